/// Install the global `tracing` subscriber
///
/// `RUST_LOG` wins over the `--debug` flag. An already installed subscriber
/// is left in place, so embedding callers can bring their own.
pub fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };

    // Fails only when a global subscriber is already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.into()),
        )
        .with_target(false)
        .with_line_number(debug)
        .with_file(debug)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice() {
        init_logging(false);
        init_logging(true);
        tracing::info!("still logging");
    }
}
