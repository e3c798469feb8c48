use super::{Command, Context, blocking};
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use unithereum_codegen::{ArtifactPair, GenerateOutcome};

/// Regenerate the contract services affected by one changed file
pub struct GenCommand {
    pub context: Context,
    /// Changed `.abi` or `.bin` file; relative paths are taken from the project root
    pub path: PathBuf,
}

impl GenCommand {
    /// A skip stays quiet; the resolver already warned about the missing dotnet
    fn report(abi: &Path, outcome: GenerateOutcome) {
        match outcome {
            GenerateOutcome::Imported { output_dir } => {
                println!(
                    "✅ Generated contract services for {} into {}",
                    abi.display(),
                    output_dir.display()
                );
            }
            GenerateOutcome::Skipped => {
                debug!("Skipped {}: dotnet is not configured", abi.display());
            }
        }
    }

    fn changed_path(&self) -> PathBuf {
        if self.path.is_absolute() {
            self.path.clone()
        } else {
            self.context.layout.root().join(&self.path)
        }
    }
}

#[async_trait]
impl Command for GenCommand {
    async fn execute(&self) -> Result<()> {
        let changed = self.changed_path();
        let Some(pair) = ArtifactPair::from_changed_path(&changed) else {
            info!("{} is not a contract artifact, nothing to generate", changed.display());
            return Ok(());
        };

        let context = self.context.clone();
        blocking(move || {
            let resolution = context.resolve()?;
            let outcome = context
                .invoker()
                .generate(resolution.config(), &pair.abi, pair.bin())?;
            GenCommand::report(&pair.abi, outcome);
            Ok(())
        })
        .await
    }
}
