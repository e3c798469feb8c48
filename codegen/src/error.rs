//! Error types for configuration resolution and code generation

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors produced while resolving a [`crate::Config`]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A user-supplied value is malformed or unsafe
    #[error("Invalid Unithereum CodeGen config: {field}.{} {reason}", display_value(.value))]
    InvalidConfiguration {
        field: String,
        value: Option<String>,
        reason: String,
    },

    /// The login shell of the current user could not be determined, so the
    /// `dotnet` executable cannot be looked up at all
    #[error("Could not determine the login shell needed to find `dotnet`: {0}")]
    ShellDiscovery(String),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_ref()
        .map(|v| format!(" ({v})"))
        .unwrap_or_default()
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, value: Option<&str>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidConfiguration {
            field: field.into(),
            value: value.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// Name of the offending config field, if this is a validation failure
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::InvalidConfiguration { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// The external process step a generation failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Restore,
    Generate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Restore => write!(f, "dotnet tool restore"),
            Stage::Generate => write!(f, "contract service generation"),
        }
    }
}

/// Failure of a single external process run, before it is attributed to a stage
#[derive(Error, Debug)]
pub enum RunError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` did not exit within {}s", .after.as_secs())]
    TimedOut { program: String, after: Duration },

    #[error("i/o error while waiting for `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors produced by [`crate::GeneratorInvoker::generate`]
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The external process exited with a non-zero status
    #[error("{stage} failed (exit code {}): {stderr}", display_code(.exit_code))]
    Process {
        stage: Stage,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("{stage} could not run: {source}")]
    Run {
        stage: Stage,
        #[source]
        source: RunError,
    },

    #[error("Failed to prepare {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Asset refresh failed: {0}")]
    Host(String),
}

fn display_code(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "terminated by signal".to_string())
}

impl GenerationError {
    /// The process stage this error belongs to, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            GenerationError::Process { stage, .. } | GenerationError::Run { stage, .. } => {
                Some(*stage)
            }
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            GenerationError::Run {
                source: RunError::TimedOut { .. },
                ..
            }
        )
    }
}
