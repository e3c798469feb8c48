//! Unithereum CLI Library
//!
//! Command implementations behind the `unithereum` binary. They can also be
//! driven programmatically, for example from an editor integration that wants
//! to regenerate contract services after a build.

pub mod commands;
pub mod utils;

// Re-export command types for advanced usage
pub use commands::{
    Command, Context, GlobalArgs,
    check::CheckCommand,
    config::ConfigCommand,
    generate::GenCommand,
    regenerate::RegenerateCommand,
    sanitize::SanitizeCommand,
};
