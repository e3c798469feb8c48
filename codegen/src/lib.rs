//! Unithereum CodeGen
//!
//! Generates Nethereum contract service classes for a Unity project by
//! driving the external `Nethereum.Generator.Console` dotnet tool. The crate
//! resolves and validates configuration, finds the `dotnet` executable,
//! pairs `.abi`/`.bin` inputs and runs the restore/generate steps.

pub mod artifacts;
pub mod codegen;
pub mod config;
pub mod error;
pub mod generator;
pub mod namespace;
pub mod process;
pub mod project;

// Re-export commonly used types for convenience
pub use artifacts::ArtifactPair;
pub use codegen::{CodegenResult, regenerate_all};
pub use config::discovery::{Discovery, Locator, Platform};
pub use config::{Config, ConfigOverrides, ConfigOverridesBuilder, ConfigResolver, Resolution};
pub use error::{ConfigError, GenerationError, RunError, Stage};
pub use generator::{AssetHost, GenerateOutcome, GeneratorInvoker, InvocationState};
pub use namespace::sanitize;
pub use process::{ProcessInvocation, ProcessOutput, ProcessRunner, SystemRunner};
pub use project::ProjectLayout;
