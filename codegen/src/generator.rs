//! Nethereum contract service generation
//!
//! One [`GeneratorInvoker::generate`] call runs two external steps in strict
//! order: `dotnet tool restore`, then the Nethereum generator. The generate
//! step never starts when restore failed.
//!
//! ```text
//! Idle -> Restoring -> RestoreFailed
//!                   -> Generating -> GenerateFailed
//!                                 -> Imported
//! ```

use crate::config::Config;
use crate::error::{GenerationError, Stage};
use crate::process::{ProcessInvocation, ProcessRunner};
use std::env;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// `dotnet tool` name of the Nethereum code generator
pub const GENERATOR_TOOL: &str = "Nethereum.Generator.Console";

/// Compiler response file that silences warnings in generated code
pub const CSC_RSP_FILE: &str = "csc.rsp";
const CSC_RSP_CONTENT: &str = "-warn:0";

/// Host editor that imports generated sources
pub trait AssetHost: Send + Sync {
    /// Recursively (re)import everything under `dir`
    fn refresh(&self, dir: &Path) -> anyhow::Result<()>;
}

/// Per-invocation progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    Idle,
    Restoring,
    RestoreFailed,
    Generating,
    GenerateFailed,
    Imported,
}

impl InvocationState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            InvocationState::RestoreFailed | InvocationState::GenerateFailed | InvocationState::Imported
        )
    }
}

/// Result of a generation request that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// No `dotnet` executable is configured
    Skipped,
    /// Sources were generated into `output_dir` and handed to the host
    Imported { output_dir: PathBuf },
}

/// File name of the assembly definition for `namespace`
pub fn assembly_definition_name(namespace: &str) -> String {
    format!("{namespace}.asmdef")
}

/// Runs the external generator for one `.abi` (and optional `.bin`) pair
pub struct GeneratorInvoker {
    runner: Arc<dyn ProcessRunner>,
    host: Arc<dyn AssetHost>,
    tool_dir: PathBuf,
    assets_dir: PathBuf,
}

impl GeneratorInvoker {
    pub fn new(runner: Arc<dyn ProcessRunner>, host: Arc<dyn AssetHost>) -> Self {
        Self {
            runner,
            host,
            tool_dir: default_tool_dir(),
            assets_dir: PathBuf::from("Assets"),
        }
    }

    /// Directory holding the `dotnet-tools.json` manifest; restore and
    /// generate both run there
    pub fn with_tool_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.tool_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Base directory the configured output dir is relative to
    pub fn with_assets_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.assets_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn tool_dir(&self) -> &Path {
        &self.tool_dir
    }

    /// Absolute output directory for `config`
    pub fn output_dir(&self, config: &Config) -> PathBuf {
        self.assets_dir.join(config.output_dir())
    }

    pub fn restore_command(&self, dotnet: &Path) -> ProcessInvocation {
        ProcessInvocation::new(dotnet)
            .args(["tool", "restore"])
            .current_dir(&self.tool_dir)
    }

    pub fn generate_command(
        &self,
        dotnet: &Path,
        config: &Config,
        abi_path: &Path,
        bin_path: Option<&Path>,
    ) -> ProcessInvocation {
        let mut invocation = ProcessInvocation::new(dotnet)
            .args(["tool", "run", GENERATOR_TOOL, "--", "generate", "from-abi"])
            .arg("-o")
            .arg(self.output_dir(config).display().to_string())
            .arg("-ns")
            .arg(config.namespace_prefix())
            .arg("-abi")
            .arg(abi_path.display().to_string())
            .current_dir(&self.tool_dir);

        if let Some(bin_path) = bin_path {
            invocation = invocation.arg("-bin").arg(bin_path.display().to_string());
        }
        invocation
    }

    /// Generate contract services for `abi_path`.
    ///
    /// Returns [`GenerateOutcome::Skipped`] without touching anything when the
    /// config has no `dotnet` path; the warning for that case is logged once
    /// during config resolution.
    pub fn generate(
        &self,
        config: &Config,
        abi_path: &Path,
        bin_path: Option<&Path>,
    ) -> Result<GenerateOutcome, GenerationError> {
        let Some(dotnet) = config.dotnet_path() else {
            return Ok(GenerateOutcome::Skipped);
        };

        let mut state = InvocationState::Idle;
        let result = self.run_steps(dotnet, config, abi_path, bin_path, &mut state);
        debug!("Generation for {} ended in {:?}", abi_path.display(), state);
        result
    }

    fn run_steps(
        &self,
        dotnet: &Path,
        config: &Config,
        abi_path: &Path,
        bin_path: Option<&Path>,
        state: &mut InvocationState,
    ) -> Result<GenerateOutcome, GenerationError> {
        transition(state, InvocationState::Restoring);
        if let Err(e) = self.run_stage(Stage::Restore, &self.restore_command(dotnet)) {
            transition(state, InvocationState::RestoreFailed);
            return Err(e);
        }

        transition(state, InvocationState::Generating);
        let output_dir = self.output_dir(config);
        let generated = ensure_output_dir(&output_dir, config.namespace_prefix()).and_then(|_| {
            self.run_stage(
                Stage::Generate,
                &self.generate_command(dotnet, config, abi_path, bin_path),
            )
        });
        if let Err(e) = generated {
            transition(state, InvocationState::GenerateFailed);
            return Err(e);
        }

        if let Err(e) = self.host.refresh(&output_dir) {
            transition(state, InvocationState::GenerateFailed);
            return Err(GenerationError::Host(format!("{e:#}")));
        }
        transition(state, InvocationState::Imported);

        info!(
            "Generated contract services for {} into {}",
            abi_path.display(),
            output_dir.display()
        );
        Ok(GenerateOutcome::Imported { output_dir })
    }

    fn run_stage(&self, stage: Stage, invocation: &ProcessInvocation) -> Result<(), GenerationError> {
        let output = self
            .runner
            .run(invocation)
            .map_err(|source| GenerationError::Run { stage, source })?;

        if output.success() {
            Ok(())
        } else {
            Err(GenerationError::Process {
                stage,
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            })
        }
    }
}

fn transition(state: &mut InvocationState, next: InvocationState) {
    debug!("{:?} -> {:?}", state, next);
    *state = next;
}

fn default_tool_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Create the output directory and its marker files.
///
/// Marker files are only ever created, never rewritten. `create_new` makes a
/// concurrent duplicate attempt a no-op instead of a clobber.
pub fn ensure_output_dir(output_dir: &Path, namespace: &str) -> Result<(), GenerationError> {
    fs::create_dir_all(output_dir).map_err(|source| GenerationError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let asmdef = format!("{{\"name\": {}}}", serde_json::Value::from(namespace));
    create_if_absent(&output_dir.join(assembly_definition_name(namespace)), &asmdef)?;
    create_if_absent(&output_dir.join(CSC_RSP_FILE), CSC_RSP_CONTENT)?;
    Ok(())
}

fn create_if_absent(path: &Path, content: &str) -> Result<(), GenerationError> {
    let io_err = |source: std::io::Error| GenerationError::Io {
        path: path.to_path_buf(),
        source,
    };

    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            debug!("Creating {}", path.display());
            file.write_all(content.as_bytes()).map_err(|e| {
                // A partial marker would never be rewritten
                drop(file);
                let _ = fs::remove_file(path);
                io_err(e)
            })
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(io_err(e)),
    }
}
