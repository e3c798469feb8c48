pub mod check;
pub mod config;
pub mod generate;
pub mod regenerate;
pub mod sanitize;

use crate::utils::host::ConsoleHost;
use anyhow::{Context as _, Result};
use async_trait::async_trait;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use unithereum_codegen::{
    ConfigOverrides, ConfigResolver, GeneratorInvoker, ProjectLayout, Resolution, SystemRunner,
};

#[async_trait]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to the Unity project (or any directory inside it)
    #[arg(short, long, global = true, default_value = ".", env = "UNITHEREUM_PROJECT")]
    pub project: PathBuf,

    /// Enable debug/verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::SetTrue)]
    pub debug: bool,

    /// Absolute path to the `dotnet` executable
    #[arg(long, global = true, env = "UNITHEREUM_DOTNET_PATH")]
    pub dotnet_path: Option<PathBuf>,

    /// Namespace prefix for generated contract services
    #[arg(long, global = true, env = "UNITHEREUM_NAMESPACE_PREFIX")]
    pub namespace_prefix: Option<String>,

    /// Output directory, relative to `Assets/`
    #[arg(long, global = true, env = "UNITHEREUM_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory scanned for `.abi` files, relative to the project root
    #[arg(long, global = true, env = "UNITHEREUM_CONTRACTS_DIR")]
    pub contracts_dir: Option<PathBuf>,

    /// Product name used for the default namespace prefix
    #[arg(long, global = true, env = "UNITHEREUM_PRODUCT_NAME")]
    pub product_name: Option<String>,

    /// Directory containing the dotnet tool manifest
    #[arg(long, global = true, env = "UNITHEREUM_TOOL_DIR")]
    pub tool_dir: Option<PathBuf>,

    /// Seconds each dotnet step may run before it is killed (0 disables)
    #[arg(long, global = true, default_value_t = 600, env = "UNITHEREUM_TIMEOUT_SECS")]
    pub timeout_secs: u64,
}

impl GlobalArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            dotnet_path: self.dotnet_path.clone(),
            namespace_prefix: self.namespace_prefix.clone(),
            output_dir: self.output_dir.clone(),
            contracts_dir: self.contracts_dir.clone(),
            product_name: self.product_name.clone(),
        }
    }
}

/// Everything a command needs to resolve config and run the generator
#[derive(Clone)]
pub struct Context {
    pub layout: ProjectLayout,
    pub overrides: ConfigOverrides,
    pub runner: Arc<SystemRunner>,
    pub tool_dir: Option<PathBuf>,
}

impl Context {
    pub fn from_args(args: &GlobalArgs) -> Self {
        let root = ProjectLayout::find_project_root(&args.project).unwrap_or_else(|| args.project.clone());
        let runner = match args.timeout_secs {
            0 => SystemRunner::new(),
            secs => SystemRunner::with_timeout(Duration::from_secs(secs)),
        };

        Self {
            layout: ProjectLayout::new(root),
            overrides: args.overrides(),
            runner: Arc::new(runner),
            tool_dir: args.tool_dir.clone(),
        }
    }

    /// Resolve the config for this project; called again on every reload
    pub fn resolve(&self) -> Result<Resolution> {
        let config_file = self.layout.config_file();
        ConfigResolver::for_project(&self.layout, self.runner.clone())
            .resolve(&self.overrides, &config_file)
            .with_context(|| format!("Failed to resolve codegen config for {}", self.layout.root().display()))
    }

    pub fn invoker(&self) -> GeneratorInvoker {
        let invoker = GeneratorInvoker::new(self.runner.clone(), Arc::new(ConsoleHost))
            .with_assets_dir(self.layout.assets_dir());
        match &self.tool_dir {
            Some(dir) => invoker.with_tool_dir(dir),
            None => invoker,
        }
    }
}

/// Run blocking generation work off the async runtime
pub(crate) async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .context("Generation task panicked")?
}
