use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use unithereum_cli::utils::logging::init_logging;
use unithereum_cli::{
    CheckCommand, Command, ConfigCommand, Context, GenCommand, GlobalArgs, RegenerateCommand,
    SanitizeCommand,
};

#[derive(Parser)]
#[command(name = "unithereum")]
#[command(about = "Generate Nethereum contract services for Unity projects")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate contract services for a changed .abi or .bin file
    Generate {
        /// Changed artifact, relative to the project root or absolute
        path: PathBuf,
    },
    /// Delete the output directory and regenerate every contract
    RegenerateAll {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Print the resolved configuration
    Config,
    /// Sanitize text into a valid C# namespace
    Sanitize {
        /// Text to sanitize
        text: String,
    },
    /// Check that dotnet and the generator tool are ready
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.debug);

    let context = Context::from_args(&cli.global);
    let command: Box<dyn Command + Send + Sync> = match cli.command {
        Commands::Generate { path } => Box::new(GenCommand { context, path }),
        Commands::RegenerateAll { yes } => Box::new(RegenerateCommand { context, yes }),
        Commands::Config => Box::new(ConfigCommand { context }),
        Commands::Sanitize { text } => Box::new(SanitizeCommand { input: text }),
        Commands::Check => Box::new(CheckCommand { context }),
    };

    command.execute().await
}
