use super::{Command, Context, blocking};
use anyhow::{Context as _, Result};
use async_trait::async_trait;

/// Print the resolved configuration as JSON
pub struct ConfigCommand {
    pub context: Context,
}

#[async_trait]
impl Command for ConfigCommand {
    async fn execute(&self) -> Result<()> {
        let context = self.context.clone();
        let resolution = blocking(move || context.resolve()).await?;
        let json = resolution
            .config()
            .to_json()
            .context("Failed to serialize configuration")?;

        println!("{}", json);
        if !resolution.is_ready() {
            eprintln!("⚠️  dotnet was not found; code generation is disabled");
        }
        Ok(())
    }
}
