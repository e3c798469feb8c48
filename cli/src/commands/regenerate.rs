use super::{Command, Context, blocking};
use anyhow::{Result, bail};
use async_trait::async_trait;
use dialoguer::Confirm;
use unithereum_codegen::regenerate_all;

/// Delete all generated contract services and generate them again
pub struct RegenerateCommand {
    pub context: Context,
    /// Skip the confirmation prompt
    pub yes: bool,
}

#[async_trait]
impl Command for RegenerateCommand {
    async fn execute(&self) -> Result<()> {
        let context = self.context.clone();
        let resolution = blocking(move || context.resolve()).await?;
        if !resolution.is_ready() {
            bail!("dotnet not found in PATH, Nethereum code generation will not work.");
        }

        let config = resolution.into_config();
        let output_dir = self.context.invoker().output_dir(&config);

        if !self.yes {
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "This will delete {} and regenerate every contract service. Continue?",
                    output_dir.display()
                ))
                .default(false)
                .interact()?;
            if !confirmed {
                println!("Cancelled.");
                return Ok(());
            }
        }

        let context = self.context.clone();
        let results = blocking(move || {
            Ok(regenerate_all(&context.invoker(), &config, &context.layout)?)
        })
        .await?;

        let succeeded = results.iter().filter(|r| r.success).count();
        println!(
            "✅ Code generation completed: {} of {} contract(s) generated",
            succeeded,
            results.len()
        );

        // Report any failures
        for result in results.iter().filter(|r| !r.success) {
            println!("❌ {}: {}", result.abi_path.display(), result.message);
        }

        if succeeded < results.len() {
            bail!("{} contract(s) failed to generate", results.len() - succeeded);
        }
        Ok(())
    }
}
