use super::Command;
use anyhow::Result;
use async_trait::async_trait;
use unithereum_codegen::sanitize;

pub struct SanitizeCommand {
    pub input: String,
}

#[async_trait]
impl Command for SanitizeCommand {
    async fn execute(&self) -> Result<()> {
        println!("{}", sanitize(&self.input));
        Ok(())
    }
}
