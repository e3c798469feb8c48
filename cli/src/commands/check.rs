use super::{Command, Context, blocking};
use crate::utils::report::{CheckReport, Finding};
use crate::utils::tool_validator::ToolValidator;
use anyhow::{Result, bail};
use async_trait::async_trait;
use unithereum_codegen::artifacts;

/// Check that code generation can run in this project
pub struct CheckCommand {
    pub context: Context,
}

impl CheckCommand {
    fn run_checks(context: &Context) -> CheckReport {
        let mut report = CheckReport::new();

        let resolution = match context.resolve() {
            Ok(resolution) => resolution,
            Err(e) => {
                report.push(Finding::config_error(&e, &context.layout.config_file()));
                return report;
            }
        };
        report.push(Finding::passed("Configuration is valid"));

        let config = resolution.config();
        let validator = ToolValidator::new(context.runner.clone());
        validator.check_dotnet(config.dotnet_path(), &mut report);
        validator.check_tool_manifest(context.invoker().tool_dir(), &mut report);

        let contracts_dir = context.layout.root().join(config.contracts_dir());
        match artifacts::scan(&contracts_dir).len() {
            0 => report.push(
                Finding::warning("No .abi files found")
                    .with_file(&contracts_dir)
                    .with_hint("Set contractsDir in codegen.config.json"),
            ),
            count => report.push(
                Finding::passed(format!("{} contract(s) found", count)).with_file(&contracts_dir),
            ),
        }

        report
    }
}

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self) -> Result<()> {
        let context = self.context.clone();
        let report = blocking(move || Ok(CheckCommand::run_checks(&context))).await?;

        println!("{}", report);
        if report.has_errors() {
            bail!("Code generation is not ready: {} error(s)", report.error_count());
        }
        println!("✅ Ready to generate contract services");
        Ok(())
    }
}
