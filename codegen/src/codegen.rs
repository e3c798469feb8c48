//! Project-wide regeneration
//!
//! Wipes the generated output and runs the generator once per `.abi` found
//! under the configured contracts directory.

use crate::artifacts::{self, ArtifactPair};
use crate::config::Config;
use crate::error::GenerationError;
use crate::generator::{GenerateOutcome, GeneratorInvoker};
use crate::project::ProjectLayout;
use derive_builder::Builder;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{error, info};

/// Result of generating one artifact pair
#[derive(Debug, Clone, Builder)]
pub struct CodegenResult {
    pub abi_path: PathBuf,
    pub success: bool,
    pub message: String,
}

/// Delete the output directory, then generate every pair under the contracts
/// directory. A failing pair is recorded and the rest still run.
pub fn regenerate_all(
    invoker: &GeneratorInvoker,
    config: &Config,
    layout: &ProjectLayout,
) -> Result<Vec<CodegenResult>, GenerationError> {
    let output_dir = invoker.output_dir(config);
    match fs::remove_dir_all(&output_dir) {
        Ok(()) => info!("Removed {}", output_dir.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(source) => {
            return Err(GenerationError::Io {
                path: output_dir,
                source,
            });
        }
    }

    let contracts_dir = layout.root().join(config.contracts_dir());
    let pairs = artifacts::scan(&contracts_dir);
    info!("Regenerating {} contract(s) from {}", pairs.len(), contracts_dir.display());

    Ok(pairs
        .iter()
        .map(|pair| generate_pair(invoker, config, pair))
        .collect())
}

fn generate_pair(invoker: &GeneratorInvoker, config: &Config, pair: &ArtifactPair) -> CodegenResult {
    match invoker.generate(config, &pair.abi, pair.bin()) {
        Ok(GenerateOutcome::Imported { output_dir }) => CodegenResult {
            abi_path: pair.abi.clone(),
            success: true,
            message: format!("generated into {}", output_dir.display()),
        },
        Ok(GenerateOutcome::Skipped) => CodegenResult {
            abi_path: pair.abi.clone(),
            success: false,
            message: "skipped: dotnet is not configured".to_string(),
        },
        Err(e) => {
            error!("Generation failed for {}: {}", pair.abi.display(), e);
            CodegenResult {
                abi_path: pair.abi.clone(),
                success: false,
                message: format!("Generation failed: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::testing::RecordingHost;
    use crate::process::testing::RecordingRunner;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn project() -> (TempDir, Config) {
        let temp_dir = TempDir::new().unwrap();
        let dotnet = temp_dir.path().join("dotnet");
        fs::write(&dotnet, "").unwrap();
        let contracts = temp_dir.path().join("Assets").join("Contracts");
        fs::create_dir_all(&contracts).unwrap();
        fs::write(contracts.join("A.abi"), "[]").unwrap();
        fs::write(contracts.join("B.abi"), "[]").unwrap();
        fs::write(contracts.join("B.bin"), "6080").unwrap();

        let config = Config::new(Some(dotnet), "Game.ContractServices", "ContractServices", "Assets").unwrap();
        (temp_dir, config)
    }

    #[test]
    fn test_regenerate_all_wipes_and_generates_each_pair() {
        let (temp_dir, config) = project();
        let layout = ProjectLayout::new(temp_dir.path());
        let stale = layout.assets_dir().join("ContractServices").join("Stale.cs");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "// old").unwrap();

        let runner = Arc::new(RecordingRunner::new());
        let invoker = GeneratorInvoker::new(runner.clone(), Arc::new(RecordingHost::default()))
            .with_assets_dir(layout.assets_dir());

        let results = regenerate_all(&invoker, &config, &layout).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.success));
        assert!(!stale.exists());

        let generate_calls: Vec<_> = runner
            .calls()
            .into_iter()
            .filter(|c| c.args.iter().any(|a| a == "from-abi"))
            .collect();
        assert_eq!(generate_calls.len(), 2);
        assert!(generate_calls[0].flag_value("-abi").unwrap().ends_with("A.abi"));
        assert_eq!(generate_calls[0].count_flag("-bin"), 0);
        assert!(generate_calls[1].flag_value("-bin").unwrap().ends_with("B.bin"));
    }

    #[test]
    fn test_regenerate_all_continues_after_failure() {
        let (temp_dir, config) = project();
        let layout = ProjectLayout::new(temp_dir.path());

        let runner = Arc::new(RecordingRunner::new());
        runner.push_exit(1, "", "restore broke");
        let invoker = GeneratorInvoker::new(runner.clone(), Arc::new(RecordingHost::default()))
            .with_assets_dir(layout.assets_dir());

        let results = regenerate_all(&invoker, &config, &layout).unwrap();
        assert!(!results[0].success);
        assert!(results[0].message.contains("restore broke"));
        assert!(results[1].success);
        assert_eq!(results[1].abi_path.file_name(), Some(Path::new("B.abi").as_os_str()));
    }

    #[test]
    fn test_codegen_result_builder() {
        let result = CodegenResultBuilder::default()
            .abi_path(PathBuf::from("Token.abi"))
            .success(true)
            .message("ok".to_string())
            .build()
            .unwrap();
        assert!(result.success);
    }
}
