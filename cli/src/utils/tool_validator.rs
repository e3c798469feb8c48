use crate::utils::report::{CheckReport, Finding};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use unithereum_codegen::generator::GENERATOR_TOOL;
use unithereum_codegen::{ProcessInvocation, ProcessRunner};

/// Local dotnet tool manifest locations, in the order `dotnet` looks for them
const MANIFEST_LOCATIONS: [&str; 2] = [".config/dotnet-tools.json", "dotnet-tools.json"];

/// Checks the dotnet side of code generation
pub struct ToolValidator {
    runner: Arc<dyn ProcessRunner>,
}

impl ToolValidator {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Check that `dotnet` was found and answers `--version`
    pub fn check_dotnet(&self, dotnet: Option<&Path>, report: &mut CheckReport) {
        let Some(dotnet) = dotnet else {
            report.push(
                Finding::error("dotnet not found in PATH")
                    .with_hint(Self::get_dotnet_install_command()),
            );
            return;
        };

        let invocation = ProcessInvocation::new(dotnet).arg("--version");
        match self.runner.run(&invocation) {
            Ok(output) if output.success() => {
                report.push(Finding::passed(format!(
                    "dotnet {} at {}",
                    output.stdout.trim(),
                    dotnet.display()
                )));
            }
            Ok(output) => {
                report.push(
                    Finding::error(format!(
                        "`{}` exited with {:?}: {}",
                        invocation,
                        output.exit_code,
                        output.stderr.trim()
                    ))
                    .with_hint(Self::get_dotnet_install_command()),
                );
            }
            Err(e) => {
                report.push(
                    Finding::error(format!("Failed to run {}: {}", dotnet.display(), e))
                        .with_hint(Self::get_dotnet_install_command()),
                );
            }
        }
    }

    /// Check that the tool directory has a manifest listing the generator
    pub fn check_tool_manifest(&self, tool_dir: &Path, report: &mut CheckReport) {
        let Some(manifest) = Self::find_manifest(tool_dir) else {
            report.push(
                Finding::error(format!(
                    "No dotnet tool manifest in {}",
                    tool_dir.display()
                ))
                .with_hint(format!(
                    "Run in {}:\n  dotnet new tool-manifest\n  dotnet tool install {}",
                    tool_dir.display(),
                    GENERATOR_TOOL
                )),
            );
            return;
        };

        let listed = fs::read_to_string(&manifest)
            .map_err(|e| e.to_string())
            .and_then(|text| Self::manifest_lists_generator(&text));

        match listed {
            Ok(true) => {
                report.push(Finding::passed(format!("{} is listed", GENERATOR_TOOL)).with_file(manifest));
            }
            Ok(false) => {
                report.push(
                    Finding::error(format!("{} is not listed", GENERATOR_TOOL))
                        .with_file(manifest)
                        .with_hint(format!("dotnet tool install {}", GENERATOR_TOOL)),
                );
            }
            Err(e) => {
                report.push(
                    Finding::error(format!("Unreadable tool manifest: {}", e)).with_file(manifest),
                );
            }
        }
    }

    fn find_manifest(tool_dir: &Path) -> Option<PathBuf> {
        MANIFEST_LOCATIONS
            .iter()
            .map(|location| tool_dir.join(location))
            .find(|path| path.is_file())
    }

    /// Tool ids in a manifest are case-insensitive
    fn manifest_lists_generator(text: &str) -> Result<bool, String> {
        let manifest: serde_json::Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
        let listed = manifest
            .get("tools")
            .and_then(|tools| tools.as_object())
            .map(|tools| tools.keys().any(|id| id.eq_ignore_ascii_case(GENERATOR_TOOL)))
            .unwrap_or(false);
        Ok(listed)
    }

    /// Get dotnet installation command for the current platform
    #[cfg(target_os = "macos")]
    fn get_dotnet_install_command() -> String {
        r#"macOS:
  brew install --cask dotnet-sdk
  # Or download the .NET SDK from https://dotnet.microsoft.com/download"#
            .to_string()
    }

    #[cfg(target_os = "linux")]
    fn get_dotnet_install_command() -> String {
        r#"Linux (Ubuntu/Debian):
  sudo apt-get update
  sudo apt-get install dotnet-sdk-8.0

Linux (Fedora):
  sudo dnf install dotnet-sdk-8.0

Or use the install script:
  curl -sSL https://dot.net/v1/dotnet-install.sh | bash"#
            .to_string()
    }

    #[cfg(target_os = "windows")]
    fn get_dotnet_install_command() -> String {
        r#"Windows:
  winget install Microsoft.DotNet.SDK.8

  # Or with Chocolatey:
  choco install dotnet-sdk"#
            .to_string()
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    fn get_dotnet_install_command() -> String {
        "Please install the .NET SDK from https://dotnet.microsoft.com/download".to_string()
    }
}
