//! `codegen.config.json` parsing

use crate::error::ConfigError;
use convert_case::{Case, Casing};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

pub const DOTNET_PATH_KEY: &str = "dotnetPath";
pub const NAMESPACE_PREFIX_KEY: &str = "namespacePrefix";
pub const OUTPUT_DIR_KEY: &str = "outputDir";
pub const CONTRACTS_DIR_KEY: &str = "contractsDir";

/// Raw string values found in the config file; validation happens later
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    pub dotnet_path: Option<String>,
    pub namespace_prefix: Option<String>,
    pub output_dir: Option<String>,
    pub contracts_dir: Option<String>,
}

/// Read the config file, `Ok(None)` when it does not exist
pub fn read_config_file(path: &Path) -> Result<Option<FileConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(None);
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    parse_config(&content).map(Some)
}

/// Parse config file content.
///
/// Keys are normalised to camelCase before matching, so `dotnetPath`,
/// `DotnetPath` and `dotnet_path` name the same setting. Unknown keys are
/// logged and skipped; `null` counts as unset.
pub fn parse_config(content: &str) -> Result<FileConfig, ConfigError> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| ConfigError::invalid("<root>", None, e.to_string()))?;

    let map = match value {
        Value::Object(map) => map,
        other => {
            return Err(ConfigError::invalid(
                "<root>",
                Some(&other.to_string()),
                "Config file must contain a JSON object.",
            ));
        }
    };

    let mut config = FileConfig::default();
    for (key, value) in map {
        let normalized = key.to_case(Case::Camel);
        let slot = match normalized.as_str() {
            DOTNET_PATH_KEY => &mut config.dotnet_path,
            NAMESPACE_PREFIX_KEY => &mut config.namespace_prefix,
            OUTPUT_DIR_KEY => &mut config.output_dir,
            CONTRACTS_DIR_KEY => &mut config.contracts_dir,
            _ => {
                warn!("Unithereum CodeGen: invalid config property {}. Unknown config key.", key);
                continue;
            }
        };

        if slot.is_some() {
            warn!("Unithereum CodeGen: config property {} is set more than once", normalized);
        }
        *slot = match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => {
                return Err(ConfigError::invalid(
                    normalized,
                    Some(&other.to_string()),
                    "Expected a string value.",
                ));
            }
        };
    }

    Ok(config)
}
