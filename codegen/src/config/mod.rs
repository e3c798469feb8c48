//! Code generation configuration
//!
//! A [`Config`] is built once per load from explicit overrides, the optional
//! `codegen.config.json` and defaults, and is never mutated afterwards. A
//! reload builds a new one.

pub mod discovery;
pub mod file;

use crate::error::ConfigError;
use crate::namespace::{self, DEFAULT_NAMESPACE_SUFFIX};
use crate::process::ProcessRunner;
use crate::project::ProjectLayout;
use derive_builder::Builder;
use discovery::{Discovery, Platform};
use file::{CONTRACTS_DIR_KEY, DOTNET_PATH_KEY, NAMESPACE_PREFIX_KEY, OUTPUT_DIR_KEY};
use serde::Serialize;
use std::path::{self, Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_CONTRACTS_DIR: &str = "Assets";

/// Validated code generation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    dotnet_path: Option<PathBuf>,
    namespace_prefix: String,
    output_dir: PathBuf,
    contracts_dir: PathBuf,
}

impl Config {
    /// Build a config from explicit values, applying the same checks as
    /// [`ConfigResolver::resolve`]
    pub fn new(
        dotnet_path: Option<PathBuf>,
        namespace_prefix: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        contracts_dir: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let namespace_prefix = namespace_prefix.into();
        let output_dir = output_dir.into();
        let contracts_dir = contracts_dir.into();

        let dotnet_path = dotnet_path.as_deref().map(check_dotnet_path).transpose()?;
        check_namespace_prefix(&namespace_prefix)?;
        check_relative(OUTPUT_DIR_KEY, &output_dir, "Asset/")?;
        check_relative(CONTRACTS_DIR_KEY, &contracts_dir, "Unity project")?;

        Ok(Self {
            dotnet_path,
            namespace_prefix,
            output_dir,
            contracts_dir,
        })
    }

    /// Absolute path of `dotnet`; `None` disables generation
    pub fn dotnet_path(&self) -> Option<&Path> {
        self.dotnet_path.as_deref()
    }

    pub fn namespace_prefix(&self) -> &str {
        &self.namespace_prefix
    }

    /// Output directory, relative to the project's `Assets/`
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Directory scanned for `.abi` files, relative to the project root
    pub fn contracts_dir(&self) -> &Path {
        &self.contracts_dir
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Returns the absolute form of `path`; generation runs `dotnet` from the
/// tool dir, not from the directory the path was given in
fn check_dotnet_path(path: &Path) -> Result<PathBuf, ConfigError> {
    let invalid = |reason: String| {
        ConfigError::invalid(DOTNET_PATH_KEY, Some(&path.display().to_string()), reason)
    };

    if !path.is_file() {
        return Err(invalid(
            "`dotnet` executable doesn't exist at given path.".to_string(),
        ));
    }
    path::absolute(path).map_err(|e| invalid(e.to_string()))
}

fn check_namespace_prefix(prefix: &str) -> Result<(), ConfigError> {
    if namespace::is_sanitized(prefix) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            NAMESPACE_PREFIX_KEY,
            Some(prefix),
            format!(
                "Use proper C# namespace identifier, e.g. `{}`.",
                namespace::sanitize(prefix)
            ),
        ))
    }
}

/// The path must name a subdirectory of `base`: no root, no `.`/`..`, not empty
fn check_relative(field: &str, path: &Path, base: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| {
        ConfigError::invalid(field, Some(&path.display().to_string()), reason)
    };

    if path.is_absolute() || path.has_root() {
        return Err(invalid(format!(
            "Using absolute path is not supported. Use relative path to {base} directory instead."
        )));
    }
    let mut components = path.components().peekable();
    if components.peek().is_none() {
        return Err(invalid(format!(
            "Path must name a directory inside the {base} directory."
        )));
    }
    if !components.all(|c| matches!(c, Component::Normal(_))) {
        return Err(invalid(format!(
            "`.` and `..` are not supported. Use a path inside the {base} directory."
        )));
    }
    Ok(())
}

/// Values supplied by the caller (command line, environment). Config file
/// values take precedence over these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
#[builder(default, setter(into, strip_option))]
pub struct ConfigOverrides {
    pub dotnet_path: Option<PathBuf>,
    pub namespace_prefix: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub contracts_dir: Option<PathBuf>,
    /// Replaces the product name used for the default namespace prefix
    pub product_name: Option<String>,
}

/// Outcome of a successful resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// `dotnet` was found; generation can run
    Ready(Config),
    /// Settings are valid but `dotnet` could not be found; generation is skipped
    Unconfigured(Config),
}

impl Resolution {
    pub fn config(&self) -> &Config {
        match self {
            Resolution::Ready(config) | Resolution::Unconfigured(config) => config,
        }
    }

    pub fn into_config(self) -> Config {
        match self {
            Resolution::Ready(config) | Resolution::Unconfigured(config) => config,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Resolution::Ready(_))
    }
}

/// Produces validated [`Config`] values
pub struct ConfigResolver {
    discovery: Discovery,
    product_name: String,
}

impl ConfigResolver {
    pub fn new(discovery: Discovery, product_name: impl Into<String>) -> Self {
        Self {
            discovery,
            product_name: product_name.into(),
        }
    }

    /// Resolver for a Unity project using the platform's discovery chain
    pub fn for_project(layout: &ProjectLayout, runner: Arc<dyn ProcessRunner>) -> Self {
        Self::new(
            Discovery::for_platform(Platform::current(), runner),
            layout.product_name(),
        )
    }

    /// Resolve a config from `overrides` and the file at `config_file`.
    ///
    /// Explicit values are validated in the order dotnet path, namespace
    /// prefix, output dir, contracts dir. Discovery only runs when no dotnet
    /// path was given, and a miss yields [`Resolution::Unconfigured`].
    pub fn resolve(
        &self,
        overrides: &ConfigOverrides,
        config_file: &Path,
    ) -> Result<Resolution, ConfigError> {
        let file = file::read_config_file(config_file)?.unwrap_or_default();

        let dotnet_path = file
            .dotnet_path
            .map(PathBuf::from)
            .or_else(|| overrides.dotnet_path.clone());
        let namespace_prefix = file
            .namespace_prefix
            .or_else(|| overrides.namespace_prefix.clone());
        let output_dir = file
            .output_dir
            .map(PathBuf::from)
            .or_else(|| overrides.output_dir.clone());
        let contracts_dir = file
            .contracts_dir
            .map(PathBuf::from)
            .or_else(|| overrides.contracts_dir.clone());

        let dotnet_path = dotnet_path.as_deref().map(check_dotnet_path).transpose()?;
        if let Some(prefix) = &namespace_prefix {
            check_namespace_prefix(prefix)?;
        }
        if let Some(dir) = &output_dir {
            check_relative(OUTPUT_DIR_KEY, dir, "Asset/")?;
        }
        if let Some(dir) = &contracts_dir {
            check_relative(CONTRACTS_DIR_KEY, dir, "Unity project")?;
        }

        let dotnet_path = match dotnet_path {
            Some(path) => Some(path),
            None => self.discovery.locate()?,
        };

        let product_name = overrides.product_name.as_deref().unwrap_or(&self.product_name);
        let config = Config {
            dotnet_path,
            namespace_prefix: namespace_prefix
                .unwrap_or_else(|| namespace::default_namespace_prefix(product_name)),
            output_dir: output_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_NAMESPACE_SUFFIX)),
            contracts_dir: contracts_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_CONTRACTS_DIR)),
        };

        if config.dotnet_path.is_some() {
            info!(
                "Resolved codegen config: namespace {} -> {}",
                config.namespace_prefix,
                config.output_dir.display()
            );
            Ok(Resolution::Ready(config))
        } else {
            warn!("dotnet not found in PATH, Nethereum code generation will not work.");
            Ok(Resolution::Unconfigured(config))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::discovery::Locator;
    use std::fs;
    use tempfile::TempDir;

    struct Found(Option<PathBuf>);

    impl Locator for Found {
        fn name(&self) -> &str {
            "test"
        }

        fn locate(&self) -> Result<Option<PathBuf>, ConfigError> {
            Ok(self.0.clone())
        }
    }

    struct Broken;

    impl Locator for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn locate(&self) -> Result<Option<PathBuf>, ConfigError> {
            Err(ConfigError::ShellDiscovery("no passwd entry".into()))
        }
    }

    fn resolver(found: Option<PathBuf>) -> ConfigResolver {
        ConfigResolver::new(Discovery::new().with_locator(Found(found)), "My Game")
    }

    fn fake_dotnet(dir: &Path) -> PathBuf {
        let path = dir.join("dotnet");
        fs::write(&path, "").unwrap();
        path
    }

    #[test]
    fn test_defaults_without_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let dotnet = fake_dotnet(temp_dir.path());

        let resolution = resolver(Some(dotnet.clone()))
            .resolve(&ConfigOverrides::default(), &temp_dir.path().join("codegen.config.json"))
            .unwrap();

        assert!(resolution.is_ready());
        let config = resolution.config();
        assert_eq!(config.dotnet_path(), Some(dotnet.as_path()));
        assert_eq!(config.namespace_prefix(), "My_Game.ContractServices");
        assert_eq!(config.output_dir(), Path::new("ContractServices"));
        assert_eq!(config.contracts_dir(), Path::new("Assets"));
    }

    #[test]
    fn test_missing_dotnet_is_unconfigured() {
        let temp_dir = TempDir::new().unwrap();
        let resolution = resolver(None)
            .resolve(&ConfigOverrides::default(), &temp_dir.path().join("codegen.config.json"))
            .unwrap();

        assert!(!resolution.is_ready());
        assert_eq!(resolution.config().dotnet_path(), None);
    }

    #[test]
    fn test_shell_discovery_failure_is_hard() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = ConfigResolver::new(Discovery::new().with_locator(Broken), "Game");
        let result = resolver.resolve(&ConfigOverrides::default(), &temp_dir.path().join("none.json"));

        assert!(matches!(result, Err(ConfigError::ShellDiscovery(_))));
    }

    #[test]
    fn test_file_overlays_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("codegen.config.json");
        fs::write(&config_path, r#"{"namespacePrefix": "File.Ns", "extra": true}"#).unwrap();

        let overrides = ConfigOverridesBuilder::default()
            .namespace_prefix("Flag.Ns")
            .output_dir("FromFlag")
            .build()
            .unwrap();

        let config = resolver(None).resolve(&overrides, &config_path).unwrap().into_config();
        assert_eq!(config.namespace_prefix(), "File.Ns");
        assert_eq!(config.output_dir(), Path::new("FromFlag"));
    }

    #[test]
    fn test_product_name_override() {
        let temp_dir = TempDir::new().unwrap();
        let overrides = ConfigOverridesBuilder::default()
            .product_name("class")
            .build()
            .unwrap();

        let config = resolver(None)
            .resolve(&overrides, &temp_dir.path().join("none.json"))
            .unwrap()
            .into_config();
        assert_eq!(config.namespace_prefix(), "@class.ContractServices");
    }

    #[test]
    fn test_invalid_namespace_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("codegen.config.json");
        fs::write(&config_path, r#"{"namespacePrefix": "My App"}"#).unwrap();

        let err = resolver(None)
            .resolve(&ConfigOverrides::default(), &config_path)
            .unwrap_err();
        assert_eq!(err.field(), Some("namespacePrefix"));
        assert!(err.to_string().contains("My_App"));
    }

    #[test]
    fn test_absolute_output_dir_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let absolute = temp_dir.path().join("Out");
        let overrides = ConfigOverridesBuilder::default()
            .output_dir(absolute)
            .build()
            .unwrap();

        let err = resolver(None)
            .resolve(&overrides, &temp_dir.path().join("none.json"))
            .unwrap_err();
        assert_eq!(err.field(), Some("outputDir"));
    }

    #[test]
    fn test_missing_explicit_dotnet_rejected_before_namespace() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("codegen.config.json");
        let missing = temp_dir.path().join("no-dotnet");
        fs::write(
            &config_path,
            serde_json::json!({
                "dotnetPath": missing,
                "namespacePrefix": "not valid",
            })
            .to_string(),
        )
        .unwrap();

        let err = resolver(None)
            .resolve(&ConfigOverrides::default(), &config_path)
            .unwrap_err();
        assert_eq!(err.field(), Some("dotnetPath"));
    }

    #[test]
    fn test_config_new_validates_namespace() {
        assert!(Config::new(None, "App.Contracts", "Out", "Assets").is_ok());

        let err = Config::new(None, "App Contracts", "Out", "Assets").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidConfiguration { ref field, .. } if field == "namespacePrefix"
        ));
    }

    #[test]
    fn test_config_new_rejects_absolute_contracts_dir() {
        let err = Config::new(None, "App", "Out", "/abs/contracts").unwrap_err();
        assert_eq!(err.field(), Some("contractsDir"));
    }

    #[test]
    fn test_output_dir_must_stay_inside_assets() {
        let temp_dir = TempDir::new().unwrap();
        let dotnet = fake_dotnet(temp_dir.path());
        let config_path = temp_dir.path().join("codegen.config.json");

        for output_dir in ["", ".", "..", "a/../..", "./Out", "Out/.."] {
            fs::write(
                &config_path,
                serde_json::json!({
                    "dotnetPath": dotnet,
                    "namespacePrefix": "App",
                    "outputDir": output_dir,
                })
                .to_string(),
            )
            .unwrap();

            let err = resolver(None)
                .resolve(&ConfigOverrides::default(), &config_path)
                .unwrap_err();
            assert_eq!(err.field(), Some("outputDir"), "outputDir {:?}", output_dir);
        }
    }

    #[test]
    fn test_nested_output_dir_accepted() {
        let config = Config::new(None, "App", "Generated/Contracts", "Assets/Abi").unwrap();
        assert_eq!(config.output_dir(), Path::new("Generated/Contracts"));
    }

    #[test]
    fn test_contracts_dir_cannot_escape_project() {
        for contracts_dir in ["", "..", "../Other"] {
            let err = Config::new(None, "App", "Out", contracts_dir).unwrap_err();
            assert_eq!(err.field(), Some("contractsDir"));
        }
    }

    #[test]
    fn test_relative_dotnet_path_made_absolute() {
        // Tests run from the crate directory
        let config = Config::new(Some("Cargo.toml".into()), "App", "Out", "Assets").unwrap();
        let resolved = config.dotnet_path().unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved, std::env::current_dir().unwrap().join("Cargo.toml"));
    }

    #[test]
    fn test_dotnet_path_from_file_is_absolute() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("codegen.config.json");
        fs::write(&config_path, r#"{"dotnetPath": "Cargo.toml"}"#).unwrap();

        let resolution = resolver(None)
            .resolve(&ConfigOverrides::default(), &config_path)
            .unwrap();
        let dotnet = resolution.config().dotnet_path().unwrap();
        assert!(dotnet.is_absolute());
        assert!(dotnet.ends_with("Cargo.toml"));
    }

    #[test]
    fn test_config_serializes_camel_case() {
        let config = Config::new(None, "App.Contracts", "Out", "Assets").unwrap();
        let json: serde_json::Value = serde_json::from_str(&config.to_json().unwrap()).unwrap();

        assert_eq!(json["namespacePrefix"], "App.Contracts");
        assert_eq!(json["outputDir"], "Out");
        assert_eq!(json["contractsDir"], "Assets");
        assert!(json["dotnetPath"].is_null());
    }
}
