//! Unity project layout

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the optional config file at the project root
pub const CONFIG_FILE_NAME: &str = "codegen.config.json";

const ASSETS_DIR: &str = "Assets";
const PROJECT_SETTINGS: &str = "ProjectSettings/ProjectSettings.asset";

/// Locations inside a Unity project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `Assets/` directory; generated output paths are relative to it
    pub fn assets_dir(&self) -> PathBuf {
        self.root.join(ASSETS_DIR)
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    /// Product name from `ProjectSettings.asset`, falling back to the project
    /// directory name
    pub fn product_name(&self) -> String {
        self.read_product_name()
            .or_else(|| {
                self.root
                    .canonicalize()
                    .ok()
                    .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            })
            .unwrap_or_default()
    }

    fn read_product_name(&self) -> Option<String> {
        let path = self.root.join(PROJECT_SETTINGS);
        let content = fs::read_to_string(&path).ok()?;
        let name = parse_product_name(&content);
        if name.is_none() {
            debug!("No productName in {}", path.display());
        }
        name
    }

    /// Find the project root by looking for an `Assets/` directory upwards
    pub fn find_project_root<P: AsRef<Path>>(start_path: P) -> Option<PathBuf> {
        let mut current = start_path.as_ref().to_path_buf();

        loop {
            if current.join(ASSETS_DIR).is_dir() {
                return Some(current);
            }

            if !current.pop() {
                break;
            }
        }

        None
    }
}

/// Extract `productName` from Unity's serialized `PlayerSettings`.
///
/// The file is tagged YAML that generic parsers reject, so only the one
/// top-level key is read.
fn parse_product_name(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let value = line.trim_start().strip_prefix("productName:")?.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
            .unwrap_or(value);
        Some(value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SETTINGS: &str = r#"%YAML 1.1
%TAG !u! tag:unity3d.com,2011:
--- !u!129 &1
PlayerSettings:
  m_ObjectHideFlags: 0
  serializedVersion: 23
  companyName: DefaultCompany
  productName: My Dapp Game
  defaultCursor: {fileID: 0}
"#;

    #[test]
    fn test_parse_product_name() {
        assert_eq!(parse_product_name(SETTINGS), Some("My Dapp Game".to_string()));
        assert_eq!(
            parse_product_name("  productName: \"Quoted: Name\"\n"),
            Some("Quoted: Name".to_string())
        );
        assert_eq!(parse_product_name("companyName: X\n"), None);
    }

    #[test]
    fn test_product_name_from_settings() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("ProjectSettings")).unwrap();
        fs::write(temp_dir.path().join(PROJECT_SETTINGS), SETTINGS).unwrap();

        let layout = ProjectLayout::new(temp_dir.path());
        assert_eq!(layout.product_name(), "My Dapp Game");
    }

    #[test]
    fn test_product_name_falls_back_to_directory() {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path().join("SpaceTrader");
        fs::create_dir_all(&project).unwrap();

        let layout = ProjectLayout::new(&project);
        assert_eq!(layout.product_name(), "SpaceTrader");
    }

    #[test]
    fn test_layout_paths() {
        let layout = ProjectLayout::new("/work/game");
        assert_eq!(layout.assets_dir(), PathBuf::from("/work/game/Assets"));
        assert_eq!(
            layout.config_file(),
            PathBuf::from("/work/game/codegen.config.json")
        );
    }

    #[test]
    fn test_find_project_root() {
        let temp_dir = TempDir::new().unwrap();
        let project_dir = temp_dir.path().join("project");
        let nested_dir = project_dir.join("Assets").join("Contracts");
        fs::create_dir_all(&nested_dir).unwrap();

        let found_root = ProjectLayout::find_project_root(&nested_dir);
        assert_eq!(found_root, Some(project_dir));
    }
}
