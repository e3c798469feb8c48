use std::path::Path;
use tracing::info;
use unithereum_codegen::AssetHost;
use walkdir::WalkDir;

/// Stands in for the Unity asset database when running from a terminal
///
/// Unity picks the files up on its next refresh; all this host can do is
/// report what landed on disk.
pub struct ConsoleHost;

impl ConsoleHost {
    pub fn count_sources(dir: &Path) -> usize {
        WalkDir::new(dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "cs"))
            .count()
    }
}

impl AssetHost for ConsoleHost {
    fn refresh(&self, dir: &Path) -> anyhow::Result<()> {
        info!(
            "📁 {} C# source file(s) in {}",
            Self::count_sources(dir),
            dir.display()
        );
        Ok(())
    }
}
