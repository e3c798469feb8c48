//! `.abi` / `.bin` input pairs

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const ABI_EXTENSION: &str = "abi";
pub const BIN_EXTENSION: &str = "bin";

/// An interface description and its optional compiled bytecode sibling
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArtifactPair {
    pub abi: PathBuf,
    pub bin: Option<PathBuf>,
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

impl ArtifactPair {
    /// Pair for an `.abi` file, picking up a sibling `.bin` when present
    pub fn for_abi<P: AsRef<Path>>(abi: P) -> Self {
        let abi = abi.as_ref().to_path_buf();
        let bin = Some(abi.with_extension(BIN_EXTENSION)).filter(|bin| bin.is_file());
        Self { abi, bin }
    }

    /// Pair affected by a change to `path`.
    ///
    /// A changed `.abi` always yields a pair. A changed `.bin` only does when
    /// its `.abi` sibling exists. Other files are not inputs.
    pub fn from_changed_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let path = path.as_ref();
        if has_extension(path, ABI_EXTENSION) {
            Some(Self::for_abi(path))
        } else if has_extension(path, BIN_EXTENSION) {
            let abi = path.with_extension(ABI_EXTENSION);
            abi.is_file().then(|| Self {
                abi,
                bin: Some(path.to_path_buf()),
            })
        } else {
            None
        }
    }

    pub fn bin(&self) -> Option<&Path> {
        self.bin.as_deref()
    }
}

/// Every `.abi` file below `dir`, paired with its `.bin`, in path order.
/// A missing `dir` yields nothing.
pub fn scan<P: AsRef<Path>>(dir: P) -> Vec<ArtifactPair> {
    let mut pairs: Vec<ArtifactPair> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && has_extension(entry.path(), ABI_EXTENSION))
        .map(|entry| ArtifactPair::for_abi(entry.path()))
        .collect();
    pairs.sort();
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_changed_abi_with_bin() {
        let temp_dir = TempDir::new().unwrap();
        let abi = temp_dir.path().join("Token.abi");
        let bin = temp_dir.path().join("Token.bin");
        fs::write(&abi, "[]").unwrap();
        fs::write(&bin, "6080").unwrap();

        let pair = ArtifactPair::from_changed_path(&abi).unwrap();
        assert_eq!(pair.abi, abi);
        assert_eq!(pair.bin(), Some(bin.as_path()));
    }

    #[test]
    fn test_changed_abi_without_bin() {
        let temp_dir = TempDir::new().unwrap();
        let abi = temp_dir.path().join("Token.ABI");
        fs::write(&abi, "[]").unwrap();

        let pair = ArtifactPair::from_changed_path(&abi).unwrap();
        assert_eq!(pair.bin, None);
    }

    #[test]
    fn test_changed_bin_needs_abi() {
        let temp_dir = TempDir::new().unwrap();
        let bin = temp_dir.path().join("Token.bin");
        fs::write(&bin, "6080").unwrap();
        assert_eq!(ArtifactPair::from_changed_path(&bin), None);

        let abi = temp_dir.path().join("Token.abi");
        fs::write(&abi, "[]").unwrap();
        let pair = ArtifactPair::from_changed_path(&bin).unwrap();
        assert_eq!(pair.abi, abi);
        assert_eq!(pair.bin, Some(bin));
    }

    #[test]
    fn test_other_files_ignored() {
        assert_eq!(ArtifactPair::from_changed_path("Assets/Scene.unity"), None);
        assert_eq!(ArtifactPair::from_changed_path("Assets/abi"), None);
    }

    #[test]
    fn test_scan_finds_nested_pairs() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("Contracts").join("Tokens");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp_dir.path().join("Game.abi"), "[]").unwrap();
        fs::write(nested.join("Erc20.abi"), "[]").unwrap();
        fs::write(nested.join("Erc20.bin"), "6080").unwrap();
        fs::write(nested.join("Orphan.bin"), "6080").unwrap();
        fs::write(nested.join("notes.txt"), "").unwrap();

        let pairs = scan(temp_dir.path());
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].abi, nested.join("Erc20.abi"));
        assert_eq!(pairs[0].bin, Some(nested.join("Erc20.bin")));
        assert_eq!(pairs[1].abi, temp_dir.path().join("Game.abi"));
        assert_eq!(pairs[1].bin, None);
    }

    #[test]
    fn test_scan_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(scan(temp_dir.path().join("missing")).is_empty());
    }
}
