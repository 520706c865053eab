//! # Evidence Discovery
//!
//! Scans an evidence directory (non-recursively) and digests every regular
//! file it holds. The resulting [`EvidenceSet`] is read-only: each file's
//! digest is computed exactly once, at scan time.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::digest::{digest_file, EvidenceDigest};
use crate::error::PackError;

/// A single evidence file with its computed digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvidenceFile {
    /// Basename of the file, exactly as it appears on disk.
    pub name: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// Size of the file content in bytes.
    pub len: u64,
    /// SHA-256 digest of the file content.
    pub digest: EvidenceDigest,
}

/// The evidence files found directly under one directory, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvidenceSet {
    files: Vec<EvidenceFile>,
}

impl EvidenceSet {
    /// Scan `dir` and digest every regular file directly under it.
    ///
    /// Subdirectories are skipped. Symlinks are followed. The directory must
    /// exist and contain at least one file; both checks run before any
    /// digest is computed.
    pub fn scan(dir: &Path) -> Result<Self, PackError> {
        let paths = list_evidence_paths(dir)?;

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let name = file_name(&path)?;
            let len = std::fs::metadata(&path)
                .map_err(|e| PackError::io(&path, e))?
                .len();
            let digest = digest_file(&path)?;
            tracing::debug!(
                file = %name,
                bytes = len,
                digest = %digest.to_hex(),
                "digested evidence file"
            );
            files.push(EvidenceFile {
                name,
                path,
                len,
                digest,
            });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::info!(dir = %dir.display(), files = files.len(), "scanned evidence directory");
        Ok(Self { files })
    }

    /// Look up a file by exact (case-sensitive) name.
    pub fn get(&self, name: &str) -> Option<&EvidenceFile> {
        self.files
            .binary_search_by(|f| f.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.files[i])
    }

    /// Iterate over the files in name order.
    pub fn iter(&self) -> impl Iterator<Item = &EvidenceFile> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<'a> IntoIterator for &'a EvidenceSet {
    type Item = &'a EvidenceFile;
    type IntoIter = std::slice::Iter<'a, EvidenceFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// Enumerate the regular files directly under `dir`, validating the
/// directory preconditions.
pub fn list_evidence_paths(dir: &Path) -> Result<Vec<PathBuf>, PackError> {
    let meta = match std::fs::metadata(dir) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PackError::MissingEvidenceDir(dir.to_path_buf()));
        }
        Err(e) => return Err(PackError::io(dir, e)),
    };
    if !meta.is_dir() {
        return Err(PackError::NotADirectory(dir.to_path_buf()));
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| PackError::io(dir, e))? {
        let entry = entry.map_err(|e| PackError::io(dir, e))?;
        let path = entry.path();
        // fs::metadata follows symlinks; a dangling link surfaces as an error.
        let meta = std::fs::metadata(&path).map_err(|e| PackError::io(&path, e))?;
        if meta.is_file() {
            paths.push(path);
        } else {
            tracing::debug!(path = %path.display(), "skipping non-file entry");
        }
    }

    if paths.is_empty() {
        return Err(PackError::EmptyEvidenceDir(dir.to_path_buf()));
    }
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> Result<String, PackError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| PackError::InvalidFileName(path.to_path_buf()))
}

/// Render a `sha256sum`-compatible listing: `<hex>  <name>` per line.
pub fn manifest(set: &EvidenceSet) -> String {
    set.iter()
        .map(|f| format!("{}  {}\n", f.digest.to_hex(), f.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &[u8]) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn scan_finds_files_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "screenshot-003.png", b"three");
        write(dir.path(), "screenshot-001.png", b"one");
        write(dir.path(), "screenshot-002.png", b"two");

        let set = EvidenceSet::scan(dir.path()).unwrap();
        let names: Vec<&str> = set.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["screenshot-001.png", "screenshot-002.png", "screenshot-003.png"]
        );
        assert_eq!(set.get("screenshot-002.png").unwrap().len, 3);
    }

    #[test]
    fn scan_is_not_recursive() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "top.png", b"top");
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        write(&nested, "deep.png", b"deep");

        let set = EvidenceSet::scan(dir.path()).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.get("deep.png").is_none());
    }

    #[test]
    fn scan_missing_dir_is_precondition_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = EvidenceSet::scan(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, PackError::MissingEvidenceDir(_)));
        assert!(err.is_precondition());
    }

    #[test]
    fn scan_empty_dir_is_precondition_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("only-a-subdir")).unwrap();
        let err = EvidenceSet::scan(dir.path()).unwrap_err();
        assert!(matches!(err, PackError::EmptyEvidenceDir(_)));
    }

    #[test]
    fn scan_file_path_is_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "file.png", b"x");
        let err = EvidenceSet::scan(&dir.path().join("file.png")).unwrap_err();
        assert!(matches!(err, PackError::NotADirectory(_)));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Shot.png", b"x");
        let set = EvidenceSet::scan(dir.path()).unwrap();
        assert!(set.get("Shot.png").is_some());
        assert!(set.get("shot.png").is_none());
    }

    #[test]
    fn manifest_lists_hex_and_name() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.png", b"hello");
        let set = EvidenceSet::scan(dir.path()).unwrap();
        assert_eq!(
            manifest(&set),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824  a.png\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn scan_follows_symlinks_to_files() {
        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        write(outside.path(), "real.png", b"hello");
        std::os::unix::fs::symlink(outside.path().join("real.png"), dir.path().join("link.png"))
            .unwrap();

        let set = EvidenceSet::scan(dir.path()).unwrap();
        assert_eq!(
            set.get("link.png").unwrap().digest.to_hex(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[cfg(unix)]
    #[test]
    fn scan_rejects_non_utf8_file_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join(OsStr::from_bytes(b"bad\xff.png"));
        std::fs::write(&bad, b"x").unwrap();

        let err = EvidenceSet::scan(dir.path()).unwrap_err();
        match err {
            PackError::InvalidFileName(path) => assert_eq!(path, bad),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn scan_dangling_symlink_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.png", b"hello");
        let link = dir.path().join("gone.png");
        std::os::unix::fs::symlink(dir.path().join("missing-target.png"), &link).unwrap();

        let err = EvidenceSet::scan(dir.path()).unwrap_err();
        match err {
            PackError::Io { path, .. } => assert_eq!(path, link),
            other => panic!("unexpected error: {other}"),
        }
    }
}
