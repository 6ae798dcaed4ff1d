//! Import path resolution.
//!
//! Import declarations are authored relative to an unspecified base —
//! sometimes the file's own directory, sometimes a shared ancestor,
//! sometimes the project root. Resolution probes a fixed list of
//! candidate locations and the first one that exists on disk wins.
//! Nothing existing is not an error: the best guess comes back tagged
//! so the caller can report a precise diagnostic instead of silently
//! skipping the import.

use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory whose presence marks a project root (step 4).
pub const PROJECT_MARKER_DIR: &str = "db";

/// Where a resolved import path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportOrigin {
    /// The declaration was already absolute.
    Absolute,

    /// Joined directly onto the base directory.
    BaseDir,

    /// Joined onto the parent of the base directory.
    ParentDir,

    /// Joined onto an ancestor containing the project marker.
    ProjectRoot,

    /// Found by bare filename inside the base directory.
    FileName,

    /// Nothing existed; this is the base-directory join anyway.
    #[default]
    BestGuess,
}

impl std::fmt::Display for ImportOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportOrigin::Absolute => write!(f, "absolute path"),
            ImportOrigin::BaseDir => write!(f, "base directory"),
            ImportOrigin::ParentDir => write!(f, "parent directory"),
            ImportOrigin::ProjectRoot => write!(f, "project root"),
            ImportOrigin::FileName => write!(f, "filename match"),
            ImportOrigin::BestGuess => write!(f, "best guess"),
        }
    }
}

/// A resolved import declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImport {
    pub path: PathBuf,
    pub origin: ImportOrigin,
}

impl ResolvedImport {
    /// Whether the resolved path was actually seen on disk.
    pub fn found(&self) -> bool {
        self.origin != ImportOrigin::BestGuess
    }
}

/// Resolve a raw import path string against a base directory.
///
/// Absolute declarations come back unchanged (idempotent); relative
/// ones probe, in order: the base directory, its parent, the nearest
/// marked project root above it, and a bare-filename lookup in the
/// base directory. The returned path may not exist — check
/// [`ResolvedImport::found`].
pub fn resolve_import(raw: &str, base_dir: &Path) -> ResolvedImport {
    let raw_path = Path::new(raw);

    if raw_path.is_absolute() {
        return ResolvedImport {
            path: raw_path.to_path_buf(),
            origin: ImportOrigin::Absolute,
        };
    }

    let direct = base_dir.join(raw_path);
    if direct.exists() {
        return ResolvedImport {
            path: direct,
            origin: ImportOrigin::BaseDir,
        };
    }

    if let Some(parent) = base_dir.parent() {
        let candidate = parent.join(raw_path);
        if candidate.exists() {
            return ResolvedImport {
                path: candidate,
                origin: ImportOrigin::ParentDir,
            };
        }
    }

    // Only the nearest marked ancestor is consulted
    for ancestor in base_dir.ancestors() {
        if ancestor.join(PROJECT_MARKER_DIR).is_dir() {
            let candidate = ancestor.join(raw_path);
            if candidate.exists() {
                return ResolvedImport {
                    path: candidate,
                    origin: ImportOrigin::ProjectRoot,
                };
            }
            break;
        }
    }

    if let Some(name) = raw_path.file_name() {
        let candidate = base_dir.join(name);
        if candidate.exists() {
            return ResolvedImport {
                path: candidate,
                origin: ImportOrigin::FileName,
            };
        }
    }

    debug!(raw, base = %base_dir.display(), "import not found, returning best guess");
    ResolvedImport {
        path: direct,
        origin: ImportOrigin::BestGuess,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_absolute_path_is_idempotent() {
        let base = Path::new("/data/items");
        let resolved = resolve_import("/etc/hosts", base);
        assert_eq!(resolved.path, PathBuf::from("/etc/hosts"));
        assert_eq!(resolved.origin, ImportOrigin::Absolute);

        // Absolute declarations come back unchanged even when missing
        let resolved = resolve_import("/no/such/file.yml", base);
        assert_eq!(resolved.path, PathBuf::from("/no/such/file.yml"));
        assert_eq!(resolved.origin, ImportOrigin::Absolute);
    }

    #[test]
    fn test_base_dir_join() {
        let tmp = TempDir::new().expect("tempdir");
        let base = tmp.path();
        fs::create_dir(base.join("sub")).expect("mkdir");
        fs::write(base.join("sub/a.yml"), "[]").expect("write");

        let resolved = resolve_import("sub/a.yml", base);
        assert_eq!(resolved.origin, ImportOrigin::BaseDir);
        assert_eq!(resolved.path, base.join("sub/a.yml"));
        assert!(resolved.found());
    }

    #[test]
    fn test_parent_dir_join() {
        let tmp = TempDir::new().expect("tempdir");
        let base = tmp.path().join("items");
        fs::create_dir(&base).expect("mkdir");
        fs::write(tmp.path().join("shared.yml"), "[]").expect("write");

        let resolved = resolve_import("shared.yml", &base);
        assert_eq!(resolved.origin, ImportOrigin::ParentDir);
        assert_eq!(resolved.path, tmp.path().join("shared.yml"));
    }

    #[test]
    fn test_project_root_marker() {
        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path();
        fs::create_dir_all(root.join("db/re")).expect("mkdir");
        fs::write(root.join("db/import.yml"), "[]").expect("write");

        // Base is two levels below the marked root; neither the base
        // join nor the parent join can see db/import.yml
        let base = root.join("db/re");
        let resolved = resolve_import("db/import.yml", &base);
        assert_eq!(resolved.origin, ImportOrigin::ProjectRoot);
        assert_eq!(resolved.path, root.join("db/import.yml"));
    }

    #[test]
    fn test_filename_fallback_in_base_dir() {
        let tmp = TempDir::new().expect("tempdir");
        let base = tmp.path();
        fs::write(base.join("a.yml"), "[]").expect("write");

        let resolved = resolve_import("some/deep/prefix/a.yml", base);
        assert_eq!(resolved.origin, ImportOrigin::FileName);
        assert_eq!(resolved.path, base.join("a.yml"));
    }

    #[test]
    fn test_best_guess_when_nothing_exists() {
        let tmp = TempDir::new().expect("tempdir");
        let base = tmp.path();

        let resolved = resolve_import("missing/b.yml", base);
        assert_eq!(resolved.origin, ImportOrigin::BestGuess);
        assert_eq!(resolved.path, base.join("missing/b.yml"));
        assert!(!resolved.found());
    }

    #[test]
    fn test_origin_display() {
        assert_eq!(ImportOrigin::BaseDir.to_string(), "base directory");
        assert_eq!(ImportOrigin::BestGuess.to_string(), "best guess");
    }
}
