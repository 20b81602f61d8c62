//! Deterministic content fingerprint of a project tree.
//!
//! The fingerprint is a hash tree mirroring the directory structure:
//!
//! - a file's hash is the SHA-256 of its raw bytes
//! - a directory's hash is the SHA-256 of its children's `(name, hash)` pairs,
//!   visited in byte-lexicographic name order
//!
//! Excluded entries (see [`ExclusionRules`]) are pruned before hashing and
//! contribute neither content nor leaf count. The tree is recomputed from
//! disk on every run.

mod rules;

pub use rules::{DEFAULT_EXCLUDED_DIRS, DEFAULT_EXCLUDED_FILES, ExclusionRules};

use crate::error::{ReleaseError, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One node of the fingerprint tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintNode {
    /// Basename of the entry
    pub name: String,
    /// Hex-encoded SHA-256
    pub hash: String,
    /// `None` for files, `Some` (possibly empty) for directories
    pub children: Option<Vec<FingerprintNode>>,
}

impl FingerprintNode {
    /// Number of hashed files under this node.
    ///
    /// A file counts as one; a directory counts the files beneath it, so an
    /// empty directory counts zero.
    pub fn leaf_count(&self) -> usize {
        match &self.children {
            None => 1,
            Some(children) => children.iter().map(FingerprintNode::leaf_count).sum(),
        }
    }

    /// Find a direct child by name
    pub fn child(&self, name: &str) -> Option<&FingerprintNode> {
        self.children.as_deref()?.iter().find(|c| c.name == name)
    }
}

/// Fingerprint `root` on a blocking worker thread.
///
/// # Errors
///
/// Returns [`ReleaseError::Io`] if the root or any non-excluded entry
/// beneath it cannot be read.
pub async fn fingerprint(root: &Path, rules: &ExclusionRules) -> Result<FingerprintNode> {
    let root = root.to_path_buf();
    let rules = rules.clone();

    tokio::task::spawn_blocking(move || fingerprint_blocking(&root, &rules))
        .await
        .map_err(|e| anyhow::anyhow!("fingerprint task failed: {}", e))?
}

/// Synchronous fingerprint of `root`.
pub fn fingerprint_blocking(root: &Path, rules: &ExclusionRules) -> Result<FingerprintNode> {
    let metadata = std::fs::metadata(root).map_err(|e| ReleaseError::io(root, e))?;
    if !metadata.is_dir() {
        return Ok(FingerprintNode {
            name: basename(root),
            hash: hash_file(root)?,
            children: None,
        });
    }

    // Pre-order walk: excluded directories are pruned before they are
    // entered. Open directories live on `stack`; a directory is closed once
    // the walk yields an entry that is not beneath it.
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !rules.excludes(entry));

    let mut stack: Vec<OpenDir> = Vec::new();

    for entry in walker {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        let depth = entry.depth();

        while stack.len() > 1 && stack.last().is_some_and(|open| open.depth >= depth) {
            close_dir(&mut stack);
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        let file_type = entry.file_type();

        if file_type.is_dir() {
            stack.push(OpenDir {
                depth,
                name,
                children: Vec::new(),
            });
            continue;
        }

        let hash = if file_type.is_symlink() {
            let target =
                std::fs::read_link(entry.path()).map_err(|e| ReleaseError::io(entry.path(), e))?;
            hex::encode(Sha256::digest(target.to_string_lossy().as_bytes()))
        } else {
            hash_file(entry.path())?
        };

        match stack.last_mut() {
            Some(parent) => parent.children.push(FingerprintNode {
                name,
                hash,
                children: None,
            }),
            None => {
                return Err(
                    anyhow::anyhow!("{} has no open directory", entry.path().display()).into(),
                );
            }
        }
    }

    while stack.len() > 1 {
        close_dir(&mut stack);
    }

    let mut node = stack
        .pop()
        .map(OpenDir::into_node)
        .ok_or_else(|| anyhow::anyhow!("walk of {} yielded no root", root.display()))?;
    node.name = basename(root);
    log::debug!(
        "Fingerprinted {} ({} files): {}",
        root.display(),
        node.leaf_count(),
        node.hash
    );
    Ok(node)
}

/// A directory whose children are still being collected.
struct OpenDir {
    depth: usize,
    name: String,
    children: Vec<FingerprintNode>,
}

impl OpenDir {
    fn into_node(self) -> FingerprintNode {
        FingerprintNode {
            name: self.name,
            hash: hash_children(&self.children),
            children: Some(self.children),
        }
    }
}

/// Pop the innermost open directory into its parent. The root stays open.
fn close_dir(stack: &mut Vec<OpenDir>) {
    if stack.len() < 2 {
        return;
    }
    if let Some(done) = stack.pop() {
        let node = done.into_node();
        if let Some(parent) = stack.last_mut() {
            parent.children.push(node);
        }
    }
}

/// Digest of the ordered `(name, hash)` pairs of a directory's children.
fn hash_children(children: &[FingerprintNode]) -> String {
    let mut hasher = Sha256::new();
    for child in children {
        hasher.update(child.name.as_bytes());
        hasher.update([0u8]);
        hasher.update(child.hash.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Digest of a file's raw bytes, read in 8KB chunks.
fn hash_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| ReleaseError::io(path, e))?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file.read(&mut buffer).map_err(|e| ReleaseError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

fn walk_error(root: &Path, err: walkdir::Error) -> ReleaseError {
    let path: PathBuf = err.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
    ReleaseError::io(path, source)
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, hash: &str) -> FingerprintNode {
        FingerprintNode {
            name: name.into(),
            hash: hash.into(),
            children: None,
        }
    }

    #[test]
    fn leaf_count_sums_nested_files() {
        let tree = FingerprintNode {
            name: "root".into(),
            hash: String::new(),
            children: Some(vec![
                leaf("a", "1"),
                FingerprintNode {
                    name: "dir".into(),
                    hash: String::new(),
                    children: Some(vec![
                        leaf("b", "2"),
                        leaf("c", "3"),
                        FingerprintNode {
                            name: "empty".into(),
                            hash: String::new(),
                            children: Some(Vec::new()),
                        },
                    ]),
                },
            ]),
        };

        assert_eq!(tree.leaf_count(), 3);
        assert_eq!(leaf("x", "0").leaf_count(), 1);
    }

    #[test]
    fn child_names_participate_in_directory_hash() {
        let a = hash_children(&[leaf("a", "same")]);
        let b = hash_children(&[leaf("b", "same")]);
        assert_ne!(a, b);
    }

    #[test]
    fn missing_root_is_io_error() {
        let err = fingerprint_blocking(Path::new("/definitely/not/here"), &ExclusionRules::none())
            .unwrap_err();
        assert!(matches!(err, ReleaseError::Io { .. }));
    }
}
