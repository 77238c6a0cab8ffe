//! # Ignore Module
//!
//! Pairs of paths the user declared "not duplicates of each other".
//!
//! Matches whose two items form an ignored pair are removed before
//! verification and grouping. The relation is symmetric: ignoring (a, b)
//! also ignores (b, a).

use crate::error::{DupeFinderError, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A symmetric relation over item paths
pub trait IgnoreRelation: Send + Sync {
    /// Whether the pair (a, b) is ignored
    fn contains(&self, a: &Path, b: &Path) -> bool;

    /// Whether the relation is empty (lets the pipeline skip the filter)
    fn is_empty(&self) -> bool {
        false
    }
}

/// In-memory ignore list
#[derive(Debug, Clone, Default)]
pub struct IgnoreList {
    pairs: HashSet<(PathBuf, PathBuf)>,
}

impl IgnoreList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore the pair (a, b), in either order
    pub fn ignore(&mut self, a: impl Into<PathBuf>, b: impl Into<PathBuf>) {
        let (a, b) = (a.into(), b.into());
        let pair = if a <= b { (a, b) } else { (b, a) };
        self.pairs.insert(pair);
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Load an ignore list from a JSON array of `[path, path]` pairs
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse an ignore list from a JSON array of `[path, path]` pairs
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: Vec<(PathBuf, PathBuf)> = serde_json::from_str(content)?;
        let mut list = Self::new();
        for (a, b) in raw {
            if a == b {
                return Err(DupeFinderError::Config(format!(
                    "ignore list pairs {} with itself",
                    a.display()
                )));
            }
            list.ignore(a, b);
        }
        debug!(pairs = list.len(), "ignore list loaded");
        Ok(list)
    }
}

impl IgnoreRelation for IgnoreList {
    fn contains(&self, a: &Path, b: &Path) -> bool {
        let pair = if a <= b {
            (a.to_path_buf(), b.to_path_buf())
        } else {
            (b.to_path_buf(), a.to_path_buf())
        };
        self.pairs.contains(&pair)
    }

    fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn ignore_is_symmetric() {
        let mut list = IgnoreList::new();
        list.ignore("/music/a.mp3", "/music/b.mp3");

        assert!(list.contains(Path::new("/music/a.mp3"), Path::new("/music/b.mp3")));
        assert!(list.contains(Path::new("/music/b.mp3"), Path::new("/music/a.mp3")));
        assert!(!list.contains(Path::new("/music/a.mp3"), Path::new("/music/c.mp3")));
    }

    #[test]
    fn duplicate_pairs_are_stored_once() {
        let mut list = IgnoreList::new();
        list.ignore("a", "b");
        list.ignore("b", "a");
        assert_eq!(list.len(), 1);
        assert!(!IgnoreRelation::is_empty(&list));
    }

    #[test]
    fn loads_json_pairs() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[["/x/a.mp3", "/x/b.mp3"], ["/x/c.mp3", "/x/a.mp3"]]"#).unwrap();

        let list = IgnoreList::load_json(file.path()).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains(Path::new("/x/a.mp3"), Path::new("/x/c.mp3")));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            IgnoreList::from_json(r#"{"a": "b"}"#),
            Err(DupeFinderError::Json(_))
        ));
        assert!(matches!(
            IgnoreList::from_json(r#"[["a", "a"]]"#),
            Err(DupeFinderError::Config(_))
        ));
    }
}
