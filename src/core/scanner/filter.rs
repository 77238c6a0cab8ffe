//! File filtering logic for the scanner.

use std::collections::HashSet;
use std::path::Path;

/// Decides which files the scanner keeps
///
/// With no extensions configured every (visible) file is kept.
#[derive(Debug, Clone, Default)]
pub struct ExtensionFilter {
    /// Lowercase extensions to include; empty means all
    extensions: HashSet<String>,
    /// Whether to include hidden files
    include_hidden: bool,
}

impl ExtensionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Only accept these extensions (case-insensitive, leading dot optional)
    pub fn with_extensions(mut self, extensions: impl IntoIterator<Item = String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        self
    }

    pub fn is_hidden(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.starts_with('.'))
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden && Self::is_hidden(path) {
            return false;
        }
        if self.extensions.is_empty() {
            return true;
        }

        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_accepts_everything_by_default() {
        let filter = ExtensionFilter::new();
        assert!(filter.should_include(Path::new("/music/track.mp3")));
        assert!(filter.should_include(Path::new("/music/no_extension")));
    }

    #[test]
    fn filter_matches_extensions_case_insensitively() {
        let filter = ExtensionFilter::new().with_extensions(vec![".MP3".to_string(), "flac".to_string()]);
        assert!(filter.should_include(Path::new("/music/track.mp3")));
        assert!(filter.should_include(Path::new("/music/track.FLAC")));
        assert!(!filter.should_include(Path::new("/music/cover.jpg")));
        assert!(!filter.should_include(Path::new("/music/no_extension")));
    }

    #[test]
    fn filter_excludes_hidden_by_default() {
        let filter = ExtensionFilter::new();
        assert!(!filter.should_include(Path::new("/music/.hidden.mp3")));
    }

    #[test]
    fn filter_can_include_hidden() {
        let filter = ExtensionFilter::new().with_hidden(true);
        assert!(filter.should_include(Path::new("/music/.hidden.mp3")));
    }
}
