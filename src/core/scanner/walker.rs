//! Directory walking implementation using walkdir.

use super::{filter::ExtensionFilter, ItemSource, ScanOutcome};
use crate::core::grouping::PriorityPolicy;
use crate::core::item::FileItem;
use crate::core::pipeline::ScannerConfig;
use crate::core::tokenizer::ScanType;
use crate::error::{DupeFinderError, ScanError};
use crate::events::{Event, EventSender, ScanEvent, ScanProgress};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Configuration for the directory scanner
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
    /// Extensions to include (empty = all files)
    pub extensions: Vec<String>,
    /// Files under these directories are marked as references
    pub reference_paths: Vec<PathBuf>,
}

/// Scanner implementation using the walkdir crate
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: ExtensionFilter,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let filter = ExtensionFilter::new()
            .with_hidden(config.include_hidden)
            .with_extensions(config.extensions.clone());

        Self { config, filter }
    }

    fn is_reference(&self, path: &Path) -> bool {
        self.config
            .reference_paths
            .iter()
            .any(|root| path.starts_with(root))
    }

    /// Hidden directories are pruned, except a hidden scan root
    fn keep_entry(&self, entry: &DirEntry) -> bool {
        self.config.include_hidden
            || entry.depth() == 0
            || !entry.file_type().is_dir()
            || !ExtensionFilter::is_hidden(entry.path())
    }

    /// Scan a single directory
    fn scan_directory(
        &self,
        root: &Path,
        events: &EventSender,
    ) -> Result<(Vec<FileItem>, Vec<ScanError>), ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut items = Vec::new();
        let mut errors = Vec::new();
        let mut directories_scanned = 0;

        let mut walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();
        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        for entry_result in walker.into_iter().filter_entry(|entry| self.keep_entry(entry)) {
            match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    if entry.file_type().is_dir() {
                        directories_scanned += 1;
                        events.send(Event::Scan(ScanEvent::Progress(ScanProgress {
                            directories_scanned,
                            items_found: items.len(),
                            current_path: path.to_path_buf(),
                        })));
                        continue;
                    }

                    if !self.filter.should_include(path) {
                        continue;
                    }

                    match entry.metadata() {
                        Ok(metadata) if metadata.is_file() => {
                            let item = FileItem::new(path.to_path_buf(), metadata.len())
                                .with_reference(self.is_reference(path));
                            events.send(Event::Scan(ScanEvent::ItemFound {
                                path: path.to_path_buf(),
                            }));
                            items.push(item);
                        }
                        Ok(_) => {}
                        Err(e) => {
                            let error = ScanError::ReadDirectory {
                                path: path.to_path_buf(),
                                source: e.into(),
                            };
                            events.send(Event::Scan(ScanEvent::Error {
                                path: path.to_path_buf(),
                                message: error.to_string(),
                            }));
                            errors.push(error);
                        }
                    }
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();

                    let error = if e.io_error().map(|e| e.kind()) == Some(std::io::ErrorKind::PermissionDenied) {
                        ScanError::PermissionDenied { path: path.clone() }
                    } else {
                        ScanError::ReadDirectory {
                            path: path.clone(),
                            source: e.into(),
                        }
                    };

                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));
                    errors.push(error);
                }
            }
        }

        debug!(
            root = %root.display(),
            directories = directories_scanned,
            items = items.len(),
            "directory scanned"
        );
        Ok((items, errors))
    }
}

impl ItemSource for WalkDirScanner {
    fn scan(&self, paths: &[PathBuf]) -> Result<ScanOutcome, ScanError> {
        self.scan_with_events(paths, &crate::events::null_sender())
    }

    /// Files carry no audio tags, audio sizes or bitrates
    fn check_config(&self, config: &ScannerConfig) -> Result<(), DupeFinderError> {
        if matches!(config.scan_type, ScanType::Tag | ScanType::ContentAudio) {
            return Err(DupeFinderError::Config(format!(
                "{:?} scans need audio metadata, which files on disk don't provide",
                config.scan_type
            )));
        }
        if config.priority == PriorityPolicy::BitrateThenSize {
            return Err(DupeFinderError::Config(
                "bitrate priority needs audio metadata, which files on disk don't provide".to_string(),
            ));
        }
        Ok(())
    }

    fn scan_with_events(&self, paths: &[PathBuf], events: &EventSender) -> Result<ScanOutcome, ScanError> {
        events.send(Event::Scan(ScanEvent::Started {
            paths: paths.to_vec(),
        }));

        let mut all_items = Vec::new();
        let mut all_errors = Vec::new();

        for path in paths {
            match self.scan_directory(path, events) {
                Ok((items, errors)) => {
                    all_items.extend(items);
                    all_errors.extend(errors);
                }
                Err(e) => {
                    all_errors.push(e);
                }
            }
        }

        events.send(Event::Scan(ScanEvent::Completed {
            total_items: all_items.len(),
        }));

        Ok(ScanOutcome {
            items: all_items,
            errors: all_errors,
        })
    }
}
