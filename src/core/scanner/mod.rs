//! # Scanner Module
//!
//! Discovers files in directories and turns them into [`FileItem`]s.
//!
//! The duplicate pipeline itself never touches the filesystem; this module
//! is the item source used by the CLI.
//!
//! ## Example
//! ```rust,ignore
//! use dupe_scan::core::scanner::{ItemSource, ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let found = scanner.scan(&["/Users/music".into()])?;
//! ```

mod filter;
mod walker;

pub use filter::ExtensionFilter;
pub use walker::{ScanConfig, WalkDirScanner};

use crate::core::item::FileItem;
use crate::core::pipeline::ScannerConfig;
use crate::error::{DupeFinderError, ScanError};
use crate::events::EventSender;
use std::path::PathBuf;

/// Result of a directory scan
#[derive(Debug)]
pub struct ScanOutcome {
    /// Files found, in walk order
    pub items: Vec<FileItem>,
    /// Errors that occurred during scanning (non-fatal)
    pub errors: Vec<ScanError>,
}

/// Trait for item sources
///
/// Implement this trait to create custom sources (e.g., for testing).
pub trait ItemSource: Send + Sync {
    /// Scan directories and return discovered items
    fn scan(&self, paths: &[PathBuf]) -> Result<ScanOutcome, ScanError>;

    /// Scan with progress reporting via events
    fn scan_with_events(&self, paths: &[PathBuf], events: &EventSender) -> Result<ScanOutcome, ScanError>;

    /// Refuse scanner settings that need metadata this source can't provide
    fn check_config(&self, _config: &ScannerConfig) -> Result<(), DupeFinderError> {
        Ok(())
    }
}
