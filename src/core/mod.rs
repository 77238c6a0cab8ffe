//! # Core Module
//!
//! The UI-agnostic duplicate detection engine.
//!
//! ## Modules
//! - `item` - The item contract and the filesystem item
//! - `tokenizer` - Turns names and tags into comparable words
//! - `engine` - Scores item pairs and emits matches
//! - `verifier` - Confirms content matches with digests
//! - `grouping` - Builds duplicate groups and picks their references
//! - `ignore` - Pairs the user declared not to be duplicates
//! - `progress` - Subdividable progress and cancellation
//! - `pipeline` - Orchestrates the full workflow
//! - `scanner` - Discovers files in directories

pub mod engine;
pub mod grouping;
pub mod ignore;
pub mod item;
pub mod pipeline;
pub mod progress;
pub mod scanner;
pub mod tokenizer;
pub mod verifier;

// Re-export commonly used types
pub use engine::{Match, MatchConfig, MatchFactory};
pub use grouping::{Group, PriorityPolicy};
pub use ignore::{IgnoreList, IgnoreRelation};
pub use item::{FileItem, ItemId, MemoryItem, ScanItem, TagField, TagValue};
pub use pipeline::{ScanResult, Scanner, ScannerConfig};
pub use tokenizer::ScanType;
