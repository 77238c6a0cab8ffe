//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the duplicate scanner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Filesystem enumeration events
    Scan(ScanEvent),
    /// Fractional progress reported by the matching pipeline
    Progress(ProgressUpdate),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events while enumerating items on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Enumeration has started
    Started { paths: Vec<PathBuf> },
    /// Progress update during enumeration
    Progress(ScanProgress),
    /// An item was found
    ItemFound { path: PathBuf },
    /// An error occurred but enumeration continues
    Error { path: PathBuf, message: String },
    /// Enumeration completed
    Completed { total_items: usize },
}

/// Progress information during enumeration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Number of directories visited so far
    pub directories_scanned: usize,
    /// Number of items found so far
    pub items_found: usize,
    /// Current directory
    pub current_path: PathBuf,
}

/// A single progress report, already rescaled to the whole scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Overall completion, 0-100
    pub percent: u8,
    /// What the pipeline is doing right now
    pub message: String,
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline was cancelled
    Cancelled,
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Annotating,
    Matching,
    Filtering,
    Verifying,
    Grouping,
    Prioritizing,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Items handed to the scanner
    pub total_items: usize,
    /// Number of duplicate groups found
    pub duplicate_groups: usize,
    /// Total number of dupes (excluding references)
    pub duplicate_count: usize,
    /// Matched items that ended up in no group
    pub discarded_count: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Annotating => write!(f, "Reading metadata"),
            PipelinePhase::Matching => write!(f, "Matching"),
            PipelinePhase::Filtering => write!(f, "Filtering"),
            PipelinePhase::Verifying => write!(f, "Verifying contents"),
            PipelinePhase::Grouping => write!(f, "Grouping"),
            PipelinePhase::Prioritizing => write!(f, "Prioritizing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Progress(ProgressUpdate {
            percent: 42,
            message: "Matched 10/20 items".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Progress(p) => {
                assert_eq!(p.percent, 42);
                assert_eq!(p.message, "Matched 10/20 items");
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn pipeline_summary_is_serializable() {
        let summary = PipelineSummary {
            total_items: 1000,
            duplicate_groups: 50,
            duplicate_count: 150,
            discarded_count: 7,
            duration_ms: 5000,
        };

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"discarded_count\":7"));
    }
}
