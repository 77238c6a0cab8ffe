//! # Dupe Scan
//!
//! Finds files that are probably copies of each other, by name, by tags or
//! by content, and groups them so one copy can be kept.
//!
//! ## Core Philosophy
//! - **Never auto-delete** - The scanner only reports groups
//! - **Every pair inside a group matched** - No chained "a looks like b
//!   looks like c" groups
//! - **Keep the best copy** - Each group names a reference to keep
//!
//! ## Architecture
//! - `core` - The duplicate detection engine
//! - `events` - Event-driven progress reporting and cancellation
//! - `error` - Error types

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{DupeFinderError, Result};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the library
///
/// This should be called by the application entry point. `RUST_LOG` wins
/// when set; otherwise `verbose` selects debug output for this crate.
/// Calling it twice leaves the first subscriber in place.
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "dupe_scan=debug" } else { "warn" })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
