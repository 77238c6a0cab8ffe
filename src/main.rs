//! # dupe-scan CLI
//!
//! Command-line interface for the duplicate scanner.
//!
//! ## Usage
//! ```bash
//! dupe-scan scan ~/Music --min-match 80
//! dupe-scan scan ~/Music --scan-type content --output json
//! ```

mod cli;

use dupe_scan::Result;

fn main() -> Result<()> {
    cli::run()
}
