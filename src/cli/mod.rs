//! # CLI Module
//!
//! Command-line interface for the duplicate scanner.
//!
//! ## Usage
//! ```bash
//! # Scan a directory for files with similar names
//! dupe-scan scan ~/Music
//!
//! # Compare "artist - album - title" fields, looser threshold
//! dupe-scan scan ~/Music --scan-type fields --min-match 60
//!
//! # Exact content duplicates, as JSON
//! dupe-scan scan ~/Music --scan-type content --output json
//!
//! # Settings from a file, overridden by flags
//! dupe-scan scan ~/Music --config scan.json --similar-words
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use dupe_scan::core::ignore::IgnoreList;
use dupe_scan::core::item::{FileItem, ItemId, ScanItem};
use dupe_scan::core::pipeline::{ScanResult, Scanner, ScannerConfig};
use dupe_scan::core::scanner::{ItemSource, ScanConfig, WalkDirScanner};
use dupe_scan::core::tokenizer::ScanType;
use dupe_scan::error::{DupeFinderError, Result};
use dupe_scan::events::{Event, EventChannel, PipelineEvent, ScanEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;

/// Dupe Scan - Find files that are copies of each other
#[derive(Parser, Debug)]
#[command(name = "dupe-scan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan directories for duplicate files
    Scan(ScanArgs),
}

#[derive(clap::Args, Debug)]
struct ScanArgs {
    /// Directories to scan
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// What to compare
    #[arg(short, long)]
    scan_type: Option<ScanKind>,

    /// Lowest match percentage (0-100) for word scans
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(0..=100))]
    min_match: Option<u32>,

    /// Score by characters instead of by words
    #[arg(long)]
    weight_words: bool,

    /// Match words like "stripe" and "stripes"
    #[arg(long)]
    similar_words: bool,

    /// Never match files with different extensions
    #[arg(long)]
    no_mix_file_kind: bool,

    /// Skip files smaller than this many bytes
    #[arg(long)]
    size_threshold: Option<u64>,

    /// Only scan files with these extensions
    #[arg(long, value_delimiter = ',')]
    ext: Vec<String>,

    /// Files under these directories are always kept
    #[arg(long)]
    reference: Vec<PathBuf>,

    /// Include hidden files
    #[arg(long)]
    include_hidden: bool,

    /// JSON array of path pairs that are not duplicates
    #[arg(long)]
    ignore_file: Option<PathBuf>,

    /// JSON scanner configuration; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScanKind {
    /// Words of the file name
    Filename,
    /// "a - b - c" fields of the file name, compared in order
    Fields,
    /// Fields of the file name, in any order
    FieldsNoOrder,
    /// File contents
    Content,
}

impl From<ScanKind> for ScanType {
    fn from(kind: ScanKind) -> Self {
        match kind {
            ScanKind::Filename => ScanType::Filename,
            ScanKind::Fields => ScanType::Fields,
            ScanKind::FieldsNoOrder => ScanType::FieldsNoOrder,
            ScanKind::Content => ScanType::Content,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (dupe paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => {
            dupe_scan::init_tracing(args.verbose);
            run_scan(args)
        }
    }
}

/// Load the config file (if any) and apply explicit flags over it
fn scanner_config(args: &ScanArgs) -> Result<ScannerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            serde_json::from_str(&content).map_err(|e| {
                DupeFinderError::Config(format!("{}: {e}", path.display()))
            })?
        }
        None => ScannerConfig::default(),
    };

    if let Some(kind) = args.scan_type {
        config.scan_type = kind.into();
    }
    if let Some(min_match) = args.min_match {
        config.min_match_percentage = min_match;
    }
    if args.weight_words {
        config.word_weighting = true;
    }
    if args.similar_words {
        config.match_similar_words = true;
    }
    if args.no_mix_file_kind {
        config.mix_file_kind = false;
    }
    if let Some(size_threshold) = args.size_threshold {
        config.size_threshold = size_threshold;
    }
    Ok(config)
}

fn run_scan(args: ScanArgs) -> Result<()> {
    let term = Term::stderr();
    let start_time = Instant::now();
    let config = scanner_config(&args)?;

    if matches!(args.output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Dupe Scan").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let mut builder = Scanner::builder().config(config);
    if let Some(path) = &args.ignore_file {
        builder = builder.ignore_list(IgnoreList::load_json(path)?);
    }
    let scanner = builder.build();

    let source = WalkDirScanner::new(ScanConfig {
        include_hidden: args.include_hidden,
        extensions: args.ext.clone(),
        reference_paths: args.reference.clone(),
        ..Default::default()
    });
    source.check_config(scanner.config())?;

    let (sender, receiver) = EventChannel::new();

    let progress = if matches!(args.output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(100);
        if let Ok(bar_style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
        {
            pb.set_style(bar_style.progress_chars("█▓░"));
        }
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose = args.verbose;

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(pb) = progress_clone.as_ref() else {
                continue;
            };
            match event {
                Event::Scan(ScanEvent::Progress(p)) => {
                    pb.set_message(format!("Scanning... {} files found", p.items_found));
                }
                Event::Scan(ScanEvent::Error { path, message }) if verbose => {
                    pb.println(format!("{} {}: {}", style("!").yellow(), path.display(), message));
                }
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(phase.to_string());
                }
                Event::Progress(update) => {
                    pb.set_position(u64::from(update.percent));
                    if verbose {
                        pb.set_message(update.message);
                    }
                }
                Event::Pipeline(PipelineEvent::Completed { .. } | PipelineEvent::Cancelled) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let outcome = source.scan_with_events(&args.paths, &sender);
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(error) => {
            drop(sender);
            event_thread.join().ok();
            return Err(error.into());
        }
    };
    let result = scanner.run_with_events(&outcome.items, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }
    let result = result?;

    let report = Report {
        items: &outcome.items,
        result: &result,
        scan_errors: outcome.errors.len(),
        duration_ms: start_time.elapsed().as_millis() as u64,
    };
    match args.output {
        OutputFormat::Pretty => print_pretty_results(&term, &report, args.verbose),
        OutputFormat::Json => print_json_results(&report)?,
        OutputFormat::Minimal => print_minimal_results(&report),
    }

    Ok(())
}

struct Report<'a> {
    items: &'a [FileItem],
    result: &'a ScanResult,
    scan_errors: usize,
    duration_ms: u64,
}

impl Report<'_> {
    fn path_of(&self, id: ItemId) -> &Path {
        self.items[id.index()].path()
    }

    fn wasted_bytes(&self) -> u64 {
        self.result
            .groups
            .iter()
            .flat_map(|group| group.dupes())
            .map(|&id| self.items[id.index()].size())
            .sum()
    }
}

fn print_pretty_results(term: &Term, report: &Report<'_>, verbose: bool) {
    let result = report.result;

    term.write_line("").ok();
    if result.cancelled {
        term.write_line(&format!("{} Scan cancelled", style("✗").red().bold())).ok();
        return;
    }
    term.write_line(&format!("{} Scan Complete", style("✓").green().bold())).ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} files scanned in {:.1}s",
        style(report.items.len()).cyan(),
        report.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicate groups found",
        style(result.groups.len()).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicate files",
        style(result.duplicate_count()).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} taken by duplicates",
        style(format_bytes(report.wasted_bytes())).yellow()
    ))
    .ok();
    if result.discarded_count > 0 {
        term.write_line(&format!(
            "  {} matched files left out of every group",
            style(result.discarded_count).dim()
        ))
        .ok();
    }
    if report.scan_errors > 0 {
        term.write_line(&format!(
            "  {} paths could not be read",
            style(report.scan_errors).red()
        ))
        .ok();
    }
    term.write_line("").ok();

    if result.groups.is_empty() {
        term.write_line(&format!("  {} No duplicates found!", style("✓").green())).ok();
        return;
    }

    term.write_line(&format!("{}", style("Duplicate Groups:").bold().underlined())).ok();
    term.write_line("").ok();

    for (i, group) in result.groups.iter().enumerate() {
        term.write_line(&format!(
            "  {} {}% match, {} files",
            style(format!("Group {}:", i + 1)).bold(),
            style(group.percentage()).yellow(),
            group.len()
        ))
        .ok();

        for &id in group.members() {
            let marker = if id == group.reference() {
                style("★").green().to_string()
            } else {
                style("○").dim().to_string()
            };
            let percentage = group
                .match_of(id)
                .map(|m| format!(" {}", style(format!("({}%)", m.percentage)).dim()))
                .unwrap_or_default();

            term.write_line(&format!(
                "    {} {}{}",
                marker,
                display_path(report.path_of(id)),
                percentage
            ))
            .ok();
        }

        if verbose {
            term.write_line(&format!(
                "    {} {}",
                style("Recommended:").dim(),
                style("Keep the starred (★) file").dim()
            ))
            .ok();
        }
        term.write_line("").ok();
    }

    term.write_line(&format!(
        "{}",
        style("Remember: No files were deleted. Review carefully before taking action.").dim()
    ))
    .ok();
}

fn print_json_results(report: &Report<'_>) -> Result<()> {
    let result = report.result;
    let output = serde_json::json!({
        "total_files": report.items.len(),
        "cancelled": result.cancelled,
        "duplicate_groups": result.groups.len(),
        "duplicate_count": result.duplicate_count(),
        "discarded_count": result.discarded_count,
        "wasted_bytes": report.wasted_bytes(),
        "duration_ms": report.duration_ms,
        "groups": result.groups.iter().map(|group| {
            serde_json::json!({
                "percentage": group.percentage(),
                "reference": report.path_of(group.reference()),
                "dupes": group.dupes().iter().map(|&id| {
                    serde_json::json!({
                        "path": report.path_of(id),
                        "percentage": group.match_of(id).map(|m| m.percentage),
                    })
                }).collect::<Vec<_>>(),
            })
        }).collect::<Vec<_>>()
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_minimal_results(report: &Report<'_>) {
    for group in &report.result.groups {
        for &id in group.dupes() {
            println!("{}", report.path_of(id).display());
        }
    }
}

/// Shorten paths under the home directory to `~/...`
fn display_path(path: &Path) -> String {
    match dirs::home_dir().and_then(|home| path.strip_prefix(home).ok().map(Path::to_path_buf)) {
        Some(relative) => format!("~/{}", relative.display()),
        None => path.display().to_string(),
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
