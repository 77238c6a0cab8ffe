//! Pipeline execution implementation.

use super::{ScanResult, ScannerConfig};
use crate::core::engine::{Candidate, Match, MatchConfig, MatchFactory, WordMatchFactory};
use crate::core::grouping::{default_tie_break, prioritize, CliqueGrouper, Group, PriorityPolicy};
use crate::core::ignore::IgnoreRelation;
use crate::core::item::{DigestKind, ItemId, ScanItem, TagField};
use crate::core::progress::Job;
use crate::core::tokenizer::{content_verified_tokens, get_file_ext, tokenize, ScanType, Tokens};
use crate::core::verifier::verify;
use crate::error::Result;
use crate::events::{
    Event, EventSender, PipelineEvent, PipelinePhase, PipelineSummary, ProgressSink,
};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

/// Progress weights of annotate, match, ignore, verify, group, prioritize
const STAGE_WEIGHTS: [u32; 6] = [1, 4, 1, 1, 2, 1];

/// Items between two progress reports of the sequential stages
const REPORT_EVERY: usize = 256;

/// Builder for scanner configuration
pub struct ScannerBuilder {
    config: ScannerConfig,
    match_factory: Option<Box<dyn MatchFactory>>,
    ignore_list: Option<Box<dyn IgnoreRelation>>,
}

impl ScannerBuilder {
    /// Create a new scanner builder with default settings
    pub fn new() -> Self {
        Self {
            config: ScannerConfig::default(),
            match_factory: None,
            ignore_list: None,
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ScannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn scan_type(mut self, scan_type: ScanType) -> Self {
        self.config.scan_type = scan_type;
        self
    }

    pub fn min_match_percentage(mut self, percentage: u32) -> Self {
        self.config.min_match_percentage = percentage;
        self
    }

    pub fn word_weighting(mut self, enabled: bool) -> Self {
        self.config.word_weighting = enabled;
        self
    }

    pub fn match_similar_words(mut self, enabled: bool) -> Self {
        self.config.match_similar_words = enabled;
        self
    }

    pub fn mix_file_kind(mut self, enabled: bool) -> Self {
        self.config.mix_file_kind = enabled;
        self
    }

    pub fn scanned_tags(mut self, tags: impl IntoIterator<Item = TagField>) -> Self {
        self.config.scanned_tags = tags.into_iter().collect();
        self
    }

    pub fn size_threshold(mut self, bytes: u64) -> Self {
        self.config.size_threshold = bytes;
        self
    }

    pub fn priority(mut self, policy: PriorityPolicy) -> Self {
        self.config.priority = policy;
        self
    }

    /// Replace the word-overlap engine
    pub fn match_factory(mut self, factory: Box<dyn MatchFactory>) -> Self {
        self.match_factory = Some(factory);
        self
    }

    /// Pairs of items that must never be reported as duplicates
    pub fn ignore_list(mut self, ignore_list: impl IgnoreRelation + 'static) -> Self {
        self.ignore_list = Some(Box::new(ignore_list));
        self
    }

    /// Build the scanner
    pub fn build(self) -> Scanner {
        Scanner {
            config: self.config,
            match_factory: self.match_factory,
            ignore_list: self.ignore_list,
        }
    }
}

impl Default for ScannerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The duplicate detection pipeline
///
/// A scanner holds no per-scan state: the same scanner can run any number
/// of scans, and the items it scans are never modified.
pub struct Scanner {
    config: ScannerConfig,
    match_factory: Option<Box<dyn MatchFactory>>,
    ignore_list: Option<Box<dyn IgnoreRelation>>,
}

impl Scanner {
    /// Create a new scanner builder
    pub fn builder() -> ScannerBuilder {
        ScannerBuilder::new()
    }

    /// Create a scanner from a configuration
    pub fn new(config: ScannerConfig) -> Self {
        ScannerBuilder::new().config(config).build()
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Options of the default match factory for the configured scan
    ///
    /// Content scans match on equal sizes only, so every word option stays
    /// at its neutral value.
    pub fn match_config(&self) -> MatchConfig {
        if self.config.scan_type.is_content() {
            return MatchConfig::default();
        }
        MatchConfig {
            match_similar_words: self.config.match_similar_words,
            weight_words: self.config.word_weighting,
            min_match_percentage: self.config.min_match_percentage,
            no_field_order: self.config.scan_type == ScanType::FieldsNoOrder,
        }
    }

    /// Find the duplicate groups among `items`
    ///
    /// Progress goes to `sink`, which can stop the scan by returning
    /// `false`. A stopped scan is not an error: it returns an empty result
    /// with `cancelled` set.
    pub fn find_groups<I: ScanItem>(&self, items: &[I], sink: &dyn ProgressSink) -> Result<ScanResult> {
        self.finish(self.run(items, sink, None))
    }

    /// Find the duplicate groups among `items`, reporting to `events`
    ///
    /// Besides progress updates, pipeline start, phase changes and the
    /// outcome are sent as [`PipelineEvent`]s.
    pub fn run_with_events<I: ScanItem>(&self, items: &[I], events: &EventSender) -> Result<ScanResult> {
        let start_time = Instant::now();
        events.send(Event::Pipeline(PipelineEvent::Started));

        let result = self.finish(self.run(items, events, Some(events)));
        match &result {
            Ok(result) if result.cancelled => {
                events.send(Event::Pipeline(PipelineEvent::Cancelled));
            }
            Ok(result) => {
                events.send(Event::Pipeline(PipelineEvent::Completed {
                    summary: PipelineSummary {
                        total_items: items.len(),
                        duplicate_groups: result.groups.len(),
                        duplicate_count: result.duplicate_count(),
                        discarded_count: result.discarded_count,
                        duration_ms: start_time.elapsed().as_millis() as u64,
                    },
                }));
            }
            Err(error) => {
                events.send(Event::Pipeline(PipelineEvent::Error {
                    message: error.to_string(),
                }));
            }
        }
        result
    }

    fn finish(&self, outcome: Result<ScanResult>) -> Result<ScanResult> {
        match outcome {
            Err(error) if error.is_cancelled() => {
                info!("scan cancelled");
                Ok(ScanResult::cancelled())
            }
            other => other,
        }
    }

    fn run<I: ScanItem>(
        &self,
        items: &[I],
        sink: &dyn ProgressSink,
        events: Option<&EventSender>,
    ) -> Result<ScanResult> {
        let enter = |phase: PipelinePhase| {
            debug!(%phase, "entering phase");
            if let Some(events) = events {
                events.send(Event::Pipeline(PipelineEvent::PhaseChanged { phase }));
            }
        };

        let root = Job::new(sink);
        let jobs = root.subjobs(&STAGE_WEIGHTS);
        let (annotate_job, match_job, ignore_job) = (&jobs[0], &jobs[1], &jobs[2]);
        let (verify_job, group_job, prioritize_job) = (&jobs[3], &jobs[4], &jobs[5]);

        info!(items = items.len(), scan_type = ?self.config.scan_type, "scan started");

        enter(PipelinePhase::Annotating);
        let (mut tokens, references, eligible) = self.annotate(items, annotate_job)?;

        enter(PipelinePhase::Matching);
        let matches = {
            let candidates: Vec<Candidate<'_>> = eligible
                .iter()
                .map(|&index| Candidate {
                    id: ItemId(index),
                    item: &items[index],
                    tokens: &tokens[index],
                })
                .collect();

            let matches = match &self.match_factory {
                Some(factory) => factory.compute_matches(&candidates, match_job)?,
                None => WordMatchFactory::new(self.match_config()).compute_matches(&candidates, match_job)?,
            };
            info!(candidates = candidates.len(), matches = matches.len(), "matching finished");

            enter(PipelinePhase::Filtering);
            let matches = drop_unknown_items(items.len(), matches);
            let matches = self.filter_file_kind(items, matches);
            let matches = self.filter_ignored(items, matches, ignore_job)?;

            if self.config.scan_type.is_content() {
                enter(PipelinePhase::Verifying);
                self.verify_contents(matches, &candidates, verify_job)?
            } else {
                verify_job.set_progress(100, "Nothing to verify")?;
                matches
            }
        };

        if self.config.scan_type.is_content() {
            for m in &matches {
                tokens[m.first.index()] = content_verified_tokens();
                tokens[m.second.index()] = content_verified_tokens();
            }
        }

        enter(PipelinePhase::Grouping);
        let groups = CliqueGrouper::new().build(&matches, group_job)?;
        let (groups, dropped): (Vec<Group>, Vec<Group>) = groups
            .into_iter()
            .partition(|group| !group.members().iter().all(|id| references[id.index()]));
        info!(groups = groups.len(), dropped = dropped.len(), "grouping finished");

        enter(PipelinePhase::Prioritizing);
        let groups = self.prioritize_groups(items, &references, groups, prioritize_job)?;

        let matched: HashSet<ItemId> = matches.iter().flat_map(|m| [m.first, m.second]).collect();
        let grouped: usize = groups.iter().map(Group::len).sum();
        let dropped: usize = dropped.iter().map(Group::len).sum();
        let discarded_count = matched.len().saturating_sub(grouped + dropped);

        info!(
            groups = groups.len(),
            discarded = discarded_count,
            "scan finished"
        );

        Ok(ScanResult {
            groups,
            discarded_count,
            tokens,
            cancelled: false,
        })
    }

    /// Tokenize items, copy reference flags and pick the items to match
    fn annotate<I: ScanItem>(
        &self,
        items: &[I],
        job: &Job<'_>,
    ) -> Result<(Vec<Tokens>, Vec<bool>, Vec<usize>)> {
        let total = items.len();
        job.set_progress(0, "Reading metadata")?;

        let mut tokens = Vec::with_capacity(total);
        let mut references = Vec::with_capacity(total);
        let mut eligible = Vec::with_capacity(total);
        for (index, item) in items.iter().enumerate() {
            tokens.push(tokenize(item, self.config.scan_type, &self.config.scanned_tags));
            references.push(item.is_reference());
            if self.config.size_threshold == 0 || item.size() >= self.config.size_threshold {
                eligible.push(index);
            }
            if (index + 1) % REPORT_EVERY == 0 {
                job.advance(index + 1, total, "Read metadata of")?;
            }
        }

        if eligible.len() < total {
            debug!(
                skipped = total - eligible.len(),
                threshold = self.config.size_threshold,
                "items below size threshold"
            );
        }
        job.set_progress(100, "Read metadata")?;
        Ok((tokens, references, eligible))
    }

    fn filter_file_kind<I: ScanItem>(&self, items: &[I], matches: Vec<Match>) -> Vec<Match> {
        if self.config.mix_file_kind {
            return matches;
        }
        let before = matches.len();
        let kept: Vec<Match> = matches
            .into_iter()
            .filter(|m| {
                get_file_ext(items[m.first.index()].name()) == get_file_ext(items[m.second.index()].name())
            })
            .collect();
        debug!(before, after = kept.len(), "file kind filter applied");
        kept
    }

    fn filter_ignored<I: ScanItem>(
        &self,
        items: &[I],
        matches: Vec<Match>,
        job: &Job<'_>,
    ) -> Result<Vec<Match>> {
        let Some(ignore_list) = self.ignore_list.as_deref().filter(|list| !list.is_empty()) else {
            job.set_progress(100, "No ignored pairs")?;
            return Ok(matches);
        };

        let total = matches.len();
        let mut kept = Vec::with_capacity(total);
        for (done, m) in matches.into_iter().enumerate() {
            if !ignore_list.contains(items[m.first.index()].path(), items[m.second.index()].path()) {
                kept.push(m);
            }
            if (done + 1) % REPORT_EVERY == 0 {
                job.advance(done + 1, total, "Processed matches against the ignore list")?;
            }
        }
        debug!(before = total, after = kept.len(), "ignore list applied");
        job.set_progress(100, "Applied ignore list")?;
        Ok(kept)
    }

    /// Partial digests first; full digests only for plain content scans
    fn verify_contents(
        &self,
        matches: Vec<Match>,
        candidates: &[Candidate<'_>],
        job: &Job<'_>,
    ) -> Result<Vec<Match>> {
        match self.config.scan_type {
            ScanType::Content => {
                let parts = job.subjobs(&[1, 1]);
                let matches = verify(matches, candidates, DigestKind::Partial, &parts[0])?;
                verify(matches, candidates, DigestKind::Full, &parts[1])
            }
            _ => verify(matches, candidates, DigestKind::Partial, job),
        }
    }

    fn prioritize_groups<I: ScanItem>(
        &self,
        items: &[I],
        references: &[bool],
        mut groups: Vec<Group>,
        job: &Job<'_>,
    ) -> Result<Vec<Group>> {
        let policy = self.config.priority;
        let total = groups.len();
        for (done, group) in groups.iter_mut().enumerate() {
            prioritize(
                group,
                |id| policy.key(&items[id.index()], references[id.index()]),
                |reference, candidate| default_tie_break(&items[reference.index()], &items[candidate.index()]),
            );
            if (done + 1) % REPORT_EVERY == 0 {
                job.advance(done + 1, total, "Prioritized groups")?;
            }
        }
        job.set_progress(100, "Doing priorization")?;
        Ok(groups)
    }
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("config", &self.config)
            .field("custom_match_factory", &self.match_factory.is_some())
            .field("ignore_list", &self.ignore_list.is_some())
            .finish()
    }
}

/// Drop matches pointing past the item list or pairing an item with itself
fn drop_unknown_items(item_count: usize, matches: Vec<Match>) -> Vec<Match> {
    let before = matches.len();
    let kept: Vec<Match> = matches
        .into_iter()
        .filter(|m| m.first != m.second && m.first.index() < item_count && m.second.index() < item_count)
        .collect();
    if kept.len() < before {
        debug!(dropped = before - kept.len(), item_count, "matches with unknown items dropped");
    }
    kept
}
