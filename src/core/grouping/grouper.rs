//! Groups matches into mutual cliques.

use super::Group;
use crate::core::engine::Match;
use crate::core::item::ItemId;
use crate::core::progress::Job;
use crate::error::ScanError;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Groups items so that every pair inside a group matched directly
///
/// Matches are visited strongest first. A match between two ungrouped
/// items opens a group; a match between a grouped and an ungrouped item
/// admits the newcomer only if its matches with every member already there
/// have been visited. Items that can't join any group are left out.
///
/// Admission never looks at weaker matches, so the groups built from the
/// matches above a threshold are exactly the state reached halfway through
/// a run at a lower threshold. Groups only grow as matches are visited.
pub struct CliqueGrouper;

impl CliqueGrouper {
    pub fn new() -> Self {
        Self
    }

    /// Build the groups of `matches`
    pub fn build(&self, matches: &[Match], job: &Job<'_>) -> Result<Vec<Group>, ScanError> {
        if matches.is_empty() {
            job.set_progress(100, "Grouped matches")?;
            return Ok(Vec::new());
        }

        let mut ordered: Vec<&Match> = matches.iter().collect();
        ordered.sort_by_key(|m| (Reverse(m.percentage), m.first, m.second));

        let mut clusters: Vec<Vec<ItemId>> = Vec::new();
        let mut cluster_of: HashMap<ItemId, usize> = HashMap::new();
        let mut visited: HashSet<(ItemId, ItemId)> = HashSet::with_capacity(matches.len());
        let total = ordered.len();

        for (done, m) in ordered.iter().enumerate() {
            visited.insert((m.first.min(m.second), m.first.max(m.second)));
            let linked = |a: ItemId, b: ItemId| visited.contains(&(a.min(b), a.max(b)));

            match (cluster_of.get(&m.first).copied(), cluster_of.get(&m.second).copied()) {
                (None, None) => {
                    cluster_of.insert(m.first, clusters.len());
                    cluster_of.insert(m.second, clusters.len());
                    clusters.push(vec![m.first, m.second]);
                }
                (Some(cluster), None) => {
                    if clusters[cluster].iter().all(|&member| linked(member, m.second)) {
                        clusters[cluster].push(m.second);
                        cluster_of.insert(m.second, cluster);
                    }
                }
                (None, Some(cluster)) => {
                    if clusters[cluster].iter().all(|&member| linked(member, m.first)) {
                        clusters[cluster].push(m.first);
                        cluster_of.insert(m.first, cluster);
                    }
                }
                // Same cluster: already linked. Different clusters: merging
                // would pair members that never matched.
                (Some(_), Some(_)) => {}
            }

            if (done + 1) % 1000 == 0 {
                job.advance(done + 1, total, "Grouped matches")?;
            }
        }

        let mut cluster_matches: Vec<Vec<Match>> = vec![Vec::new(); clusters.len()];
        for m in &ordered {
            if let (Some(a), Some(b)) = (cluster_of.get(&m.first), cluster_of.get(&m.second)) {
                if a == b {
                    cluster_matches[*a].push(**m);
                }
            }
        }

        let groups: Vec<Group> = clusters
            .into_iter()
            .zip(cluster_matches)
            .filter(|(members, _)| members.len() >= 2)
            .map(|(members, matches)| Group::new(members, matches))
            .collect();

        debug!(matches = total, groups = groups.len(), "grouping finished");
        job.set_progress(100, "Grouped matches")?;
        Ok(groups)
    }
}

impl Default for CliqueGrouper {
    fn default() -> Self {
        Self::new()
    }
}
