//! Disjoint deny range set and the builder that produces it.
//!
//! The builder parses every entry, sorts the ranges (start ascending, broader
//! blocks first) and sweeps them once. A range is kept only if the retained
//! range with the greatest start at or below its own start does not already
//! cover it. Because CIDR blocks either nest or are disjoint, and the sweep
//! visits them broadest-first, the result never holds two overlapping ranges,
//! which is what lets [`RangeSet::contains`] answer with a single floor lookup.

use serde::Serialize;
use std::collections::BTreeMap;

use super::addr::Address;
use super::range::DenyRange;

/// Default ceiling on the number of addresses a deny list may cover.
pub const DEFAULT_MAX_DENIED_ADDRESSES: u64 = 30_000_000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSet {
    ranges: BTreeMap<Address, DenyRange>,
    covered: u64,
}

impl RangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from raw entries with the default ceiling, discarding the report.
    pub fn from_entries<S: AsRef<str>>(entries: &[S]) -> Self {
        RangeSetBuilder::default().build(entries).0
    }

    /// The retained range with the greatest start address `<= key`.
    pub fn floor(&self, key: Address) -> Option<&DenyRange> {
        self.ranges.range(..=key).next_back().map(|(_, range)| range)
    }

    /// Returns `true` if `address` falls inside a retained range.
    pub fn contains(&self, address: Address) -> bool {
        self.floor(address).is_some_and(|range| range.contains(address))
    }

    /// Retained ranges in ascending start order.
    pub fn iter(&self) -> impl Iterator<Item = &DenyRange> {
        self.ranges.values()
    }

    pub fn first(&self) -> Option<&DenyRange> {
        self.ranges.values().next()
    }

    pub fn last(&self) -> Option<&DenyRange> {
        self.ranges.values().next_back()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Sum of the block sizes of all retained ranges.
    pub fn covered_addresses(&self) -> u64 {
        self.covered
    }

    fn insert(&mut self, range: DenyRange) {
        self.covered += range.size();
        self.ranges.insert(range.start(), range);
    }
}

/// A deny-list entry that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub entry: String,
    pub reason: String,
}

/// Where a build stopped after the covered-address ceiling was exceeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Truncation {
    pub covered_addresses: u64,
    pub ceiling: u64,
    /// Last range (in sorted order) that was processed.
    pub last_processed: Option<String>,
    /// First range (in sorted order) that was not applied.
    pub stopped_at: String,
    /// Number of sorted ranges left unprocessed, `stopped_at` included.
    pub unapplied: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Entries that parsed successfully.
    pub parsed: usize,
    /// Parsed ranges dropped because a retained range already covered them.
    pub redundant: usize,
    pub skipped: Vec<SkippedEntry>,
    pub truncated: Option<Truncation>,
}

/// Builds a [`RangeSet`] from raw `A.B.C.D` / `A.B.C.D/N` strings.
///
/// All counters live in the single [`RangeSetBuilder::build`] call.
#[derive(Debug, Clone, Copy)]
pub struct RangeSetBuilder {
    max_denied_addresses: u64,
}

impl Default for RangeSetBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DENIED_ADDRESSES)
    }
}

impl RangeSetBuilder {
    pub fn new(max_denied_addresses: u64) -> Self {
        Self { max_denied_addresses }
    }

    pub fn max_denied_addresses(&self) -> u64 {
        self.max_denied_addresses
    }

    pub fn build<S: AsRef<str>>(&self, entries: &[S]) -> (RangeSet, BuildReport) {
        let mut report = BuildReport::default();
        let mut candidates = Vec::with_capacity(entries.len());

        for entry in entries {
            let entry = entry.as_ref();
            match entry.parse::<DenyRange>() {
                Ok(range) => candidates.push(range),
                Err(e) => {
                    tracing::warn!("Skipping deny entry {:?}: {}", entry, e);
                    report.skipped.push(SkippedEntry {
                        entry: entry.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        report.parsed = candidates.len();
        candidates.sort_unstable();

        let mut set = RangeSet::new();
        let mut last_processed: Option<&DenyRange> = None;

        for (i, candidate) in candidates.iter().enumerate() {
            if set.covered_addresses() > self.max_denied_addresses {
                let truncation = Truncation {
                    covered_addresses: set.covered_addresses(),
                    ceiling: self.max_denied_addresses,
                    last_processed: last_processed.map(ToString::to_string),
                    stopped_at: candidate.to_string(),
                    unapplied: candidates.len() - i,
                };
                tracing::warn!(
                    "Deny list exceeds {} addresses (covered {}): processed up to {}, {} ranges from {} not applied",
                    truncation.ceiling,
                    truncation.covered_addresses,
                    truncation.last_processed.as_deref().unwrap_or("-"),
                    truncation.unapplied,
                    truncation.stopped_at,
                );
                report.truncated = Some(truncation);
                break;
            }

            let nested = set
                .floor(candidate.start())
                .is_some_and(|floor| floor.covers(candidate));
            if nested {
                report.redundant += 1;
            } else {
                set.insert(*candidate);
            }
            last_processed = Some(candidate);
        }

        tracing::info!(
            "Deny set built: {} ranges, {} addresses, {} redundant, {} skipped",
            set.len(),
            set.covered_addresses(),
            report.redundant,
            report.skipped.len(),
        );
        (set, report)
    }
}
