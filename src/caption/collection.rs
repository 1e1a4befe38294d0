use super::entry::{CaptionEntry, CaptionId};
use super::overlap::{sort_by_start, EditPolicy, TOLERANCE};
use crate::error::{CaptionError, Result};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Ordered set of captions, always sorted ascending by start time.
///
/// The collection exposes read-only access only; edits go through
/// [`CaptionEditor`](super::CaptionEditor).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptionCollection {
    entries: Vec<CaptionEntry>,
}

/// Outcome of normalising imported captions into a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Captions kept in the collection.
    pub loaded: usize,
    /// Captions whose end was pulled back to the next caption's start.
    pub trimmed: usize,
    /// Captions discarded because trimming left nothing of them.
    pub dropped: usize,
    /// Captions that arrived with a duplicate id and were given a new one.
    pub reassigned: usize,
}

impl CaptionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from arbitrary entries (typically parsed from a
    /// subtitle file), repairing them until every invariant holds.
    pub fn from_entries(entries: Vec<CaptionEntry>, policy: &EditPolicy) -> (Self, ImportSummary) {
        let mut summary = ImportSummary::default();
        let mut seen = HashSet::new();

        let mut entries: Vec<CaptionEntry> = entries
            .into_iter()
            .map(|mut entry| {
                if !seen.insert(entry.id()) {
                    let id = CaptionId::new();
                    debug!("Reassigning duplicate caption id {} to {}", entry.id(), id);
                    entry.set_id(id);
                    seen.insert(id);
                    summary.reassigned += 1;
                }
                if entry.duration() < policy.min_duration {
                    let start = entry.start();
                    entry.set_timing(start, start + policy.min_duration);
                }
                entry
            })
            .collect();

        sort_by_start(&mut entries);

        if policy.allow_overlap {
            summary.loaded = entries.len();
            return (Self { entries }, summary);
        }

        let mut result: Vec<CaptionEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            while let Some(last) = result.last_mut() {
                if entry.start() >= last.end() {
                    break;
                }

                let new_end = entry.start();
                if new_end - last.start() >= policy.min_duration - TOLERANCE {
                    let start = last.start();
                    last.set_timing(start, new_end);
                    summary.trimmed += 1;
                    break;
                }

                warn!(
                    "Dropping caption at {:.3}s: it is fully overlapped by the caption at {:.3}s",
                    last.start(),
                    entry.start()
                );
                result.pop();
                summary.dropped += 1;
            }
            result.push(entry);
        }

        summary.loaded = result.len();
        (Self { entries: result }, summary)
    }

    pub(crate) fn from_sorted(entries: Vec<CaptionEntry>) -> Self {
        Self { entries }
    }

    pub(crate) fn into_entries(self) -> Vec<CaptionEntry> {
        self.entries
    }

    pub fn entries(&self) -> &[CaptionEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CaptionEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: CaptionId) -> Option<&CaptionEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub(crate) fn position(&self, id: CaptionId) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }

    /// First caption showing at `time`.
    pub fn entry_at(&self, time: f64) -> Option<&CaptionEntry> {
        self.entries
            .iter()
            .take_while(|e| e.start() <= time)
            .find(|e| e.contains(time))
    }

    /// Latest end time across all captions, zero when empty.
    pub fn total_duration(&self) -> f64 {
        self.entries.iter().map(|e| e.end()).fold(0.0, f64::max)
    }

    /// Check ordering, identity, duration and (unless the policy allows it)
    /// non-overlap invariants.
    pub fn validate(&self, policy: &EditPolicy) -> Result<()> {
        let mut ids = HashSet::with_capacity(self.entries.len());

        for (i, entry) in self.entries.iter().enumerate() {
            if !(entry.end() > entry.start()) {
                return Err(CaptionError::InvariantViolation(format!(
                    "caption {} ends at {:.3}s, not after its start {:.3}s",
                    entry.id(),
                    entry.end(),
                    entry.start()
                )));
            }

            if !ids.insert(entry.id()) {
                return Err(CaptionError::InvariantViolation(format!(
                    "duplicate caption id {}",
                    entry.id()
                )));
            }

            if let Some(next) = self.entries.get(i + 1) {
                if next.start() < entry.start() {
                    return Err(CaptionError::InvariantViolation(format!(
                        "caption {} is out of order",
                        next.id()
                    )));
                }
                if !policy.allow_overlap && entry.end() > next.start() + TOLERANCE {
                    return Err(CaptionError::InvariantViolation(format!(
                        "caption {} overlaps caption {}",
                        entry.id(),
                        next.id()
                    )));
                }
            }
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a CaptionCollection {
    type Item = &'a CaptionEntry;
    type IntoIter = std::slice::Iter<'a, CaptionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
