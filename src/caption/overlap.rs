use super::entry::CaptionEntry;
use super::CaptionId;
use crate::error::{CaptionError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Slack used when comparing durations computed from floating-point edits.
pub(crate) const TOLERANCE: f64 = 1e-9;

/// Timing policy applied by every edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditPolicy {
    /// Gap inserted between a clamped caption and the neighbour it collided
    /// with (default: 0.01 seconds).
    pub epsilon: f64,
    /// Shortest duration a caption may have (default: 0.1 seconds).
    pub min_duration: f64,
    /// Skip overlap resolution entirely, keeping only start ordering.
    pub allow_overlap: bool,
    /// Number of undo snapshots retained (default: 50).
    pub history_capacity: usize,
}

impl Default for EditPolicy {
    fn default() -> Self {
        Self {
            epsilon: 0.01,
            min_duration: 0.1,
            allow_overlap: false,
            history_capacity: 50,
        }
    }
}

pub(crate) fn sort_by_start(entries: &mut [CaptionEntry]) {
    entries.sort_by(|a, b| a.start().total_cmp(&b.start()));
}

/// Re-sort `entries`, then clamp the caption `id` against its immediate
/// neighbours so it no longer overlaps them.
///
/// Only the changed caption moves. If clamping leaves it shorter than the
/// minimum duration the whole edit is rejected and `entries` must be
/// discarded by the caller.
pub(crate) fn resolve_overlap(
    entries: &mut [CaptionEntry],
    id: CaptionId,
    policy: &EditPolicy,
) -> Result<()> {
    sort_by_start(entries);

    if policy.allow_overlap {
        return Ok(());
    }

    let index = entries
        .iter()
        .position(|e| e.id() == id)
        .ok_or(CaptionError::NotFound(id))?;

    let mut start = entries[index].start();
    let mut end = entries[index].end();

    if let Some(prev) = index.checked_sub(1).map(|i| &entries[i]) {
        if start < prev.end() {
            debug!(
                "Clamping start of {} from {:.3} to {:.3}",
                id,
                start,
                prev.end() + policy.epsilon
            );
            start = prev.end() + policy.epsilon;
        }
    }

    if let Some(next) = entries.get(index + 1) {
        if end > next.start() {
            debug!(
                "Clamping end of {} from {:.3} to {:.3}",
                id,
                end,
                next.start() - policy.epsilon
            );
            end = next.start() - policy.epsilon;
        }
    }

    if end - start < policy.min_duration - TOLERANCE {
        return Err(CaptionError::WouldCollapseEntry(id));
    }

    entries[index].set_timing(start, end);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(entries: &[CaptionEntry], id: CaptionId) -> &CaptionEntry {
        entries.iter().find(|e| e.id() == id).unwrap()
    }

    #[test]
    fn test_clamps_start_after_predecessor() {
        let first = CaptionEntry::new(0.0, 3.0, "Hello");
        let second = CaptionEntry::new(2.0, 5.0, "World");
        let id = second.id();
        let mut entries = vec![second, first];

        resolve_overlap(&mut entries, id, &EditPolicy::default()).unwrap();

        assert_eq!(entries[1].id(), id);
        assert!((find(&entries, id).start() - 3.01).abs() < 1e-9);
        assert_eq!(find(&entries, id).end(), 5.0);
    }

    #[test]
    fn test_clamps_end_before_successor() {
        let changed = CaptionEntry::new(0.0, 4.0, "a");
        let id = changed.id();
        let mut entries = vec![changed, CaptionEntry::new(3.0, 6.0, "b")];

        resolve_overlap(&mut entries, id, &EditPolicy::default()).unwrap();

        assert!((find(&entries, id).end() - 2.99).abs() < 1e-9);
    }

    #[test]
    fn test_touching_neighbours_are_left_alone() {
        let changed = CaptionEntry::new(2.0, 4.0, "b");
        let id = changed.id();
        let mut entries = vec![
            CaptionEntry::new(0.0, 2.0, "a"),
            changed,
            CaptionEntry::new(4.0, 6.0, "c"),
        ];

        resolve_overlap(&mut entries, id, &EditPolicy::default()).unwrap();

        assert_eq!(find(&entries, id).start(), 2.0);
        assert_eq!(find(&entries, id).end(), 4.0);
    }

    #[test]
    fn test_collapse_is_rejected() {
        let changed = CaptionEntry::new(1.0, 2.0, "squeezed");
        let id = changed.id();
        let mut entries = vec![
            CaptionEntry::new(0.0, 1.5, "a"),
            changed,
            CaptionEntry::new(1.55, 3.0, "b"),
        ];

        let result = resolve_overlap(&mut entries, id, &EditPolicy::default());
        assert!(matches!(result, Err(CaptionError::WouldCollapseEntry(e)) if e == id));
    }

    #[test]
    fn test_allow_overlap_only_sorts() {
        let changed = CaptionEntry::new(1.0, 5.0, "b");
        let id = changed.id();
        let mut entries = vec![changed, CaptionEntry::new(0.0, 3.0, "a")];
        let policy = EditPolicy {
            allow_overlap: true,
            ..Default::default()
        };

        resolve_overlap(&mut entries, id, &policy).unwrap();

        assert_eq!(entries[1].id(), id);
        assert_eq!(entries[1].start(), 1.0);
    }
}
