use super::collection::{CaptionCollection, ImportSummary};
use super::entry::{non_negative, CaptionDraft, CaptionEntry, CaptionId};
use super::events::{EditEvent, Listeners};
use super::history::EditHistory;
use super::overlap::{resolve_overlap, EditPolicy, TOLERANCE};
use crate::error::{CaptionError, Result};
use tracing::debug;

/// Which edge of a caption a resize moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

/// An editing session: the caption collection together with its undo log,
/// timing policy and change listeners.
///
/// Every operation builds a candidate copy of the caption list, validates
/// it, and only then commits it with a single history snapshot. A failed
/// operation leaves the collection and the history untouched; an operation
/// that changes nothing records nothing.
#[derive(Debug, Default)]
pub struct CaptionEditor {
    collection: CaptionCollection,
    history: EditHistory,
    policy: EditPolicy,
    listeners: Listeners,
}

impl CaptionEditor {
    pub fn new() -> Self {
        Self::with_policy(EditPolicy::default())
    }

    pub fn with_policy(policy: EditPolicy) -> Self {
        Self {
            collection: CaptionCollection::new(),
            history: EditHistory::new(policy.history_capacity),
            policy,
            listeners: Listeners::default(),
        }
    }

    /// Register a callback invoked after every committed change.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&EditEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn policy(&self) -> &EditPolicy {
        &self.policy
    }

    pub fn collection(&self) -> &CaptionCollection {
        &self.collection
    }

    pub fn entries(&self) -> &[CaptionEntry] {
        self.collection.entries()
    }

    pub fn get(&self, id: CaptionId) -> Option<&CaptionEntry> {
        self.collection.get(id)
    }

    pub fn entry_at(&self, time: f64) -> Option<&CaptionEntry> {
        self.collection.entry_at(time)
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    pub fn total_duration(&self) -> f64 {
        self.collection.total_duration()
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Insert a caption, assigning an id when the draft has none (or one
    /// already in use), then resolve overlap against its new neighbours.
    pub fn add(&mut self, draft: CaptionDraft) -> Result<CaptionId> {
        let mut candidate = self.collection.entries().to_vec();
        let id = self.insert_draft(&mut candidate, draft)?;
        self.commit(candidate, EditEvent::Added(id));
        Ok(id)
    }

    /// Insert many captions as one undoable step. Either all of them go in
    /// or none do.
    pub fn extend<I>(&mut self, drafts: I) -> Result<Vec<CaptionId>>
    where
        I: IntoIterator<Item = CaptionDraft>,
    {
        let mut candidate = self.collection.entries().to_vec();
        let ids = drafts
            .into_iter()
            .map(|draft| self.insert_draft(&mut candidate, draft))
            .collect::<Result<Vec<_>>>()?;

        if !ids.is_empty() {
            self.commit(candidate, EditEvent::Reset);
        }
        Ok(ids)
    }

    pub fn delete(&mut self, id: CaptionId) -> Result<CaptionEntry> {
        let index = self.index_of(id)?;
        let mut candidate = self.collection.entries().to_vec();
        let removed = candidate.remove(index);
        self.commit(candidate, EditEvent::Removed(id));
        Ok(removed)
    }

    /// Shift a caption so it starts at `new_start` (clamped at zero),
    /// keeping its duration.
    pub fn move_entry(&mut self, id: CaptionId, new_start: f64) -> Result<()> {
        let index = self.index_of(id)?;
        let mut candidate = self.collection.entries().to_vec();

        let entry = &mut candidate[index];
        let duration = entry.duration();
        let start = non_negative(new_start);
        entry.set_timing(start, start + duration);

        resolve_overlap(&mut candidate, id, &self.policy)?;
        self.commit(candidate, EditEvent::Updated(id));
        Ok(())
    }

    /// Move one edge of a caption, never letting it shrink below the
    /// minimum duration measured from the other, fixed edge.
    ///
    /// The moving edge stops at the neighbour on its side, so a resize never
    /// reorders captions or touches the fixed edge.
    pub fn resize(&mut self, id: CaptionId, edge: Edge, new_time: f64) -> Result<()> {
        let index = self.index_of(id)?;
        let mut candidate = self.collection.entries().to_vec();

        let (start, end) = (candidate[index].start(), candidate[index].end());
        let (start, end) = match edge {
            Edge::Start => {
                let mut new_start = non_negative(new_time.min(end - self.policy.min_duration));
                if let Some(prev) = index.checked_sub(1).map(|i| &candidate[i]) {
                    if !self.policy.allow_overlap && new_start < prev.end() {
                        new_start = prev.end() + self.policy.epsilon;
                    }
                }
                (new_start, end)
            }
            Edge::End => {
                let mut new_end = non_negative(new_time).max(start + self.policy.min_duration);
                if let Some(next) = candidate.get(index + 1) {
                    if !self.policy.allow_overlap && new_end > next.start() {
                        new_end = next.start() - self.policy.epsilon;
                    }
                }
                (start, new_end)
            }
        };

        if end - start < self.policy.min_duration - TOLERANCE {
            return Err(CaptionError::WouldCollapseEntry(id));
        }
        candidate[index].set_timing(start, end);

        resolve_overlap(&mut candidate, id, &self.policy)?;
        self.commit(candidate, EditEvent::Updated(id));
        Ok(())
    }

    pub fn set_text(&mut self, id: CaptionId, text: impl Into<String>) -> Result<()> {
        let index = self.index_of(id)?;
        let mut candidate = self.collection.entries().to_vec();
        candidate[index].set_text(text.into());
        self.commit(candidate, EditEvent::Updated(id));
        Ok(())
    }

    /// Cut a caption in two at `time`. The words are divided in proportion
    /// to the elapsed share of the caption's duration.
    pub fn split_at(&mut self, id: CaptionId, time: f64) -> Result<(CaptionId, CaptionId)> {
        let index = self.index_of(id)?;
        let original = &self.collection.entries()[index];
        let (start, end) = (original.start(), original.end());

        let min = self.policy.min_duration - TOLERANCE;
        if !(time > start && time < end) || time - start < min || end - time < min {
            return Err(CaptionError::InvalidSplit { time, start, end });
        }

        let ratio = (time - start) / (end - start);
        let (left_text, right_text) = split_words(original.text(), ratio);

        let left = inherit(CaptionEntry::new(start, time, left_text), original);
        let right = inherit(CaptionEntry::new(time, end, right_text), original);
        let added = vec![left.id(), right.id()];

        let mut candidate = self.collection.entries().to_vec();
        candidate.splice(index..=index, [left, right]);

        self.commit(
            candidate,
            EditEvent::Replaced {
                removed: vec![id],
                added: added.clone(),
            },
        );
        Ok((added[0], added[1]))
    }

    /// Replace the selected captions with one spanning all of them, texts
    /// joined by single spaces in start order.
    pub fn merge_selection(&mut self, ids: &[CaptionId]) -> Result<CaptionId> {
        if ids.len() < 2 {
            return Err(CaptionError::InsufficientSelection(ids.len()));
        }

        let mut indices = Vec::with_capacity(ids.len());
        for &id in ids {
            let index = self.index_of(id)?;
            if !indices.contains(&index) {
                indices.push(index);
            }
        }
        if indices.len() < 2 {
            return Err(CaptionError::InsufficientSelection(indices.len()));
        }
        indices.sort_unstable();

        let contiguous = indices[indices.len() - 1] - indices[0] + 1 == indices.len();
        if !self.policy.allow_overlap && !contiguous {
            return Err(CaptionError::NonContiguousSelection);
        }

        let entries = self.collection.entries();
        let selected: Vec<&CaptionEntry> = indices.iter().map(|&i| &entries[i]).collect();

        let start = selected.iter().map(|e| e.start()).fold(f64::INFINITY, f64::min);
        let end = selected.iter().map(|e| e.end()).fold(0.0, f64::max);
        let text = selected
            .iter()
            .map(|e| e.text().trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let mut merged = CaptionEntry::new(start, end, text);
        if let Some(confidence) = selected
            .iter()
            .filter_map(|e| e.confidence())
            .min_by(|a, b| a.total_cmp(b))
        {
            merged = merged.with_confidence(confidence);
        }
        if let Some(language) = selected.iter().find_map(|e| e.language()) {
            merged = merged.with_language(language);
        }

        let merged_id = merged.id();
        let removed: Vec<CaptionId> = selected.iter().map(|e| e.id()).collect();

        let mut candidate: Vec<CaptionEntry> = entries
            .iter()
            .enumerate()
            .filter(|(i, _)| !indices.contains(i))
            .map(|(_, e)| e.clone())
            .collect();
        candidate.push(merged);
        resolve_overlap(&mut candidate, merged_id, &self.policy)?;

        self.commit(
            candidate,
            EditEvent::Replaced {
                removed,
                added: vec![merged_id],
            },
        );
        Ok(merged_id)
    }

    /// Replace `search` with `replacement` in every caption's text.
    ///
    /// `search` is always a literal substring, never a pattern. With
    /// `all = false` only the first occurrence in each caption is replaced.
    /// Returns the number of replacements made.
    pub fn replace_text(&mut self, search: &str, replacement: &str, all: bool) -> usize {
        if search.is_empty() {
            return 0;
        }

        let mut candidate = self.collection.entries().to_vec();
        let mut replaced = 0;

        for entry in &mut candidate {
            let occurrences = entry.text().matches(search).count();
            if occurrences == 0 {
                continue;
            }

            let text = if all {
                replaced += occurrences;
                entry.text().replace(search, replacement)
            } else {
                replaced += 1;
                entry.text().replacen(search, replacement, 1)
            };
            entry.set_text(text);
        }

        if replaced > 0 {
            self.commit(candidate, EditEvent::Reset);
        }
        replaced
    }

    /// Offset every caption by `delta` seconds. A negative offset is
    /// limited so the earliest caption starts no earlier than zero.
    pub fn shift_all(&mut self, delta: f64) {
        let Some(first) = self.collection.entries().first() else {
            return;
        };
        if !delta.is_finite() {
            return;
        }

        let delta = delta.max(-first.start());
        let mut candidate = self.collection.entries().to_vec();
        for entry in &mut candidate {
            let (start, end) = (entry.start(), entry.end());
            entry.set_timing(start + delta, end + delta);
        }

        self.commit(candidate, EditEvent::Reset);
    }

    pub fn clear(&mut self) {
        self.commit(Vec::new(), EditEvent::Reset);
    }

    /// Replace the whole collection with imported captions as one undoable
    /// step, repairing ordering, duplicate ids and overlaps on the way in.
    pub fn load(&mut self, entries: Vec<CaptionEntry>) -> ImportSummary {
        let (collection, summary) = CaptionCollection::from_entries(entries, &self.policy);
        self.commit(collection.into_entries(), EditEvent::Reset);
        summary
    }

    pub fn undo(&mut self) -> Result<()> {
        let previous = self.history.undo(self.collection.entries())?;
        let restored = CaptionCollection::from_sorted(previous);

        if let Err(e) = restored.validate(&self.policy) {
            self.history.revert_undo(restored.into_entries());
            return Err(e);
        }

        self.collection = restored;
        self.listeners.emit(EditEvent::Reset);
        Ok(())
    }

    pub fn redo(&mut self) -> Result<()> {
        let next = self.history.redo(self.collection.entries())?;
        let restored = CaptionCollection::from_sorted(next);

        if let Err(e) = restored.validate(&self.policy) {
            self.history.revert_redo(restored.into_entries());
            return Err(e);
        }

        self.collection = restored;
        self.listeners.emit(EditEvent::Reset);
        Ok(())
    }

    fn index_of(&self, id: CaptionId) -> Result<usize> {
        self.collection
            .position(id)
            .ok_or(CaptionError::NotFound(id))
    }

    fn insert_draft(&self, candidate: &mut Vec<CaptionEntry>, draft: CaptionDraft) -> Result<CaptionId> {
        let mut entry = draft.into_entry(self.policy.min_duration);
        if candidate.iter().any(|e| e.id() == entry.id()) {
            let id = CaptionId::new();
            debug!("Caption id {} already in use, assigning {}", entry.id(), id);
            entry.set_id(id);
        }

        let id = entry.id();
        candidate.push(entry);
        resolve_overlap(candidate, id, &self.policy)?;
        Ok(id)
    }

    fn commit(&mut self, candidate: Vec<CaptionEntry>, event: EditEvent) {
        if candidate.as_slice() == self.collection.entries() {
            return;
        }

        self.history.snapshot(self.collection.entries());
        self.collection = CaptionCollection::from_sorted(candidate);
        self.listeners.emit(event);
    }
}

fn inherit(mut entry: CaptionEntry, source: &CaptionEntry) -> CaptionEntry {
    if let Some(confidence) = source.confidence() {
        entry = entry.with_confidence(confidence);
    }
    if let Some(language) = source.language() {
        entry = entry.with_language(language);
    }
    entry
}

/// Divide `text` at the word boundary nearest `ratio` of its word count.
/// With two or more words each side keeps at least one.
fn split_words(text: &str, ratio: f64) -> (String, String) {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return (String::new(), String::new());
    }

    let count = words.len();
    let boundary = (ratio * count as f64).round() as usize;
    let boundary = if count >= 2 {
        boundary.clamp(1, count - 1)
    } else {
        boundary.min(count)
    };

    (words[..boundary].join(" "), words[boundary..].join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn editor_with(captions: &[(f64, f64, &str)]) -> (CaptionEditor, Vec<CaptionId>) {
        let mut editor = CaptionEditor::new();
        let ids = captions
            .iter()
            .map(|&(start, end, text)| editor.add(CaptionDraft::new(start, end, text)).unwrap())
            .collect();
        (editor, ids)
    }

    #[test]
    fn test_split_words_proportional() {
        assert_eq!(
            split_words("one two three four", 0.5),
            ("one two".to_string(), "three four".to_string())
        );
        assert_eq!(
            split_words("one two three four", 0.05),
            ("one".to_string(), "two three four".to_string())
        );
        assert_eq!(
            split_words("one two three four", 0.99),
            ("one two three".to_string(), "four".to_string())
        );
        assert_eq!(split_words("single", 0.3), (String::new(), "single".to_string()));
        assert_eq!(split_words("", 0.5), (String::new(), String::new()));
    }

    #[test]
    fn test_add_assigns_new_id_on_collision() {
        let (mut editor, ids) = editor_with(&[(0.0, 1.0, "a")]);
        let draft = CaptionDraft {
            id: Some(ids[0]),
            ..CaptionDraft::new(2.0, 3.0, "b")
        };

        let id = editor.add(draft).unwrap();

        assert_ne!(id, ids[0]);
        assert_eq!(editor.len(), 2);
    }

    #[test]
    fn test_failed_add_leaves_state_untouched() {
        let (mut editor, _) = editor_with(&[(0.0, 1.0, "a"), (1.05, 2.0, "b")]);
        let depth = editor.history().undo_depth();
        let before = editor.entries().to_vec();

        let result = editor.add(CaptionDraft::new(1.0, 1.05, "squeezed"));

        assert!(matches!(result, Err(CaptionError::WouldCollapseEntry(_))));
        assert_eq!(editor.entries(), before.as_slice());
        assert_eq!(editor.history().undo_depth(), depth);
    }

    #[test]
    fn test_extend_is_atomic() {
        let (mut editor, _) = editor_with(&[(0.0, 1.0, "a"), (1.05, 2.0, "b")]);
        let depth = editor.history().undo_depth();

        let result = editor.extend(vec![
            CaptionDraft::new(3.0, 4.0, "fits"),
            CaptionDraft::new(1.0, 1.05, "does not"),
        ]);

        assert!(result.is_err());
        assert_eq!(editor.len(), 2);
        assert_eq!(editor.history().undo_depth(), depth);

        let ids = editor
            .extend(vec![
                CaptionDraft::new(3.0, 4.0, "c"),
                CaptionDraft::new(5.0, 6.0, "d"),
            ])
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(editor.history().undo_depth(), depth + 1);
    }

    #[test]
    fn test_resize_respects_min_duration() {
        let (mut editor, ids) = editor_with(&[(1.0, 2.0, "a")]);

        editor.resize(ids[0], Edge::Start, 5.0).unwrap();
        let entry = editor.get(ids[0]).unwrap();
        assert!((entry.start() - 1.9).abs() < 1e-9);
        assert_eq!(entry.end(), 2.0);

        editor.resize(ids[0], Edge::End, 0.0).unwrap();
        let entry = editor.get(ids[0]).unwrap();
        assert!((entry.end() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_stops_at_neighbours() {
        let (mut editor, ids) =
            editor_with(&[(0.5, 1.0, "a"), (2.0, 3.0, "b"), (4.0, 5.0, "c")]);

        editor.resize(ids[1], Edge::Start, 0.2).unwrap();
        let entry = editor.get(ids[1]).unwrap();
        assert!((entry.start() - 1.01).abs() < 1e-9);
        assert_eq!(entry.end(), 3.0);

        editor.resize(ids[1], Edge::End, 9.0).unwrap();
        let entry = editor.get(ids[1]).unwrap();
        assert!((entry.start() - 1.01).abs() < 1e-9);
        assert!((entry.end() - 3.99).abs() < 1e-9);

        let order: Vec<_> = editor.entries().iter().map(|e| e.id()).collect();
        assert_eq!(order, ids);
    }

    #[test]
    fn test_resize_into_neighbour_can_collapse() {
        let (mut editor, ids) = editor_with(&[(0.0, 1.0, "a"), (1.0, 1.1, "b")]);
        let before = editor.entries().to_vec();

        let result = editor.resize(ids[1], Edge::Start, 0.5);

        assert!(matches!(result, Err(CaptionError::WouldCollapseEntry(id)) if id == ids[1]));
        assert_eq!(editor.entries(), before.as_slice());
    }

    #[test]
    fn test_move_preserves_duration_and_clamps_at_zero() {
        let (mut editor, ids) = editor_with(&[(2.0, 3.5, "a")]);

        editor.move_entry(ids[0], -4.0).unwrap();

        let entry = editor.get(ids[0]).unwrap();
        assert_eq!(entry.start(), 0.0);
        assert_eq!(entry.end(), 1.5);
    }

    #[test]
    fn test_noop_edit_records_nothing() {
        let (mut editor, ids) = editor_with(&[(0.0, 1.0, "same")]);
        let depth = editor.history().undo_depth();

        editor.set_text(ids[0], "same").unwrap();
        editor.move_entry(ids[0], 0.0).unwrap();

        assert_eq!(editor.history().undo_depth(), depth);
    }

    #[test]
    fn test_merge_rejects_gap_with_unselected_caption() {
        let (mut editor, ids) = editor_with(&[(0.0, 1.0, "a"), (1.0, 2.0, "b"), (2.0, 3.0, "c")]);

        let result = editor.merge_selection(&[ids[0], ids[2]]);

        assert!(matches!(result, Err(CaptionError::NonContiguousSelection)));
        assert_eq!(editor.len(), 3);
    }

    #[test]
    fn test_merge_duplicate_ids_are_insufficient() {
        let (mut editor, ids) = editor_with(&[(0.0, 1.0, "a")]);
        let result = editor.merge_selection(&[ids[0], ids[0]]);
        assert!(matches!(result, Err(CaptionError::InsufficientSelection(1))));
    }

    #[test]
    fn test_merge_keeps_metadata() {
        let mut editor = CaptionEditor::new();
        let a = editor
            .add(CaptionDraft {
                confidence: Some(0.9),
                language: Some("en".to_string()),
                ..CaptionDraft::new(0.0, 1.0, "a")
            })
            .unwrap();
        let b = editor
            .add(CaptionDraft {
                confidence: Some(0.6),
                ..CaptionDraft::new(1.0, 2.0, "b")
            })
            .unwrap();

        let merged = editor.merge_selection(&[b, a]).unwrap();
        let entry = editor.get(merged).unwrap();

        assert_eq!(entry.text(), "a b");
        assert_eq!(entry.confidence(), Some(0.6));
        assert_eq!(entry.language(), Some("en"));
    }

    #[test]
    fn test_split_rejects_sliver() {
        let (mut editor, ids) = editor_with(&[(0.0, 4.0, "one two")]);

        let result = editor.split_at(ids[0], 3.95);

        assert!(matches!(result, Err(CaptionError::InvalidSplit { .. })));
    }

    #[test]
    fn test_shift_all_clamps_at_zero() {
        let (mut editor, _) = editor_with(&[(1.0, 2.0, "a"), (3.0, 4.0, "b")]);

        editor.shift_all(-5.0);

        assert_eq!(editor.entries()[0].start(), 0.0);
        assert_eq!(editor.entries()[1].start(), 2.0);
        assert_eq!(editor.entries()[1].end(), 3.0);
    }

    #[test]
    fn test_listeners_receive_events() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);

        let mut editor = CaptionEditor::new();
        editor.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        let id = editor.add(CaptionDraft::new(0.0, 1.0, "a")).unwrap();
        editor.set_text(id, "b").unwrap();
        editor.delete(id).unwrap();
        editor.undo().unwrap();

        assert_eq!(
            *events.borrow(),
            vec![
                EditEvent::Added(id),
                EditEvent::Updated(id),
                EditEvent::Removed(id),
                EditEvent::Reset,
            ]
        );
    }

    #[test]
    fn test_undo_rejects_corrupt_snapshot() {
        let (mut editor, _) = editor_with(&[(0.0, 1.0, "a")]);
        editor
            .history
            .snapshot(&[CaptionEntry::new(2.0, 2.0, "broken")]);
        let current = editor.entries().to_vec();

        let result = editor.undo();

        assert!(matches!(result, Err(CaptionError::InvariantViolation(_))));
        assert_eq!(editor.entries(), current.as_slice());
        assert!(editor.can_undo());
        assert!(!editor.can_redo());
    }
}
