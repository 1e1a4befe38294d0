use super::entry::CaptionId;

/// Change notification emitted by [`CaptionEditor`](super::CaptionEditor)
/// after an edit has been committed. Presentation layers subscribe to these
/// instead of the editor reaching into their state.
#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    Added(CaptionId),
    Removed(CaptionId),
    /// Timing or text of an existing caption changed.
    Updated(CaptionId),
    /// Split or merge: `removed` captions were atomically replaced by `added`.
    Replaced {
        removed: Vec<CaptionId>,
        added: Vec<CaptionId>,
    },
    /// Many captions changed at once (load, shift, replace-all, clear,
    /// undo, redo); listeners should re-read the whole collection.
    Reset,
}

pub(crate) type Listener = Box<dyn FnMut(&EditEvent)>;

#[derive(Default)]
pub(crate) struct Listeners {
    listeners: Vec<Listener>,
}

impl Listeners {
    pub fn push(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    pub fn emit(&mut self, event: EditEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.len())
            .finish()
    }
}
