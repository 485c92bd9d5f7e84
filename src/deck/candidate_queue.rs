use crate::domain::{Character, PageCursor};

/// Ordered candidates plus a browse position and the cursor for the next page.
///
/// Appends only extend the sequence past the position; they never move it.
/// `position == len()` means the local candidates are exhausted.
#[derive(Debug, Default)]
pub struct CandidateQueue {
    items: Vec<Character>,
    position: usize,
    next: Option<PageCursor>,
}

impl CandidateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards the current sequence and cursor and starts over at position 0.
    pub fn replace(&mut self, items: Vec<Character>, next: Option<PageCursor>) {
        self.items = items;
        self.position = 0;
        self.next = next;
    }

    pub fn append(&mut self, items: Vec<Character>, next: Option<PageCursor>) {
        self.items.extend(items);
        self.next = next;
    }

    /// `None` when the position is at or beyond the end of the sequence.
    pub fn current(&self) -> Option<&Character> {
        self.items.get(self.position)
    }

    /// Moves forward by one without clamping; check `current()` afterwards.
    pub fn advance(&mut self) {
        self.position += 1;
    }

    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }

    pub fn next_cursor(&self) -> Option<&PageCursor> {
        self.next.as_ref()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Candidates not yet decided on in this pass.
    pub fn remaining(&self) -> usize {
        self.items.len().saturating_sub(self.position)
    }
}
