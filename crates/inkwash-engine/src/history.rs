//! Undo/redo history shared by the viewport transform and the bitmap
//! snapshots.

/// An append-only list of immutable entries plus a cursor.
///
/// The store is seeded with an initial entry at construction, so the cursor
/// always points at a valid entry. Pushing while the cursor sits below the
/// tail discards the abandoned branch first. `undo`/`redo` only move the
/// cursor and hand the entry back; reapplying it is the caller's job and
/// must be idempotent.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<T>,
    index: usize,
    limit: Option<usize>,
}

impl<T> History<T> {
    /// Create a history seeded with `initial` and no size limit.
    pub fn new(initial: T) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
            limit: None,
        }
    }

    /// Create a history with at most `limit` entries (minimum 1). When the
    /// limit is exceeded the oldest entry is dropped.
    pub fn with_limit(initial: T, limit: usize) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
            limit: Some(limit.max(1)),
        }
    }

    /// Append an entry after the cursor, discarding any redo branch.
    pub fn push(&mut self, entry: T) {
        self.entries.truncate(self.index + 1);
        self.entries.push(entry);
        self.index += 1;

        if let Some(limit) = self.limit {
            while self.entries.len() > limit {
                self.entries.remove(0);
                self.index -= 1;
            }
        }
    }

    /// Step the cursor back and return the entry to reapply.
    /// None when already at the oldest entry.
    pub fn undo(&mut self) -> Option<&T> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    /// Step the cursor forward and return the entry to reapply.
    /// None when already at the newest entry.
    pub fn redo(&mut self) -> Option<&T> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    /// The entry under the cursor.
    pub fn current(&self) -> &T {
        &self.entries[self.index]
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        // Seeded at construction, so never empty.
        false
    }

    pub fn index(&self) -> usize {
        self.index
    }
}
