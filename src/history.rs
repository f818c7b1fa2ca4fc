//! Snapshot-based undo/redo history.
//!
//! Each entry is a complete copy of the tracked state. This costs memory
//! proportional to `entries x state size`; [`History::with_limit`] bounds it by
//! discarding the oldest entries.

/// A stack of snapshots with a cursor at the currently applied one.
#[derive(Debug, Clone)]
pub struct History<T> {
    stack: Vec<T>,
    cursor: usize,
    /// Maximum number of entries kept; 0 means unbounded
    limit: usize,
}

impl<T> History<T> {
    /// Start a history whose first entry is `initial`.
    pub fn new(initial: T) -> Self {
        Self { stack: vec![initial], cursor: 0, limit: 0 }
    }

    /// Start a history that keeps at most `limit` entries (0 = unbounded).
    pub fn with_limit(initial: T, limit: usize) -> Self {
        Self { limit, ..Self::new(initial) }
    }

    /// Push a new snapshot, discarding any redo entries past the cursor.
    pub fn record(&mut self, snapshot: T) {
        self.stack.truncate(self.cursor + 1);
        self.stack.push(snapshot);

        if self.limit > 0 && self.stack.len() > self.limit {
            let excess = self.stack.len() - self.limit;
            self.stack.drain(..excess);
        }
        self.cursor = self.stack.len() - 1;
    }

    /// Step back one entry and return the snapshot to apply.
    pub fn undo(&mut self) -> Option<&T> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.stack.get(self.cursor)
    }

    /// Step forward one entry and return the snapshot to apply.
    pub fn redo(&mut self) -> Option<&T> {
        if self.cursor + 1 >= self.stack.len() {
            return None;
        }
        self.cursor += 1;
        self.stack.get(self.cursor)
    }

    /// The snapshot at the cursor.
    pub fn current(&self) -> &T {
        &self.stack[self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.stack.len()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let history = History::new("a");
        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), 0);
        assert_eq!(*history.current(), "a");
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_record_undo_redo() {
        let mut history = History::new(0);
        history.record(1);
        history.record(2);
        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.undo(), Some(&0));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), Some(&1));
        assert_eq!(history.redo(), Some(&2));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_record_after_undo_truncates_redo() {
        let mut history = History::new(0);
        history.record(1);
        history.record(2);
        history.undo();
        history.undo();
        history.record(3);
        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert_eq!(history.redo(), None);
        assert_eq!(*history.current(), 3);
        assert_eq!(history.undo(), Some(&0));
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::with_limit(0, 3);
        for i in 1..=5 {
            history.record(i);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(*history.current(), 5);
        assert_eq!(history.undo(), Some(&4));
        assert_eq!(history.undo(), Some(&3));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn test_zero_limit_is_unbounded() {
        let mut history = History::with_limit(0, 0);
        for i in 1..=50 {
            history.record(i);
        }
        assert_eq!(history.len(), 51);
    }
}
