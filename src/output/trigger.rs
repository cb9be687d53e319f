//! Trigger position tracking and annotation

/// Single-slot holder for the column of the latest unrendered trigger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerTracker {
    pending: Option<usize>,
}

impl TriggerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a trigger at `column`, replacing any pending one
    pub fn record(&mut self, column: usize) {
        self.pending = Some(column);
    }

    pub fn pending(&self) -> Option<usize> {
        self.pending
    }

    /// Take the pending trigger and render its annotation line
    pub fn take_annotation(&mut self) -> Option<String> {
        self.pending.take().map(annotation)
    }
}

/// Render the `T:` marker line for a trigger at `column`.
///
/// The caret is shifted right by one extra space per full byte group so it
/// lines up with the separators in the data lines.
pub fn annotation(column: usize) -> String {
    let offset = column + column / 8;
    format!("T:{:offset$}^ {}\n", "", column, offset = offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_alignment() {
        assert_eq!(annotation(0), "T:^ 0\n");
        assert_eq!(annotation(3), "T:   ^ 3\n");
        // One separator before column 8
        assert_eq!(annotation(8), format!("T:{}^ 8\n", " ".repeat(9)));
        assert_eq!(annotation(17), format!("T:{}^ 17\n", " ".repeat(19)));
    }

    #[test]
    fn test_caret_offset() {
        for c in 0..200 {
            let line = annotation(c);
            let caret = line.find('^').unwrap();
            assert_eq!(caret - "T:".len(), c + c / 8);
        }
    }

    #[test]
    fn test_last_trigger_wins() {
        let mut tracker = TriggerTracker::new();
        tracker.record(2);
        tracker.record(5);
        assert_eq!(tracker.pending(), Some(5));
        assert_eq!(tracker.take_annotation(), Some(annotation(5)));
        assert_eq!(tracker.pending(), None);
        assert_eq!(tracker.take_annotation(), None);
    }
}
