//! Usage: Batch operation inputs and reports (row selection, outcomes).

/// Ordered selection of server names, owned by the calling layer (the table
/// UI). Batches process it strictly in this order and clear it per the rules
/// in the coordinator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSelection(Vec<String>);

impl RowSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.0.contains(&name) {
            self.0.push(name);
        }
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl From<Vec<String>> for RowSelection {
    fn from(names: Vec<String>) -> Self {
        let mut selection = RowSelection::new();
        for name in names {
            selection.push(name);
        }
        selection
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    Completed,
    PartiallyFailed,
}

/// Result of one batch enable/disable run. Failed items carry the per-item
/// error; the batch itself never aborts on them.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    /// Names that were already in the requested state (no-ops).
    pub skipped: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl BatchReport {
    pub fn outcome(&self) -> BatchOutcome {
        if self.failed.is_empty() {
            BatchOutcome::Completed
        } else {
            BatchOutcome::PartiallyFailed
        }
    }
}
