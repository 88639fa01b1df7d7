use crate::calculation::Calculation;

/// Owned copy of the history log at one instant.
///
/// The records are cloned on capture, so later changes to the live log never
/// show up here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    records: Vec<Calculation>,
}

impl Snapshot {
    pub fn capture(history: &[Calculation]) -> Self {
        Self {
            records: history.to_vec(),
        }
    }

    /// Hand the records back for restoring
    pub fn into_records(self) -> Vec<Calculation> {
        self.records
    }
}
