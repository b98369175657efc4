//! Counters accumulated over one repair pass.

/// Repair session statistics
///
/// Each repair pass starts a fresh session and returns it with its trees;
/// sessions of separate passes can be combined with [`RepairSession::merge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairSession {
    /// Records inspected
    pub total_input: usize,
    /// Records holding at least one missing value
    pub corrupt: usize,
    /// Corrupt records successfully repaired
    pub repaired: usize,
    /// Corrupt records dropped as irreparable
    pub deleted: usize,
}

impl RepairSession {
    pub fn new() -> Self {
        Self {
            total_input: 0,
            corrupt: 0,
            repaired: 0,
            deleted: 0,
        }
    }

    /// Fold another session's counters into this one
    pub fn merge(&mut self, other: &RepairSession) {
        self.total_input += other.total_input;
        self.corrupt += other.corrupt;
        self.repaired += other.repaired;
        self.deleted += other.deleted;
    }

    /// Records kept after the pass
    pub fn kept(&self) -> usize {
        self.total_input.saturating_sub(self.deleted)
    }

    /// Share of corrupt records that could be repaired, as a percentage
    pub fn repair_rate(&self) -> f64 {
        if self.corrupt == 0 {
            100.0
        } else {
            (self.repaired as f64 / self.corrupt as f64) * 100.0
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Repair Summary: {} -> {} trees | Corrupt: {} | Repaired: {} ({:.1}%) | Deleted: {}",
            self.total_input,
            self.kept(),
            self.corrupt,
            self.repaired,
            self.repair_rate(),
            self.deleted
        )
    }
}

impl Default for RepairSession {
    fn default() -> Self {
        Self::new()
    }
}
