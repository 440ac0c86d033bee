//! Shared mission fed by donations.

use crate::MissionProgress;

/// Units needed to complete one mission level.
pub const MISSION_TARGET_PER_LEVEL: u64 = 1_000;

impl MissionProgress {
    pub fn new() -> Self {
        Self {
            level: 1,
            contributed: 0,
            total_contributed: 0,
        }
    }

    /// Add a donation. Surplus past a level target carries into the next
    /// level. Returns how many levels were completed.
    pub fn contribute(&mut self, amount: u64) -> u32 {
        self.total_contributed = self.total_contributed.saturating_add(amount);
        self.contributed = self.contributed.saturating_add(amount);

        let completed = self.contributed / MISSION_TARGET_PER_LEVEL;
        self.contributed %= MISSION_TARGET_PER_LEVEL;
        let completed = completed as u32;
        self.level = self.level.saturating_add(completed);
        completed
    }

    /// Progress toward the next level in basis points.
    pub fn progress_bps(&self) -> u32 {
        (self.contributed * 10_000 / MISSION_TARGET_PER_LEVEL) as u32
    }
}

impl Default for MissionProgress {
    fn default() -> Self {
        Self::new()
    }
}
