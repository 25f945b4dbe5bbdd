//! # Phase Clock
//!
//! Stateless classification of a timestamp within the current epoch.
//!
//! ```text
//! epoch_start                                                       epoch_end
//!     │ commit │ reveal │ round 0 │buf│ round 1 │buf│ ... │ slashing │
//!     └─── selection ───┘└────── rounds_per_epoch rounds ──┘
//! ```
//!
//! A timestamp at or past `epoch_end` is `EpochElapsed`; only rollover is
//! permitted until the next epoch is initiated.

use serde::{Deserialize, Serialize};

/// Where a timestamp falls within the epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Commit,
    Reveal,
    /// Inside the rounds span. `open` is false during the round buffer.
    Round { round: u32, open: bool },
    Slashing,
    EpochElapsed,
}

impl Phase {
    /// Round index if a designated executor is live.
    pub fn open_round(&self) -> Option<u32> {
        match self {
            Phase::Round { round, open: true } => Some(*round),
            _ => None,
        }
    }

    /// Stake, topup and module registration are allowed.
    pub fn allows_staking(&self) -> bool {
        matches!(self, Phase::Commit | Phase::EpochElapsed)
    }

    /// Unstake and module deregistration are allowed.
    pub fn allows_unstaking(&self) -> bool {
        matches!(self, Phase::EpochElapsed)
    }
}

/// Durations (seconds) that shape an epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseDurations {
    pub commit_phase_duration: u64,
    pub reveal_phase_duration: u64,
    pub round_duration: u64,
    pub round_buffer: u64,
    pub rounds_per_epoch: u32,
    pub slashing_duration: u64,
}

impl PhaseDurations {
    pub fn selection_phase_duration(&self) -> u64 {
        self.commit_phase_duration + self.reveal_phase_duration
    }

    pub fn total_round_duration(&self) -> u64 {
        self.round_duration + self.round_buffer
    }

    pub fn rounds_span(&self) -> u64 {
        self.rounds_per_epoch as u64 * self.total_round_duration()
    }

    pub fn epoch_duration(&self) -> u64 {
        self.selection_phase_duration() + self.rounds_span() + self.slashing_duration
    }
}

/// Classifies timestamps against an epoch boundary.
#[derive(Clone, Copy, Debug)]
pub struct PhaseClock {
    durations: PhaseDurations,
}

impl PhaseClock {
    pub fn new(durations: PhaseDurations) -> Self {
        Self { durations }
    }

    pub fn durations(&self) -> &PhaseDurations {
        &self.durations
    }

    pub fn epoch_start(&self, epoch_end_time: u64) -> u64 {
        epoch_end_time.saturating_sub(self.durations.epoch_duration())
    }

    /// Classify `now` for the epoch ending at `epoch_end_time`.
    pub fn classify(&self, epoch_end_time: u64, now: u64) -> Phase {
        if now >= epoch_end_time {
            return Phase::EpochElapsed;
        }
        let d = &self.durations;
        let into_epoch = now.saturating_sub(self.epoch_start(epoch_end_time));

        if into_epoch < d.commit_phase_duration {
            return Phase::Commit;
        }
        if into_epoch < d.selection_phase_duration() {
            return Phase::Reveal;
        }

        let into_rounds = into_epoch - d.selection_phase_duration();
        if into_rounds >= d.rounds_span() {
            return Phase::Slashing;
        }

        let total = d.total_round_duration();
        Phase::Round {
            round: (into_rounds / total) as u32,
            open: into_rounds % total < d.round_duration,
        }
    }

    /// Start of `round` for the epoch ending at `epoch_end_time`.
    pub fn round_start(&self, epoch_end_time: u64, round: u32) -> u64 {
        self.epoch_start(epoch_end_time)
            + self.durations.selection_phase_duration()
            + round as u64 * self.durations.total_round_duration()
    }

    pub fn slashing_start(&self, epoch_end_time: u64) -> u64 {
        epoch_end_time.saturating_sub(self.durations.slashing_duration)
    }
}
