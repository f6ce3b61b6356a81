//! Per-move progress tracking
//!
//! Two independent detectors run every iteration:
//! - round trip: the agent stays inside a small radius of an anchor for too long
//! - stuck: the exact position does not change between movement commits
//!
//! Both can raise a soft block before they fail the move.

use std::time::{Duration, Instant};

use crate::core::config::MovementConfig;
use crate::core::types::WorldPos;

/// Outcome of one liveness assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Progressing,
    SoftBlocked,
    RoundTrip,
    Stuck,
}

#[derive(Debug, Clone)]
pub struct LivenessTracker {
    round_trip_anchor: WorldPos,
    round_trip_since: Instant,
    stuck_since: Instant,
    round_trip_radius: i32,
    round_trip_threshold: Duration,
    stuck_threshold: Duration,
    block_threshold: Duration,
}

impl LivenessTracker {
    pub fn new(config: &MovementConfig, start: WorldPos, now: Instant) -> Self {
        Self {
            round_trip_anchor: start,
            round_trip_since: now,
            stuck_since: now,
            round_trip_radius: config.round_trip_radius,
            round_trip_threshold: config.round_trip_threshold(),
            stuck_threshold: config.stuck_threshold(),
            block_threshold: config.block_threshold(),
        }
    }

    /// Assess progress at `current`
    ///
    /// `previous` is the position recorded at the last movement commit.
    /// A stunned agent cannot move, so it never counts as stuck.
    pub fn assess(
        &mut self,
        current: WorldPos,
        previous: Option<WorldPos>,
        stunned: bool,
        now: Instant,
    ) -> Liveness {
        let mut blocked = false;

        if current.distance(&self.round_trip_anchor) <= self.round_trip_radius {
            let in_round_trip = now.saturating_duration_since(self.round_trip_since);
            if in_round_trip > self.round_trip_threshold {
                return Liveness::RoundTrip;
            } else if in_round_trip > self.round_trip_threshold / 2 {
                blocked = true;
            }
        } else {
            self.round_trip_anchor = current;
            self.round_trip_since = now;
        }

        if previous == Some(current) && !stunned {
            let stuck_for = now.saturating_duration_since(self.stuck_since);
            if stuck_for > self.stuck_threshold {
                return Liveness::Stuck;
            } else if stuck_for > self.block_threshold {
                blocked = true;
            }
        } else {
            self.stuck_since = now;
        }

        if blocked {
            Liveness::SoftBlocked
        } else {
            Liveness::Progressing
        }
    }

    pub fn round_trip_anchor(&self) -> WorldPos {
        self.round_trip_anchor
    }
}
