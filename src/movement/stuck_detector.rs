//! Session-long stuck detection and waypoint blacklisting
//!
//! Tracks how long the agent has sat at exactly one position. Once that
//! exceeds [`PATH_STUCK_TIMEOUT`] the caller reports the episode with
//! [`StuckDetector::on_stuck_detected`], and the implicated points are kept
//! out of future path requests until the area changes or the detector is
//! reset.
//!
//! The detector is plain data with no locking; share it across threads only
//! behind external synchronization.

use std::time::Instant;

use crate::core::types::{AreaId, WorldPos};
use crate::movement::constants::{BLACKLIST_RADIUS, PATH_STUCK_TIMEOUT};

#[derive(Debug, Clone)]
pub struct StuckDetector {
    last_position: WorldPos,
    last_area: Option<AreaId>,
    /// `None` while idle, otherwise when the current stall began
    stuck_since: Option<Instant>,
    blacklisted_points: Vec<WorldPos>,
    enabled: bool,
}

impl StuckDetector {
    /// Create an enabled detector with no history
    pub fn new() -> Self {
        Self {
            last_position: WorldPos::default(),
            last_area: None,
            stuck_since: None,
            blacklisted_points: Vec::new(),
            enabled: true,
        }
    }

    /// Feed the current position, returns true once the agent counts as stuck
    pub fn update(&mut self, position: WorldPos, area: AreaId) -> bool {
        self.update_at(position, area, Instant::now())
    }

    /// [`update`](Self::update) with an explicit timestamp
    pub fn update_at(&mut self, position: WorldPos, area: AreaId, now: Instant) -> bool {
        if self.last_area != Some(area) {
            self.reset();
            self.last_area = Some(area);
            self.last_position = position;
            return false;
        }

        if !self.enabled {
            self.last_position = position;
            return false;
        }

        if position != self.last_position {
            self.stuck_since = None;
            self.last_position = position;
            return false;
        }

        match self.stuck_since {
            None => {
                self.stuck_since = Some(now);
                false
            }
            Some(since) => now.saturating_duration_since(since) >= PATH_STUCK_TIMEOUT,
        }
    }

    /// Restart stall timing at `position`, keeping the blacklist
    ///
    /// Used when a new move begins and while the agent cannot act. Entering
    /// a different area still clears the blacklist.
    pub fn rebaseline(&mut self, position: WorldPos, area: AreaId) {
        if self.last_area != Some(area) {
            self.reset();
            self.last_area = Some(area);
        }
        self.last_position = position;
        self.stuck_since = None;
    }

    /// Blacklist the position the agent is stuck at and the waypoint it was heading for
    pub fn on_stuck_detected(&mut self, current: WorldPos, next: WorldPos) {
        self.blacklisted_points.push(current);
        if next != current {
            self.blacklisted_points.push(next);
        }

        tracing::debug!(
            current_x = current.x,
            current_y = current.y,
            next_x = next.x,
            next_y = next.y,
            total = self.blacklisted_points.len(),
            "Blacklisted stuck waypoints"
        );
    }

    /// True if `point` lies within [`BLACKLIST_RADIUS`] of any blacklisted entry
    pub fn is_point_blacklisted(&self, point: WorldPos) -> bool {
        self.blacklisted_points
            .iter()
            .any(|p| p.distance(&point) <= BLACKLIST_RADIUS)
    }

    /// Whether a path from `from` to `dest` should route around `point`
    ///
    /// Points within [`BLACKLIST_RADIUS`] of either end are never avoided.
    pub fn should_avoid(&self, point: WorldPos, from: WorldPos, dest: WorldPos) -> bool {
        point.distance(&from) > BLACKLIST_RADIUS
            && point.distance(&dest) > BLACKLIST_RADIUS
            && self.is_point_blacklisted(point)
    }

    pub fn has_blacklisted_points(&self) -> bool {
        !self.blacklisted_points.is_empty()
    }

    /// Blacklisted entries in insertion order
    pub fn blacklisted_points(&self) -> Vec<WorldPos> {
        self.blacklisted_points.clone()
    }

    /// Clear the blacklist, the stall timer and the last position
    ///
    /// The enabled flag and the last seen area survive a reset.
    pub fn reset(&mut self) {
        self.blacklisted_points.clear();
        self.stuck_since = None;
        self.last_position = WorldPos::default();
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for StuckDetector {
    fn default() -> Self {
        Self::new()
    }
}
