//! Navigation configuration with documented constants
//!
//! All timing and distance tunables of the movement controller are collected
//! here with explanations of their purpose and how they interact.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{NavError, Result};
use crate::movement::skills::SkillStrategy;

/// Configuration for the movement controller
///
/// These values were tuned against live latency; changing them affects how
/// quickly the agent gives up on an obstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    // === TERMINAL DISTANCE ===
    /// Distance to the destination at which a move counts as finished
    ///
    /// Doubled while the agent is soft-blocked.
    pub distance_to_finish: i32,

    // === OBSTACLE BYPASS ===
    /// Maximum corrective "move past" steps while inside finish range
    ///
    /// The counter resets whenever the agent's position changes between
    /// commits, so this only bounds consecutive fruitless attempts.
    pub max_obstacle_bypass_attempts: u32,

    /// Pause after a corrective sub-step before re-evaluating (ms)
    pub bypass_settle_ms: u64,

    // === DOORS ===
    /// Attempts to open a door on the path before giving up
    pub door_retry_attempts: u32,

    /// Pause after the jitter movement between door attempts (ms)
    pub door_retry_delay_ms: u64,

    // === THREATS ===
    /// Minimum interval between monster scans (ms)
    ///
    /// The scan runs line-of-sight and door queries per enemy, so it is
    /// throttled independently of the loop rate.
    pub monster_check_interval_ms: u64,

    // === LIVENESS ===
    /// Radius around the round-trip anchor that counts as "not going anywhere"
    pub round_trip_radius: i32,

    /// Time inside the round-trip radius before giving up (ms)
    ///
    /// Past half of this the agent is marked soft-blocked.
    pub round_trip_threshold_ms: u64,

    /// Time at an unchanged position before giving up (ms)
    pub stuck_threshold_ms: u64,

    /// Time at an unchanged position before marking soft-blocked (ms)
    pub block_threshold_ms: u64,

    // === RECOVERY ===
    /// Search radius for a destructible to clear while blocked
    pub destructible_search_radius: i32,

    /// Search radius for a door to open while blocked
    pub door_search_radius: i32,

    /// Base delay after clicking an obstacle, before latency scaling (ms)
    pub obstacle_interaction_delay_ms: u64,

    // === TELEPORT ===
    /// Path segments validated ahead of each teleport step
    pub lookahead_segments: usize,

    // === AREA TRANSITIONS ===
    /// How long to wait for collision data after an area change (ms)
    pub area_load_timeout_ms: u64,

    /// Polling interval while waiting for collision data (ms)
    pub area_load_poll_ms: u64,

    // === STEP DURATION ===
    /// Base step duration range outside town, before latency (ms)
    pub step_duration_field_ms: (u64, u64),

    /// Base step duration range in town, before latency (ms)
    ///
    /// Slower than the field range; nothing in town needs a fast refresh.
    pub step_duration_town_ms: (u64, u64),
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            distance_to_finish: 4,

            max_obstacle_bypass_attempts: 3,
            bypass_settle_ms: 100,

            door_retry_attempts: 5,
            door_retry_delay_ms: 250,

            monster_check_interval_ms: 100,

            // Liveness (round trip is the slow detector, stuck the fast one)
            round_trip_radius: 8,
            round_trip_threshold_ms: 10_000,
            stuck_threshold_ms: 2_000,
            block_threshold_ms: 200,

            destructible_search_radius: 5,
            door_search_radius: 10,
            obstacle_interaction_delay_ms: 100,

            lookahead_segments: 10,

            area_load_timeout_ms: 2_000,
            area_load_poll_ms: 100,

            step_duration_field_ms: (300, 400),
            step_duration_town_ms: (500, 800),
        }
    }
}

impl MovementConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn monster_check_interval(&self) -> Duration {
        Duration::from_millis(self.monster_check_interval_ms)
    }

    pub fn round_trip_threshold(&self) -> Duration {
        Duration::from_millis(self.round_trip_threshold_ms)
    }

    pub fn stuck_threshold(&self) -> Duration {
        Duration::from_millis(self.stuck_threshold_ms)
    }

    pub fn block_threshold(&self) -> Duration {
        Duration::from_millis(self.block_threshold_ms)
    }

    pub fn area_load_timeout(&self) -> Duration {
        Duration::from_millis(self.area_load_timeout_ms)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.distance_to_finish < 0 {
            return Err("distance_to_finish must not be negative".into());
        }

        // Soft-block must trigger before the fatal stuck error
        if self.block_threshold_ms >= self.stuck_threshold_ms {
            return Err(format!(
                "block_threshold_ms ({}) should be < stuck_threshold_ms ({})",
                self.block_threshold_ms, self.stuck_threshold_ms
            ));
        }

        if self.round_trip_radius <= 0 {
            return Err("round_trip_radius must be positive".into());
        }

        if self.lookahead_segments == 0 {
            return Err("lookahead_segments must be at least 1".into());
        }

        if self.area_load_poll_ms == 0 || self.area_load_poll_ms > self.area_load_timeout_ms {
            return Err(format!(
                "area_load_poll_ms ({}) must be in 1..={}",
                self.area_load_poll_ms, self.area_load_timeout_ms
            ));
        }

        for (name, (min, max)) in [
            ("step_duration_field_ms", self.step_duration_field_ms),
            ("step_duration_town_ms", self.step_duration_town_ms),
        ] {
            if min > max {
                return Err(format!("{} range is inverted ({} > {})", name, min, max));
            }
        }

        Ok(())
    }
}

/// Per-agent settings that shape movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentProfile {
    /// Character class name, matched case-insensitively for presets
    pub class: String,

    /// Radius in which enemies interrupt movement (0 disables the check)
    pub clear_path_distance: i32,

    /// Whether the agent stops for shrines; when false every move ignores them
    pub interact_with_shrines: bool,

    /// Movement-assist skills to keep active while walking
    pub skills: SkillStrategy,
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self {
            class: String::new(),
            clear_path_distance: 7,
            interact_with_shrines: true,
            skills: SkillStrategy::default(),
        }
    }
}

impl AgentProfile {
    /// Profile with the skill preferences preset for a class
    pub fn for_class(class: &str) -> Self {
        Self {
            class: class.to_string(),
            skills: SkillStrategy::for_class(class),
            ..Self::default()
        }
    }
}

/// Top-level configuration file layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    pub movement: MovementConfig,
    pub agent: AgentProfile,
}

impl NavigatorConfig {
    /// Parse configuration from a TOML string and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: NavigatorConfig = toml::from_str(content)?;
        config.movement.validate().map_err(NavError::Config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file on disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
