//! Movement - drives the agent to a destination through a live world
//!
//! The controller owns the loop; everything it decides on is factored into
//! small pure pieces so each can be tested without an environment:
//! - `liveness`: round-trip and stuck timers for one move
//! - `lookahead`: teleport path validation
//! - `skills`: which navigation skill to keep active
//! - `stuck_detector`: session-long stall tracking and waypoint blacklist

pub mod constants;
pub mod controller;
pub mod liveness;
pub mod lookahead;
pub mod options;
pub mod skills;
pub mod stuck_detector;

pub use constants::*;
pub use controller::{adaptive_step_duration, terminal_reached, MovementController};
pub use liveness::{Liveness, LivenessTracker};
pub use lookahead::{validate_lookahead, Lookahead};
pub use options::{MonsterFilter, MoveOption, MoveOptions};
pub use skills::{SkillPreference, SkillStrategy};
pub use stuck_detector::StuckDetector;
