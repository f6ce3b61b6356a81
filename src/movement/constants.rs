//! Movement constants that are not per-agent tunables

use std::time::Duration;

// Stuck detector
pub const PATH_STUCK_TIMEOUT: Duration = Duration::from_secs(3);
pub const BLACKLIST_RADIUS: i32 = 5;

/// Step name reported to the environment while a move runs
pub const MOVE_STEP_NAME: &str = "move_to";
