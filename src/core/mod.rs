pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AgentProfile, MovementConfig, NavigatorConfig};
pub use error::{NavError, Result};
pub use types::{Area, AreaId, GridPos, KeyBinding, MonsterId, ObjectId, ScreenPos, Skill, WorldPos};
