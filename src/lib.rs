//! Arc Navigator - real-time grid navigation with stuck detection and recovery

pub mod core;
pub mod movement;
pub mod sim;
pub mod world;
