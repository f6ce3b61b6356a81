//! World snapshot and the collaborator contracts around it

pub mod ports;
pub mod snapshot;

pub use ports::{InputDriver, NavEnvironment, PathPlanner, PlannedPath, WorldSource};
pub use snapshot::{Capabilities, Monster, ObjectKind, WorldObject, WorldSnapshot};
