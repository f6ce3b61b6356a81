//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Absolute position in world space
///
/// Everything the world snapshot reports (player, monsters, objects) is in
/// this space. Path waypoints are not: see [`GridPos`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: i32,
    pub y: i32,
}

impl WorldPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance, truncated to whole units
    pub fn distance(&self, other: &WorldPos) -> i32 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt() as i32
    }

    /// Convert into grid space relative to an area origin
    pub fn to_grid(self, origin: WorldPos) -> GridPos {
        GridPos::new(self.x - origin.x, self.y - origin.y)
    }
}

/// Position relative to the current area's origin
///
/// The path planner produces and the movement layer consumes these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Convert back into world space using the area origin
    pub fn to_world(self, origin: WorldPos) -> WorldPos {
        WorldPos::new(self.x + origin.x, self.y + origin.y)
    }
}

/// Position in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenPos {
    pub x: i32,
    pub y: i32,
}

/// Area identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AreaId(pub u32);

/// An area of the world the agent can be in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    pub is_town: bool,
}

impl Area {
    pub fn new(id: u32, name: impl Into<String>, is_town: bool) -> Self {
        Self {
            id: AreaId(id),
            name: name.into(),
            is_town,
        }
    }
}

/// World object identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

/// Monster identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonsterId(pub u32);

/// Skills relevant to navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Teleport,
    Vigor,
    Conviction,
    BurstOfSpeed,
}

/// Key binding that activates a skill
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyBinding(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_euclidean_truncated() {
        let a = WorldPos::new(0, 0);
        assert_eq!(a.distance(&WorldPos::new(3, 4)), 5);
        assert_eq!(a.distance(&WorldPos::new(3, 3)), 4); // 4.24
        assert_eq!(a.distance(&a), 0);
    }

    #[test]
    fn test_grid_world_conversion() {
        let origin = WorldPos::new(5000, 3000);
        let world = WorldPos::new(5012, 2990);
        let grid = world.to_grid(origin);

        assert_eq!(grid, GridPos::new(12, -10));
        assert_eq!(grid.to_world(origin), world);
    }
}
