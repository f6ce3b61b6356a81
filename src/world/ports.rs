//! Collaborator contracts consumed by the movement controller
//!
//! The controller never touches the game directly. It reads the world through
//! [`WorldSource`], asks [`PathPlanner`] spatial questions, acts through
//! [`InputDriver`] and waits through [`Clock`]. An environment implements all
//! four and is handed to the controller as a [`NavEnvironment`].

use std::time::Duration;

use crate::core::clock::Clock;
use crate::core::error::Result;
use crate::core::types::{GridPos, KeyBinding, ObjectId, ScreenPos, WorldPos};
use crate::world::snapshot::{Monster, WorldObject, WorldSnapshot};

/// A path produced by the planner
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlannedPath {
    /// Waypoints in grid space, excluding the start position
    pub points: Vec<GridPos>,
    pub cost: u32,
}

/// Live world state
pub trait WorldSource {
    /// Cooperative preemption point: block while a higher-priority activity runs
    fn yield_to_priority(&mut self) {}

    /// Error out if an external flow (item pickup, drop request) wants control
    fn check_pending_interrupt(&mut self) -> Result<()> {
        Ok(())
    }

    /// Take a fresh snapshot
    fn refresh(&mut self) -> WorldSnapshot;

    /// Record the step currently executing, for diagnostics
    fn mark_step(&mut self, _step: &'static str) {}

    /// Agent-specific rule for monsters that never block movement
    fn should_ignore_monster(&self, _monster: &Monster) -> bool {
        false
    }

    /// Project a world position onto the screen
    fn screen_position(&self, snapshot: &WorldSnapshot, pos: WorldPos) -> ScreenPos;
}

/// Grid queries and planning
pub trait PathPlanner {
    /// Plan a path; `None` when the destination is unreachable
    ///
    /// Waypoints for which `avoid` returns true must not be used. The
    /// controller's predicate never rejects points within
    /// [`BLACKLIST_RADIUS`](crate::movement::BLACKLIST_RADIUS) of `from` or
    /// `dest`, so a planner may treat rejected points as impassable without
    /// trapping the agent at a blacklisted start.
    fn compute_path(
        &mut self,
        from: WorldPos,
        dest: WorldPos,
        avoid: &dyn Fn(WorldPos) -> bool,
    ) -> Option<PlannedPath>;

    fn distance(&self, a: WorldPos, b: WorldPos) -> i32 {
        a.distance(&b)
    }

    fn has_line_of_sight(&self, a: WorldPos, b: WorldPos) -> bool;

    /// True when a straight-line move from `a` to `b` is obstructed
    fn is_obstacle_between(&self, a: WorldPos, b: WorldPos) -> bool;

    /// A walkable point a little beyond `dest`, seen from `from`
    fn position_past(&self, from: WorldPos, dest: WorldPos) -> WorldPos;

    fn find_door_between(&self, a: WorldPos, b: WorldPos) -> Option<WorldObject>;

    fn nearest_destructible(&self, from: WorldPos, max_distance: i32) -> Option<WorldObject>;

    fn nearest_door(&self, from: WorldPos, max_distance: i32) -> Option<WorldObject>;

    /// Small random nudge, used to shake off click-through on obstacles
    fn random_movement(&mut self);
}

/// Input emission
pub trait InputDriver {
    /// Walk (or teleport) along a grid-space path for roughly `step`
    fn issue_movement(&mut self, path: &[GridPos], step: Duration);

    /// Interact with an object until `done` holds or the driver gives up
    fn interact_with_object(
        &mut self,
        object: ObjectId,
        done: &dyn Fn(&WorldSnapshot) -> bool,
    ) -> Result<()>;

    fn activate_skill(&mut self, binding: &KeyBinding);

    fn click_at(&mut self, pos: ScreenPos);
}

/// Everything the controller needs from its surroundings
pub trait NavEnvironment: WorldSource + PathPlanner + InputDriver + Clock {}

impl<T: WorldSource + PathPlanner + InputDriver + Clock> NavEnvironment for T {}
