//! Scripted environment for driving the movement controller in tests
//!
//! Every collaborator answer is set up front; every action the controller
//! takes is recorded. Time only moves through the embedded manual clock.

#![allow(dead_code)]

use std::cell::Cell;
use std::time::{Duration, Instant};

use ahash::AHashMap;
use arc_navigator::core::clock::{Clock, ManualClock};
use arc_navigator::core::error::{NavError, Result};
use arc_navigator::core::types::{
    Area, GridPos, KeyBinding, ObjectId, ScreenPos, Skill, WorldPos,
};
use arc_navigator::world::{
    Capabilities, InputDriver, Monster, PathPlanner, PlannedPath, WorldObject, WorldSnapshot,
    WorldSource,
};

/// How the player reacts to a movement command
#[derive(Debug, Clone)]
pub enum Motion {
    /// Never moves
    Stay,
    /// Ends up on the last waypoint of the issued path
    FollowPath,
    /// Moves this far along x per command, never past the last waypoint
    Advance(i32),
    /// Alternates between two positions
    Oscillate(WorldPos, WorldPos),
}

/// Area change triggered by the first movement command
#[derive(Debug, Clone)]
pub struct AreaChange {
    pub area: Area,
    pub origin: WorldPos,
    /// Refreshes until collision data is ready; `None` means never
    pub ready_after: Option<u32>,
}

pub struct ScriptedEnv {
    pub clock: ManualClock,
    pub snapshot: WorldSnapshot,
    pub frame: Duration,
    pub motion: Motion,

    /// What `compute_path` returns
    pub path: Option<Vec<GridPos>>,
    /// Returned instead of `path` when `avoid` rejects one of its waypoints
    pub detour: Option<Vec<GridPos>>,
    /// Straight-line obstruction oracle
    pub obstacle: Box<dyn Fn(WorldPos, WorldPos) -> bool>,
    pub line_of_sight: bool,
    /// Door reported between any two points while it is selectable
    pub door: Option<WorldObject>,
    /// Door only found by the nearby-door search, never between two points
    pub nearby_door: Option<WorldObject>,
    /// Failed interactions before the door opens; `None` means it never does
    pub door_opens_after: Option<u32>,
    pub area_change: Option<AreaChange>,
    pub interrupt: Option<String>,
    pub ignored_monsters: Vec<String>,
    /// Point checked against the `avoid` callback on every path request
    pub avoid_check: Option<WorldPos>,

    pub movements: Vec<Vec<GridPos>>,
    /// Clock reading at each movement command
    pub movement_times: Vec<Duration>,
    pub skill_presses: Vec<KeyBinding>,
    pub clicks: Vec<ScreenPos>,
    pub interactions: u32,
    pub random_moves: u32,
    pub steps: Vec<&'static str>,
    pub path_requests: u32,
    pub avoid_results: Vec<bool>,
    /// Path requests answered with the detour
    pub detours: u32,
    pub sight_checks: Cell<u32>,
    refreshes_until_ready: Option<u32>,
    oscillation_flip: bool,
}

impl ScriptedEnv {
    /// Walking agent at `player` in a field area with origin (0, 0)
    pub fn new(player: WorldPos) -> Self {
        Self {
            clock: ManualClock::new(),
            snapshot: WorldSnapshot {
                player_position: player,
                area: Area::new(2, "Blood Moor", false),
                area_origin: WorldPos::default(),
                collision_ready: true,
                latency_ms: 0,
                monsters: Vec::new(),
                objects: Vec::new(),
                capabilities: Capabilities::default(),
                key_bindings: AHashMap::new(),
            },
            frame: Duration::from_millis(10),
            motion: Motion::FollowPath,
            path: None,
            detour: None,
            obstacle: Box::new(|_, _| false),
            line_of_sight: true,
            door: None,
            nearby_door: None,
            door_opens_after: None,
            area_change: None,
            interrupt: None,
            ignored_monsters: Vec::new(),
            avoid_check: None,
            movements: Vec::new(),
            movement_times: Vec::new(),
            skill_presses: Vec::new(),
            clicks: Vec::new(),
            interactions: 0,
            random_moves: 0,
            steps: Vec::new(),
            path_requests: 0,
            avoid_results: Vec::new(),
            detours: 0,
            sight_checks: Cell::new(0),
            refreshes_until_ready: None,
            oscillation_flip: false,
        }
    }

    pub fn with_path(mut self, path: Vec<GridPos>) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_teleport(mut self, cast: Duration) -> Self {
        self.snapshot.capabilities.can_teleport = true;
        self.snapshot.capabilities.cast_duration = cast;
        self
    }

    pub fn bind(mut self, skill: Skill, key: &str) -> Self {
        self.snapshot
            .key_bindings
            .insert(skill, KeyBinding(key.to_string()));
        self
    }

    pub fn position(&self) -> WorldPos {
        self.snapshot.player_position
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    fn door_is_closed(&self) -> bool {
        self.door
            .iter()
            .chain(self.nearby_door.iter())
            .any(|d| d.selectable)
    }
}

impl Clock for ScriptedEnv {
    fn now(&self) -> Instant {
        self.clock.now()
    }

    fn sleep(&mut self, duration: Duration) {
        self.clock.sleep(duration);
    }
}

impl WorldSource for ScriptedEnv {
    fn check_pending_interrupt(&mut self) -> Result<()> {
        match self.interrupt.take() {
            Some(reason) => Err(NavError::Interrupted(reason)),
            None => Ok(()),
        }
    }

    fn refresh(&mut self) -> WorldSnapshot {
        self.clock.advance(self.frame);
        if let Some(remaining) = self.refreshes_until_ready.as_mut() {
            if *remaining == 0 {
                self.snapshot.collision_ready = true;
                self.refreshes_until_ready = None;
            } else {
                *remaining -= 1;
            }
        }
        self.snapshot.clone()
    }

    fn mark_step(&mut self, step: &'static str) {
        self.steps.push(step);
    }

    fn should_ignore_monster(&self, monster: &Monster) -> bool {
        self.ignored_monsters.contains(&monster.name)
    }

    fn screen_position(&self, _snapshot: &WorldSnapshot, pos: WorldPos) -> ScreenPos {
        ScreenPos { x: pos.x, y: pos.y }
    }
}

impl PathPlanner for ScriptedEnv {
    fn compute_path(
        &mut self,
        _from: WorldPos,
        _dest: WorldPos,
        avoid: &dyn Fn(WorldPos) -> bool,
    ) -> Option<PlannedPath> {
        self.path_requests += 1;
        if let Some(point) = self.avoid_check {
            self.avoid_results.push(avoid(point));
        }

        let origin = self.snapshot.area_origin;
        let points = self.path.clone()?;
        if points.iter().any(|p| avoid(p.to_world(origin))) {
            self.detours += 1;
            return self.detour.clone().map(|points| PlannedPath { points, cost: 0 });
        }
        Some(PlannedPath { points, cost: 0 })
    }

    fn has_line_of_sight(&self, _a: WorldPos, _b: WorldPos) -> bool {
        self.sight_checks.set(self.sight_checks.get() + 1);
        self.line_of_sight
    }

    fn is_obstacle_between(&self, a: WorldPos, b: WorldPos) -> bool {
        (self.obstacle)(a, b)
    }

    fn position_past(&self, _from: WorldPos, dest: WorldPos) -> WorldPos {
        WorldPos::new(dest.x + 2, dest.y)
    }

    fn find_door_between(&self, _a: WorldPos, _b: WorldPos) -> Option<WorldObject> {
        self.door.clone().filter(|d| d.selectable)
    }

    fn nearest_destructible(&self, _from: WorldPos, _max_distance: i32) -> Option<WorldObject> {
        None
    }

    fn nearest_door(&self, _from: WorldPos, _max_distance: i32) -> Option<WorldObject> {
        self.nearby_door
            .clone()
            .or_else(|| self.door.clone())
            .filter(|d| d.selectable)
    }

    fn random_movement(&mut self) {
        self.random_moves += 1;
    }
}

impl InputDriver for ScriptedEnv {
    fn issue_movement(&mut self, path: &[GridPos], step: Duration) {
        self.movements.push(path.to_vec());
        self.movement_times.push(self.clock.elapsed());
        self.clock.advance(step);

        if let Some(change) = self.area_change.take() {
            self.snapshot.area = change.area;
            self.snapshot.area_origin = change.origin;
            self.snapshot.collision_ready = false;
            self.refreshes_until_ready = change.ready_after;
            return;
        }

        let origin = self.snapshot.area_origin;
        match &self.motion {
            Motion::Stay => {}
            Motion::FollowPath => {
                if let Some(last) = path.last() {
                    if !self.door_is_closed() {
                        self.snapshot.player_position = last.to_world(origin);
                    }
                }
            }
            Motion::Advance(stride) => {
                if let Some(last) = path.last() {
                    let target = last.to_world(origin);
                    let pos = &mut self.snapshot.player_position;
                    pos.x = (pos.x + stride).min(target.x);
                }
            }
            Motion::Oscillate(a, b) => {
                self.oscillation_flip = !self.oscillation_flip;
                self.snapshot.player_position = if self.oscillation_flip { *b } else { *a };
            }
        }
    }

    fn interact_with_object(
        &mut self,
        object: ObjectId,
        done: &dyn Fn(&WorldSnapshot) -> bool,
    ) -> Result<()> {
        self.interactions += 1;
        self.clock.advance(Duration::from_millis(50));

        let opens = self
            .door_opens_after
            .is_some_and(|failures| self.interactions > failures);
        if !opens {
            return Err(NavError::Interaction("door did not open".into()));
        }

        let door = self
            .door
            .iter_mut()
            .chain(self.nearby_door.iter_mut())
            .find(|d| d.id == object);
        if let Some(door) = door {
            door.selectable = false;
            self.snapshot.objects.retain(|o| o.id != object);
            self.snapshot.objects.push(door.clone());
        }

        if done(&self.snapshot) {
            Ok(())
        } else {
            Err(NavError::Interaction("door still closed".into()))
        }
    }

    fn activate_skill(&mut self, binding: &KeyBinding) {
        self.skill_presses.push(binding.clone());
        self.snapshot.capabilities.active_skill = self
            .snapshot
            .key_bindings
            .iter()
            .find(|(_, kb)| *kb == binding)
            .map(|(skill, _)| *skill);
    }

    fn click_at(&mut self, pos: ScreenPos) {
        self.clicks.push(pos);
    }
}
