//! In-memory environment implementing every collaborator contract
//!
//! A single rectangular area (plus an optional portal into a second one) on a
//! square grid. Walls are permanent; doors and destructibles block their cell
//! until opened or broken. Time only passes through the embedded
//! [`ManualClock`], so a whole `move_to` runs instantly and deterministically.

use std::time::{Duration, Instant};

use ahash::AHashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::clock::{Clock, ManualClock};
use crate::core::error::{NavError, Result};
use crate::core::types::{
    Area, GridPos, KeyBinding, MonsterId, ObjectId, ScreenPos, Skill, WorldPos,
};
use crate::sim::grid::{line_cells, BlockedCells};
use crate::sim::pathfinding::find_path;
use crate::world::ports::{InputDriver, PathPlanner, PlannedPath, WorldSource};
use crate::world::snapshot::{Capabilities, Monster, ObjectKind, WorldObject, WorldSnapshot};

/// Screen centre and isometric tile size used for click projection
const SCREEN_CENTER: (i32, i32) = (640, 360);
const TILE_WIDTH: i32 = 16;

/// Distance past the destination used for bypass targets
const PAST_DISTANCE: i32 = 3;

/// A cell that moves the agent into another area
#[derive(Debug, Clone)]
pub struct Portal {
    pub cell: GridPos,
    pub area: Area,
    pub origin: WorldPos,
    pub arrival: WorldPos,
    /// Grid size of the new area
    pub size: (i32, i32),
    /// Time until collision data for the new area is available
    pub load_delay: Duration,
}

/// Everything the controller did to the environment
#[derive(Debug, Clone, Default)]
pub struct SimRecord {
    pub movements: Vec<Vec<GridPos>>,
    pub skill_presses: Vec<KeyBinding>,
    pub clicks: Vec<ScreenPos>,
    pub interactions: u32,
    pub random_moves: u32,
    pub steps: Vec<&'static str>,
}

pub struct SimWorld {
    clock: ManualClock,
    rng: ChaCha8Rng,
    area: Area,
    origin: WorldPos,
    walls: BlockedCells,
    objects: Vec<WorldObject>,
    monsters: Vec<Monster>,
    ignored_monsters: Vec<String>,
    player: WorldPos,
    capabilities: Capabilities,
    key_bindings: AHashMap<Skill, KeyBinding>,
    teleport_range: i32,
    /// Walking speed in cells per second
    walk_speed: u64,
    latency_ms: u32,
    /// Time one snapshot refresh takes
    frame: Duration,
    collision_ready_at: Option<Instant>,
    portal: Option<Portal>,
    frozen: bool,
    door_failures: u32,
    interrupt: Option<String>,
    record: SimRecord,
}

impl SimWorld {
    /// Create an area of `width` x `height` cells with the player at `player`
    pub fn new(area: Area, origin: WorldPos, width: i32, height: i32, player: WorldPos) -> Self {
        Self {
            clock: ManualClock::new(),
            rng: ChaCha8Rng::seed_from_u64(0),
            area,
            origin,
            walls: BlockedCells::new(width, height),
            objects: Vec::new(),
            monsters: Vec::new(),
            ignored_monsters: Vec::new(),
            player,
            capabilities: Capabilities::default(),
            key_bindings: AHashMap::new(),
            teleport_range: 25,
            walk_speed: 20,
            latency_ms: 0,
            frame: Duration::from_millis(10),
            collision_ready_at: None,
            portal: None,
            frozen: false,
            door_failures: 0,
            interrupt: None,
            record: SimRecord::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    // === SCENARIO SETUP ===

    pub fn add_wall(&mut self, from: GridPos, to: GridPos) {
        self.walls.block_line(from, to);
    }

    pub fn add_door(&mut self, id: u32, cell: GridPos) {
        self.add_object(id, ObjectKind::Door, cell);
    }

    pub fn add_destructible(&mut self, id: u32, cell: GridPos) {
        self.add_object(id, ObjectKind::Destructible, cell);
    }

    fn add_object(&mut self, id: u32, kind: ObjectKind, cell: GridPos) {
        self.objects.push(WorldObject {
            id: ObjectId(id),
            kind,
            position: cell.to_world(self.origin),
            selectable: true,
        });
    }

    pub fn add_monster(&mut self, id: u32, name: &str, position: WorldPos, is_enemy: bool) {
        self.monsters.push(Monster {
            id: MonsterId(id),
            name: name.to_string(),
            position,
            is_enemy,
        });
    }

    /// Monsters with this name never block movement
    pub fn ignore_monster(&mut self, name: &str) {
        self.ignored_monsters.push(name.to_string());
    }

    pub fn enable_teleport(&mut self, range: i32, cast_duration: Duration) {
        self.capabilities.can_teleport = true;
        self.capabilities.cast_duration = cast_duration;
        self.teleport_range = range;
    }

    pub fn bind(&mut self, skill: Skill, key: &str) {
        self.key_bindings.insert(skill, KeyBinding(key.to_string()));
    }

    pub fn set_portal(&mut self, portal: Portal) {
        self.portal = Some(portal);
    }

    pub fn set_latency(&mut self, latency_ms: u32) {
        self.latency_ms = latency_ms;
    }

    pub fn set_walk_speed(&mut self, cells_per_second: u64) {
        self.walk_speed = cells_per_second;
    }

    /// The player ignores every movement command
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn set_stunned(&mut self, stunned: bool) {
        self.capabilities.stunned = stunned;
    }

    /// The next `count` object interactions fail
    pub fn fail_interactions(&mut self, count: u32) {
        self.door_failures = count;
    }

    /// Raise an external interrupt picked up at the next preemption point
    pub fn queue_interrupt(&mut self, reason: &str) {
        self.interrupt = Some(reason.to_string());
    }

    // === INSPECTION ===

    pub fn player_position(&self) -> WorldPos {
        self.player
    }

    pub fn area(&self) -> &Area {
        &self.area
    }

    pub fn origin(&self) -> WorldPos {
        self.origin
    }

    pub fn record(&self) -> &SimRecord {
        &self.record
    }

    pub fn object(&self, id: u32) -> Option<&WorldObject> {
        self.objects.iter().find(|o| o.id == ObjectId(id))
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    // === INTERNALS ===

    fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            player_position: self.player,
            area: self.area.clone(),
            area_origin: self.origin,
            collision_ready: self
                .collision_ready_at
                .map_or(true, |at| self.clock.now() >= at),
            latency_ms: self.latency_ms,
            monsters: self.monsters.clone(),
            objects: self.objects.clone(),
            capabilities: self.capabilities.clone(),
            key_bindings: self.key_bindings.clone(),
        }
    }

    fn object_blocks(&self, cell: GridPos) -> bool {
        self.objects.iter().any(|o| {
            o.selectable
                && matches!(o.kind, ObjectKind::Door | ObjectKind::Destructible)
                && o.position.to_grid(self.origin) == cell
        })
    }

    fn cell_blocked(&self, cell: GridPos) -> bool {
        self.walls.is_blocked(cell) || self.object_blocks(cell)
    }

    /// Cells strictly after the start of the line from `a` to `b`
    fn cells_between(&self, a: WorldPos, b: WorldPos) -> Vec<GridPos> {
        line_cells(a.to_grid(self.origin), b.to_grid(self.origin))
            .into_iter()
            .skip(1)
            .collect()
    }

    fn project(player: WorldPos, pos: WorldPos) -> ScreenPos {
        let dx = pos.x - player.x;
        let dy = pos.y - player.y;
        ScreenPos {
            x: SCREEN_CENTER.0 + (dx - dy) * TILE_WIDTH,
            y: SCREEN_CENTER.1 + (dx + dy) * TILE_WIDTH / 2,
        }
    }

    fn enter_portal_if_on_it(&mut self, cell: GridPos) -> bool {
        let on_portal = self.portal.as_ref().is_some_and(|p| p.cell == cell);
        if !on_portal {
            return false;
        }
        let Some(portal) = self.portal.take() else {
            return false;
        };

        let (width, height) = portal.size;
        self.area = portal.area;
        self.origin = portal.origin;
        self.player = portal.arrival;
        self.walls = BlockedCells::new(width, height);
        self.objects.clear();
        self.monsters.clear();
        self.collision_ready_at = Some(self.clock.now() + portal.load_delay);
        true
    }

    fn walk(&mut self, path: &[GridPos], step: Duration) {
        let mut budget = (self.walk_speed * step.as_millis() as u64 / 1000).max(1);
        let mut current = self.player.to_grid(self.origin);

        'outer: for waypoint in path {
            for cell in line_cells(current, *waypoint).into_iter().skip(1) {
                if budget == 0 || self.cell_blocked(cell) {
                    break 'outer;
                }
                current = cell;
                budget -= 1;
                if self.enter_portal_if_on_it(cell) {
                    return;
                }
            }
        }

        self.player = current.to_world(self.origin);
    }

    fn teleport(&mut self, path: &[GridPos]) {
        let target = path
            .iter()
            .rev()
            .copied()
            .find(|cell| {
                cell.to_world(self.origin).distance(&self.player) <= self.teleport_range
                    && !self.cell_blocked(*cell)
            });

        if let Some(cell) = target {
            if !self.enter_portal_if_on_it(cell) {
                self.player = cell.to_world(self.origin);
            }
        }
    }
}

impl Clock for SimWorld {
    fn now(&self) -> Instant {
        self.clock.now()
    }

    fn sleep(&mut self, duration: Duration) {
        self.clock.sleep(duration);
    }
}

impl WorldSource for SimWorld {
    fn check_pending_interrupt(&mut self) -> Result<()> {
        match self.interrupt.take() {
            Some(reason) => Err(NavError::Interrupted(reason)),
            None => Ok(()),
        }
    }

    fn refresh(&mut self) -> WorldSnapshot {
        self.clock.advance(self.frame);
        self.snapshot()
    }

    fn mark_step(&mut self, step: &'static str) {
        self.record.steps.push(step);
    }

    fn should_ignore_monster(&self, monster: &Monster) -> bool {
        self.ignored_monsters.iter().any(|name| *name == monster.name)
    }

    fn screen_position(&self, snapshot: &WorldSnapshot, pos: WorldPos) -> ScreenPos {
        Self::project(snapshot.player_position, pos)
    }
}

impl PathPlanner for SimWorld {
    fn compute_path(
        &mut self,
        from: WorldPos,
        dest: WorldPos,
        avoid: &dyn Fn(WorldPos) -> bool,
    ) -> Option<PlannedPath> {
        let origin = self.origin;
        let start = from.to_grid(origin);
        let goal = dest.to_grid(origin);
        if !self.walls.in_bounds(goal) {
            return None;
        }

        // Doors and destructibles are plannable, the controller clears them
        let walls = &self.walls;
        find_path(start, goal, |cell| {
            !walls.is_blocked(cell) && !avoid(cell.to_world(origin))
        })
        .map(|(points, cost)| PlannedPath { points, cost })
    }

    fn has_line_of_sight(&self, a: WorldPos, b: WorldPos) -> bool {
        let cells = self.cells_between(a, b);
        let inner = cells.len().saturating_sub(1);
        cells.iter().take(inner).all(|cell| {
            !self.walls.is_blocked(*cell)
                && !self.objects.iter().any(|o| {
                    o.kind == ObjectKind::Door
                        && o.selectable
                        && o.position.to_grid(self.origin) == *cell
                })
        })
    }

    fn is_obstacle_between(&self, a: WorldPos, b: WorldPos) -> bool {
        self.cells_between(a, b)
            .iter()
            .any(|cell| self.cell_blocked(*cell))
    }

    fn position_past(&self, from: WorldPos, dest: WorldPos) -> WorldPos {
        let length = from.distance(&dest);
        if length == 0 {
            return dest;
        }
        let past = WorldPos::new(
            dest.x + (dest.x - from.x) * PAST_DISTANCE / length,
            dest.y + (dest.y - from.y) * PAST_DISTANCE / length,
        );
        if self.cell_blocked(past.to_grid(self.origin)) {
            dest
        } else {
            past
        }
    }

    fn find_door_between(&self, a: WorldPos, b: WorldPos) -> Option<WorldObject> {
        let cells = self.cells_between(a, b);
        self.objects
            .iter()
            .find(|o| {
                o.kind == ObjectKind::Door
                    && o.selectable
                    && cells.contains(&o.position.to_grid(self.origin))
            })
            .cloned()
    }

    fn nearest_destructible(&self, from: WorldPos, max_distance: i32) -> Option<WorldObject> {
        nearest_of_kind(&self.objects, ObjectKind::Destructible, from, max_distance)
    }

    fn nearest_door(&self, from: WorldPos, max_distance: i32) -> Option<WorldObject> {
        nearest_of_kind(&self.objects, ObjectKind::Door, from, max_distance)
    }

    fn random_movement(&mut self) {
        self.record.random_moves += 1;
        let current = self.player.to_grid(self.origin);
        let candidate = GridPos::new(
            current.x + self.rng.gen_range(-1..=1),
            current.y + self.rng.gen_range(-1..=1),
        );
        if !self.frozen && !self.cell_blocked(candidate) {
            self.player = candidate.to_world(self.origin);
        }
    }
}

impl InputDriver for SimWorld {
    fn issue_movement(&mut self, path: &[GridPos], step: Duration) {
        self.record.movements.push(path.to_vec());

        if self.frozen {
            self.clock.advance(step);
        } else if self.capabilities.can_teleport {
            self.teleport(path);
            self.clock.advance(self.frame);
        } else {
            self.walk(path, step);
            self.clock.advance(step);
        }
    }

    fn interact_with_object(
        &mut self,
        object: ObjectId,
        done: &dyn Fn(&WorldSnapshot) -> bool,
    ) -> Result<()> {
        self.record.interactions += 1;
        self.clock.advance(Duration::from_millis(100));

        if self.door_failures > 0 {
            self.door_failures -= 1;
            return Err(NavError::Interaction("object did not respond".into()));
        }

        // The driver walks up to the object on its own
        let Some(target) = self.objects.iter_mut().find(|o| o.id == object) else {
            return Err(NavError::Interaction(format!("object {:?} not found", object)));
        };
        target.selectable = false;

        if done(&self.snapshot()) {
            Ok(())
        } else {
            Err(NavError::Interaction("interaction did not complete".into()))
        }
    }

    fn activate_skill(&mut self, binding: &KeyBinding) {
        self.record.skill_presses.push(binding.clone());
        self.capabilities.active_skill = self
            .key_bindings
            .iter()
            .find(|(_, kb)| *kb == binding)
            .map(|(skill, _)| *skill);
    }

    fn click_at(&mut self, pos: ScreenPos) {
        self.record.clicks.push(pos);
        let player = self.player;
        if let Some(target) = self.objects.iter_mut().find(|o| {
            o.kind == ObjectKind::Destructible && o.selectable && Self::project(player, o.position) == pos
        }) {
            target.selectable = false;
        }
    }
}

fn nearest_of_kind(
    objects: &[WorldObject],
    kind: ObjectKind,
    from: WorldPos,
    max_distance: i32,
) -> Option<WorldObject> {
    objects
        .iter()
        .filter(|o| o.kind == kind && o.selectable)
        .filter(|o| o.position.distance(&from) <= max_distance)
        .min_by_key(|o| o.position.distance(&from))
        .cloned()
}
