//! The movement control loop
//!
//! `move_to` drives the agent towards a destination until it arrives, changes
//! area, or hits one of the named failures. Every iteration works from a
//! single fresh snapshot and runs its stages in a fixed priority order:
//!
//! 1. preemption point and pending-interrupt check
//! 2. area transition
//! 3. teleport bypass of an obstructed destination
//! 4. terminal distance
//! 5. doors on the way (walking only)
//! 6. stationary band
//! 7. teleport cast gate
//! 8. monsters in the path
//! 9. round-trip and stuck detection
//! 10. soft-block recovery
//! 11. navigation skill
//! 12. path planning, teleport look-ahead and the movement commit

use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::config::{AgentProfile, MovementConfig};
use crate::core::error::{NavError, Result};
use crate::core::types::{AreaId, ObjectId, WorldPos};
use crate::movement::constants::MOVE_STEP_NAME;
use crate::movement::liveness::{Liveness, LivenessTracker};
use crate::movement::lookahead::{validate_lookahead, Lookahead};
use crate::movement::options::MoveOptions;
use crate::movement::stuck_detector::StuckDetector;
use crate::world::ports::NavEnvironment;
use crate::world::snapshot::{Monster, WorldSnapshot};

/// True when the agent is close enough to stop
///
/// While soft-blocked the tolerance doubles.
pub fn terminal_reached(distance: i32, finish_distance: i32, blocked: bool) -> bool {
    distance <= finish_distance || (blocked && distance <= finish_distance * 2)
}

/// Step duration for one move, fixed for the whole call
///
/// Half the measured latency is added to both ends of the base range so that
/// slow connections are not flooded with movement commands.
pub fn adaptive_step_duration(
    config: &MovementConfig,
    is_town: bool,
    latency_ms: u32,
    rng: &mut impl Rng,
) -> Duration {
    let (base_min, base_max) = if is_town {
        config.step_duration_town_ms
    } else {
        config.step_duration_field_ms
    };
    let (low, high) = (base_min.min(base_max), base_min.max(base_max));
    let adjustment = u64::from(latency_ms) / 2;
    Duration::from_millis(rng.gen_range(low + adjustment..=high + adjustment))
}

/// Delay after an obstacle interaction, scaled by latency
pub fn latency_scaled_delay(base_ms: u64, latency_ms: u32) -> Duration {
    Duration::from_millis(base_ms + u64::from(latency_ms) / 2)
}

/// What soft-block recovery asks the loop to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recovery {
    Proceed,
    Restart,
}

/// Transient state of one `move_to` call
#[derive(Debug)]
struct MoveState {
    dest: WorldPos,
    start_area: AreaId,
    finish_distance: i32,
    clear_path_distance: i32,
    clear_path_overridden: bool,
    step_duration: Duration,
    last_action: Option<Instant>,
    previous_position: Option<WorldPos>,
    bypass_attempts: u32,
    blocked: bool,
    last_monster_check: Option<Instant>,
    next_waypoint: Option<WorldPos>,
    blacklisted: bool,
    liveness: LivenessTracker,
}

impl MoveState {
    /// Record a movement commit; the bypass counter only survives while the
    /// agent has not moved since the previous commit
    fn commit(&mut self, now: Instant, position: WorldPos) {
        self.last_action = Some(now);
        if self.previous_position != Some(position) {
            self.bypass_attempts = 0;
        }
        self.previous_position = Some(position);
    }
}

pub struct MovementController {
    config: MovementConfig,
    profile: AgentProfile,
    stuck_detector: StuckDetector,
    rng: ChaCha8Rng,
}

impl MovementController {
    pub fn new(config: MovementConfig, profile: AgentProfile) -> Self {
        Self::with_rng(config, profile, ChaCha8Rng::from_entropy())
    }

    /// Controller with a deterministic step-duration RNG
    pub fn with_seed(config: MovementConfig, profile: AgentProfile, seed: u64) -> Self {
        Self::with_rng(config, profile, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(config: MovementConfig, profile: AgentProfile, rng: ChaCha8Rng) -> Self {
        Self {
            config,
            profile,
            stuck_detector: StuckDetector::new(),
            rng,
        }
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    /// Session-long stuck detector; its blacklist is applied to every path request
    pub fn stuck_detector(&self) -> &StuckDetector {
        &self.stuck_detector
    }

    pub fn stuck_detector_mut(&mut self) -> &mut StuckDetector {
        &mut self.stuck_detector
    }

    /// Move to `dest`, blocking until arrival or failure
    pub fn move_to<E: NavEnvironment>(
        &mut self,
        env: &mut E,
        dest: WorldPos,
        options: MoveOptions,
    ) -> Result<()> {
        env.mark_step(MOVE_STEP_NAME);

        let options = if self.profile.interact_with_shrines {
            options
        } else {
            options.ignore_shrines()
        };

        let snapshot = env.refresh();
        let mut state = self.begin(&snapshot, dest, &options, env.now());
        self.stuck_detector.rebaseline(snapshot.player_position, snapshot.area.id);

        tracing::debug!(
            dest_x = dest.x,
            dest_y = dest.y,
            area = %snapshot.area.name,
            step_ms = state.step_duration.as_millis() as u64,
            ignore_monsters = options.ignores_monsters(),
            ignore_shrines = options.ignores_shrines(),
            "MoveTo started"
        );

        loop {
            env.yield_to_priority();
            env.check_pending_interrupt()?;
            let snapshot = env.refresh();
            let now = env.now();
            let position = snapshot.player_position;

            if snapshot.capabilities.stunned {
                self.stuck_detector.rebaseline(position, snapshot.area.id);
            } else if self
                .stuck_detector
                .update_at(position, snapshot.area.id, now)
            {
                self.blacklist_stall(&mut state, position);
            }

            if snapshot.area.id != state.start_area {
                return self.await_area_data(env, snapshot);
            }

            let distance = env.distance(position, dest);
            let can_teleport = snapshot.capabilities.can_teleport;

            if can_teleport
                && distance <= state.finish_distance
                && state.bypass_attempts < self.config.max_obstacle_bypass_attempts
                && env.is_obstacle_between(position, dest)
            {
                state.bypass_attempts += 1;
                tracing::debug!(
                    attempt = state.bypass_attempts,
                    distance,
                    "Destination is not walkable, moving past it"
                );
                self.move_past_destination(env, &mut state, &snapshot);
                continue;
            }

            if terminal_reached(distance, state.finish_distance, state.blocked) {
                return Ok(());
            }

            if !can_teleport {
                if let Some(door) = env.find_door_between(position, dest) {
                    self.open_door(env, door.id)?;
                }
            }

            if let Some((min, max)) = options.stationary_band() {
                if distance >= min && distance <= max {
                    tracing::debug!(min, max, distance, "MoveTo: reached stationary distance");
                    return Ok(());
                }
            }

            if can_teleport {
                if let Some(last) = state.last_action {
                    let elapsed = now.saturating_duration_since(last);
                    let cast = snapshot.capabilities.cast_duration;
                    if elapsed < cast {
                        env.sleep(cast - elapsed);
                        continue;
                    }
                }
            }

            if self.should_scan_monsters(&state, &options, &snapshot, now) {
                state.last_monster_check = Some(now);
                if let Some(monster) =
                    find_blocking_monster(env, &snapshot, &options, state.clear_path_distance)
                {
                    tracing::debug!(
                        monster = %monster.name,
                        x = monster.position.x,
                        y = monster.position.y,
                        "Monster blocks the path"
                    );
                    return Err(NavError::MonstersInPath);
                }
            }

            state.blocked = false;
            match state.liveness.assess(
                position,
                state.previous_position,
                snapshot.capabilities.stunned,
                now,
            ) {
                Liveness::RoundTrip => {
                    tracing::warn!(
                        area = %snapshot.area.name,
                        dest_x = dest.x,
                        dest_y = dest.y,
                        "Player is doing round trips"
                    );
                    return Err(NavError::PlayerRoundTrip);
                }
                Liveness::Stuck => {
                    self.blacklist_stall(&mut state, position);
                    tracing::warn!(
                        area = %snapshot.area.name,
                        x = position.x,
                        y = position.y,
                        "Player is stuck"
                    );
                    return Err(NavError::PlayerStuck);
                }
                Liveness::SoftBlocked => state.blocked = true,
                Liveness::Progressing => {}
            }

            if state.blocked && self.clear_obstruction(env, &snapshot) == Recovery::Restart {
                continue;
            }

            if let Some(binding) = self.profile.skills.activation_needed(&snapshot) {
                env.activate_skill(binding);
            } else if can_teleport && snapshot.key_binding_for(self.profile.skills.teleport).is_none() {
                tracing::warn!("Teleport available but not bound to a key");
            }

            let detector = &self.stuck_detector;
            let planned = env.compute_path(position, dest, &|p| {
                detector.should_avoid(p, position, dest)
            });
            let Some(planned) = planned else {
                tracing::warn!(
                    area = %snapshot.area.name,
                    dest_x = dest.x,
                    dest_y = dest.y,
                    "Path could not be calculated"
                );
                return Err(NavError::NoPath);
            };
            if planned.points.is_empty() {
                tracing::warn!(
                    area = %snapshot.area.name,
                    dest_x = dest.x,
                    dest_y = dest.y,
                    "Path found but it's empty"
                );
                return Ok(());
            }

            let origin = snapshot.area_origin;
            let mut path = planned.points;
            state.next_waypoint = path.first().map(|p| p.to_world(origin));

            if can_teleport && path.len() > 1 {
                let decision = validate_lookahead(
                    &path,
                    origin,
                    position,
                    dest,
                    self.config.lookahead_segments,
                    |a, b| env.is_obstacle_between(a, b),
                );
                match decision {
                    Lookahead::Blocked => {
                        tracing::debug!(distance, "Immediate path is blocked, attempting bypass");
                        self.move_past_destination(env, &mut state, &snapshot);
                        continue;
                    }
                    Lookahead::Truncate { len } => tracing::debug!(
                        original_len = path.len(),
                        truncated_len = len,
                        "Path has obstacles but destination is reachable, truncating path"
                    ),
                    Lookahead::ResumeAt { index } => tracing::debug!(
                        skipped = index,
                        remaining = path.len() - index,
                        "Skipping blocked path segments"
                    ),
                    Lookahead::Clear => {}
                }
                path = decision.apply(path);
            }

            state.commit(env.now(), position);
            env.issue_movement(&path, state.step_duration);
        }
    }

    fn begin(
        &mut self,
        snapshot: &WorldSnapshot,
        dest: WorldPos,
        options: &MoveOptions,
        now: Instant,
    ) -> MoveState {
        let step_duration = adaptive_step_duration(
            &self.config,
            snapshot.is_town(),
            snapshot.latency_ms,
            &mut self.rng,
        );

        MoveState {
            dest,
            start_area: snapshot.area.id,
            finish_distance: options
                .distance_override()
                .unwrap_or(self.config.distance_to_finish),
            clear_path_distance: options
                .clear_path_override()
                .unwrap_or(self.profile.clear_path_distance),
            clear_path_overridden: options.clear_path_override().is_some(),
            step_duration,
            last_action: None,
            previous_position: None,
            bypass_attempts: 0,
            blocked: false,
            last_monster_check: None,
            next_waypoint: None,
            blacklisted: false,
            liveness: LivenessTracker::new(&self.config, snapshot.player_position, now),
        }
    }

    /// Area changed under us: success once the new area's collision data is in
    fn await_area_data<E: NavEnvironment>(
        &self,
        env: &mut E,
        mut snapshot: WorldSnapshot,
    ) -> Result<()> {
        tracing::debug!(area = %snapshot.area.name, "Area transition during movement");

        let deadline = env.now() + self.config.area_load_timeout();
        let poll = Duration::from_millis(self.config.area_load_poll_ms);
        while env.now() < deadline {
            if snapshot.collision_ready {
                return Ok(());
            }
            env.sleep(poll);
            snapshot = env.refresh();
        }

        Err(NavError::AreaDataUnavailable {
            area: snapshot.area.name,
        })
    }

    /// Single corrective step to a point just past the destination
    fn move_past_destination<E: NavEnvironment>(
        &self,
        env: &mut E,
        state: &mut MoveState,
        snapshot: &WorldSnapshot,
    ) {
        let position = snapshot.player_position;
        let past = env.position_past(position, state.dest);
        let target = past.to_grid(snapshot.area_origin);

        state.commit(env.now(), position);
        env.issue_movement(&[target], state.step_duration);
        env.sleep(Duration::from_millis(self.config.bypass_settle_ms));
    }

    /// Open a door, jittering between attempts
    fn open_door<E: NavEnvironment>(&self, env: &mut E, door: ObjectId) -> Result<()> {
        let attempts = self.config.door_retry_attempts;
        let mut last_error = None;

        for attempt in 1..=attempts {
            match env.interact_with_object(door, &|s| door_opened(s, door)) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    tracing::debug!(attempt, error = %err, "Door interaction failed");
                    last_error = Some(err);
                }
            }
            env.random_movement();
            env.sleep(Duration::from_millis(self.config.door_retry_delay_ms));
        }

        Err(NavError::DoorInteraction {
            attempts,
            reason: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempts configured".to_string()),
        })
    }

    fn should_scan_monsters(
        &self,
        state: &MoveState,
        options: &MoveOptions,
        snapshot: &WorldSnapshot,
        now: Instant,
    ) -> bool {
        let due = state.last_monster_check.map_or(true, |last| {
            now.saturating_duration_since(last) > self.config.monster_check_interval()
        });

        !options.ignores_monsters()
            && !snapshot.is_town()
            && (!snapshot.capabilities.can_teleport || state.clear_path_overridden)
            && state.clear_path_distance > 0
            && due
    }

    /// Best-effort nudge while soft-blocked: break a destructible, else open a door
    fn clear_obstruction<E: NavEnvironment>(
        &self,
        env: &mut E,
        snapshot: &WorldSnapshot,
    ) -> Recovery {
        let position = snapshot.player_position;

        if let Some(obj) = env.nearest_destructible(position, self.config.destructible_search_radius)
        {
            if !obj.selectable {
                // Already broken
                return Recovery::Restart;
            }
            let screen = env.screen_position(snapshot, obj.position);
            tracing::debug!(x = obj.position.x, y = obj.position.y, "Clearing destructible");
            env.click_at(screen);
            env.sleep(latency_scaled_delay(
                self.config.obstacle_interaction_delay_ms,
                snapshot.latency_ms,
            ));
        } else if let Some(door) = env.nearest_door(position, self.config.door_search_radius) {
            let id = door.id;
            if let Err(err) = env.interact_with_object(id, &|s| door_opened(s, id)) {
                tracing::debug!(error = %err, "Could not open nearby door");
            }
        }

        Recovery::Proceed
    }

    /// Hand the current stall to the stuck detector, once per move
    fn blacklist_stall(&mut self, state: &mut MoveState, position: WorldPos) {
        if state.blacklisted {
            return;
        }
        state.blacklisted = true;
        // No plan yet: only the stall point goes on the list
        let next = state.next_waypoint.unwrap_or(position);
        self.stuck_detector.on_stuck_detected(position, next);
    }
}

fn door_opened(snapshot: &WorldSnapshot, door: ObjectId) -> bool {
    snapshot.object(door).map_or(false, |d| !d.selectable)
}

/// First enemy that should stop the move
///
/// Checks run cheapest first: distance, then line of sight, then the door
/// query (which plans a path internally).
fn find_blocking_monster<'a, E: NavEnvironment>(
    env: &E,
    snapshot: &'a WorldSnapshot,
    options: &MoveOptions,
    clear_path_distance: i32,
) -> Option<&'a Monster> {
    let position = snapshot.player_position;

    snapshot
        .enemies()
        .filter(|m| !env.should_ignore_monster(m))
        .filter(|m| options.accepts_monster(m))
        .find(|m| {
            env.distance(position, m.position) <= clear_path_distance
                && env.has_line_of_sight(position, m.position)
                && env.find_door_between(position, m.position).is_none()
        })
}
