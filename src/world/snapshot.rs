//! Point-in-time view of the world the controller reasons about
//!
//! A snapshot is taken once per loop iteration and never mutated afterwards,
//! so every distance, obstacle and door decision in an iteration agrees.

use std::time::Duration;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{Area, KeyBinding, MonsterId, ObjectId, Skill, WorldPos};

/// A monster visible in the snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub id: MonsterId,
    pub name: String,
    pub position: WorldPos,
    /// False for summons, mercenaries and other friendlies
    pub is_enemy: bool,
}

/// What a world object is, as far as movement cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Door,
    Destructible,
    Shrine,
    Other,
}

/// An interactable object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub position: WorldPos,
    /// Doors stop being selectable once open, destructibles once broken
    pub selectable: bool,
}

/// What the agent can currently do
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Capabilities {
    pub can_teleport: bool,
    /// Cast time of the movement skill; teleports are spaced at least this far apart
    pub cast_duration: Duration,
    pub active_skill: Option<Skill>,
    /// Stunned agents cannot move, which must not be mistaken for being stuck
    pub stunned: bool,
}

#[derive(Debug, Clone)]
pub struct WorldSnapshot {
    pub player_position: WorldPos,
    pub area: Area,
    /// World position of grid cell (0, 0) in the current area
    pub area_origin: WorldPos,
    pub collision_ready: bool,
    pub latency_ms: u32,
    pub monsters: Vec<Monster>,
    pub objects: Vec<WorldObject>,
    pub capabilities: Capabilities,
    pub key_bindings: AHashMap<Skill, KeyBinding>,
}

impl WorldSnapshot {
    /// Monsters hostile to the agent
    pub fn enemies(&self) -> impl Iterator<Item = &Monster> {
        self.monsters.iter().filter(|m| m.is_enemy)
    }

    pub fn object(&self, id: ObjectId) -> Option<&WorldObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn key_binding_for(&self, skill: Skill) -> Option<&KeyBinding> {
        self.key_bindings.get(&skill)
    }

    pub fn is_town(&self) -> bool {
        self.area.is_town
    }
}
