//! Navigation skill selection
//!
//! While teleporting the movement skill itself must be active. While walking,
//! an agent may keep a movement-assist skill up; which one is an ordered list
//! of preferences resolved against the key bindings the agent actually has.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{KeyBinding, Skill};
use crate::world::snapshot::WorldSnapshot;

/// Use `preferred` if bound, otherwise `fallback` if bound
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillPreference {
    pub preferred: Skill,
    #[serde(default)]
    pub fallback: Option<Skill>,
}

impl SkillPreference {
    pub fn new(preferred: Skill) -> Self {
        Self {
            preferred,
            fallback: None,
        }
    }

    pub fn with_fallback(preferred: Skill, fallback: Skill) -> Self {
        Self {
            preferred,
            fallback: Some(fallback),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillStrategy {
    /// Skill used for unconditional movement
    pub teleport: Skill,
    /// Assist preferences while walking, first resolvable entry wins
    pub assist: Vec<SkillPreference>,
}

impl Default for SkillStrategy {
    fn default() -> Self {
        Self {
            teleport: Skill::Teleport,
            assist: vec![SkillPreference::new(Skill::Vigor)],
        }
    }
}

impl SkillStrategy {
    /// Preset for a character class (case-insensitive)
    pub fn for_class(class: &str) -> Self {
        if class.eq_ignore_ascii_case("dragondin") {
            // Conviction instead of Vigor while moving
            Self {
                assist: vec![SkillPreference::with_fallback(Skill::Conviction, Skill::Vigor)],
                ..Self::default()
            }
        } else {
            Self::default()
        }
    }

    /// First assist skill that has a key binding
    pub fn resolve_assist<'a>(
        &self,
        bindings: &'a AHashMap<Skill, KeyBinding>,
    ) -> Option<(Skill, &'a KeyBinding)> {
        self.assist.iter().find_map(|pref| {
            std::iter::once(pref.preferred)
                .chain(pref.fallback)
                .find_map(|skill| bindings.get(&skill).map(|kb| (skill, kb)))
        })
    }

    /// Skill that should be active for the next movement step
    pub fn desired<'a>(&self, snapshot: &'a WorldSnapshot) -> Option<(Skill, &'a KeyBinding)> {
        if snapshot.capabilities.can_teleport {
            snapshot
                .key_binding_for(self.teleport)
                .map(|kb| (self.teleport, kb))
        } else {
            self.resolve_assist(&snapshot.key_bindings)
        }
    }

    /// Binding to press, or `None` when the desired skill is already active
    pub fn activation_needed<'a>(&self, snapshot: &'a WorldSnapshot) -> Option<&'a KeyBinding> {
        let (skill, binding) = self.desired(snapshot)?;
        if snapshot.capabilities.active_skill == Some(skill) {
            None
        } else {
            Some(binding)
        }
    }
}
