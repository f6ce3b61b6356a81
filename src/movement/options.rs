//! Per-call movement options
//!
//! Options are collected from an ordered list of [`MoveOption`] values (or the
//! builder methods) once per `move_to` call and are read-only afterwards.

use std::fmt;
use std::sync::Arc;

use crate::world::snapshot::Monster;

/// Predicate selecting which enemies may interrupt a move
///
/// An enemy is considered only if every filter accepts it.
#[derive(Clone)]
pub struct MonsterFilter(Arc<dyn Fn(&Monster) -> bool + Send + Sync>);

impl MonsterFilter {
    pub fn new(filter: impl Fn(&Monster) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(filter))
    }

    pub fn accepts(&self, monster: &Monster) -> bool {
        (self.0)(monster)
    }
}

impl fmt::Debug for MonsterFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MonsterFilter(..)")
    }
}

/// A single option applied to [`MoveOptions`]
#[derive(Debug, Clone)]
pub enum MoveOption {
    /// Override the default finish distance
    DistanceToFinish(i32),
    /// Stop as soon as the distance to the destination falls within `[min, max]`
    StationaryDistance { min: i32, max: i32 },
    IgnoreMonsters,
    IgnoreItems,
    IgnoreShrines,
    MonsterFilters(Vec<MonsterFilter>),
    /// Override the agent's clear-path distance; also enables the monster
    /// check while teleporting
    ClearPathDistance(i32),
}

#[derive(Debug, Clone, Default)]
pub struct MoveOptions {
    distance_to_finish: Option<i32>,
    stationary_distance: Option<(i32, i32)>,
    ignore_shrines: bool,
    ignore_monsters: bool,
    ignore_items: bool,
    monster_filters: Vec<MonsterFilter>,
    clear_path_distance: Option<i32>,
}

impl MoveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one option; scalar options override earlier values, filters accumulate
    pub fn apply(&mut self, option: MoveOption) {
        match option {
            MoveOption::DistanceToFinish(distance) => self.distance_to_finish = Some(distance),
            MoveOption::StationaryDistance { min, max } => {
                self.stationary_distance = Some((min, max))
            }
            MoveOption::IgnoreMonsters => self.ignore_monsters = true,
            MoveOption::IgnoreItems => self.ignore_items = true,
            MoveOption::IgnoreShrines => self.ignore_shrines = true,
            MoveOption::MonsterFilters(filters) => self.monster_filters.extend(filters),
            MoveOption::ClearPathDistance(distance) => self.clear_path_distance = Some(distance),
        }
    }

    pub fn with(mut self, option: MoveOption) -> Self {
        self.apply(option);
        self
    }

    pub fn distance_to_finish(self, distance: i32) -> Self {
        self.with(MoveOption::DistanceToFinish(distance))
    }

    pub fn stationary_distance(self, min: i32, max: i32) -> Self {
        self.with(MoveOption::StationaryDistance { min, max })
    }

    pub fn ignore_monsters(self) -> Self {
        self.with(MoveOption::IgnoreMonsters)
    }

    pub fn ignore_items(self) -> Self {
        self.with(MoveOption::IgnoreItems)
    }

    pub fn ignore_shrines(self) -> Self {
        self.with(MoveOption::IgnoreShrines)
    }

    pub fn monster_filter(self, filter: MonsterFilter) -> Self {
        self.with(MoveOption::MonsterFilters(vec![filter]))
    }

    pub fn clear_path_distance(self, distance: i32) -> Self {
        self.with(MoveOption::ClearPathDistance(distance))
    }

    pub fn distance_override(&self) -> Option<i32> {
        self.distance_to_finish
    }

    pub fn stationary_band(&self) -> Option<(i32, i32)> {
        self.stationary_distance
    }

    pub fn ignores_monsters(&self) -> bool {
        self.ignore_monsters
    }

    pub fn ignores_items(&self) -> bool {
        self.ignore_items
    }

    pub fn ignores_shrines(&self) -> bool {
        self.ignore_shrines
    }

    pub fn monster_filters(&self) -> &[MonsterFilter] {
        &self.monster_filters
    }

    pub fn clear_path_override(&self) -> Option<i32> {
        self.clear_path_distance
    }

    /// True if the monster passes every caller-supplied filter
    pub fn accepts_monster(&self, monster: &Monster) -> bool {
        self.monster_filters.iter().all(|f| f.accepts(monster))
    }
}

impl FromIterator<MoveOption> for MoveOptions {
    fn from_iter<I: IntoIterator<Item = MoveOption>>(iter: I) -> Self {
        let mut options = MoveOptions::new();
        for option in iter {
            options.apply(option);
        }
        options
    }
}
