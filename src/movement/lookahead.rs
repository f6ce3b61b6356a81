//! Bounded look-ahead validation for teleport paths
//!
//! Teleport ignores walkability but not obstacles, and the path is re-planned
//! every iteration anyway. So instead of validating the whole path, only the
//! next few segments are checked, chained from the player's position.

use crate::core::types::{GridPos, WorldPos};

/// What to do with a planned path after look-ahead validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookahead {
    /// Use the path as planned
    Clear,
    /// Keep only the first `len` waypoints; the destination is directly
    /// reachable from the last of them
    Truncate { len: usize },
    /// Drop the waypoints before `index` and continue from there
    ResumeAt { index: usize },
    /// Not even the first segment is clear
    Blocked,
}

impl Lookahead {
    /// Apply the decision to a path. `Blocked` leaves it untouched.
    pub fn apply(self, mut path: Vec<GridPos>) -> Vec<GridPos> {
        match self {
            Lookahead::Clear | Lookahead::Blocked => path,
            Lookahead::Truncate { len } => {
                path.truncate(len);
                path
            }
            Lookahead::ResumeAt { index } => path.split_off(index.min(path.len())),
        }
    }
}

/// Validate up to `max_segments` path segments starting at `player`
///
/// `path` is in grid space relative to `origin`; `player`, `dest` and every
/// position handed to `is_obstacle` are world space.
pub fn validate_lookahead(
    path: &[GridPos],
    origin: WorldPos,
    player: WorldPos,
    dest: WorldPos,
    max_segments: usize,
    is_obstacle: impl Fn(WorldPos, WorldPos) -> bool,
) -> Lookahead {
    if path.len() <= 1 {
        return Lookahead::Clear;
    }

    let checked = max_segments.min(path.len());
    let mut last_valid = None;
    let mut from = player;

    for (i, waypoint) in path.iter().take(checked).enumerate() {
        let to = waypoint.to_world(origin);
        if is_obstacle(from, to) {
            break;
        }
        last_valid = Some(i);
        from = to;
    }

    let Some(last) = last_valid else {
        return Lookahead::Blocked;
    };

    // Everything checked was clear
    if last >= checked - 1 || last >= path.len() - 1 {
        return Lookahead::Clear;
    }

    let last_world = path[last].to_world(origin);
    if !is_obstacle(last_world, dest) {
        Lookahead::Truncate { len: last + 1 }
    } else if last > 0 {
        Lookahead::ResumeAt { index: last }
    } else {
        Lookahead::Clear
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: WorldPos = WorldPos::new(1000, 2000);

    fn straight_path(len: i32) -> Vec<GridPos> {
        (1..=len).map(|i| GridPos::new(i * 5, 0)).collect()
    }

    fn world(x: i32) -> WorldPos {
        GridPos::new(x, 0).to_world(ORIGIN)
    }

    #[test]
    fn test_all_clear() {
        let path = straight_path(5);
        let result = validate_lookahead(&path, ORIGIN, world(0), world(25), 10, |_, _| false);
        assert_eq!(result, Lookahead::Clear);
    }

    #[test]
    fn test_single_point_path_not_checked() {
        let path = straight_path(1);
        let result = validate_lookahead(&path, ORIGIN, world(0), world(5), 10, |_, _| true);
        assert_eq!(result, Lookahead::Clear);
    }

    #[test]
    fn test_first_segment_blocked() {
        let path = straight_path(5);
        let result = validate_lookahead(&path, ORIGIN, world(0), world(25), 10, |_, _| true);
        assert_eq!(result, Lookahead::Blocked);
    }

    #[test]
    fn test_truncates_when_destination_reachable() {
        let path = straight_path(5);
        let dest = world(40);
        // Segment into the second waypoint is blocked, direct shot to dest is not
        let blocked_segment = (world(5), world(10));
        let result = validate_lookahead(&path, ORIGIN, world(0), dest, 10, |a, b| {
            (a, b) == blocked_segment
        });

        assert_eq!(result, Lookahead::Truncate { len: 1 });
        assert_eq!(result.apply(path), vec![GridPos::new(5, 0)]);
    }

    #[test]
    fn test_resumes_when_destination_unreachable() {
        let path = straight_path(6);
        let dest = world(30);
        let result = validate_lookahead(&path, ORIGIN, world(0), dest, 10, |a, b| {
            (a == world(15) && b == world(20)) || b == dest
        });

        assert_eq!(result, Lookahead::ResumeAt { index: 2 });
        assert_eq!(
            result.apply(path),
            vec![
                GridPos::new(15, 0),
                GridPos::new(20, 0),
                GridPos::new(25, 0),
                GridPos::new(30, 0)
            ]
        );
    }

    #[test]
    fn test_only_checks_window() {
        let path = straight_path(20);
        // Obstacle beyond the window is never seen
        let result = validate_lookahead(&path, ORIGIN, world(0), world(100), 10, |a, _| {
            a == world(60)
        });
        assert_eq!(result, Lookahead::Clear);
    }

    #[test]
    fn test_segments_chain_from_player() {
        let path = straight_path(3);
        let player = world(-5);
        let result = validate_lookahead(&path, ORIGIN, player, world(15), 10, |a, _| a == player);
        assert_eq!(result, Lookahead::Blocked);
    }
}
