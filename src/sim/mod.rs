//! Reference environment for driving the controller without a live game
//!
//! - `grid`: blocked cells and line rasterization
//! - `pathfinding`: A* over the grid
//! - `world`: [`SimWorld`], which implements every collaborator contract on
//!   top of a manual clock

pub mod grid;
pub mod pathfinding;
pub mod world;

pub use grid::{line_cells, BlockedCells};
pub use pathfinding::find_path;
pub use world::{Portal, SimRecord, SimWorld};
