//! Room construction.
//!
//! Tiles are written in a fixed order: wall ring, lava, spiky floor, goal.
//! A coordinate named by several sets ends up holding the tile written last,
//! so goal beats spiky floor beats lava.

use serde::{Deserialize, Serialize};

use crate::grid::{Grid, Tile};
use crate::types::{Direction, Pos};

/// Heading the agent is given at every reset.
pub const START_DIRECTION: Direction = Direction::North;

/// Fully resolved room description. Built by [`crate::EnvConfig::resolve`],
/// which has already checked every precondition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub width: i32,
    pub height: i32,
    pub agent_start_pos: Pos,
    pub goal_positions: Vec<Pos>,
    pub lava_positions: Vec<Pos>,
    pub spiky_positions: Vec<Pos>,
}

/// A freshly generated room with the agent in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub grid: Grid,
    pub agent_pos: Pos,
    pub agent_dir: Direction,
}

pub fn generate(layout: &Layout) -> Generated {
    let mut grid = Grid::new(layout.width, layout.height);
    grid.wall_rect(0, 0, layout.width, layout.height);

    for &(x, y) in &layout.lava_positions {
        grid.place(Tile::Lava, x, y);
    }
    for &(x, y) in &layout.spiky_positions {
        grid.place(Tile::SpikyFloor, x, y);
    }
    // last, so a goal overrides any hazard on the same cell
    for &(x, y) in &layout.goal_positions {
        grid.place(Tile::Goal, x, y);
    }

    Generated { grid, agent_pos: layout.agent_start_pos, agent_dir: START_DIRECTION }
}

pub fn default_goal_positions() -> Vec<Pos> {
    vec![(1, 3)]
}

/// Default hazards, laid out relative to the bottom-left interior corner:
/// a full lava column at `x = 1` (the goal row is reopened by the goal tile),
/// a five-tile column at `x = 3` rising from two rows above the floor, and
/// two tiles at `x = 6`. Cells that fall outside the interior of a small room
/// are dropped.
pub fn default_lava_positions(width: i32, height: i32) -> Vec<Pos> {
    let mut out: Vec<Pos> = (1..height - 1).map(|y| (1, y)).collect();
    out.extend((height - 7..=height - 3).rev().map(|y| (3, y)));
    out.extend([(6, height - 5), (6, height - 6)]);
    out.retain(|&p| interior(width, height, p));
    out
}

/// Default spiky floor: the column right of the first lava column, from the
/// top interior row down to two rows above the floor.
pub fn default_spiky_positions(width: i32, height: i32) -> Vec<Pos> {
    let mut out: Vec<Pos> = (1..height - 2).map(|y| (2, y)).collect();
    out.retain(|&p| interior(width, height, p));
    out
}

/// Fixed hazard layout of the legacy directional variant.
pub fn legacy_lava_positions(width: i32, height: i32) -> Vec<Pos> {
    let mut out: Vec<Pos> = (1..height - 1).filter(|&y| y != 3).map(|y| (1, y)).collect();
    out.extend((4..height - 2).map(|y| (3, y)));
    out.extend([(6, 5), (6, 6)]);
    out.retain(|&p| interior(width, height, p));
    out
}

pub(crate) fn interior(width: i32, height: i32, p: Pos) -> bool {
    p.0 >= 1 && p.1 >= 1 && p.0 < width - 1 && p.1 < height - 1
}
