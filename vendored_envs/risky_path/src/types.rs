use serde::{Deserialize, Serialize};

use crate::error::RiskyPathError;

/// Grid coordinate `(x, y)`, `y` grows downward.
pub type Pos = (i32, i32);

/// Absolute moves. The agent faces the chosen direction and then tries to
/// advance one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Action {
    West = 0,
    North = 1,
    East = 2,
    South = 3,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::West, Action::North, Action::East, Action::South];

    /// Heading the agent takes before resolving movement.
    pub fn heading(self) -> Direction {
        match self {
            Action::West => Direction::West,
            Action::North => Direction::North,
            Action::East => Direction::East,
            Action::South => Direction::South,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::West => "west",
            Action::North => "north",
            Action::East => "east",
            Action::South => "south",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "west" => Some(Action::West),
            "north" => Some(Action::North),
            "east" => Some(Action::East),
            "south" => Some(Action::South),
            _ => None,
        }
    }
}

impl TryFrom<i64> for Action {
    type Error = RiskyPathError;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        Ok(match v {
            0 => Action::West,
            1 => Action::North,
            2 => Action::East,
            3 => Action::South,
            _ => return Err(RiskyPathError::InvalidAction(v)),
        })
    }
}

impl TryFrom<u8> for Action {
    type Error = RiskyPathError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Action::try_from(i64::from(v))
    }
}

/// Agent heading. Codes follow the MiniGrid convention shared with the grid
/// encoding: 0=east, 1=south, 2=west, 3=north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Direction {
    East = 0,
    South = 1,
    West = 2,
    North = 3,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::North => (0, -1),
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Cell one unit ahead of `pos` in this direction.
    pub fn ahead(self, pos: Pos) -> Pos {
        let (dx, dy) = self.delta();
        (pos.0 + dx, pos.1 + dy)
    }
}
