use serde::{Deserialize, Serialize};

use crate::types::Pos;

/// Object codes used in the `[object, color, state]` cell encoding.
/// Values match MiniGrid's OBJECT_TO_IDX; spiky floor takes the next free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ObjectKind {
    Unseen = 0,
    Empty = 1,
    Wall = 2,
    Goal = 8,
    Lava = 9,
    Agent = 10,
    SpikyFloor = 11,
}

/// Color codes (MiniGrid COLOR_TO_IDX subset).
pub mod color {
    pub const RED: u8 = 0;
    pub const GREEN: u8 = 1;
    pub const PURPLE: u8 = 3;
    pub const GREY: u8 = 5;
}

/// Contents of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tile {
    Empty,
    Wall,
    Goal,
    Lava,
    SpikyFloor,
}

impl Tile {
    /// Whether the agent may stand on this tile. Only walls block.
    pub fn can_overlap(self) -> bool {
        !matches!(self, Tile::Wall)
    }

    pub fn object_kind(self) -> ObjectKind {
        match self {
            Tile::Empty => ObjectKind::Empty,
            Tile::Wall => ObjectKind::Wall,
            Tile::Goal => ObjectKind::Goal,
            Tile::Lava => ObjectKind::Lava,
            Tile::SpikyFloor => ObjectKind::SpikyFloor,
        }
    }

    pub fn color(self) -> u8 {
        match self {
            Tile::Empty => 0,
            Tile::Wall => color::GREY,
            Tile::Goal => color::GREEN,
            Tile::Lava => color::RED,
            Tile::SpikyFloor => color::PURPLE,
        }
    }

    /// `[object, color, state]` triple. Static tiles carry no state.
    pub fn encode(self) -> [u8; 3] {
        [self.object_kind() as u8, self.color(), 0]
    }

    pub fn glyph(self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::Wall => '#',
            Tile::Goal => 'G',
            Tile::Lava => 'L',
            Tile::SpikyFloor => '^',
        }
    }
}

/// Rectangular tile storage, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Tile>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self { width, height, cells: vec![Tile::Empty; width as usize * height as usize] }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Strictly inside the outer ring of cells.
    #[inline]
    pub fn is_interior(&self, pos: Pos) -> bool {
        pos.0 >= 1 && pos.1 >= 1 && pos.0 < self.width - 1 && pos.1 < self.height - 1
    }

    #[inline]
    fn idx(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Tile at `(x, y)`, `None` outside the grid.
    pub fn get(&self, x: i32, y: i32) -> Option<Tile> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.cells[self.idx(x, y)])
    }

    /// Overwrites the tile at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn place(&mut self, tile: Tile, x: i32, y: i32) {
        if self.in_bounds(x, y) {
            let i = self.idx(x, y);
            self.cells[i] = tile;
        }
    }

    /// Draws the outline of the `w` x `h` rectangle anchored at `(x0, y0)` with walls.
    pub fn wall_rect(&mut self, x0: i32, y0: i32, w: i32, h: i32) {
        for x in x0..x0 + w {
            self.place(Tile::Wall, x, y0);
            self.place(Tile::Wall, x, y0 + h - 1);
        }
        for y in y0..y0 + h {
            self.place(Tile::Wall, x0, y);
            self.place(Tile::Wall, x0 + w - 1, y);
        }
    }

    /// Positions holding `tile`, row-major order.
    pub fn positions_of(&self, tile: Tile) -> Vec<Pos> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.cells[self.idx(x, y)] == tile {
                    out.push((x, y));
                }
            }
        }
        out
    }

    /// `[h][w]` array of encoded cells.
    pub fn encode(&self) -> Vec<Vec<[u8; 3]>> {
        (0..self.height)
            .map(|y| (0..self.width).map(|x| self.cells[self.idx(x, y)].encode()).collect())
            .collect()
    }

    /// One line per row, one glyph per cell. `agent` is drawn as `A`.
    pub fn text(&self, agent: Option<Pos>) -> String {
        let mut out = String::with_capacity((self.width as usize + 1) * self.height as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                if agent == Some((x, y)) {
                    out.push('A');
                } else {
                    out.push(self.cells[self.idx(x, y)].glyph());
                }
            }
            if y + 1 < self.height {
                out.push('\n');
            }
        }
        out
    }
}
