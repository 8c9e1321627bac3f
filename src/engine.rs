//! Board model for the tile-matching grid.
//!
//! This module defines the snapshot the recognizer hands to the hinter:
//! - `Tile`: one classified cell, either a known tile kind or unknown.
//! - `Board`: the dense row-major grid plus its validity counters.
//! - `Frame`: a board together with the pixel size of the image it came from.
use crate::error::{Error, Result};
use crate::geometry::Size;
use std::collections::HashMap;
use std::fmt;

/// Represents one classified cell of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tile {
    /// The recognizer could not classify this cell.
    Unknown,
    /// A classified tile kind (colour, gem type, ...).
    Kind(u8),
}

impl Tile {
    /// Builds a tile from the recognizer's integer id, where `-1` (or any
    /// negative id, or one that does not fit a `u8`) means unknown.
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_hinter::engine::Tile;
    /// assert_eq!(Tile::from_id(-1), Tile::Unknown);
    /// assert_eq!(Tile::from_id(4), Tile::Kind(4));
    /// ```
    pub fn from_id(id: i32) -> Self {
        match u8::try_from(id) {
            Ok(kind) => Tile::Kind(kind),
            Err(_) => Tile::Unknown,
        }
    }

    /// The integer id, `-1` for unknown cells.
    pub fn id(&self) -> i32 {
        match self {
            Tile::Unknown => -1,
            Tile::Kind(kind) => i32::from(*kind),
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Tile::Kind(_))
    }

    /// Converts the tile to its character representation (`0-9`, `a-z`, `?`).
    pub fn to_char(&self) -> char {
        match self {
            Tile::Unknown => '?',
            Tile::Kind(kind) => std::char::from_digit(u32::from(*kind), 36).unwrap_or('#'),
        }
    }

    /// Returns the ANSI background colour code string for terminal output.
    fn to_ansi_color_code(&self) -> &'static str {
        match self {
            Tile::Unknown => "40",
            Tile::Kind(kind) => match kind % 6 {
                0 => "41",
                1 => "42",
                2 => "43",
                3 => "44",
                4 => "45",
                _ => "46",
            },
        }
    }
}

/// The four axis-aligned neighbour offsets, in the order the hinter tries them:
/// left, right, up, down.
pub const DIRECTIONS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// A classified snapshot of the puzzle grid.
///
/// Cells are addressed as `(x, y)` with `0 <= x < width`, `0 <= y < height`
/// and stored row-major. `invalid_count` always equals the number of
/// `Tile::Unknown` cells; every mutator keeps it in step.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Tile>,
    invalid_count: usize,
}

impl Board {
    /// Creates a board with every cell unknown.
    pub fn new_unknown(width: usize, height: usize) -> Self {
        Board {
            width,
            height,
            cells: vec![Tile::Unknown; width * height],
            invalid_count: width * height,
        }
    }

    /// Creates a board from row-major tiles.
    ///
    /// # Returns
    /// * `Err(Error::Dimensions)` if either dimension is zero or `cells.len()`
    ///   differs from `width * height`.
    pub fn from_tiles(width: usize, height: usize, cells: Vec<Tile>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::Dimensions(format!(
                "board must have at least one cell, got {}x{}",
                width, height
            )));
        }
        if cells.len() != width * height {
            return Err(Error::Dimensions(format!(
                "expected {} cells for a {}x{} board, found {}",
                width * height,
                width,
                height,
                cells.len()
            )));
        }
        let invalid_count = cells.iter().filter(|t| !t.is_known()).count();
        Ok(Board {
            width,
            height,
            cells,
            invalid_count,
        })
    }

    /// Creates a board from the recognizer's raw integer ids (`-1` = unknown).
    pub fn from_ids(width: usize, height: usize, ids: &[i32]) -> Result<Self> {
        Board::from_tiles(width, height, ids.iter().map(|&id| Tile::from_id(id)).collect())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    pub fn total(&self) -> usize {
        self.cells.len()
    }

    /// Number of unknown cells.
    pub fn invalid_count(&self) -> usize {
        self.invalid_count
    }

    /// `invalid_count / total`, or 1.0 for a board without cells.
    pub fn invalid_ratio(&self) -> f64 {
        if self.cells.is_empty() {
            1.0
        } else {
            self.invalid_count as f64 / self.cells.len() as f64
        }
    }

    pub fn in_bounds(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Returns the tile at column `x`, row `y`.
    ///
    /// # Panics
    /// Panics if `(x, y)` is outside the board.
    pub fn get(&self, x: usize, y: usize) -> Tile {
        assert!(x < self.width && y < self.height, "cell ({}, {}) out of bounds", x, y);
        self.cells[y * self.width + x]
    }

    /// Sets the tile at column `x`, row `y`, keeping `invalid_count` exact.
    ///
    /// # Panics
    /// Panics if `(x, y)` is outside the board.
    pub fn set(&mut self, x: usize, y: usize, tile: Tile) {
        assert!(x < self.width && y < self.height, "cell ({}, {}) out of bounds", x, y);
        let slot = &mut self.cells[y * self.width + x];
        match (slot.is_known(), tile.is_known()) {
            (true, false) => self.invalid_count += 1,
            (false, true) => self.invalid_count -= 1,
            _ => {}
        }
        *slot = tile;
    }

    /// Exchanges two cells. The unknown count cannot change.
    pub fn swap(&mut self, a: (usize, usize), b: (usize, usize)) {
        assert!(a.0 < self.width && a.1 < self.height, "cell {:?} out of bounds", a);
        assert!(b.0 < self.width && b.1 < self.height, "cell {:?} out of bounds", b);
        self.cells.swap(a.1 * self.width + a.0, b.1 * self.width + b.0);
    }

    /// The in-bounds neighbour of `(x, y)` in direction `(dx, dy)`, if any.
    pub fn neighbour(&self, x: usize, y: usize, dx: isize, dy: isize) -> Option<(usize, usize)> {
        let nx = x as isize + dx;
        let ny = y as isize + dy;
        if self.in_bounds(nx, ny) {
            Some((nx as usize, ny as usize))
        } else {
            None
        }
    }

    /// Iterates over all cells as `((x, y), tile)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = ((usize, usize), Tile)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &tile)| ((i % width, i / width), tile))
    }

    /// How many times each known tile kind occurs on the board.
    pub fn kind_histogram(&self) -> HashMap<u8, u32> {
        let mut histogram = HashMap::new();
        for tile in &self.cells {
            if let Tile::Kind(kind) = tile {
                *histogram.entry(*kind).or_insert(0) += 1;
            }
        }
        histogram
    }

    /// Renders the board with column/row numbers and ANSI colours, marking
    /// `pos` (an `(x, y)` cell) if given.
    pub fn to_string_with_highlight(&self, pos: Option<(usize, usize)>) -> String {
        let mut output = String::new();

        output.push_str("  ");
        for x in 0..self.width {
            output.push_str(&format!("{:<2}", x));
        }
        output.push('\n');

        for y in 0..self.height {
            output.push_str(&format!("{:<2}", y));
            for x in 0..self.width {
                let tile = self.get(x, y);
                let mark = if pos == Some((x, y)) { '*' } else { ' ' };
                output.push_str(&format!(
                    "\x1b[1;{};m{}{}\x1b[m",
                    tile.to_ansi_color_code(),
                    tile.to_char(),
                    mark
                ));
            }
            if y + 1 < self.height {
                output.push('\n');
            }
        }

        output
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_highlight(None))
    }
}

/// One recognizer output: the board and the pixel size of its source image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub board: Board,
    pub image: Size,
}

impl Frame {
    pub fn new(board: Board, image: Size) -> Self {
        Frame { board, image }
    }
}
