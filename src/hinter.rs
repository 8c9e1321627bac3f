//! Move discovery: turns a classified `Board` into a ranked list of hints.
//!
//! The primary search tries every swap of a known cell with each of its four
//! neighbours and keeps the ones that line up at least `min_match` equal
//! tiles. When that finds nothing (or, now and then, only a single move) a
//! fallback looks at the unknown cells next to known ones, weighting each
//! candidate by how common the neighbouring kind is on the board.
use crate::engine::{Board, Tile, DIRECTIONS};
use crate::geometry::{CellMapper, Point, Size};
use rand::Rng;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::trace;

/// Tunable constants of the search heuristics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HintConfig {
    /// Shortest run a swap must produce to become a hint.
    pub min_match: u32,
    /// With exactly one swap found, the fallback also runs with probability
    /// `1 / panic_one_in`. Zero disables this.
    pub panic_one_in: u32,
    /// In highlight mode, once a hint above this count has been shown the
    /// list stops at the first hint at or below it.
    pub highlight_cutoff: u32,
}

impl Default for HintConfig {
    fn default() -> Self {
        HintConfig {
            min_match: 3,
            panic_one_in: 4,
            highlight_cutoff: 3,
        }
    }
}

/// Where a hint came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HintKind {
    /// A swap that completes a run; `count` is the run length.
    Swap,
    /// A step from an unknown cell toward a known one; `count` is the
    /// neighbour kind's frequency on the board.
    Explore,
}

/// A candidate move with its score and resolved image-space points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Hint {
    pub from_x: usize,
    pub from_y: usize,
    pub to_x: usize,
    pub to_y: usize,
    pub count: u32,
    pub point_from: Point,
    pub point_to: Point,
    pub kind: HintKind,
}

impl Hint {
    fn new(
        kind: HintKind,
        from: (usize, usize),
        to: (usize, usize),
        count: u32,
        mapper: &CellMapper,
    ) -> Self {
        Hint {
            from_x: from.0,
            from_y: from.1,
            to_x: to.0,
            to_y: to.1,
            count,
            point_from: mapper.cell_center(from.0, from.1),
            point_to: mapper.cell_center(to.0, to.1),
            kind,
        }
    }

    pub fn from(&self) -> (usize, usize) {
        (self.from_x, self.from_y)
    }

    pub fn to(&self) -> (usize, usize) {
        (self.to_x, self.to_y)
    }
}

/// Length of the longest run of equal tiles through `(x, y)`.
///
/// The vertical and horizontal runs are measured separately, each starting
/// at 1 for the cell itself, and the larger one is returned.
///
/// # Examples
/// ```
/// use tile_hinter::hinter::cross_count;
/// use tile_hinter::utils::board_from_str_array;
///
/// let board = board_from_str_array(&["1000", "2012", "3033"]).unwrap();
/// assert_eq!(cross_count(&board, 1, 0), 3);
/// assert_eq!(cross_count(&board, 1, 1), 3);
/// assert_eq!(cross_count(&board, 3, 2), 2);
/// ```
pub fn cross_count(board: &Board, x: usize, y: usize) -> u32 {
    let value = board.get(x, y);

    let mut v_count = 1;
    let mut step = y;
    while step > 0 && board.get(x, step - 1) == value {
        v_count += 1;
        step -= 1;
    }
    step = y + 1;
    while step < board.height() && board.get(x, step) == value {
        v_count += 1;
        step += 1;
    }

    let mut h_count = 1;
    step = x + 1;
    while step < board.width() && board.get(step, y) == value {
        h_count += 1;
        step += 1;
    }
    step = x;
    while step > 0 && board.get(step - 1, y) == value {
        h_count += 1;
        step -= 1;
    }

    v_count.max(h_count)
}

/// Trial-swaps `(x, y)` with its neighbour in direction `(dx, dy)` and
/// reports the swap if the moved tile ends up in a run of at least
/// `min_match`. The board is restored before returning.
pub fn try_swap(
    board: &mut Board,
    mapper: &CellMapper,
    min_match: u32,
    x: usize,
    y: usize,
    dx: isize,
    dy: isize,
) -> Option<Hint> {
    let to = board.neighbour(x, y, dx, dy)?;
    board.swap((x, y), to);
    let count = cross_count(board, to.0, to.1);
    board.swap((x, y), to);

    (count >= min_match).then(|| Hint::new(HintKind::Swap, (x, y), to, count, mapper))
}

/// Looks from the unknown cell `(x, y)` toward its neighbour in direction
/// `(dx, dy)`; yields a hint only if that neighbour is known.
pub fn try_eat(
    board: &Board,
    histogram: &HashMap<u8, u32>,
    mapper: &CellMapper,
    x: usize,
    y: usize,
    dx: isize,
    dy: isize,
) -> Option<Hint> {
    let to = board.neighbour(x, y, dx, dy)?;
    match board.get(to.0, to.1) {
        Tile::Kind(kind) => {
            let count = histogram.get(&kind).copied().unwrap_or(0);
            Some(Hint::new(HintKind::Explore, (x, y), to, count, mapper))
        }
        Tile::Unknown => None,
    }
}

/// Higher counts first; on equal counts the hint starting lower on the board.
pub fn hint_order(a: &Hint, b: &Hint) -> Ordering {
    b.count.cmp(&a.count).then_with(|| b.from_y.cmp(&a.from_y))
}

pub fn rank_hints(hints: &mut [Hint]) {
    hints.sort_by(hint_order);
}

/// How many ranked hints highlight mode shows.
fn highlight_len(ranked: &[Hint], cutoff: u32) -> usize {
    let mut got_more = false;
    for (i, hint) in ranked.iter().enumerate() {
        if hint.count > cutoff {
            got_more = true;
        } else if got_more {
            return i;
        }
    }
    ranked.len()
}

/// The outcome of one hint search.
///
/// `ranked()` is always the complete ranked list; `displayed()` is the
/// prefix that should be drawn (and acted upon) for the requested mode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hints {
    ranked: Vec<Hint>,
    shown: usize,
    used_fallback: bool,
}

impl Hints {
    pub fn ranked(&self) -> &[Hint] {
        &self.ranked
    }

    pub fn displayed(&self) -> &[Hint] {
        &self.ranked[..self.shown]
    }

    pub fn best(&self) -> Option<&Hint> {
        self.ranked.first()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    /// Whether the exploratory fallback contributed to this list.
    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }
}

/// Finds and ranks candidate moves on a board.
#[derive(Clone, Debug, Default)]
pub struct HintEngine {
    config: HintConfig,
}

impl HintEngine {
    pub fn new(config: HintConfig) -> Self {
        HintEngine { config }
    }

    /// Runs the full search on `board`, whose source image is `image` pixels.
    ///
    /// `rng` only decides whether a lone swap also triggers the fallback.
    /// The input board is never modified; swaps are tried on a scratch copy.
    ///
    /// # Examples
    /// ```
    /// use rand::rngs::mock::StepRng;
    /// use tile_hinter::geometry::{Point, Size};
    /// use tile_hinter::hinter::HintEngine;
    /// use tile_hinter::utils::board_from_str_array;
    ///
    /// let board = board_from_str_array(&["0010"]).unwrap();
    /// let mut rng = StepRng::new(0, 0);
    /// let hints = HintEngine::default().process(&board, Size::new(40, 10), false, &mut rng);
    /// let best = hints.best().unwrap();
    /// assert_eq!((best.from(), best.to(), best.count), ((3, 0), (2, 0), 3));
    /// assert_eq!((best.point_from, best.point_to), (Point::new(35, 5), Point::new(25, 5)));
    /// ```
    pub fn process<R: Rng + ?Sized>(
        &self,
        board: &Board,
        image: Size,
        highlight: bool,
        rng: &mut R,
    ) -> Hints {
        let mapper = CellMapper::new(board.width(), board.height(), image);

        let mut ranked = self.find_swaps(board, &mapper);
        let swaps = ranked.len();
        let used_fallback = self.should_panic(swaps, rng);
        if used_fallback {
            ranked.extend(find_explores(board, &mapper));
        }
        rank_hints(&mut ranked);

        let shown = if highlight {
            highlight_len(&ranked, self.config.highlight_cutoff)
        } else {
            ranked.len()
        };
        trace!(
            swaps,
            explores = ranked.len() - swaps,
            shown,
            "hint search finished"
        );

        Hints {
            ranked,
            shown,
            used_fallback,
        }
    }

    /// Every swap that produces a run of `min_match` or more, in scan order.
    /// A pair that works from both sides is reported once per side.
    pub fn find_swaps(&self, board: &Board, mapper: &CellMapper) -> Vec<Hint> {
        let mut scratch = board.clone();
        let mut results = Vec::new();
        for y in 0..board.height() {
            for x in 0..board.width() {
                if !board.get(x, y).is_known() {
                    continue;
                }
                for &(dx, dy) in &DIRECTIONS {
                    if let Some(hint) =
                        try_swap(&mut scratch, mapper, self.config.min_match, x, y, dx, dy)
                    {
                        results.push(hint);
                    }
                }
            }
        }
        results
    }

    fn should_panic<R: Rng + ?Sized>(&self, swaps: usize, rng: &mut R) -> bool {
        match swaps {
            0 => true,
            1 if self.config.panic_one_in > 0 => rng.gen_ratio(1, self.config.panic_one_in),
            _ => false,
        }
    }
}

/// Exploratory hints from every unknown cell toward each known neighbour.
pub fn find_explores(board: &Board, mapper: &CellMapper) -> Vec<Hint> {
    let histogram = board.kind_histogram();
    let mut results = Vec::new();
    for ((x, y), tile) in board.cells() {
        if tile.is_known() {
            continue;
        }
        for &(dx, dy) in &DIRECTIONS {
            if let Some(hint) = try_eat(board, &histogram, mapper, x, y, dx, dy) {
                results.push(hint);
            }
        }
    }
    results
}
