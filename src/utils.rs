use crate::engine::{Board, Tile};
use crate::error::{Error, Result};

/// Parses one character of a board row into a tile.
///
/// `0`-`9` and `a`-`z` are tile kinds 0..=35; `?` and `.` are unknown cells.
fn tile_from_char(ch: char) -> Option<Tile> {
    match ch {
        '?' | '.' => Some(Tile::Unknown),
        _ => ch
            .to_digit(36)
            .filter(|_| !ch.is_ascii_uppercase())
            .map(|kind| Tile::Kind(kind as u8)),
    }
}

/// Parses an array of string slices into a `Board`.
///
/// Each string slice is one row, starting from row 0 at the top. The board
/// width is the length of the first row and every row must match it.
///
/// # Returns
/// * `Ok(Board)` if parsing is successful.
/// * `Err(Error::Dimensions)` if there are no rows or the first row is empty.
/// * `Err(Error::Parse)` if a row has the wrong length or contains a
///   character other than `0-9`, `a-z`, `?` or `.`.
///
/// # Examples
/// ```
/// use tile_hinter::utils::board_from_str_array;
/// use tile_hinter::engine::Tile;
///
/// let board = board_from_str_array(&["01?", "2.3"]).unwrap();
/// assert_eq!(board.width(), 3);
/// assert_eq!(board.height(), 2);
/// assert_eq!(board.get(2, 0), Tile::Unknown);
/// assert_eq!(board.get(2, 1), Tile::Kind(3));
/// assert_eq!(board.invalid_count(), 2);
///
/// assert!(board_from_str_array(&["01", "0"]).is_err());
/// assert!(board_from_str_array(&["0X"]).is_err());
/// ```
pub fn board_from_str_array(s: &[&str]) -> Result<Board> {
    let width = s.first().map_or(0, |row| row.chars().count());
    if width == 0 {
        return Err(Error::Dimensions("board text has no cells".to_string()));
    }

    let mut cells = Vec::with_capacity(width * s.len());
    for (y, row) in s.iter().enumerate() {
        let row_len = row.chars().count();
        if row_len != width {
            return Err(Error::Parse {
                line: y + 1,
                column: row_len.min(width) + 1,
                message: format!("row has {} cells, expected {}", row_len, width),
            });
        }
        for (x, ch) in row.chars().enumerate() {
            let tile = tile_from_char(ch).ok_or_else(|| Error::Parse {
                line: y + 1,
                column: x + 1,
                message: format!("unrecognized character '{}'", ch),
            })?;
            cells.push(tile);
        }
    }

    Board::from_tiles(width, s.len(), cells)
}

/// Parses a whole board file: rows are trimmed and blank lines skipped.
pub fn board_from_text(text: &str) -> Result<Board> {
    let rows: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    board_from_str_array(&rows)
}
