//! # Tile Hinter Library
//!
//! Move discovery and autoplay for grid-based tile-matching puzzles. Each
//! captured frame arrives as a classified [`engine::Board`]; the hinter ranks
//! the swaps that would complete a run, and the autoplay controller turns the
//! ranking into pointer clicks, spreading a move over two frames when it
//! commits to the best one.
//!
//! It is used by two binaries:
//! - `hint_board`: prints the ranked hints for a board read from a text file.
//! - `autoplay_replay`: feeds a sequence of board files through a session
//!   with a dry-run pointer and prints what autoplay would click.
//!
//! ## Modules
//! - `engine`: tiles, the board snapshot and frames.
//! - `geometry`: points, rectangles and the grid-to-pixel mapping.
//! - `hinter`: swap search, exploratory fallback and ranking.
//! - `autoplay`: the per-frame click decision state machine.
//! - `overlay`: draw instructions for the guidance overlay.
//! - `session`: wires a frame through all of the above.
//! - `config`: persistable settings.
//! - `utils`: parsing boards from text.

pub mod autoplay;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod hinter;
pub mod overlay;
pub mod session;
pub mod utils;

pub use error::{Error, Result};
