//! Error type shared by the fallible parts of the crate.
//!
//! The hinting and autoplay logic itself never fails; only building boards
//! from text or values and loading settings can.

use std::io;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("line {line} col {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("bad board dimensions: {0}")]
    Dimensions(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("settings json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid setting: {0}")]
    InvalidSetting(String),
}

pub type Result<T> = std::result::Result<T, Error>;
