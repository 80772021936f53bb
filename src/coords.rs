//! Conversions between flattened move indices and board notation
//!
//! Only diagnostics use these conversions. Human coordinates follow the GTP
//! convention: columns are letters skipping `I`, rows count from 1 at the
//! bottom of the board, and the pass move prints as `pass`.

use crate::{MCTSError, Result};

const COLUMNS: &str = "ABCDEFGHJKLMNOPQRSTUVWXYZ";

/// Coordinate mapping for a square board of a given size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coords {
    board_size: usize,
}

impl Coords {
    /// Creates the mapping for a `board_size` x `board_size` board
    pub fn new(board_size: usize) -> Self {
        Coords { board_size }
    }

    /// Side length of the board
    pub fn board_size(&self) -> usize {
        self.board_size
    }

    /// Index of the pass move
    pub fn pass_move(&self) -> usize {
        self.board_size * self.board_size
    }

    /// Converts `(row, col)` to a flattened move index
    pub fn flatten(&self, row: usize, col: usize) -> usize {
        row * self.board_size + col
    }

    /// Converts a flattened index back to `(row, col)`, `None` for a pass
    pub fn unflatten(&self, mv: usize) -> Option<(usize, usize)> {
        if mv >= self.pass_move() {
            return None;
        }
        Some((mv / self.board_size, mv % self.board_size))
    }

    /// Human-readable name of a move, e.g. `D4` or `pass`
    pub fn to_human(&self, mv: usize) -> String {
        match self.unflatten(mv) {
            None => "pass".to_string(),
            Some((row, col)) => {
                let letter = COLUMNS.as_bytes().get(col).map(|&b| b as char).unwrap_or('?');
                format!("{}{}", letter, self.board_size - row)
            }
        }
    }

    /// Parses a human-readable move back to its flattened index
    pub fn from_human(&self, text: &str) -> Result<usize> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("pass") {
            return Ok(self.pass_move());
        }

        let invalid = || MCTSError::InvalidCoordinate(text.to_string());
        let mut chars = text.chars();
        let letter = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
        let col = COLUMNS.find(letter).ok_or_else(invalid)?;
        let number: usize = chars.as_str().parse().map_err(|_| invalid())?;

        if col >= self.board_size || number == 0 || number > self.board_size {
            return Err(invalid());
        }
        Ok(self.flatten(self.board_size - number, col))
    }
}
