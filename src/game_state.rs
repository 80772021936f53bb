//! Traits defining the board position seen by the search.
//!
//! The [`Position`] trait is the interface a rules engine implements so the
//! search tree can expand moves, mask illegal ones and score finished games.
//! Moves are flattened board coordinates `row * board_size + col`, with the
//! extra index `board_size * board_size` standing for a pass.

use std::fmt::Debug;

use crate::Result;

/// The two players of the game
///
/// Black is the maximizing player: values are always stored from Black's
/// point of view, `+1` meaning a Black win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// Maximizing player, moves first
    Black,
    /// Minimizing player
    White,
}

impl Color {
    /// Perspective sign of this player: `+1` for Black, `-1` for White
    pub fn sign(self) -> f64 {
        match self {
            Color::Black => 1.0,
            Color::White => -1.0,
        }
    }

    /// The other player
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

/// Trait defining the rules engine interface required by the search
///
/// Implementations are immutable snapshots: [`Position::apply_move`] must
/// leave `self` untouched and return the successor position.
pub trait Position: Clone + Debug {
    /// Side length of the square board
    fn board_size(&self) -> usize;

    /// Applies a move, returning the resulting position
    ///
    /// Illegal moves must fail with [`MCTSError::IllegalMove`](crate::MCTSError::IllegalMove).
    /// The search never recovers from this error.
    fn apply_move(&self, mv: usize) -> Result<Self>;

    /// Returns true if the game is over
    fn is_terminal(&self) -> bool;

    /// Final score from Black's perspective, positive for a Black win
    ///
    /// Only meaningful when [`Position::is_terminal`] holds.
    fn score(&self) -> f64;

    /// Legality of every move index, pass included
    ///
    /// The returned vector has length `board_size^2 + 1`.
    fn legal_moves(&self) -> Vec<bool>;

    /// Player to move
    fn to_play(&self) -> Color;

    /// Moves played so far, oldest first
    fn recent_moves(&self) -> &[usize];

    /// Authoritative game outcome: `+1` if Black won, `-1` otherwise
    fn outcome_sign(&self) -> f64 {
        if self.score() > 0.0 {
            1.0
        } else {
            -1.0
        }
    }

    /// Number of board points
    fn board_area(&self) -> usize {
        self.board_size() * self.board_size()
    }

    /// Index of the pass move
    fn pass_move(&self) -> usize {
        self.board_area()
    }

    /// Size of the move-index space, pass included
    fn action_space(&self) -> usize {
        self.board_area() + 1
    }

    /// Returns true if the last move played was a pass
    fn last_move_was_pass(&self) -> bool {
        self.recent_moves().last() == Some(&self.pass_move())
    }
}
