//! # puct-mcts
//!
//! The move-selection core of a two-player board game agent: a Monte Carlo
//! Tree Search guided by a policy/value evaluator, using the PUCT selection
//! rule.
//!
//! ## Features
//!
//! - Arena-backed search tree with per-move child statistics
//! - PUCT selection with hard masking of illegal moves
//! - Lazy, idempotent expansion and iterative value backup
//! - Dirichlet exploration noise from an injectable random source
//! - Visit-count policies, optionally sharpened
//! - Diagnostic tables and principal variations
//!
//! ## Basic Usage
//!
//! ```
//! use puct_mcts::{Color, MCTSConfig, MCTSError, Position, Tree};
//!
//! // A one-point board where the game ends once both players passed.
//! #[derive(Clone, Debug)]
//! struct Tiny {
//!     moves: Vec<usize>,
//! }
//!
//! impl Position for Tiny {
//!     fn board_size(&self) -> usize { 1 }
//!
//!     fn apply_move(&self, mv: usize) -> puct_mcts::Result<Self> {
//!         if !self.legal_moves()[mv] {
//!             return Err(MCTSError::IllegalMove { mv, reason: "occupied".into() });
//!         }
//!         let mut moves = self.moves.clone();
//!         moves.push(mv);
//!         Ok(Tiny { moves })
//!     }
//!
//!     fn is_terminal(&self) -> bool { self.moves.ends_with(&[1, 1]) }
//!
//!     fn score(&self) -> f64 { if self.moves.contains(&0) { 1.0 } else { -1.0 } }
//!
//!     fn legal_moves(&self) -> Vec<bool> { vec![!self.moves.contains(&0), true] }
//!
//!     fn to_play(&self) -> Color {
//!         if self.moves.len() % 2 == 0 { Color::Black } else { Color::White }
//!     }
//!
//!     fn recent_moves(&self) -> &[usize] { &self.moves }
//! }
//!
//! fn main() -> puct_mcts::Result<()> {
//!     let mut tree = Tree::new(Tiny { moves: vec![] }, MCTSConfig::default())?;
//!     let root = tree.root();
//!
//!     // The first selection on an empty tree returns the root itself.
//!     let leaf = tree.select_leaf(root)?;
//!     assert_eq!(leaf, root);
//!     tree.incorporate_results(leaf, &[0.5, 0.5], 0.0, None)?;
//!
//!     for _ in 0..16 {
//!         let leaf = tree.select_leaf(root)?;
//!         tree.incorporate_results(leaf, &[0.5, 0.5], 0.0, None)?;
//!     }
//!
//!     let pi = tree.children_as_pi(root, false)?;
//!     assert!((pi.iter().sum::<f64>() - 1.0).abs() < 1e-9);
//!     println!("{}", tree.describe(root));
//!     Ok(())
//! }
//! ```
//!
//! ## How It Works
//!
//! Each simulation has three steps:
//!
//! 1. **Selection**: from the root, follow the move with the best
//!    `Q + sign * U` score until reaching a node never visited before or a
//!    finished game. A missing child is expanded on the spot.
//!
//! 2. **Evaluation**: the evaluator returns move probabilities and a value
//!    for the leaf. A finished game uses its real outcome instead.
//!
//! 3. **Backup**: the value is folded into the running mean of every node on
//!    the path to the root, and each node's statistics are copied into its
//!    parent's per-move arrays.
//!
//! Values are always stored from Black's point of view. The perspective sign
//! of the player to move only enters at selection time.
//!
//! The [`MCTS`] driver wraps these steps with a simulation budget, root
//! noise, move picking and tree reuse.

pub mod config;
pub mod coords;
mod describe;
pub mod evaluator;
pub mod game_state;
pub mod mcts;
pub mod stats;
pub mod tree;
pub mod utils;

pub use config::MCTSConfig;
pub use coords::Coords;
pub use evaluator::{Evaluation, Evaluator, UniformEvaluator};
pub use game_state::{Color, Position};
pub use mcts::MCTS;
pub use stats::SearchStatistics;
pub use tree::{MCTSNode, NodeId, Tree};

/// Error types for the PUCT search
///
/// Every variant reports a broken contract between the search and its
/// caller, rules engine or evaluator. None of them is retried.
#[derive(thiserror::Error, Debug)]
pub enum MCTSError {
    /// The evaluator returned a prior of the wrong length
    #[error("Prior has {actual} entries, expected {expected}")]
    PriorLengthMismatch {
        /// Size of the move-index space
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// A prior entry is negative, non-finite, or too large to mask
    #[error("Invalid prior {value} for move {mv}")]
    InvalidPrior {
        /// Move index of the offending entry
        mv: usize,
        /// The offending value
        value: f64,
    },

    /// The rules engine returned a legality mask of the wrong length
    #[error("Legal move mask has {actual} entries, expected {expected}")]
    LegalMaskMismatch {
        /// Size of the move-index space
        expected: usize,
        /// Length that was returned
        actual: usize,
    },

    /// The rules engine refused a move
    #[error("Illegal move {mv}: {reason}")]
    IllegalMove {
        /// Move index that was refused
        mv: usize,
        /// Explanation from the rules engine
        reason: String,
    },

    /// A policy was requested from a node whose children were never visited
    #[error("No child visits to build a policy from")]
    NoVisits,

    /// No move can be chosen from the current state
    #[error("No legal actions available from current state")]
    NoLegalActions,

    /// Expansion was requested below a finished game
    #[error("Cannot expand a terminal position")]
    TerminalNode,

    /// The evaluator failed or returned an unusable value
    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    /// A move could not be parsed from board notation
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The Dirichlet noise could not be sampled
    #[error("Noise sampling failed: {0}")]
    Noise(String),
}

/// Result type for search operations
pub type Result<T> = std::result::Result<T, MCTSError>;
