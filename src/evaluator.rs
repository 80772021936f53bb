//! Evaluator trait for position evaluation.
//!
//! The evaluator provides the prior over moves and a value estimate for a
//! position. In a trained agent this is a neural network; the uniform
//! evaluator below is enough to exercise the search without a model.

use crate::{game_state::Position, MCTSError, Result};

/// Result of evaluating a position
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Relative, non-negative weights over the move-index space, pass included
    pub probabilities: Vec<f64>,

    /// Value estimate from Black's perspective, in `[-1, 1]`
    pub value: f64,
}

impl Evaluation {
    /// Creates an evaluation from its parts
    pub fn new(probabilities: Vec<f64>, value: f64) -> Self {
        Evaluation {
            probabilities,
            value,
        }
    }

    /// Uniform prior over `action_space` moves with the given value
    pub fn uniform(action_space: usize, value: f64) -> Self {
        let p = 1.0 / action_space.max(1) as f64;
        Evaluation::new(vec![p; action_space], value)
    }
}

/// Trait for policy/value evaluators
///
/// The search calls [`Evaluator::evaluate`] exactly once for every
/// non-terminal leaf it reaches.
pub trait Evaluator<P: Position> {
    /// Evaluates a single position
    fn evaluate(&self, position: &P) -> Result<Evaluation>;
}

/// Evaluator assigning equal probability to every move and a fixed value
#[derive(Debug, Clone, Default)]
pub struct UniformEvaluator {
    value: f64,
}

impl UniformEvaluator {
    /// Creates a uniform evaluator that reports a neutral value
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a uniform evaluator that reports the given value
    pub fn with_value(value: f64) -> Result<Self> {
        if !(-1.0..=1.0).contains(&value) {
            return Err(MCTSError::Evaluation(format!(
                "value {} outside [-1, 1]",
                value
            )));
        }
        Ok(UniformEvaluator { value })
    }
}

impl<P: Position> Evaluator<P> for UniformEvaluator {
    fn evaluate(&self, position: &P) -> Result<Evaluation> {
        Ok(Evaluation::uniform(position.action_space(), self.value))
    }
}
