//! Configuration options for the PUCT search
//!
//! This module defines the constants and budgets that control the
//! behavior of the search tree and the search driver.

use std::time::Duration;

use crate::{MCTSError, Result};

/// Board area the Dirichlet alpha reference value is calibrated for (19x19)
pub const REFERENCE_BOARD_AREA: usize = 361;

/// Configuration for the PUCT search
///
/// Use the builder methods to create a customized configuration.
///
/// # Example
///
/// ```
/// use puct_mcts::MCTSConfig;
/// use std::time::Duration;
///
/// let config = MCTSConfig::default()
///     .with_exploration_constant(1.5)
///     .with_num_simulations(1_600)
///     .with_max_time(Duration::from_secs(5))
///     .with_seed(42);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct MCTSConfig {
    /// Exploration constant `C` of the PUCT bonus
    ///
    /// Higher values push the search toward moves with a high prior
    /// and few visits.
    pub exploration_constant: f64,

    /// Amount subtracted from the prior of every illegal move
    ///
    /// Must be large enough that an illegal move can never outscore a
    /// legal one. See [`MCTSConfig::max_prior`].
    pub illegal_move_penalty: f64,

    /// Fraction of the shaped prior replaced by Dirichlet noise
    pub noise_weight: f64,

    /// Dirichlet concentration at a 19x19 board
    ///
    /// The concentration actually used scales inversely with board area.
    pub dirichlet_alpha_reference: f64,

    /// Power applied to visit counts when extracting a sharpened policy
    pub sharpening_exponent: i32,

    /// Number of simulations run by a single search
    pub num_simulations: usize,

    /// Maximum time to run a single search
    pub max_time: Option<Duration>,

    /// Seed for the driver's random source (noise and move sampling)
    pub seed: Option<u64>,

    /// Number of game moves during which the driver samples its move
    /// from the visit distribution instead of taking the most visited one
    pub temperature_moves: usize,

    /// Whether the driver mixes Dirichlet noise into the root prior
    pub inject_root_noise: bool,

    /// Maximum number of rows printed by `describe`
    pub describe_limit: usize,
}

impl Default for MCTSConfig {
    fn default() -> Self {
        MCTSConfig {
            exploration_constant: 1.38,
            illegal_move_penalty: 10.0,
            noise_weight: 0.25,
            dirichlet_alpha_reference: 0.03,
            sharpening_exponent: 8,
            num_simulations: 800,
            max_time: None,
            seed: None,
            temperature_moves: 30,
            inject_root_noise: true,
            describe_limit: 15,
        }
    }
}

impl MCTSConfig {
    /// Sets the exploration constant
    pub fn with_exploration_constant(mut self, constant: f64) -> Self {
        self.exploration_constant = constant;
        self
    }

    /// Sets the illegal move penalty
    pub fn with_illegal_move_penalty(mut self, penalty: f64) -> Self {
        self.illegal_move_penalty = penalty;
        self
    }

    /// Sets the noise mixing weight
    pub fn with_noise_weight(mut self, weight: f64) -> Self {
        self.noise_weight = weight;
        self
    }

    /// Sets the Dirichlet alpha used at 19x19
    pub fn with_dirichlet_alpha_reference(mut self, alpha: f64) -> Self {
        self.dirichlet_alpha_reference = alpha;
        self
    }

    /// Sets the sharpening exponent
    pub fn with_sharpening_exponent(mut self, exponent: i32) -> Self {
        self.sharpening_exponent = exponent;
        self
    }

    /// Sets the number of simulations per search
    pub fn with_num_simulations(mut self, simulations: usize) -> Self {
        self.num_simulations = simulations;
        self
    }

    /// Sets the maximum time to run a search
    pub fn with_max_time(mut self, duration: Duration) -> Self {
        self.max_time = Some(duration);
        self
    }

    /// Sets the seed of the random source
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the number of moves played by sampling
    pub fn with_temperature_moves(mut self, moves: usize) -> Self {
        self.temperature_moves = moves;
        self
    }

    /// Enables or disables root noise in the driver
    pub fn with_root_noise(mut self, enabled: bool) -> Self {
        self.inject_root_noise = enabled;
        self
    }

    /// Sets the number of rows printed by `describe`
    pub fn with_describe_limit(mut self, limit: usize) -> Self {
        self.describe_limit = limit;
        self
    }

    /// Dirichlet concentration for a board of the given area
    ///
    /// Keeps the total noise mass roughly constant across board sizes.
    pub fn dirichlet_alpha(&self, board_area: usize) -> f64 {
        self.dirichlet_alpha_reference * REFERENCE_BOARD_AREA as f64 / board_area.max(1) as f64
    }

    /// Largest raw move probability for which an illegal move stays unselectable
    ///
    /// An illegal move is never visited, so its bonus is
    /// `C * sqrt(max(1, N)) * shaped_prior`. Its score loses to any legal move
    /// when the bonus is below `-2` (child values live in `[-1, 1]`), even after
    /// noise of weight `w` added the largest possible sample of 1:
    ///
    /// ```text
    /// C * ((1 - w) * (K - p) - w) > 2   <=>   p < K - (2 / C + w) / (1 - w)
    /// ```
    pub fn max_prior(&self) -> f64 {
        let w = self.noise_weight;
        self.illegal_move_penalty - (2.0 / self.exploration_constant + w) / (1.0 - w)
    }

    /// Checks that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if !(self.exploration_constant > 0.0) {
            return Err(MCTSError::InvalidConfiguration(format!(
                "exploration constant must be positive, got {}",
                self.exploration_constant
            )));
        }
        if !(0.0..1.0).contains(&self.noise_weight) {
            return Err(MCTSError::InvalidConfiguration(format!(
                "noise weight must be in [0, 1), got {}",
                self.noise_weight
            )));
        }
        if !(self.dirichlet_alpha_reference > 0.0) {
            return Err(MCTSError::InvalidConfiguration(format!(
                "dirichlet alpha must be positive, got {}",
                self.dirichlet_alpha_reference
            )));
        }
        if self.sharpening_exponent < 1 {
            return Err(MCTSError::InvalidConfiguration(format!(
                "sharpening exponent must be at least 1, got {}",
                self.sharpening_exponent
            )));
        }
        if self.max_prior() < 1.0 {
            return Err(MCTSError::InvalidConfiguration(format!(
                "illegal move penalty {} does not dominate the exploration bonus",
                self.illegal_move_penalty
            )));
        }
        Ok(())
    }
}
