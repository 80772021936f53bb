//! Statistics collection for PUCT searches
//!
//! This module provides structures for collecting and reporting statistics
//! about a search run by the driver.

use std::time::Duration;

/// Statistics collected during a search
#[derive(Debug, Clone)]
pub struct SearchStatistics {
    /// Number of simulations performed
    pub simulations: usize,

    /// Number of evaluator calls
    pub evaluations: usize,

    /// Number of simulations that ended on a finished game
    pub terminal_leaves: usize,

    /// Total time spent searching
    pub total_time: Duration,

    /// Total number of nodes in the tree
    pub tree_size: usize,

    /// Maximum depth of a selected leaf below the root
    pub max_depth: usize,

    /// Whether the search was stopped early due to time constraints
    pub stopped_early: bool,
}

impl SearchStatistics {
    /// Creates a new, empty statistics object
    pub fn new() -> Self {
        SearchStatistics {
            simulations: 0,
            evaluations: 0,
            terminal_leaves: 0,
            total_time: Duration::from_secs(0),
            tree_size: 1, // Start with root node
            max_depth: 0,
            stopped_early: false,
        }
    }

    /// Returns the average time per simulation in microseconds
    pub fn avg_time_per_simulation_us(&self) -> f64 {
        if self.simulations == 0 {
            return 0.0;
        }
        self.total_time.as_micros() as f64 / self.simulations as f64
    }

    /// Returns the number of simulations per second
    pub fn simulations_per_second(&self) -> f64 {
        if self.total_time.as_secs_f64() <= 0.0 {
            return 0.0;
        }
        self.simulations as f64 / self.total_time.as_secs_f64()
    }

    /// Returns the number of evaluator calls per second
    pub fn evaluations_per_second(&self) -> f64 {
        if self.total_time.as_secs_f64() <= 0.0 {
            return 0.0;
        }
        self.evaluations as f64 / self.total_time.as_secs_f64()
    }

    /// Share of simulations that ended on a finished game instead of an
    /// evaluator call
    pub fn terminal_leaf_ratio(&self) -> f64 {
        if self.simulations == 0 {
            return 0.0;
        }
        self.terminal_leaves as f64 / self.simulations as f64
    }

    /// Returns a summary of the statistics as a string
    pub fn summary(&self) -> String {
        format!(
            "PUCT Search Statistics:\n\
             - Simulations: {}\n\
             - Evaluations: {} ({:.1}/s)\n\
             - Terminal leaves: {} ({:.1}% of simulations)\n\
             - Total time: {:.3} seconds\n\
             - Tree size: {} nodes\n\
             - Max depth: {}\n\
             - Avg time per simulation: {:.3} µs\n\
             - Simulations per second: {:.1}\n\
             - Stopped early: {}",
            self.simulations,
            self.evaluations,
            self.evaluations_per_second(),
            self.terminal_leaves,
            self.terminal_leaf_ratio() * 100.0,
            self.total_time.as_secs_f64(),
            self.tree_size,
            self.max_depth,
            self.avg_time_per_simulation_us(),
            self.simulations_per_second(),
            self.stopped_early
        )
    }
}

impl Default for SearchStatistics {
    fn default() -> Self {
        Self::new()
    }
}
