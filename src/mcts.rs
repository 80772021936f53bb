//! Search driver built on the PUCT tree
//!
//! [`MCTS`] runs simulations against an [`Evaluator`], picks a move from the
//! resulting visit counts, and re-roots the tree when a move is committed.

use std::time::Instant;

use log::{debug, trace};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    config::MCTSConfig,
    evaluator::Evaluator,
    game_state::Position,
    stats::SearchStatistics,
    tree::{MCTSNode, NodeId, Tree},
    utils::{argmax, sample_index},
    MCTSError, Result,
};

/// The search driver
///
/// Owns the tree, the evaluator and the random source used for root noise
/// and move sampling. Runs are reproducible when a seed is configured.
pub struct MCTS<P: Position, E: Evaluator<P>> {
    tree: Tree<P>,
    evaluator: E,
    config: MCTSConfig,
    statistics: SearchStatistics,
    rng: StdRng,
    root_noised: bool,
}

impl<P: Position, E: Evaluator<P>> MCTS<P, E> {
    /// Creates a driver searching from `position`
    pub fn new(position: P, evaluator: E, config: MCTSConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let tree = Tree::new(position, config.clone())?;

        Ok(MCTS {
            tree,
            evaluator,
            config,
            statistics: SearchStatistics::new(),
            rng,
            root_noised: false,
        })
    }

    /// Reseeds the random source
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// The search tree
    pub fn tree(&self) -> &Tree<P> {
        &self.tree
    }

    /// The current root node
    pub fn root(&self) -> &MCTSNode<P> {
        self.tree.get(self.tree.root())
    }

    /// The evaluator
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Returns the statistics of the last search
    pub fn get_statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Returns true if the game is over at the root
    pub fn is_game_over(&self) -> bool {
        self.root().is_terminal()
    }

    /// Runs one simulation and returns the leaf it ended on
    ///
    /// A finished game is scored by its outcome without calling the
    /// evaluator; any other leaf is evaluated once and incorporated.
    pub fn tree_search(&mut self) -> Result<NodeId> {
        let root = self.tree.root();
        let leaf = self.tree.select_leaf(root)?;
        self.statistics.max_depth = self.statistics.max_depth.max(self.tree.depth(leaf));

        let node = self.tree.get(leaf);
        if node.is_terminal() {
            let outcome = node.position().outcome_sign();
            trace!("terminal leaf {} scored {}", leaf.index(), outcome);
            self.tree.backup_value(leaf, outcome, Some(root));
            self.statistics.terminal_leaves += 1;
        } else {
            let evaluation = self.evaluator.evaluate(node.position())?;
            trace!("leaf {} evaluated at {:.3}", leaf.index(), evaluation.value);
            self.tree
                .incorporate_results(leaf, &evaluation.probabilities, evaluation.value, Some(root))?;
            self.statistics.evaluations += 1;
        }

        self.statistics.simulations += 1;
        Ok(leaf)
    }

    /// Runs a full search and returns the chosen move
    ///
    /// The root is evaluated first if needed, then noise is mixed into its
    /// prior once (when enabled), then simulations run until the configured
    /// count or time budget is spent.
    pub fn search(&mut self) -> Result<usize> {
        self.statistics = SearchStatistics::new();
        let start_time = Instant::now();

        let root = self.tree.root();
        if self.tree.get(root).is_terminal() {
            return Err(MCTSError::NoLegalActions);
        }

        if self.tree.get(root).visit_count() == 0 {
            self.tree_search()?;
        }
        if self.config.inject_root_noise && !self.root_noised {
            self.tree.inject_noise(root, &mut self.rng)?;
            self.root_noised = true;
        }

        while self.statistics.simulations < self.config.num_simulations {
            if let Some(max_duration) = self.config.max_time {
                if start_time.elapsed() >= max_duration {
                    self.statistics.stopped_early = true;
                    debug!(
                        "search stopped after {} simulations due to time limit",
                        self.statistics.simulations
                    );
                    break;
                }
            }
            self.tree_search()?;
        }

        self.statistics.total_time = start_time.elapsed();
        self.statistics.tree_size = self.tree.len();
        debug!("{}", self.statistics.summary());

        self.pick_move()
    }

    /// Chooses a move from the root's visit counts
    ///
    /// Early in the game the move is sampled in proportion to visits; after
    /// the configured number of moves the most visited move is taken.
    pub fn pick_move(&mut self) -> Result<usize> {
        let root = self.tree.root();
        let move_number = self.tree.get(root).position().recent_moves().len();

        if move_number < self.config.temperature_moves {
            let pi = self.tree.children_as_pi(root, false)?;
            sample_index(&pi, &mut self.rng).ok_or(MCTSError::NoVisits)
        } else {
            let counts: Vec<f64> = self
                .tree
                .get(root)
                .child_visit_count()
                .iter()
                .map(|&n| n as f64)
                .collect();
            if counts.iter().all(|&n| n == 0.0) {
                return Err(MCTSError::NoVisits);
            }
            argmax(&counts).ok_or(MCTSError::NoVisits)
        }
    }

    /// Commits `mv`, making its child the new root
    pub fn play_move(&mut self, mv: usize) -> Result<()> {
        let root = self.tree.reroot(mv)?;
        self.root_noised = false;
        debug!(
            "played move {}, new root has {} visits",
            mv,
            self.tree.get(root).visit_count()
        );
        Ok(())
    }

    /// Visit distribution at the root, optionally sharpened
    pub fn root_policy(&self, sharpen: bool) -> Result<Vec<f64>> {
        self.tree.children_as_pi(self.tree.root(), sharpen)
    }

    /// Statistics table of the root
    pub fn describe(&self) -> String {
        self.tree.describe(self.tree.root())
    }
}
