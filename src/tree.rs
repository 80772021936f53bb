//! Tree data structures for the PUCT search
//!
//! Nodes live in an arena owned by [`Tree`] and refer to each other through
//! [`NodeId`] indices. Parent links are only used to walk upward during
//! backup; the tree alone owns every node.
//!
//! Every node keeps per-move copies of its children's visit counts and
//! value estimates so that all moves can be scored without touching the
//! child nodes. Those copies are written by [`Tree::backup_value`] only.

use std::collections::{BTreeMap, VecDeque};

use log::trace;
use rand::Rng;

use crate::{
    config::MCTSConfig,
    game_state::{Color, Position},
    utils::{argmax, argmin, dirichlet_sample, exploration_bonus, normalize},
    MCTSError, Result,
};

/// Index of a node in the tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node of the search tree
///
/// Each node holds the position reached by a sequence of moves, its own
/// visit statistics, and per-move statistics of its children.
#[derive(Debug, Clone)]
pub struct MCTSNode<P: Position> {
    position: P,
    originating_move: Option<usize>,
    parent: Option<NodeId>,
    children: BTreeMap<usize, NodeId>,

    visit_count: u32,
    value_estimate: f64,

    child_visit_count: Vec<u32>,
    child_value_estimate: Vec<f64>,
    original_prior: Vec<f64>,
    shaped_prior: Vec<f64>,
}

impl<P: Position> MCTSNode<P> {
    fn new(position: P, originating_move: Option<usize>, parent: Option<NodeId>) -> Self {
        let n = position.action_space();
        MCTSNode {
            position,
            originating_move,
            parent,
            children: BTreeMap::new(),
            visit_count: 0,
            value_estimate: 0.0,
            child_visit_count: vec![0; n],
            child_value_estimate: vec![0.0; n],
            original_prior: vec![0.0; n],
            shaped_prior: vec![0.0; n],
        }
    }

    /// The board position at this node
    pub fn position(&self) -> &P {
        &self.position
    }

    /// Move that produced this node (None for the root)
    pub fn originating_move(&self) -> Option<usize> {
        self.originating_move
    }

    /// Parent node (None for the root)
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Expanded children keyed by move index
    pub fn children(&self) -> &BTreeMap<usize, NodeId> {
        &self.children
    }

    /// Child reached by `mv`, if it has been expanded
    pub fn child(&self, mv: usize) -> Option<NodeId> {
        self.children.get(&mv).copied()
    }

    /// Number of backups that went through this node
    pub fn visit_count(&self) -> u32 {
        self.visit_count
    }

    /// Running mean of the values backed up through this node
    pub fn value_estimate(&self) -> f64 {
        self.value_estimate
    }

    /// Visit count of each child, zero for unexpanded moves
    pub fn child_visit_count(&self) -> &[u32] {
        &self.child_visit_count
    }

    /// Value estimate of each child
    ///
    /// Unvisited moves hold this node's own evaluation until first visited.
    pub fn child_value_estimate(&self) -> &[f64] {
        &self.child_value_estimate
    }

    /// Move probabilities exactly as returned by the evaluator
    pub fn original_prior(&self) -> &[f64] {
        &self.original_prior
    }

    /// Prior after the illegal-move penalty and any exploration noise
    pub fn shaped_prior(&self) -> &[f64] {
        &self.shaped_prior
    }

    /// Returns true if the game is over at this node
    pub fn is_terminal(&self) -> bool {
        self.position.is_terminal()
    }

    /// Returns true if no child has been expanded yet
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// `+1` when Black (the maximizing player) is to move, `-1` otherwise
    pub fn perspective_sign(&self) -> f64 {
        self.position.to_play().sign()
    }

    /// Value estimate seen from the player to move
    pub fn value_from_mover_perspective(&self) -> f64 {
        self.value_estimate * self.perspective_sign()
    }

    /// PUCT exploration bonus of every move
    pub fn exploration_bonus(&self, exploration_constant: f64) -> Vec<f64> {
        self.shaped_prior
            .iter()
            .zip(&self.child_visit_count)
            .map(|(&prior, &n)| {
                exploration_bonus(exploration_constant, self.visit_count, prior, n)
            })
            .collect()
    }

    /// Selection score of every move: `Q + sign * U`
    pub fn action_score(&self, exploration_constant: f64) -> Vec<f64> {
        let sign = self.perspective_sign();
        self.exploration_bonus(exploration_constant)
            .into_iter()
            .zip(&self.child_value_estimate)
            .map(|(u, &q)| q + sign * u)
            .collect()
    }
}

/// The search tree: an arena of nodes and the current root
#[derive(Debug, Clone)]
pub struct Tree<P: Position> {
    nodes: Vec<MCTSNode<P>>,
    root: NodeId,
    config: MCTSConfig,
    action_space: usize,
}

impl<P: Position> Tree<P> {
    /// Creates a tree holding a single unvisited root
    pub fn new(position: P, config: MCTSConfig) -> Result<Self> {
        config.validate()?;
        let action_space = position.action_space();
        Ok(Tree {
            nodes: vec![MCTSNode::new(position, None, None)],
            root: NodeId(0),
            config,
            action_space,
        })
    }

    /// The current root
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The configuration the tree scores moves with
    pub fn config(&self) -> &MCTSConfig {
        &self.config
    }

    /// Size of the move-index space, pass included
    pub fn action_space(&self) -> usize {
        self.action_space
    }

    /// Number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes; a tree is created with its root
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node with the given id
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    pub fn get(&self, id: NodeId) -> &MCTSNode<P> {
        &self.nodes[id.index()]
    }

    fn get_mut(&mut self, id: NodeId) -> &mut MCTSNode<P> {
        &mut self.nodes[id.index()]
    }

    /// Number of moves between the root and `id`
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while current != self.root {
            match self.get(current).parent {
                Some(parent) => {
                    current = parent;
                    depth += 1;
                }
                None => break,
            }
        }
        depth
    }

    /// Exploration bonus of every move at `id`
    pub fn exploration_bonus(&self, id: NodeId) -> Vec<f64> {
        self.get(id).exploration_bonus(self.config.exploration_constant)
    }

    /// Selection score of every move at `id`
    pub fn action_score(&self, id: NodeId) -> Vec<f64> {
        self.get(id).action_score(self.config.exploration_constant)
    }

    /// Descends from `from` to the next node that needs an evaluation
    ///
    /// Follows the best-scoring move (argmax for Black, argmin for White,
    /// lowest index on ties) until reaching a node that was never visited
    /// or whose game is over. A best move without a child is expanded and
    /// the new child returned. When the previous move was a pass and the
    /// answering pass was never visited, that pass is expanded first so the
    /// search always considers ending the game.
    pub fn select_leaf(&mut self, from: NodeId) -> Result<NodeId> {
        let pass = self.action_space - 1;
        let mut current = from;

        loop {
            let node = self.get(current);
            if node.visit_count == 0 || node.is_terminal() {
                return Ok(current);
            }

            if node.position.last_move_was_pass() && node.child_visit_count[pass] == 0 {
                return self.add_child(current, pass);
            }

            let scores = node.action_score(self.config.exploration_constant);
            let best = match node.position.to_play() {
                Color::Black => argmax(&scores),
                Color::White => argmin(&scores),
            }
            .ok_or(MCTSError::NoLegalActions)?;

            match node.child(best) {
                Some(child) => current = child,
                None => return self.add_child(current, best),
            }
        }
    }

    /// Returns the child of `id` reached by `mv`, creating it if needed
    ///
    /// Calling this again for an existing child returns the same node.
    /// Fails if the game is over at `id` or the rules engine rejects `mv`.
    pub fn add_child(&mut self, id: NodeId, mv: usize) -> Result<NodeId> {
        let node = self.get(id);
        if let Some(child) = node.child(mv) {
            return Ok(child);
        }
        if node.is_terminal() {
            return Err(MCTSError::TerminalNode);
        }
        if mv >= self.action_space {
            return Err(MCTSError::IllegalMove {
                mv,
                reason: format!("outside the move space of size {}", self.action_space),
            });
        }

        let position = node.position.apply_move(mv)?;
        let child = NodeId(self.nodes.len() as u32);
        self.nodes.push(MCTSNode::new(position, Some(mv), Some(id)));
        self.get_mut(id).children.insert(mv, child);

        trace!("expanded move {} under node {}", mv, id.index());
        Ok(child)
    }

    /// Records an evaluation at `id` and backs its value up the tree
    ///
    /// The value of a finished game is replaced by its real outcome. Illegal
    /// moves get their prior lowered by the configured penalty, and every
    /// unvisited child starts from the (possibly replaced) value rather than
    /// zero. Propagation stops after updating `up_to`, or at the root.
    /// Any other value must lie in `[-1, 1]`; nothing is recorded otherwise.
    pub fn incorporate_results(
        &mut self,
        id: NodeId,
        probabilities: &[f64],
        value: f64,
        up_to: Option<NodeId>,
    ) -> Result<()> {
        if probabilities.len() != self.action_space {
            return Err(MCTSError::PriorLengthMismatch {
                expected: self.action_space,
                actual: probabilities.len(),
            });
        }
        let max_prior = self.config.max_prior();
        if let Some((mv, &p)) = probabilities
            .iter()
            .enumerate()
            .find(|&(_, &p)| !p.is_finite() || p < 0.0 || p > max_prior)
        {
            return Err(MCTSError::InvalidPrior { mv, value: p });
        }

        let penalty = self.config.illegal_move_penalty;
        let action_space = self.action_space;
        let node = self.get_mut(id);

        let value = if node.is_terminal() {
            node.position.outcome_sign()
        } else if (-1.0..=1.0).contains(&value) {
            value
        } else {
            return Err(MCTSError::Evaluation(format!(
                "value {} outside [-1, 1]",
                value
            )));
        };

        let legal = node.position.legal_moves();
        if legal.len() != action_space {
            return Err(MCTSError::LegalMaskMismatch {
                expected: action_space,
                actual: legal.len(),
            });
        }

        node.original_prior = probabilities.to_vec();
        node.shaped_prior = probabilities
            .iter()
            .zip(&legal)
            .map(|(&p, &is_legal)| if is_legal { p } else { p - penalty })
            .collect();
        node.child_value_estimate = vec![value; action_space];

        self.backup_value(id, value, up_to);
        Ok(())
    }

    /// Propagates `value` from `id` toward the root
    ///
    /// Each node on the way gains one visit and folds `value` into its running
    /// mean, then copies its new statistics into its parent's per-move slots.
    /// The value is stored as-is at every level; perspective only matters at
    /// selection time. `up_to` is updated but nothing above it is.
    pub fn backup_value(&mut self, id: NodeId, value: f64, up_to: Option<NodeId>) {
        let mut current = id;
        loop {
            let node = self.get_mut(current);
            node.visit_count += 1;
            node.value_estimate += (value - node.value_estimate) / node.visit_count as f64;

            let (n, q) = (node.visit_count, node.value_estimate);
            let (parent, mv) = match (node.parent, node.originating_move) {
                (Some(parent), Some(mv)) if up_to != Some(current) => (parent, mv),
                _ => break,
            };

            let parent_node = self.get_mut(parent);
            parent_node.child_visit_count[mv] = n;
            parent_node.child_value_estimate[mv] = q;
            current = parent;
        }
    }

    /// Mixes Dirichlet noise into the shaped prior of `id`
    ///
    /// `shaped = shaped * (1 - w) + noise * w`. Meant to be called once per
    /// search on the root after it has been evaluated; calling it again
    /// compounds the noise.
    pub fn inject_noise<R: Rng + ?Sized>(&mut self, id: NodeId, rng: &mut R) -> Result<()> {
        let alpha = self.config.dirichlet_alpha(self.action_space - 1);
        let noise = dirichlet_sample(self.action_space, alpha, rng)?;
        let w = self.config.noise_weight;

        let node = self.get_mut(id);
        for (prior, n) in node.shaped_prior.iter_mut().zip(noise) {
            *prior = *prior * (1.0 - w) + n * w;
        }
        Ok(())
    }

    /// Visit distribution over the moves of `id`
    ///
    /// With `sharpen`, counts are raised to the configured exponent before
    /// normalizing, concentrating the mass on the most visited move. Fails
    /// with [`MCTSError::NoVisits`] when no child has been visited.
    pub fn children_as_pi(&self, id: NodeId, sharpen: bool) -> Result<Vec<f64>> {
        let exponent = self.config.sharpening_exponent;
        let counts: Vec<f64> = self
            .get(id)
            .child_visit_count
            .iter()
            .map(|&n| {
                let n = n as f64;
                if sharpen {
                    n.powi(exponent)
                } else {
                    n
                }
            })
            .collect();
        normalize(&counts)
    }

    /// Makes the child reached by `mv` the new root
    ///
    /// The child is expanded if needed. Every node outside its subtree is
    /// dropped and the arena is compacted, so previously issued ids are
    /// invalidated. Returns the id of the new root.
    pub fn reroot(&mut self, mv: usize) -> Result<NodeId> {
        let child = self.add_child(self.root, mv)?;

        let mut remap: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        let mut order = Vec::new();
        let mut queue = VecDeque::from([child]);
        while let Some(id) = queue.pop_front() {
            remap[id.index()] = Some(NodeId(order.len() as u32));
            order.push(id);
            queue.extend(self.get(id).children.values().copied());
        }

        let mut old: Vec<Option<MCTSNode<P>>> =
            std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
        for id in order {
            if let Some(mut node) = old[id.index()].take() {
                node.parent = node.parent.and_then(|p| remap[p.index()]);
                for child_id in node.children.values_mut() {
                    if let Some(new_id) = remap[child_id.index()] {
                        *child_id = new_id;
                    }
                }
                self.nodes.push(node);
            }
        }

        self.root = NodeId(0);
        let root = self.get_mut(self.root);
        root.parent = None;
        root.originating_move = None;
        Ok(self.root)
    }
}
