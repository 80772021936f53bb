//! Shared fixtures: a tiny Go-like board and scripted evaluators

#![allow(dead_code)]

use std::cell::Cell;

use puct_mcts::{Color, Evaluation, Evaluator, MCTSError, Position};

/// Stones are placed on empty points and never captured. The game ends
/// after two consecutive passes; the player with more stones wins, with
/// half a point of komi for White.
#[derive(Clone, Debug)]
pub struct TestBoard {
    size: usize,
    stones: Vec<i8>,
    moves: Vec<usize>,
}

impl TestBoard {
    pub fn new(size: usize) -> Self {
        TestBoard {
            size,
            stones: vec![0; size * size],
            moves: Vec::new(),
        }
    }

    pub fn with_moves(size: usize, moves: &[usize]) -> Self {
        moves.iter().fold(TestBoard::new(size), |board, &mv| {
            board.apply_move(mv).expect("fixture move should be legal")
        })
    }

    pub fn pass(&self) -> usize {
        self.size * self.size
    }
}

impl Position for TestBoard {
    fn board_size(&self) -> usize {
        self.size
    }

    fn apply_move(&self, mv: usize) -> puct_mcts::Result<Self> {
        if self.is_terminal() {
            return Err(MCTSError::IllegalMove {
                mv,
                reason: "game is over".to_string(),
            });
        }
        if mv > self.pass() {
            return Err(MCTSError::IllegalMove {
                mv,
                reason: "off the board".to_string(),
            });
        }
        if mv < self.pass() && self.stones[mv] != 0 {
            return Err(MCTSError::IllegalMove {
                mv,
                reason: "point is occupied".to_string(),
            });
        }

        let mut next = self.clone();
        if mv < self.pass() {
            next.stones[mv] = self.to_play().sign() as i8;
        }
        next.moves.push(mv);
        Ok(next)
    }

    fn is_terminal(&self) -> bool {
        let pass = self.pass();
        self.moves.len() >= 2 && self.moves[self.moves.len() - 2..] == [pass, pass]
    }

    fn score(&self) -> f64 {
        self.stones.iter().map(|&s| s as f64).sum::<f64>() - 0.5
    }

    fn legal_moves(&self) -> Vec<bool> {
        let mut legal: Vec<bool> = self.stones.iter().map(|&s| s == 0).collect();
        legal.push(true);
        legal
    }

    fn to_play(&self) -> Color {
        if self.moves.len() % 2 == 0 {
            Color::Black
        } else {
            Color::White
        }
    }

    fn recent_moves(&self) -> &[usize] {
        &self.moves
    }
}

/// Evaluator returning the same prior and value for every position
pub struct FixedEvaluator {
    pub probabilities: Vec<f64>,
    pub value: f64,
    pub calls: Cell<usize>,
}

impl FixedEvaluator {
    pub fn new(probabilities: Vec<f64>, value: f64) -> Self {
        FixedEvaluator {
            probabilities,
            value,
            calls: Cell::new(0),
        }
    }
}

impl Evaluator<TestBoard> for FixedEvaluator {
    fn evaluate(&self, _position: &TestBoard) -> puct_mcts::Result<Evaluation> {
        self.calls.set(self.calls.get() + 1);
        Ok(Evaluation::new(self.probabilities.clone(), self.value))
    }
}

pub fn uniform(n: usize) -> Vec<f64> {
    vec![1.0 / n as f64; n]
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

/// Runs `n` select/incorporate rounds from the root with a fixed evaluation
pub fn run_simulations(
    tree: &mut puct_mcts::Tree<TestBoard>,
    n: usize,
    probabilities: &[f64],
    value: f64,
) {
    let root = tree.root();
    for _ in 0..n {
        let leaf = tree.select_leaf(root).expect("selection should succeed");
        tree.incorporate_results(leaf, probabilities, value, None)
            .expect("incorporation should succeed");
    }
}

/// Every node reachable from the root, parents before children
pub fn reachable(tree: &puct_mcts::Tree<TestBoard>) -> Vec<puct_mcts::NodeId> {
    let mut out = vec![tree.root()];
    let mut i = 0;
    while i < out.len() {
        let id = out[i];
        out.extend(tree.get(id).children().values().copied());
        i += 1;
    }
    out
}
