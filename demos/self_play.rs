//! Self-play example for the PUCT search
//!
//! Plays a small stone-placement game against itself, printing the search
//! diagnostics after every move. Stones are never captured and the game ends
//! after two consecutive passes; Black wins when it owns more points than
//! White plus half a point of komi.

use std::fmt;

use puct_mcts::{
    Color, Coords, Evaluation, Evaluator, MCTSConfig, MCTSError, Position, Result, MCTS,
};

const SIZE: usize = 5;

fn main() {
    // Initialize logging
    env_logger::init();

    println!("PUCT Self-Play Example");
    println!("======================");
    println!();

    let config = MCTSConfig::default()
        .with_num_simulations(400)
        .with_temperature_moves(4)
        .with_describe_limit(8);

    let mut mcts = match MCTS::new(Board::new(SIZE), CenterEvaluator, config) {
        Ok(mcts) => mcts,
        Err(e) => {
            eprintln!("Failed to set up search: {}", e);
            return;
        }
    };
    let coords = Coords::new(SIZE);

    while !mcts.is_game_over() {
        let mover = mcts.root().position().to_play();
        let mv = match mcts.search() {
            Ok(mv) => mv,
            Err(e) => {
                eprintln!("Search failed: {}", e);
                return;
            }
        };

        println!("{}", mcts.describe());
        println!("{}", mcts.get_statistics().summary());
        println!("{:?} plays {}", mover, coords.to_human(mv));

        if let Err(e) = mcts.play_move(mv) {
            eprintln!("Could not play {}: {}", coords.to_human(mv), e);
            return;
        }
        println!("{}", mcts.root().position());
    }

    let score = mcts.root().position().score();
    let winner = if score > 0.0 { "Black" } else { "White" };
    println!("Game over. {} wins by {:.1}", winner, score.abs());
}

#[derive(Clone, Debug)]
struct Board {
    size: usize,
    stones: Vec<i8>,
    moves: Vec<usize>,
}

impl Board {
    fn new(size: usize) -> Self {
        Board {
            size,
            stones: vec![0; size * size],
            moves: Vec::new(),
        }
    }
}

impl Position for Board {
    fn board_size(&self) -> usize {
        self.size
    }

    fn apply_move(&self, mv: usize) -> Result<Self> {
        if self.is_terminal() {
            return Err(MCTSError::IllegalMove {
                mv,
                reason: "game is over".to_string(),
            });
        }
        let pass = self.pass_move();
        if mv > pass || (mv < pass && self.stones[mv] != 0) {
            return Err(MCTSError::IllegalMove {
                mv,
                reason: "point is occupied".to_string(),
            });
        }

        let mut next = self.clone();
        if mv < pass {
            next.stones[mv] = self.to_play().sign() as i8;
        }
        next.moves.push(mv);
        Ok(next)
    }

    fn is_terminal(&self) -> bool {
        let pass = self.pass_move();
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

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in 0..self.size {
            for col in 0..self.size {
                let symbol = match self.stones[row * self.size + col] {
                    1 => 'X',
                    -1 => 'O',
                    _ => '.',
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Prefers points near the centre and reads the value off the stone balance
struct CenterEvaluator;

impl Evaluator<Board> for CenterEvaluator {
    fn evaluate(&self, position: &Board) -> Result<Evaluation> {
        let size = position.size;
        let centre = (size as f64 - 1.0) / 2.0;
        let mut probabilities: Vec<f64> = (0..size * size)
            .map(|mv| {
                let (row, col) = ((mv / size) as f64, (mv % size) as f64);
                1.0 / (1.0 + (row - centre).abs() + (col - centre).abs())
            })
            .collect();
        probabilities.push(0.1);

        let total: f64 = probabilities.iter().sum();
        for p in probabilities.iter_mut() {
            *p /= total;
        }

        let area = (size * size) as f64;
        let value = (position.score() / area).clamp(-1.0, 1.0);
        Ok(Evaluation::new(probabilities, value))
    }
}
