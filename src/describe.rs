//! Human-readable reports on the state of a search tree

use std::fmt::Write;

use crate::{
    coords::Coords,
    game_state::Position,
    tree::{NodeId, Tree},
};

impl<P: Position> Tree<P> {
    fn coords(&self) -> Coords {
        Coords::new(self.get(self.root()).position().board_size())
    }

    /// Most visited expanded child of `id`, lowest move on ties
    fn most_visited_child(&self, id: NodeId) -> Option<(usize, NodeId)> {
        let node = self.get(id);
        let counts = node.child_visit_count();
        let mut best: Option<(usize, NodeId)> = None;
        for (&mv, &child) in node.children() {
            match best {
                Some((b, _)) if counts[mv] <= counts[b] => {}
                _ => best = Some((mv, child)),
            }
        }
        best
    }

    /// Line of most visited moves below `id`
    ///
    /// Each step prints as `<move> (<visits>) ==> `, followed by the value
    /// estimate of the last node reached.
    pub fn most_visited_path(&self, id: NodeId) -> String {
        let coords = self.coords();
        let mut output = String::new();
        let mut current = id;
        while let Some((mv, child)) = self.most_visited_child(current) {
            current = child;
            let _ = write!(
                output,
                "{} ({}) ==> ",
                coords.to_human(mv),
                self.get(current).visit_count()
            );
        }
        let _ = writeln!(output, "Q: {:.5}", self.get(current).value_estimate());
        output
    }

    /// Most visited line in GTP variation format, e.g. `D4 Q16 pass`
    ///
    /// Stops as soon as the best child has been visited at most once.
    pub fn most_visited_path_gtp(&self, id: NodeId) -> String {
        let coords = self.coords();
        let mut moves = Vec::new();
        let mut current = id;
        while let Some((mv, child)) = self.most_visited_child(current) {
            if self.get(current).child_visit_count()[mv] <= 1 {
                break;
            }
            moves.push(coords.to_human(mv));
            current = child;
        }
        moves.join(" ")
    }

    /// Table of move statistics at `id`
    ///
    /// Lists moves with at least one visit, most visited first, capped at
    /// the configured describe limit. Columns are the action score, child
    /// value, exploration bonus, shaped prior, raw prior, visits, share of
    /// visits, and the absolute and relative gap between that share and the
    /// shaped prior.
    pub fn describe(&self, id: NodeId) -> String {
        let coords = self.coords();
        let node = self.get(id);
        let counts = node.child_visit_count();
        let total: u32 = counts.iter().sum();

        let scores = self.action_score(id);
        let bonus = self.exploration_bonus(id);
        let q = node.child_value_estimate();
        let prior = node.shaped_prior();
        let original = node.original_prior();

        let mut order: Vec<usize> = (0..counts.len()).filter(|&mv| counts[mv] > 0).collect();
        order.sort_by(|&a, &b| counts[b].cmp(&counts[a]));
        order.truncate(self.config().describe_limit);

        let mut output = String::new();
        let _ = writeln!(output, "{:.4}", node.value_estimate());
        output.push_str(&self.most_visited_path(id));
        output.push_str("move:  action      Q      U      P    P-Dir    N  soft-N  p-delta  p-rel\n");

        let rows: Vec<String> = order
            .into_iter()
            .map(|mv| {
                // rows only exist for visited moves, so total > 0 and soft_n > 0
                let soft_n = counts[mv] as f64 / total as f64;
                let p_delta = soft_n - prior[mv];
                let p_rel = p_delta / soft_n;
                format!(
                    "{:<6}: {:>6.3}, {:>6.3}, {:.3}, {:.3}, {:.3}, {:>4} {:.4} {:>8.5} {:>6.2}",
                    coords.to_human(mv),
                    scores[mv],
                    q[mv],
                    bonus[mv],
                    prior[mv],
                    original[mv],
                    counts[mv],
                    soft_n,
                    p_delta,
                    p_rel
                )
            })
            .collect();
        output.push_str(&rows.join("\n"));
        output
    }
}
