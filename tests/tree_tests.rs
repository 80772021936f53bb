mod common;

use common::{assert_close, reachable, run_simulations, uniform, TestBoard};
use puct_mcts::{MCTSConfig, MCTSError, Position, Tree};

fn new_tree(board: TestBoard) -> Tree<TestBoard> {
    Tree::new(board, MCTSConfig::default()).unwrap()
}

#[test]
fn test_first_selection_returns_root() {
    let mut tree = new_tree(TestBoard::new(2));
    let root = tree.root();

    assert_eq!(tree.select_leaf(root).unwrap(), root);
    assert_eq!(tree.len(), 1, "selecting the root must not expand anything");
}

#[test]
fn test_two_simulation_scenario() {
    let mut tree = new_tree(TestBoard::new(2));
    let root = tree.root();
    let prior = uniform(5);

    let leaf = tree.select_leaf(root).unwrap();
    tree.incorporate_results(leaf, &prior, 0.0, None).unwrap();
    assert_eq!(tree.get(root).visit_count(), 1);
    assert_close(tree.get(root).value_estimate(), 0.0);

    let leaf = tree.select_leaf(root).unwrap();
    assert_ne!(leaf, root);
    assert_eq!(tree.get(leaf).parent(), Some(root));
    tree.incorporate_results(leaf, &prior, 1.0, None).unwrap();

    assert_eq!(tree.get(root).visit_count(), 2);
    assert_close(tree.get(root).value_estimate(), 0.5);
    assert_eq!(tree.get(leaf).visit_count(), 1);
    assert_close(tree.get(leaf).value_estimate(), 1.0);

    let mv = tree.get(leaf).originating_move().unwrap();
    assert_eq!(tree.get(root).child_visit_count()[mv], 1);
    assert_close(tree.get(root).child_value_estimate()[mv], 1.0);
}

#[test]
fn test_ties_resolve_to_lowest_index() {
    // Black to move: every move scores the same, so move 0 wins
    let mut tree = new_tree(TestBoard::new(2));
    run_simulations(&mut tree, 2, &uniform(5), 0.0);
    let root = tree.get(tree.root());
    assert_eq!(root.children().keys().copied().collect::<Vec<_>>(), vec![0]);

    // White to move with point 0 taken: the lowest legal move is 1
    let mut tree = new_tree(TestBoard::with_moves(2, &[0]));
    run_simulations(&mut tree, 2, &uniform(5), 0.0);
    let root = tree.get(tree.root());
    assert_eq!(root.children().keys().copied().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn test_expansion_is_idempotent() {
    let mut tree = new_tree(TestBoard::new(3));
    let root = tree.root();

    let first = tree.add_child(root, 4).unwrap();
    tree.backup_value(first, 1.0, None);
    let second = tree.add_child(root, 4).unwrap();

    assert_eq!(first, second);
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.get(second).visit_count(), 1, "existing child must be kept");
    assert_eq!(tree.get(second).originating_move(), Some(4));
    assert_eq!(tree.get(root).child(4), Some(first));
}

#[test]
fn test_expansion_propagates_illegal_moves() {
    let mut tree = new_tree(TestBoard::with_moves(2, &[3]));
    let root = tree.root();

    let result = tree.add_child(root, 3);
    assert!(matches!(result, Err(MCTSError::IllegalMove { mv: 3, .. })));

    let result = tree.add_child(root, 17);
    assert!(matches!(result, Err(MCTSError::IllegalMove { mv: 17, .. })));
    assert_eq!(tree.len(), 1);
}

#[test]
fn test_terminal_node_is_never_expanded() {
    let board = TestBoard::with_moves(2, &[1, 4, 4]);
    assert!(board.is_terminal());
    let mut tree = new_tree(board);
    let root = tree.root();

    run_simulations(&mut tree, 10, &uniform(5), 0.3);

    assert_eq!(tree.len(), 1);
    assert_eq!(tree.get(root).visit_count(), 10);
    // Black owns one stone against komi 0.5, so the true outcome is a Black win
    assert_close(tree.get(root).value_estimate(), 1.0);
    assert!(matches!(tree.add_child(root, 0), Err(MCTSError::TerminalNode)));
}

#[test]
fn test_pass_answer_is_explored_first() {
    // Black passed; the evaluator strongly prefers point 0 for White
    let mut tree = new_tree(TestBoard::with_moves(2, &[4]));
    let root = tree.root();
    let prior = vec![1.0, 0.0, 0.0, 0.0, 0.0];

    let leaf = tree.select_leaf(root).unwrap();
    tree.incorporate_results(leaf, &prior, 0.0, None).unwrap();

    let leaf = tree.select_leaf(root).unwrap();
    assert_eq!(tree.get(leaf).originating_move(), Some(4));
    assert!(tree.get(leaf).is_terminal());

    // The evaluator's opinion is replaced by the real result (White wins on komi)
    tree.incorporate_results(leaf, &prior, 1.0, None).unwrap();
    assert_close(tree.get(leaf).value_estimate(), -1.0);
    assert_close(tree.get(root).child_value_estimate()[4], -1.0);
}

#[test]
fn test_backup_incremental_mean() {
    let mut tree = new_tree(TestBoard::new(2));
    let root = tree.root();

    for (i, v) in [1.0, 0.0, -1.0, 0.5].into_iter().enumerate() {
        tree.backup_value(root, v, None);
        assert_eq!(tree.get(root).visit_count(), i as u32 + 1);
    }
    assert_close(tree.get(root).value_estimate(), 0.125);
}

#[test]
fn test_backup_converges_to_repeated_value() {
    let mut tree = new_tree(TestBoard::new(2));
    let root = tree.root();

    for _ in 0..10 {
        tree.backup_value(root, 0.3, None);
    }
    assert_close(tree.get(root).value_estimate(), 0.3);

    tree.backup_value(root, -1.0, None);
    for _ in 0..2000 {
        tree.backup_value(root, 0.3, None);
    }
    assert!((tree.get(root).value_estimate() - 0.3).abs() < 1e-3);
}

#[test]
fn test_backup_does_not_flip_sign() {
    let mut tree = new_tree(TestBoard::new(2));
    let root = tree.root();
    let child = tree.add_child(root, 0).unwrap();
    let grandchild = tree.add_child(child, 1).unwrap();

    tree.backup_value(grandchild, 1.0, None);

    for id in [grandchild, child, root] {
        assert_eq!(tree.get(id).visit_count(), 1);
        assert_close(tree.get(id).value_estimate(), 1.0);
    }
    assert_close(tree.get(child).child_value_estimate()[1], 1.0);
    assert_close(tree.get(root).child_value_estimate()[0], 1.0);
}

#[test]
fn test_backup_stops_at_stop_node() {
    let mut tree = new_tree(TestBoard::new(2));
    let root = tree.root();
    let child = tree.add_child(root, 0).unwrap();
    let grandchild = tree.add_child(child, 1).unwrap();

    tree.backup_value(grandchild, -0.5, Some(child));

    assert_eq!(tree.get(grandchild).visit_count(), 1);
    assert_eq!(tree.get(child).visit_count(), 1);
    assert_close(tree.get(child).value_estimate(), -0.5);
    assert_eq!(tree.get(child).child_visit_count()[1], 1);

    assert_eq!(tree.get(root).visit_count(), 0);
    assert_eq!(tree.get(root).child_visit_count()[0], 0);
}

#[test]
fn test_child_statistics_stay_consistent() {
    let mut tree = new_tree(TestBoard::new(3));
    run_simulations(&mut tree, 300, &uniform(10), 0.1);

    for id in reachable(&tree) {
        let node = tree.get(id);
        for (&mv, &child) in node.children() {
            assert_eq!(node.child_visit_count()[mv], tree.get(child).visit_count());
        }
        for mv in 0..tree.action_space() {
            if node.child(mv).is_none() {
                assert_eq!(node.child_visit_count()[mv], 0);
            }
        }
        if node.visit_count() > 0 && !node.is_terminal() {
            let total: u32 = node.child_visit_count().iter().sum();
            assert_eq!(total, node.visit_count() - 1);
        }
    }
}

#[test]
fn test_perspective_views() {
    let mut tree = new_tree(TestBoard::with_moves(2, &[0]));
    let root = tree.root();
    tree.incorporate_results(root, &uniform(5), 0.4, None).unwrap();

    let node = tree.get(root);
    assert_close(node.perspective_sign(), -1.0);
    assert_close(node.value_from_mover_perspective(), -0.4);

    let bonus = tree.exploration_bonus(root);
    let scores = tree.action_score(root);
    for mv in 0..5 {
        assert_close(scores[mv], node.child_value_estimate()[mv] - bonus[mv]);
    }
    // a single visit still counts as sqrt(max(1, N)) = 1
    assert_close(bonus[1], 1.38 * 0.2);
}

#[test]
fn test_reroot_keeps_subtree() {
    let mut tree = new_tree(TestBoard::new(2));
    run_simulations(&mut tree, 60, &uniform(5), 0.0);

    let root = tree.root();
    let child = tree.get(root).child(0).unwrap();
    let child_visits = tree.get(child).visit_count();
    let child_q = tree.get(child).value_estimate();
    let child_tree_moves: Vec<usize> = tree.get(child).children().keys().copied().collect();

    let new_root = tree.reroot(0).unwrap();
    let node = tree.get(new_root);
    assert_eq!(node.parent(), None);
    assert_eq!(node.originating_move(), None);
    assert_eq!(node.visit_count(), child_visits);
    assert_close(node.value_estimate(), child_q);
    assert_eq!(node.children().keys().copied().collect::<Vec<_>>(), child_tree_moves);
    assert_eq!(tree.len(), reachable(&tree).len());

    run_simulations(&mut tree, 20, &uniform(5), 0.0);
    let node = tree.get(tree.root());
    assert_eq!(node.visit_count(), child_visits + 20);
    let total: u32 = node.child_visit_count().iter().sum();
    assert_eq!(total, node.visit_count() - 1);
}

#[test]
fn test_depth() {
    let mut tree = new_tree(TestBoard::new(2));
    let root = tree.root();
    let child = tree.add_child(root, 2).unwrap();
    let grandchild = tree.add_child(child, 4).unwrap();

    assert_eq!(tree.depth(root), 0);
    assert_eq!(tree.depth(child), 1);
    assert_eq!(tree.depth(grandchild), 2);
}
