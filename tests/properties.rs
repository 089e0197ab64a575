//! Property-based tests for the graph search engine and the game-tree evaluator.

use std::collections::VecDeque;

use proptest::prelude::*;
use wasm_search::{
    breadth_first_graph_search, uniform_cost_search, Evaluator, EvaluatorConfig, GameTree, Goal,
    Problem, SearchConfig, TreeEntry,
};

// =============================================================================
// Graph fixtures
// =============================================================================

/// Directed graph over `0..n` with unit step cost.
#[derive(Debug, Clone)]
struct RandomGraph {
    start: usize,
    goal: Goal<usize>,
    adjacency: Vec<Vec<usize>>,
}

impl RandomGraph {
    fn new(n: usize, edges: &[(usize, usize)], goal: usize) -> Self {
        let mut adjacency = vec![Vec::new(); n];
        for &(from, to) in edges {
            let (from, to) = (from % n, to % n);
            if !adjacency[from].contains(&to) {
                adjacency[from].push(to);
            }
        }
        Self {
            start: 0,
            goal: Goal::Single(goal % n),
            adjacency,
        }
    }

    /// Reference step distance from the start, by plain breadth-first traversal.
    fn distance_to(&self, target: usize) -> Option<usize> {
        let mut distance = vec![None; self.adjacency.len()];
        distance[self.start] = Some(0);
        let mut queue = VecDeque::from([self.start]);
        while let Some(state) = queue.pop_front() {
            let here = distance[state]?;
            for &next in &self.adjacency[state] {
                if distance[next].is_none() {
                    distance[next] = Some(here + 1);
                    queue.push_back(next);
                }
            }
        }
        distance[target]
    }
}

impl Problem for RandomGraph {
    type State = usize;
    type Action = usize;

    fn initial(&self) -> &usize {
        &self.start
    }

    fn goal(&self) -> Option<&Goal<usize>> {
        Some(&self.goal)
    }

    fn actions(&self, state: &usize) -> Vec<usize> {
        self.adjacency[*state].clone()
    }

    fn result(&self, _state: &usize, action: &usize) -> usize {
        *action
    }
}

fn arb_graph() -> impl Strategy<Value = RandomGraph> {
    (2usize..12)
        .prop_flat_map(|n| {
            (
                Just(n),
                prop::collection::vec((0..n, 0..n), 0..(n * 3)),
                0..n,
            )
        })
        .prop_map(|(n, edges, goal)| RandomGraph::new(n, &edges, goal))
}

// =============================================================================
// Tree fixtures
// =============================================================================

fn arb_tree() -> impl Strategy<Value = GameTree> {
    (1usize..5, 1usize..4, any::<u64>())
        .prop_map(|(depth, branching, seed)| GameTree::random(depth, branching, seed))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn breadth_first_expands_in_depth_order(graph in arb_graph()) {
        let report = breadth_first_graph_search(&graph, &SearchConfig::traced()).unwrap();
        let depths: Vec<usize> = report.expansions.iter().map(|e| e.depth).collect();
        prop_assert!(depths.windows(2).all(|pair| pair[0] <= pair[1]), "depths {:?}", depths);
    }

    #[test]
    fn uniform_cost_matches_reference_distance(graph in arb_graph()) {
        let report = uniform_cost_search(&graph, &SearchConfig::default()).unwrap();
        let target = match graph.goal {
            Goal::Single(goal) => goal,
            Goal::AnyOf(_) => unreachable!(),
        };
        let expected = graph.distance_to(target).map(|steps| steps as f64);
        prop_assert_eq!(report.outcome.goal().map(|node| node.path_cost), expected);
    }

    #[test]
    fn search_is_repeatable(graph in arb_graph()) {
        let config = SearchConfig::default();
        let first = uniform_cost_search(&graph, &config).unwrap();
        let second = uniform_cost_search(&graph, &config).unwrap();
        prop_assert_eq!(
            first.outcome.goal().map(|node| (node.state, node.path_cost)),
            second.outcome.goal().map(|node| (node.state, node.path_cost))
        );
    }

    #[test]
    fn pruning_never_changes_the_value(tree in arb_tree()) {
        let evaluator = Evaluator::new(EvaluatorConfig::untraced());
        let minimax = evaluator.minimax(&tree).unwrap();
        let alpha_beta = evaluator.alpha_beta(&tree).unwrap();
        prop_assert_eq!(minimax.value, alpha_beta.value);
    }

    #[test]
    fn pruning_only_ever_saves_leaves(tree in arb_tree()) {
        let evaluator = Evaluator::default();
        let minimax = evaluator.minimax(&tree).unwrap();
        let alpha_beta = evaluator.alpha_beta(&tree).unwrap();
        prop_assert!(alpha_beta.leaves <= minimax.leaves);
        prop_assert_eq!(alpha_beta.leaves == minimax.leaves, alpha_beta.cutoffs == 0);
        prop_assert_eq!(alpha_beta.trace.cutoffs().len() as u64, alpha_beta.cutoffs);
        prop_assert_eq!(minimax.trace.visited_leaves().len() as u64, minimax.leaves);
    }

    #[test]
    fn child_order_does_not_change_the_value(tree in arb_tree(), rotate in 0usize..4) {
        let evaluator = Evaluator::new(EvaluatorConfig::untraced());
        let root = tree.root().to_string();
        let rotated = match tree.entry(&root).unwrap().clone() {
            TreeEntry::Children(mut children) => {
                let shift = rotate % children.len();
                children.rotate_left(shift);
                let children: Vec<&str> = children.iter().map(String::as_str).collect();
                tree.clone().with_children(root.as_str(), &children)
            }
            TreeEntry::Leaves(mut values) => {
                values.reverse();
                tree.clone().with_leaves(root.as_str(), &values)
            }
        };
        prop_assert_eq!(
            evaluator.alpha_beta(&tree).unwrap().value,
            evaluator.alpha_beta(&rotated).unwrap().value
        );
    }
}

#[test]
fn dead_end_start_has_no_solution() {
    let graph = RandomGraph::new(3, &[(1, 2)], 2);
    let report = breadth_first_graph_search(&graph, &SearchConfig::traced()).unwrap();
    assert!(!report.outcome.is_solved());
    assert_eq!(report.stats.generated, 1);
    assert_eq!(report.expansions.len(), 1);
}
