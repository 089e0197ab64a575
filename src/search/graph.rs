use std::collections::HashSet;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::frontier::Frontier;
use super::node::Node;
use super::problem::{Problem, SearchError};

pub type SearchNode<P> = Node<<P as Problem>::State, <P as Problem>::Action>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchConfig {
    /// Upper bound on expanded nodes; `None` searches until the frontier is exhausted.
    #[serde(default)]
    pub max_expansions: Option<usize>,
    /// Record every expansion in `SearchReport::expansions`.
    #[serde(default)]
    pub trace: bool,
    /// Log expansion statistics once a goal is reached.
    #[serde(default)]
    pub display: bool,
}

impl SearchConfig {
    pub fn traced() -> Self {
        Self {
            trace: true,
            ..Self::default()
        }
    }

    pub fn with_max_expansions(mut self, limit: usize) -> Self {
        self.max_expansions = Some(limit);
        self
    }

    pub fn with_display(mut self, display: bool) -> Self {
        self.display = display;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchStats {
    pub expanded: usize,
    pub generated: usize,
    pub frontier_remaining: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expansion<S> {
    pub state: S,
    pub depth: usize,
    pub path_cost: f64,
    pub priority: f64,
}

#[derive(Debug)]
pub enum SearchOutcome<S, A> {
    Solved(Rc<Node<S, A>>),
    NoSolution,
}

impl<S, A> SearchOutcome<S, A> {
    pub fn goal(&self) -> Option<&Rc<Node<S, A>>> {
        match self {
            SearchOutcome::Solved(node) => Some(node),
            SearchOutcome::NoSolution => None,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, SearchOutcome::Solved(_))
    }
}

#[derive(Debug)]
pub struct SearchReport<S, A> {
    pub outcome: SearchOutcome<S, A>,
    pub stats: SearchStats,
    /// `f` of the goal node as it left the frontier.
    pub goal_priority: Option<f64>,
    /// Empty unless `SearchConfig::trace` is set.
    pub expansions: Vec<Expansion<S>>,
}

/// 按 `f` 值从小到大展开节点的图搜索。
///
/// `f` 对每个生成的节点只计算一次。若子节点的状态已在 frontier 中且新的 `f`
/// 更小，则替换原条目；已展开过的状态不会再次入队。frontier 耗尽时返回
/// `SearchOutcome::NoSolution`，这不是错误。
pub fn best_first_graph_search<P, F>(
    problem: &P,
    mut f: F,
    config: &SearchConfig,
) -> Result<SearchReport<P::State, P::Action>, SearchError>
where
    P: Problem + ?Sized,
    F: FnMut(&SearchNode<P>) -> f64,
{
    let root = Rc::new(Node::root(problem.initial().clone()));
    let mut frontier = Frontier::new();
    let root_priority = f(root.as_ref());
    frontier.push(root, root_priority);

    let mut explored: HashSet<P::State> = HashSet::new();
    let mut stats = SearchStats {
        generated: 1,
        ..SearchStats::default()
    };
    let mut expansions = Vec::new();

    while let Some((node, priority)) = frontier.pop() {
        if problem.goal_test(&node.state)? {
            stats.frontier_remaining = frontier.len();
            if config.display {
                log::info!(
                    "{} paths have been expanded and {} paths remain in the frontier",
                    explored.len(),
                    frontier.len()
                );
            }
            return Ok(SearchReport {
                outcome: SearchOutcome::Solved(node),
                stats,
                goal_priority: Some(priority),
                expansions,
            });
        }

        if let Some(limit) = config.max_expansions {
            if stats.expanded >= limit {
                return Err(SearchError::ExpansionLimit { limit });
            }
        }

        log::debug!(
            "expanding {:?} (depth {}, g {}, f {})",
            node.state,
            node.depth,
            node.path_cost,
            priority
        );
        stats.expanded += 1;
        if config.trace {
            expansions.push(Expansion {
                state: node.state.clone(),
                depth: node.depth,
                path_cost: node.path_cost,
                priority,
            });
        }
        explored.insert(node.state.clone());

        for child in node.expand(problem) {
            stats.generated += 1;
            if explored.contains(&child.state) {
                continue;
            }
            let child_priority = f(&child);
            match frontier.priority(&child.state) {
                None => frontier.push(Rc::new(child), child_priority),
                Some(current) if child_priority < current => {
                    frontier.remove(&child.state);
                    frontier.push(Rc::new(child), child_priority);
                }
                Some(_) => {}
            }
        }
    }

    log::debug!("frontier exhausted after {} expansions", stats.expanded);
    Ok(SearchReport {
        outcome: SearchOutcome::NoSolution,
        stats,
        goal_priority: None,
        expansions,
    })
}

/// `f = depth`: nodes leave the frontier level by level.
pub fn breadth_first_graph_search<P>(
    problem: &P,
    config: &SearchConfig,
) -> Result<SearchReport<P::State, P::Action>, SearchError>
where
    P: Problem + ?Sized,
{
    best_first_graph_search(problem, |node| node.depth as f64, config)
}

/// `f = g`, cheapest path first.
pub fn uniform_cost_search<P>(
    problem: &P,
    config: &SearchConfig,
) -> Result<SearchReport<P::State, P::Action>, SearchError>
where
    P: Problem + ?Sized,
{
    best_first_graph_search(problem, |node| node.path_cost, config)
}

/// `f = h`, ignoring the cost already paid.
pub fn greedy_best_first_search<P, H>(
    problem: &P,
    h: H,
    config: &SearchConfig,
) -> Result<SearchReport<P::State, P::Action>, SearchError>
where
    P: Problem + ?Sized,
    H: FnMut(&SearchNode<P>) -> f64,
{
    best_first_graph_search(problem, h, config)
}

/// `f = g + h`. Optimal only when `h` is admissible, which is the caller's concern.
pub fn astar_search<P, H>(
    problem: &P,
    mut h: H,
    config: &SearchConfig,
) -> Result<SearchReport<P::State, P::Action>, SearchError>
where
    P: Problem + ?Sized,
    H: FnMut(&SearchNode<P>) -> f64,
{
    best_first_graph_search(problem, |node| node.path_cost + h(node), config)
}
