use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::graph::{
    astar_search, breadth_first_graph_search, greedy_best_first_search, uniform_cost_search,
    SearchConfig, SearchNode, SearchReport, SearchStats,
};
use super::problem::{Goal, Problem, SearchError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    BreadthFirst,
    UniformCost,
    Greedy,
    AStar,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown search strategy: {0}")]
pub struct UnknownStrategy(pub String);

impl std::str::FromStr for SearchStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bfs" | "breadth" | "breadthfirst" | "breadth_first" => Ok(SearchStrategy::BreadthFirst),
            "ucs" | "uniform" | "uniformcost" | "uniform_cost" => Ok(SearchStrategy::UniformCost),
            "greedy" | "best_first" => Ok(SearchStrategy::Greedy),
            "astar" | "a*" | "a_star" => Ok(SearchStrategy::AStar),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

/// Wire form of a graph problem, as read from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSpec {
    pub initial: String,
    #[serde(default)]
    pub goal: Option<Goal<String>>,
    /// `from -> (to -> cost)`.
    pub edges: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default)]
    pub directed: bool,
    /// Estimated cost to the goal per state, used by greedy and A*.
    #[serde(default)]
    pub heuristic: BTreeMap<String, f64>,
}

/// 带权图上的路径搜索问题；动作即目标城市名。
#[derive(Debug, Clone)]
pub struct GraphProblem {
    initial: String,
    goal: Option<Goal<String>>,
    adjacency: BTreeMap<String, BTreeMap<String, f64>>,
    heuristic: BTreeMap<String, f64>,
}

impl GraphProblem {
    /// Undirected graphs gain a reverse edge only where none was declared.
    pub fn from_spec(spec: GraphSpec) -> Self {
        let mut adjacency = spec.edges.clone();
        if !spec.directed {
            for (from, out) in &spec.edges {
                for (to, cost) in out {
                    adjacency
                        .entry(to.clone())
                        .or_default()
                        .entry(from.clone())
                        .or_insert(*cost);
                }
            }
        }
        Self {
            initial: spec.initial,
            goal: spec.goal,
            adjacency,
            heuristic: spec.heuristic,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<GraphSpec>(json).map(Self::from_spec)
    }

    pub fn edge_cost(&self, from: &str, to: &str) -> Option<f64> {
        self.adjacency.get(from).and_then(|out| out.get(to)).copied()
    }

    pub fn h(&self, node: &SearchNode<Self>) -> f64 {
        self.heuristic.get(&node.state).copied().unwrap_or(0.0)
    }

    pub fn solve(
        &self,
        strategy: SearchStrategy,
        config: &SearchConfig,
    ) -> Result<SearchReport<String, String>, SearchError> {
        match strategy {
            SearchStrategy::BreadthFirst => breadth_first_graph_search(self, config),
            SearchStrategy::UniformCost => uniform_cost_search(self, config),
            SearchStrategy::Greedy => greedy_best_first_search(self, |n| self.h(n), config),
            SearchStrategy::AStar => astar_search(self, |n| self.h(n), config),
        }
    }
}

impl Problem for GraphProblem {
    type State = String;
    type Action = String;

    fn initial(&self) -> &String {
        &self.initial
    }

    fn goal(&self) -> Option<&Goal<String>> {
        self.goal.as_ref()
    }

    fn actions(&self, state: &String) -> Vec<String> {
        self.adjacency
            .get(state)
            .map(|out| out.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn result(&self, _state: &String, action: &String) -> String {
        action.clone()
    }

    fn path_cost(&self, cost: f64, from: &String, _action: &String, to: &String) -> f64 {
        cost + self.edge_cost(from, to).unwrap_or(f64::INFINITY)
    }
}

/// Serializable summary of a finished graph search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolutionView {
    pub solved: bool,
    pub strategy: SearchStrategy,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub path: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_priority: Option<f64>,
    pub stats: SearchStats,
}

impl SolutionView {
    pub fn new(strategy: SearchStrategy, report: &SearchReport<String, String>) -> Self {
        match report.outcome.goal() {
            Some(goal) => Self {
                solved: true,
                strategy,
                actions: goal.solution(),
                path: goal.states(),
                path_cost: Some(goal.path_cost),
                goal_priority: report.goal_priority,
                stats: report.stats,
            },
            None => Self {
                solved: false,
                strategy,
                actions: Vec::new(),
                path: Vec::new(),
                path_cost: None,
                goal_priority: None,
                stats: report.stats,
            },
        }
    }
}
