//! 图搜索框架（问题抽象、搜索节点、优先队列与最佳优先搜索）。

pub mod frontier;
pub mod graph;
pub mod graph_problem;
pub mod node;
pub mod problem;

pub use frontier::Frontier;
pub use graph::{
    astar_search, best_first_graph_search, breadth_first_graph_search, greedy_best_first_search,
    uniform_cost_search, Expansion, SearchConfig, SearchNode, SearchOutcome, SearchReport,
    SearchStats,
};
pub use graph_problem::{GraphProblem, GraphSpec, SearchStrategy, SolutionView, UnknownStrategy};
pub use node::Node;
pub use problem::{Goal, Problem, SearchError};
