pub mod ai;
pub mod game;
pub mod logging;
pub mod search;

use serde::Serialize;
use serde_wasm_bindgen::{from_value, Serializer};
use std::str::FromStr;
use wasm_bindgen::prelude::*;

pub use ai::{Algorithm, Comparison, Evaluation, Evaluator, EvaluatorConfig, UnknownAlgorithm};
pub use game::{
    EvalTrace, GameTree, Layer, Level, Role, TraceEvent, TreeDocument, TreeEntry, TreeError,
};
pub use search::{
    astar_search, best_first_graph_search, breadth_first_graph_search, greedy_best_first_search,
    uniform_cost_search, Expansion, Frontier, Goal, GraphProblem, GraphSpec, Node, Problem,
    SearchConfig, SearchError, SearchOutcome, SearchReport, SearchStats, SearchStrategy,
    SolutionView, UnknownStrategy,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
    logging::init(log::LevelFilter::Info);
}

#[wasm_bindgen(js_name = "setLogLevel")]
pub fn set_log_level(level: &str) {
    logging::init(logging::parse_level(level));
}

/// Plain objects instead of `Map`s, so results read like the JSON entry points.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(JsValue::from)
}

fn to_js_error<E: Serialize + std::fmt::Display>(error: E) -> JsValue {
    to_js(&error).unwrap_or_else(|_| JsValue::from_str(&error.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_algorithm(algorithm: Option<String>) -> Algorithm {
    algorithm
        .as_deref()
        .and_then(|value| Algorithm::from_str(value).ok())
        .unwrap_or(Algorithm::AlphaBeta)
}

fn parse_strategy(strategy: Option<String>) -> SearchStrategy {
    strategy
        .as_deref()
        .and_then(|value| SearchStrategy::from_str(value).ok())
        .unwrap_or(SearchStrategy::UniformCost)
}

/// JS 端的图搜索统一从这里进入，并打印展开统计。
fn graph_search_config() -> SearchConfig {
    SearchConfig::default().with_display(true)
}

fn solve_graph_view(
    problem: &GraphProblem,
    strategy: SearchStrategy,
) -> Result<SolutionView, SearchError> {
    let report = problem.solve(strategy, &graph_search_config())?;
    Ok(SolutionView::new(strategy, &report))
}

#[derive(Serialize)]
struct EvaluationView<'a> {
    #[serde(flatten)]
    evaluation: &'a Evaluation,
    lines: Vec<String>,
}

fn evaluation_json(evaluation: &Evaluation) -> Result<String, JsValue> {
    let view = EvaluationView {
        evaluation,
        lines: evaluation.trace.lines(),
    };
    serde_json::to_string(&view).map_err(serde_to_js_error)
}

/// 持有一棵博弈树的会话对象，供前端反复求值与比较。
#[wasm_bindgen]
pub struct TreeLab {
    tree: GameTree,
    config: EvaluatorConfig,
}

#[wasm_bindgen]
impl TreeLab {
    #[wasm_bindgen(constructor)]
    pub fn new(tree_json: Option<String>) -> Result<TreeLab, JsValue> {
        let tree = match tree_json {
            Some(json) => GameTree::from_json(&json).map_err(to_js_error)?,
            None => GameTree::textbook(),
        };
        tree.validate().map_err(to_js_error)?;
        Ok(TreeLab {
            tree,
            config: EvaluatorConfig::default(),
        })
    }

    pub fn tree_json(&self) -> Result<String, JsValue> {
        self.tree.to_json().map_err(to_js_error)
    }

    pub fn set_tree_json(&mut self, json: &str) -> Result<(), JsValue> {
        let tree = GameTree::from_json(json).map_err(to_js_error)?;
        tree.validate().map_err(to_js_error)?;
        self.tree = tree;
        Ok(())
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.config = self.config.clone().with_max_depth(max_depth);
    }

    pub fn minimax_json(&self) -> Result<String, JsValue> {
        self.evaluate_json(Algorithm::Minimax)
    }

    pub fn alpha_beta_json(&self) -> Result<String, JsValue> {
        self.evaluate_json(Algorithm::AlphaBeta)
    }

    pub fn compare_json(&self) -> Result<String, JsValue> {
        let comparison = Evaluator::new(self.config.clone())
            .compare(&self.tree)
            .map_err(to_js_error)?;
        serde_json::to_string(&comparison).map_err(serde_to_js_error)
    }

    pub fn levels_json(&self) -> Result<String, JsValue> {
        let levels = self.tree.levels(Role::Max).map_err(to_js_error)?;
        let lines: Vec<String> = levels.iter().map(|level| level.to_string()).collect();
        serde_json::to_string(&lines).map_err(serde_to_js_error)
    }

    fn evaluate_json(&self, algorithm: Algorithm) -> Result<String, JsValue> {
        let evaluation = Evaluator::new(self.config.clone())
            .evaluate(&self.tree, algorithm)
            .map_err(to_js_error)?;
        evaluation_json(&evaluation)
    }
}

/// 返回课程示例博弈树，方便前端初始化。
#[wasm_bindgen(js_name = "textbookTree")]
pub fn textbook_tree() -> Result<JsValue, JsValue> {
    to_js(&GameTree::textbook())
}

/// 生成可复现的随机博弈树，用于比较剪枝效果。
#[wasm_bindgen(js_name = "randomTree")]
pub fn random_tree(depth: usize, branching: usize, seed: u64) -> Result<JsValue, JsValue> {
    to_js(&GameTree::random(depth, branching, seed))
}

#[wasm_bindgen(js_name = "evaluateTree")]
pub fn evaluate_tree(tree: JsValue, algorithm: Option<String>) -> Result<JsValue, JsValue> {
    let tree: GameTree = from_value(tree).map_err(JsValue::from)?;
    let evaluation = Evaluator::default()
        .evaluate(&tree, parse_algorithm(algorithm))
        .map_err(to_js_error)?;
    to_js(&evaluation)
}

#[wasm_bindgen(js_name = "compareTree")]
pub fn compare_tree(tree: JsValue) -> Result<JsValue, JsValue> {
    let tree: GameTree = from_value(tree).map_err(JsValue::from)?;
    let comparison = Evaluator::default().compare(&tree).map_err(to_js_error)?;
    to_js(&comparison)
}

#[wasm_bindgen(js_name = "solveGraph")]
pub fn solve_graph(problem: JsValue, strategy: Option<String>) -> Result<JsValue, JsValue> {
    let spec: GraphSpec = from_value(problem).map_err(JsValue::from)?;
    let view = solve_graph_view(&GraphProblem::from_spec(spec), parse_strategy(strategy))
        .map_err(to_js_error)?;
    to_js(&view)
}

#[wasm_bindgen(js_name = "solveGraphJson")]
pub fn solve_graph_json(problem_json: &str, strategy: Option<String>) -> Result<String, JsValue> {
    let problem = GraphProblem::from_json(problem_json).map_err(serde_to_js_error)?;
    let view = solve_graph_view(&problem, parse_strategy(strategy)).map_err(to_js_error)?;
    serde_json::to_string(&view).map_err(serde_to_js_error)
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
