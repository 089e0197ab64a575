//! 博弈树搜索算法（极小极大、α-β 剪枝）。

pub mod minimax;

pub use minimax::{
    Algorithm, Comparison, Evaluation, Evaluator, EvaluatorConfig, UnknownAlgorithm,
};
