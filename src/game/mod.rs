//! 博弈树模型（标签树、叶子组、层次划分）与求值轨迹。

pub mod trace;
pub mod tree;

pub use trace::{EvalTrace, TraceEvent};
pub use tree::{GameTree, Layer, Level, Role, TreeDocument, TreeEntry, TreeError};
