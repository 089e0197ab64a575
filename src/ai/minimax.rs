use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::{EvalTrace, GameTree, Role, TraceEvent, TreeEntry, TreeError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Minimax,
    AlphaBeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown algorithm: {0}")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimax" | "full" => Ok(Algorithm::Minimax),
            "alphabeta" | "alpha-beta" | "alpha_beta" | "pruning" => Ok(Algorithm::AlphaBeta),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvaluatorConfig {
    /// Deepest node the recursion may enter; deeper trees fail with `DepthExceeded`.
    pub max_depth: usize,
    pub trace: bool,
}

impl EvaluatorConfig {
    pub fn untraced() -> Self {
        Self {
            trace: false,
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            trace: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
    pub algorithm: Algorithm,
    pub value: f64,
    pub nodes: u64,
    pub leaf_groups: u64,
    pub leaves: u64,
    pub cutoffs: u64,
    pub trace: EvalTrace,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comparison {
    pub minimax: Evaluation,
    pub alpha_beta: Evaluation,
    /// Leaf values alpha-beta never had to look at.
    pub leaves_pruned: u64,
}

struct SearchStats {
    nodes: u64,
    leaf_groups: u64,
    leaves: u64,
    cutoffs: u64,
}

impl SearchStats {
    fn new() -> Self {
        Self {
            nodes: 0,
            leaf_groups: 0,
            leaves: 0,
            cutoffs: 0,
        }
    }
}

/// 博弈树求值器：极小极大与 α-β 剪枝。
///
/// 子节点严格按树中给出的顺序从左到右求值；剪枝是否发生取决于这一顺序，
/// 但不会改变根节点的返回值。叶子组是终结结构：按所在层的角色直接取
/// 最大或最小值，组内不剪枝。
pub struct Evaluator {
    config: EvaluatorConfig,
}

impl Evaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    pub fn evaluate(&self, tree: &GameTree, algorithm: Algorithm) -> Result<Evaluation, TreeError> {
        match algorithm {
            Algorithm::Minimax => self.minimax(tree),
            Algorithm::AlphaBeta => self.alpha_beta(tree),
        }
    }

    /// Root is MAX.
    pub fn minimax(&self, tree: &GameTree) -> Result<Evaluation, TreeError> {
        self.minimax_from(tree, tree.root(), true)
    }

    /// Root is MAX, bounds start at (-inf, +inf).
    pub fn alpha_beta(&self, tree: &GameTree) -> Result<Evaluation, TreeError> {
        self.alpha_beta_from(tree, tree.root(), f64::NEG_INFINITY, f64::INFINITY, true)
    }

    pub fn minimax_from(
        &self,
        tree: &GameTree,
        label: &str,
        maximizing: bool,
    ) -> Result<Evaluation, TreeError> {
        tree.validate_from(label)?;
        let mut walk = Walk::new(tree, &self.config);
        let value = walk.minimax_rec(label, Role::from_maximizing(maximizing), 0)?;
        Ok(walk.finish(Algorithm::Minimax, value))
    }

    pub fn alpha_beta_from(
        &self,
        tree: &GameTree,
        label: &str,
        alpha: f64,
        beta: f64,
        maximizing: bool,
    ) -> Result<Evaluation, TreeError> {
        tree.validate_from(label)?;
        let mut walk = Walk::new(tree, &self.config);
        let value = walk.alpha_beta_rec(label, alpha, beta, Role::from_maximizing(maximizing), 0)?;
        Ok(walk.finish(Algorithm::AlphaBeta, value))
    }

    pub fn compare(&self, tree: &GameTree) -> Result<Comparison, TreeError> {
        let minimax = self.minimax(tree)?;
        let alpha_beta = self.alpha_beta(tree)?;
        log::info!(
            "minimax {} over {} leaves, alpha-beta {} over {} leaves ({} cutoffs)",
            minimax.value,
            minimax.leaves,
            alpha_beta.value,
            alpha_beta.leaves,
            alpha_beta.cutoffs
        );
        Ok(Comparison {
            leaves_pruned: minimax.leaves.saturating_sub(alpha_beta.leaves),
            minimax,
            alpha_beta,
        })
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::new(EvaluatorConfig::default())
    }
}

struct Walk<'a> {
    tree: &'a GameTree,
    config: &'a EvaluatorConfig,
    stats: SearchStats,
    trace: EvalTrace,
}

impl<'a> Walk<'a> {
    fn new(tree: &'a GameTree, config: &'a EvaluatorConfig) -> Self {
        Self {
            tree,
            config,
            stats: SearchStats::new(),
            trace: EvalTrace::new(),
        }
    }

    fn finish(self, algorithm: Algorithm, value: f64) -> Evaluation {
        log::debug!(
            "{:?} returns {} after {} nodes, {} cutoffs",
            algorithm,
            value,
            self.stats.nodes,
            self.stats.cutoffs
        );
        Evaluation {
            algorithm,
            value,
            nodes: self.stats.nodes,
            leaf_groups: self.stats.leaf_groups,
            leaves: self.stats.leaves,
            cutoffs: self.stats.cutoffs,
            trace: self.trace,
        }
    }

    fn record(&mut self, event: impl FnOnce() -> TraceEvent) {
        if self.config.trace {
            self.trace.push(event());
        }
    }

    fn visit(&mut self, label: &str, depth: usize) -> Result<&'a TreeEntry, TreeError> {
        if depth > self.config.max_depth {
            return Err(TreeError::DepthExceeded {
                label: label.to_string(),
                limit: self.config.max_depth,
            });
        }
        self.stats.nodes += 1;
        self.tree.entry(label)
    }

    fn leaf_group(
        &mut self,
        label: &str,
        values: &[f64],
        role: Role,
        depth: usize,
    ) -> Result<f64, TreeError> {
        let value = values
            .iter()
            .copied()
            .reduce(|a, b| role.pick(a, b))
            .ok_or_else(|| TreeError::EmptyLeafGroup {
                label: label.to_string(),
            })?;
        self.stats.leaf_groups += 1;
        self.stats.leaves += values.len() as u64;
        self.record(|| TraceEvent::Leaf {
            label: label.to_string(),
            role,
            depth,
            values: values.to_vec(),
            value,
        });
        Ok(value)
    }

    fn minimax_rec(&mut self, label: &str, role: Role, depth: usize) -> Result<f64, TreeError> {
        let children = match self.visit(label, depth)? {
            TreeEntry::Leaves(values) => return self.leaf_group(label, values, role, depth),
            TreeEntry::Children(children) => children,
        };

        self.record(|| TraceEvent::Enter {
            label: label.to_string(),
            role,
            depth,
        });
        let mut value = role.worst();
        for child in children {
            let child_value = self.minimax_rec(child, role.flip(), depth + 1)?;
            value = role.pick(value, child_value);
        }
        self.record(|| TraceEvent::Exit {
            label: label.to_string(),
            role,
            depth,
            value,
        });
        Ok(value)
    }

    fn alpha_beta_rec(
        &mut self,
        label: &str,
        mut alpha: f64,
        mut beta: f64,
        role: Role,
        depth: usize,
    ) -> Result<f64, TreeError> {
        let children = match self.visit(label, depth)? {
            TreeEntry::Leaves(values) => return self.leaf_group(label, values, role, depth),
            TreeEntry::Children(children) => children,
        };

        self.record(|| TraceEvent::Enter {
            label: label.to_string(),
            role,
            depth,
        });
        let mut value = role.worst();
        for (index, child) in children.iter().enumerate() {
            let child_value = self.alpha_beta_rec(child, alpha, beta, role.flip(), depth + 1)?;
            value = role.pick(value, child_value);
            match role {
                Role::Max => alpha = alpha.max(value),
                Role::Min => beta = beta.min(value),
            }

            let remaining = &children[index + 1..];
            if beta <= alpha && !remaining.is_empty() {
                self.stats.cutoffs += 1;
                self.record(|| TraceEvent::Cutoff {
                    label: label.to_string(),
                    role,
                    depth,
                    alpha,
                    beta,
                    skipped: remaining.to_vec(),
                });
                break;
            }
        }
        self.record(|| TraceEvent::Exit {
            label: label.to_string(),
            role,
            depth,
            value,
        });
        Ok(value)
    }
}
