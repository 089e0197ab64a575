use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum SearchError {
    #[error("problem does not implement `{method}`")]
    NotImplemented { method: String },
    #[error("search gave up after {limit} expansions")]
    ExpansionLimit { limit: usize },
}

impl SearchError {
    pub fn not_implemented(method: impl Into<String>) -> Self {
        SearchError::NotImplemented {
            method: method.into(),
        }
    }
}

/// 目标描述：单一目标状态，或任意一个可接受的目标状态。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Goal<S> {
    Single(S),
    AnyOf(Vec<S>),
}

impl<S: PartialEq> Goal<S> {
    pub fn is_satisfied_by(&self, state: &S) -> bool {
        match self {
            Goal::Single(goal) => goal == state,
            Goal::AnyOf(goals) => goals.contains(state),
        }
    }
}

/// 形式化搜索问题。
///
/// 实现者至少提供初始状态、`actions` 与 `result`；若问题没有声明 `goal`，
/// 还需要覆盖 `goal_test`，否则搜索会以 `SearchError::NotImplemented` 失败。
/// 问题本身不持有任何可变的搜索状态。
pub trait Problem {
    type State: Clone + Eq + Hash + Debug;
    type Action: Clone + Debug;

    fn initial(&self) -> &Self::State;

    fn goal(&self) -> Option<&Goal<Self::State>> {
        None
    }

    /// Must be deterministic for a given state. An empty list marks a dead end.
    fn actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Only ever called with an action returned by `actions(state)`.
    fn result(&self, state: &Self::State, action: &Self::Action) -> Self::State;

    fn goal_test(&self, state: &Self::State) -> Result<bool, SearchError> {
        match self.goal() {
            Some(goal) => Ok(goal.is_satisfied_by(state)),
            None => Err(SearchError::not_implemented("goal_test")),
        }
    }

    /// Cost of reaching `to` from `from` via `action`, given cost `cost` up to `from`.
    /// Must not decrease `cost`.
    fn path_cost(
        &self,
        cost: f64,
        _from: &Self::State,
        _action: &Self::Action,
        _to: &Self::State,
    ) -> f64 {
        cost + 1.0
    }

    /// Objective for optimisation-style problems.
    fn value(&self, _state: &Self::State) -> Result<f64, SearchError> {
        Err(SearchError::not_implemented("value"))
    }
}
