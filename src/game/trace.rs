use std::fmt;

use serde::{Deserialize, Serialize};

use super::tree::Role;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    Enter {
        label: String,
        role: Role,
        depth: usize,
    },
    Leaf {
        label: String,
        role: Role,
        depth: usize,
        values: Vec<f64>,
        value: f64,
    },
    /// `beta <= alpha` after a child while siblings remained; `skipped` lists them.
    Cutoff {
        label: String,
        role: Role,
        depth: usize,
        alpha: f64,
        beta: f64,
        skipped: Vec<String>,
    },
    Exit {
        label: String,
        role: Role,
        depth: usize,
        value: f64,
    },
}

/// 一次评估按真实的从左到右顺序记录下的事件序列。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EvalTrace {
    events: Vec<TraceEvent>,
}

impl EvalTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: TraceEvent) {
        log::trace!("{}", TraceLine(&event));
        self.events.push(event);
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Labels of the leaf groups in the order they were examined.
    pub fn leaf_groups(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TraceEvent::Leaf { label, .. } => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every leaf value examined, flattened in visiting order.
    pub fn visited_leaves(&self) -> Vec<f64> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TraceEvent::Leaf { values, .. } => Some(values.iter().copied()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// One rendered line per event, indented by depth.
    pub fn lines(&self) -> Vec<String> {
        self.events
            .iter()
            .map(|event| TraceLine(event).to_string())
            .collect()
    }

    /// `(label, depth)` of every node that pruned its remaining children.
    pub fn cutoffs(&self) -> Vec<(&str, usize)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TraceEvent::Cutoff { label, depth, .. } => Some((label.as_str(), *depth)),
                _ => None,
            })
            .collect()
    }
}

struct TraceLine<'a>(&'a TraceEvent);

impl fmt::Display for TraceLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            TraceEvent::Enter { label, role, depth } => {
                write!(f, "{}{} at node {}", indent(*depth), role, label)
            }
            TraceEvent::Leaf {
                label,
                role,
                depth,
                values,
                value,
            } => write!(
                f,
                "{}Leaf {} [{}] → {} returns {}",
                indent(*depth),
                label,
                join(values),
                role,
                value
            ),
            TraceEvent::Cutoff {
                label,
                depth,
                alpha,
                beta,
                skipped,
                ..
            } => write!(
                f,
                "{}Pruned at node {} (alpha {}, beta {}), skipping {}",
                indent(*depth),
                label,
                alpha,
                beta,
                skipped.join(" ")
            ),
            TraceEvent::Exit {
                label,
                role,
                depth,
                value,
            } => write!(
                f,
                "{}{} at node {} returns {}",
                indent(*depth),
                role,
                label,
                value
            ),
        }
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

fn join(values: &[f64]) -> String {
    values
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for EvalTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "{}", TraceLine(event))?;
        }
        Ok(())
    }
}
