use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum TreeError {
    #[error("node `{label}` is not defined")]
    UnknownNode { label: String },
    #[error("leaf group `{label}` has no values")]
    EmptyLeafGroup { label: String },
    #[error("node `{label}` has no children")]
    EmptyChildren { label: String },
    #[error("node `{label}` is reachable from itself")]
    Cycle { label: String },
    #[error("node `{label}` lies deeper than the limit of {limit}")]
    DepthExceeded { label: String, limit: usize },
    #[error("tree has no unique root, candidates: {candidates:?}")]
    AmbiguousRoot { candidates: Vec<String> },
    #[error("invalid tree json: {message}")]
    Parse { message: String },
}

/// 博弈树节点的角色；根节点默认为 MAX，逐层交替。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Max,
    Min,
}

impl Role {
    pub fn from_maximizing(maximizing: bool) -> Self {
        if maximizing {
            Role::Max
        } else {
            Role::Min
        }
    }

    pub fn flip(self) -> Self {
        match self {
            Role::Max => Role::Min,
            Role::Min => Role::Max,
        }
    }

    /// Identity of the backup rule: nothing is worse for this role.
    pub fn worst(self) -> f64 {
        match self {
            Role::Max => f64::NEG_INFINITY,
            Role::Min => f64::INFINITY,
        }
    }

    pub fn pick(self, a: f64, b: f64) -> f64 {
        match self {
            Role::Max => a.max(b),
            Role::Min => a.min(b),
        }
    }

    pub fn at_depth(root: Role, depth: usize) -> Role {
        if depth % 2 == 0 {
            root
        } else {
            root.flip()
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Max => f.write_str("MAX"),
            Role::Min => f.write_str("MIN"),
        }
    }
}

/// 一个标签对应的内容：子节点标签列表，或一组叶子数值。
///
/// JSON 中字符串数组是子节点列表，数字数组是叶子组。
/// 空数组读作空叶子组，校验时报告 `EmptyLeafGroup`。
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum TreeEntry {
    Children(Vec<String>),
    Leaves(Vec<f64>),
}

impl<'de> Deserialize<'de> for TreeEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Children(Vec<String>),
            Leaves(Vec<f64>),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Children(children) if children.is_empty() => TreeEntry::Leaves(Vec::new()),
            Wire::Children(children) => TreeEntry::Children(children),
            Wire::Leaves(values) => TreeEntry::Leaves(values),
        })
    }
}

/// Wire form of a `GameTree`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeDocument {
    Rooted {
        root: String,
        nodes: BTreeMap<String, TreeEntry>,
    },
    Bare(BTreeMap<String, TreeEntry>),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Layer {
    Max,
    Min,
    Leaf,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Max => f.write_str("MAX"),
            Layer::Min => f.write_str("MIN"),
            Layer::Leaf => f.write_str("LEAF"),
        }
    }
}

impl From<Role> for Layer {
    fn from(role: Role) -> Self {
        match role {
            Role::Max => Layer::Max,
            Role::Min => Layer::Min,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Level {
    pub depth: usize,
    pub layer: Layer,
    pub labels: Vec<String>,
    /// Leaf values hanging at this depth, from leaf groups one level up.
    pub values: Vec<f64>,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self
            .labels
            .iter()
            .cloned()
            .chain(self.values.iter().map(|value| value.to_string()))
            .collect();
        write!(f, "Level {}: {} ({})", self.depth, items.join(" "), self.layer)
    }
}

/// 显式给出的博弈树：标签 → 子节点或叶子组。评估期间不可变。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "TreeDocument", into = "TreeDocument")]
pub struct GameTree {
    root: String,
    nodes: BTreeMap<String, TreeEntry>,
}

impl TryFrom<TreeDocument> for GameTree {
    type Error = TreeError;

    fn try_from(document: TreeDocument) -> Result<Self, Self::Error> {
        match document {
            TreeDocument::Rooted { root, nodes } => Ok(Self { root, nodes }),
            TreeDocument::Bare(nodes) => {
                let referenced: HashSet<&str> = nodes
                    .values()
                    .filter_map(|entry| match entry {
                        TreeEntry::Children(children) => Some(children),
                        TreeEntry::Leaves(_) => None,
                    })
                    .flatten()
                    .map(String::as_str)
                    .collect();
                let mut candidates: Vec<String> = nodes
                    .keys()
                    .filter(|label| !referenced.contains(label.as_str()))
                    .cloned()
                    .collect();
                match candidates.pop() {
                    Some(root) if candidates.is_empty() => Ok(Self { root, nodes }),
                    Some(root) => {
                        candidates.push(root);
                        Err(TreeError::AmbiguousRoot { candidates })
                    }
                    None => Err(TreeError::AmbiguousRoot { candidates }),
                }
            }
        }
    }
}

impl From<GameTree> for TreeDocument {
    fn from(tree: GameTree) -> Self {
        TreeDocument::Rooted {
            root: tree.root,
            nodes: tree.nodes,
        }
    }
}

impl GameTree {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            nodes: BTreeMap::new(),
        }
    }

    pub fn with_children(mut self, label: impl Into<String>, children: &[&str]) -> Self {
        let children = children.iter().map(|child| child.to_string()).collect();
        self.nodes.insert(label.into(), TreeEntry::Children(children));
        self
    }

    pub fn with_leaves(mut self, label: impl Into<String>, values: &[f64]) -> Self {
        self.nodes
            .insert(label.into(), TreeEntry::Leaves(values.to_vec()));
        self
    }

    /// Accepts `{"root": .., "nodes": {..}}` or a bare label map whose root is
    /// the only label no other node refers to.
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        serde_json::from_str(json).map_err(|error| TreeError::Parse {
            message: error.to_string(),
        })
    }

    pub fn to_json(&self) -> Result<String, TreeError> {
        serde_json::to_string(self).map_err(|error| TreeError::Parse {
            message: error.to_string(),
        })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn entry(&self, label: &str) -> Result<&TreeEntry, TreeError> {
        self.nodes.get(label).ok_or_else(|| TreeError::UnknownNode {
            label: label.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), TreeError> {
        self.validate_from(&self.root)
    }

    /// Checks everything reachable from `label`: every child is defined, no
    /// list is empty, and no node is its own descendant.
    pub fn validate_from(&self, label: &str) -> Result<(), TreeError> {
        enum Step<'a> {
            Visit(&'a str),
            Leave(&'a str),
        }

        let mut on_path: HashSet<&str> = HashSet::new();
        let mut done: HashSet<&str> = HashSet::new();
        let mut stack = vec![Step::Visit(label)];

        while let Some(step) = stack.pop() {
            match step {
                Step::Leave(label) => {
                    on_path.remove(label);
                    done.insert(label);
                }
                Step::Visit(label) => {
                    if on_path.contains(label) {
                        return Err(TreeError::Cycle {
                            label: label.to_string(),
                        });
                    }
                    if done.contains(label) {
                        continue;
                    }
                    let (key, entry) =
                        self.nodes
                            .get_key_value(label)
                            .ok_or_else(|| TreeError::UnknownNode {
                                label: label.to_string(),
                            })?;
                    match entry {
                        TreeEntry::Leaves(values) if values.is_empty() => {
                            return Err(TreeError::EmptyLeafGroup { label: key.clone() });
                        }
                        TreeEntry::Leaves(_) => {
                            done.insert(key.as_str());
                        }
                        TreeEntry::Children(children) if children.is_empty() => {
                            return Err(TreeError::EmptyChildren { label: key.clone() });
                        }
                        TreeEntry::Children(children) => {
                            on_path.insert(key.as_str());
                            stack.push(Step::Leave(key.as_str()));
                            stack.extend(children.iter().rev().map(|c| Step::Visit(c.as_str())));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// MAX/MIN/LEAF layering per depth, breadth-first in child order.
    pub fn levels(&self, root_role: Role) -> Result<Vec<Level>, TreeError> {
        self.validate()?;
        let mut levels: Vec<Level> = Vec::new();
        let mut queue = VecDeque::from([(self.root.as_str(), 0usize)]);
        let mut seen: BTreeSet<&str> = BTreeSet::new();

        while let Some((label, depth)) = queue.pop_front() {
            if !seen.insert(label) {
                continue;
            }
            level_at(&mut levels, depth, root_role).labels.push(label.to_string());
            match self.entry(label)? {
                TreeEntry::Children(children) => {
                    queue.extend(children.iter().map(|child| (child.as_str(), depth + 1)));
                }
                TreeEntry::Leaves(values) => {
                    level_at(&mut levels, depth + 1, root_role)
                        .values
                        .extend_from_slice(values);
                }
            }
        }

        for level in &mut levels {
            if level.labels.is_empty() {
                level.layer = Layer::Leaf;
            }
        }
        Ok(levels)
    }

    /// 课程中的四层示例树：A(MAX) → B C D(MIN) → E..J(MAX) → 叶子。
    pub fn textbook() -> Self {
        GameTree::new("A")
            .with_children("A", &["B", "C", "D"])
            .with_children("B", &["E", "F"])
            .with_children("C", &["G", "H"])
            .with_children("D", &["I", "J"])
            .with_leaves("E", &[1.0, 5.0])
            .with_leaves("F", &[9.0, 3.0])
            .with_leaves("G", &[9.0, 7.0])
            .with_leaves("H", &[8.0, 7.0])
            .with_leaves("I", &[2.0, 3.0])
            .with_leaves("J", &[5.0, 6.0])
    }

    /// 三个 MIN 叶子组的浅层示例树。
    pub fn reordered() -> Self {
        GameTree::new("A")
            .with_children("A", &["B", "C", "D"])
            .with_leaves("B", &[12.0, 3.0])
            .with_leaves("C", &[8.0, 10.0])
            .with_leaves("D", &[5.0, 14.0])
    }

    /// Uniform tree with `depth` labelled levels (the last one holding leaf
    /// groups) and `branching` children or values per node. Values are whole
    /// numbers in `0..100` so traces stay readable.
    pub fn random(depth: usize, branching: usize, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let branching = branching.max(1);
        let depth = depth.max(1);
        let mut tree = GameTree::new("N0");
        let mut next_id = 1usize;
        let mut frontier = vec!["N0".to_string()];

        for level in 0..depth {
            let mut next_frontier = Vec::new();
            for label in frontier {
                if level + 1 == depth {
                    let values: Vec<f64> = (0..branching)
                        .map(|_| rng.gen_range(0..100) as f64)
                        .collect();
                    tree.nodes.insert(label, TreeEntry::Leaves(values));
                } else {
                    let children: Vec<String> = (0..branching)
                        .map(|offset| format!("N{}", next_id + offset))
                        .collect();
                    next_id += branching;
                    next_frontier.extend(children.iter().cloned());
                    tree.nodes.insert(label, TreeEntry::Children(children));
                }
            }
            frontier = next_frontier;
        }
        tree
    }
}

fn level_at(levels: &mut Vec<Level>, depth: usize, root_role: Role) -> &mut Level {
    while levels.len() <= depth {
        let depth = levels.len();
        levels.push(Level {
            depth,
            layer: Role::at_depth(root_role, depth).into(),
            labels: Vec::new(),
            values: Vec::new(),
        });
    }
    &mut levels[depth]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textbook_tree_is_valid() {
        let tree = GameTree::textbook();
        assert_eq!(tree.root(), "A");
        assert_eq!(tree.len(), 10);
        assert_eq!(tree.validate(), Ok(()));
    }

    #[test]
    fn bare_json_infers_root() {
        let tree = GameTree::from_json(r#"{"A": ["B", "C"], "B": [1, 5], "C": [9, 3]}"#).unwrap();
        assert_eq!(tree.root(), "A");
        assert_eq!(tree.entry("B"), Ok(&TreeEntry::Leaves(vec![1.0, 5.0])));
        assert_eq!(
            tree.entry("A"),
            Ok(&TreeEntry::Children(vec!["B".into(), "C".into()]))
        );
    }

    #[test]
    fn rooted_json_round_trips() {
        let tree = GameTree::textbook();
        let json = tree.to_json().unwrap();
        assert!(json.contains("\"root\":\"A\""));
        assert_eq!(GameTree::from_json(&json).unwrap(), tree);
    }

    #[test]
    fn bare_json_with_two_roots_is_rejected() {
        let err = GameTree::from_json(r#"{"A": [1], "B": [2]}"#).unwrap_err();
        assert!(matches!(err, TreeError::Parse { .. }));
    }

    #[test]
    fn dangling_child_is_reported() {
        let tree = GameTree::new("A")
            .with_children("A", &["B", "X"])
            .with_leaves("B", &[1.0]);
        assert_eq!(
            tree.validate(),
            Err(TreeError::UnknownNode { label: "X".into() })
        );
    }

    #[test]
    fn empty_lists_are_reported() {
        let tree = GameTree::new("A").with_children("A", &["B"]).with_leaves("B", &[]);
        assert_eq!(
            tree.validate(),
            Err(TreeError::EmptyLeafGroup { label: "B".into() })
        );
        let tree = GameTree::new("A").with_children("A", &[]);
        assert_eq!(
            tree.validate(),
            Err(TreeError::EmptyChildren { label: "A".into() })
        );
    }

    #[test]
    fn empty_json_list_is_an_empty_leaf_group() {
        let tree = GameTree::from_json(r#"{"A": ["B", "C"], "B": [1, 2], "C": []}"#).unwrap();
        assert_eq!(tree.entry("C"), Ok(&TreeEntry::Leaves(Vec::new())));
        assert_eq!(
            tree.validate(),
            Err(TreeError::EmptyLeafGroup { label: "C".into() })
        );
    }

    #[test]
    fn cycle_is_reported() {
        let tree = GameTree::new("A")
            .with_children("A", &["B"])
            .with_children("B", &["C", "A"])
            .with_leaves("C", &[1.0]);
        assert_eq!(tree.validate(), Err(TreeError::Cycle { label: "A".into() }));
    }

    #[test]
    fn shared_subtree_is_not_a_cycle() {
        let tree = GameTree::new("A")
            .with_children("A", &["B", "C"])
            .with_children("B", &["D"])
            .with_children("C", &["D"])
            .with_leaves("D", &[4.0]);
        assert_eq!(tree.validate(), Ok(()));
    }

    #[test]
    fn textbook_levels_alternate_down_to_leaves() {
        let levels = GameTree::textbook().levels(Role::Max).unwrap();
        let layers: Vec<Layer> = levels.iter().map(|level| level.layer).collect();
        assert_eq!(layers, vec![Layer::Max, Layer::Min, Layer::Max, Layer::Leaf]);
        assert_eq!(levels[1].labels, vec!["B", "C", "D"]);
        assert_eq!(levels[3].values.len(), 12);
        assert_eq!(levels[0].to_string(), "Level 0: A (MAX)");
        assert_eq!(levels[1].to_string(), "Level 1: B C D (MIN)");
    }

    #[test]
    fn random_tree_is_reproducible_and_valid() {
        let a = GameTree::random(4, 3, 7);
        let b = GameTree::random(4, 3, 7);
        assert_eq!(a, b);
        assert_eq!(a.validate(), Ok(()));
        // 1 + 3 + 9 + 27 labelled nodes.
        assert_eq!(a.len(), 40);
        let levels = a.levels(Role::Max).unwrap();
        assert_eq!(levels.last().map(|level| level.values.len()), Some(81));
    }
}
