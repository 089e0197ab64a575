use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use super::problem::Problem;

/// 搜索树节点。
///
/// 父节点通过 `Rc` 单向持有，子节点不回指父节点，因此不会形成环。
/// 同一状态经两条路径到达时会有两个节点，但它们在 `Eq`/`Hash` 意义下相同。
#[derive(Clone)]
pub struct Node<S, A> {
    pub state: S,
    pub parent: Option<Rc<Node<S, A>>>,
    pub action: Option<A>,
    pub path_cost: f64,
    pub depth: usize,
}

impl<S, A> Node<S, A> {
    pub fn root(state: S) -> Self {
        Self {
            state,
            parent: None,
            action: None,
            path_cost: 0.0,
            depth: 0,
        }
    }

    fn child(state: S, parent: Rc<Node<S, A>>, action: A, path_cost: f64) -> Self {
        let depth = parent.depth + 1;
        Self {
            state,
            parent: Some(parent),
            action: Some(action),
            path_cost,
            depth,
        }
    }

    pub fn child_node<P>(self: &Rc<Self>, problem: &P, action: A) -> Node<S, A>
    where
        P: Problem<State = S, Action = A> + ?Sized,
    {
        let next_state = problem.result(&self.state, &action);
        let cost = problem.path_cost(self.path_cost, &self.state, &action, &next_state);
        Node::child(next_state, Rc::clone(self), action, cost)
    }

    /// Nodes reachable in one step, in the order `problem.actions` lists them.
    pub fn expand<P>(self: &Rc<Self>, problem: &P) -> Vec<Node<S, A>>
    where
        P: Problem<State = S, Action = A> + ?Sized,
    {
        problem
            .actions(&self.state)
            .into_iter()
            .map(|action| self.child_node(problem, action))
            .collect()
    }

    /// Root first, `self` last.
    pub fn path(self: &Rc<Self>) -> Vec<Rc<Node<S, A>>> {
        let mut path_back = Vec::with_capacity(self.depth + 1);
        let mut cursor = Some(Rc::clone(self));
        while let Some(node) = cursor {
            cursor = node.parent.clone();
            path_back.push(node);
        }
        path_back.reverse();
        path_back
    }

    /// Actions from the root to this node; the root contributes none.
    pub fn solution(self: &Rc<Self>) -> Vec<A>
    where
        A: Clone,
    {
        self.path()
            .iter()
            .filter_map(|node| node.action.clone())
            .collect()
    }

    pub fn states(self: &Rc<Self>) -> Vec<S>
    where
        S: Clone,
    {
        self.path().iter().map(|node| node.state.clone()).collect()
    }
}

impl<S: PartialEq, A> PartialEq for Node<S, A> {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
    }
}

impl<S: Eq, A> Eq for Node<S, A> {}

impl<S: Hash, A> Hash for Node<S, A> {
    fn hash<H: Hasher>(&self, hasher: &mut H) {
        self.state.hash(hasher);
    }
}

impl<S: fmt::Debug, A> fmt::Debug for Node<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Node {:?}>", self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::problem::{Goal, Problem};
    use std::collections::HashSet;

    /// Walks along a line of integers, paying the target position per step.
    struct Line {
        start: i32,
        goal: Goal<i32>,
    }

    impl Problem for Line {
        type State = i32;
        type Action = &'static str;

        fn initial(&self) -> &i32 {
            &self.start
        }

        fn goal(&self) -> Option<&Goal<i32>> {
            Some(&self.goal)
        }

        fn actions(&self, _state: &i32) -> Vec<&'static str> {
            vec!["left", "right"]
        }

        fn result(&self, state: &i32, action: &&'static str) -> i32 {
            match *action {
                "left" => state - 1,
                _ => state + 1,
            }
        }

        fn path_cost(&self, cost: f64, _from: &i32, _action: &&'static str, to: &i32) -> f64 {
            cost + to.abs() as f64
        }
    }

    fn line() -> Line {
        Line {
            start: 0,
            goal: Goal::Single(2),
        }
    }

    #[test]
    fn expand_follows_action_order_and_costs() {
        let problem = line();
        let root = Rc::new(Node::root(0));
        let children = root.expand(&problem);
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].state, -1);
        assert_eq!(children[0].action, Some("left"));
        assert_eq!(children[1].state, 1);
        assert_eq!(children[1].depth, 1);
        assert_eq!(children[1].path_cost, 1.0);
    }

    #[test]
    fn solution_and_path_run_root_first() {
        let problem = line();
        let root = Rc::new(Node::root(0));
        let one = Rc::new(root.child_node(&problem, "right"));
        let two = Rc::new(one.child_node(&problem, "right"));

        assert_eq!(two.solution(), vec!["right", "right"]);
        assert_eq!(two.states(), vec![0, 1, 2]);
        assert_eq!(two.path().first().map(|n| n.depth), Some(0));
        assert_eq!(two.depth, 2);
        assert_eq!(two.path_cost, 3.0);
        assert!(root.solution().is_empty());
    }

    #[test]
    fn nodes_with_equal_state_collapse() {
        let problem = line();
        let root = Rc::new(Node::root(0));
        let right = Rc::new(root.child_node(&problem, "right"));
        let back = right.child_node(&problem, "left");

        assert_eq!(*root, back);
        assert_ne!(root.depth, back.depth);
        let set: HashSet<Node<i32, &str>> = [(*root).clone(), back].into_iter().collect();
        assert_eq!(set.len(), 1);
    }
}
