use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;
use std::rc::Rc;

use super::node::Node;

struct Member<S, A> {
    node: Rc<Node<S, A>>,
    priority: f64,
    seq: u64,
}

/// Heap slot. It goes stale once its state is removed or replaced; stale slots
/// are dropped when they surface at the top of the heap.
struct Slot<S> {
    priority: f64,
    seq: u64,
    state: S,
}

impl<S> PartialEq for Slot<S> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<S> Eq for Slot<S> {}

impl<S> PartialOrd for Slot<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S> Ord for Slot<S> {
    // BinaryHeap is a max-heap: invert so the lowest priority, then the oldest
    // insertion, sits on top.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// 以状态为键的最小优先队列，支持按状态查询、删除与替换（惰性删除）。
pub struct Frontier<S, A> {
    heap: BinaryHeap<Slot<S>>,
    members: HashMap<S, Member<S, A>>,
    next_seq: u64,
}

impl<S, A> Frontier<S, A>
where
    S: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            members: HashMap::new(),
            next_seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, state: &S) -> bool {
        self.members.contains_key(state)
    }

    pub fn priority(&self, state: &S) -> Option<f64> {
        self.members.get(state).map(|member| member.priority)
    }

    /// Inserts `node`, replacing any member with the same state.
    pub fn push(&mut self, node: Rc<Node<S, A>>, priority: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Slot {
            priority,
            seq,
            state: node.state.clone(),
        });
        self.members.insert(
            node.state.clone(),
            Member {
                node,
                priority,
                seq,
            },
        );
    }

    pub fn remove(&mut self, state: &S) -> Option<Rc<Node<S, A>>> {
        self.members.remove(state).map(|member| member.node)
    }

    /// Pops the member with the lowest priority; ties go to the earliest insertion.
    pub fn pop(&mut self) -> Option<(Rc<Node<S, A>>, f64)> {
        while let Some(slot) = self.heap.pop() {
            let live = self
                .members
                .get(&slot.state)
                .is_some_and(|member| member.seq == slot.seq);
            if live {
                if let Some(member) = self.members.remove(&slot.state) {
                    return Some((member.node, member.priority));
                }
            }
        }
        None
    }
}

impl<S, A> Default for Frontier<S, A>
where
    S: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
