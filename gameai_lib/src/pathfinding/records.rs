use itertools::Itertools;

use crate::graph::{Connection, NodeIndex};

/// Search working state for one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRecord {
    pub node: NodeIndex,
    /// Connection used to reach `node`, `None` for the start record.
    pub connection: Option<Connection>,
    /// g-cost
    pub cost_so_far: f32,
    /// f-cost, g + h
    pub estimated_total_cost: f32,
}

impl NodeRecord {
    pub fn start(node: NodeIndex, h: f32) -> Self {
        NodeRecord {
            node,
            connection: None,
            cost_so_far: 0.,
            estimated_total_cost: h,
        }
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.connection.map(|c| c.from)
    }
}

/// Unordered records, extracted cheapest first. Equal f-costs leave in insertion order.
#[derive(Debug, Default)]
pub(crate) struct OpenList {
    records: Vec<NodeRecord>,
}

impl OpenList {
    pub fn push(&mut self, record: NodeRecord) {
        self.records.push(record);
    }

    pub fn pop_cheapest(&mut self) -> Option<NodeRecord> {
        let position = self
            .records
            .iter()
            .position_min_by(|a, b| a.estimated_total_cost.total_cmp(&b.estimated_total_cost))?;
        Some(self.records.remove(position))
    }

    pub fn get(&self, node: NodeIndex) -> Option<&NodeRecord> {
        self.records.iter().find(|r| r.node == node)
    }

    pub fn remove(&mut self, node: NodeIndex) {
        self.records.retain(|r| r.node != node);
    }
}

/// At most one finalized record per node, plus the order they were closed in.
#[derive(Debug)]
pub(crate) struct ClosedList {
    records: Vec<Option<NodeRecord>>,
    order: Vec<NodeIndex>,
}

impl ClosedList {
    pub fn new(node_count: usize) -> Self {
        ClosedList {
            records: vec![None; node_count],
            order: Vec::new(),
        }
    }

    pub fn insert(&mut self, record: NodeRecord) {
        if self.records[record.node].replace(record).is_none() {
            self.order.push(record.node);
        }
    }

    pub fn get(&self, node: NodeIndex) -> Option<&NodeRecord> {
        self.records.get(node).and_then(Option::as_ref)
    }

    pub fn remove(&mut self, node: NodeIndex) {
        if self.records[node].take().is_some() {
            self.order.retain(|&n| n != node);
        }
    }

    pub fn order(&self) -> &[NodeIndex] {
        &self.order
    }
}

/// Offers `record` to the search. A record for the same node with a g-cost no
/// higher than the candidate's wins, otherwise the stale one is evicted.
///
/// Returns whether the candidate entered the open list.
pub(crate) fn relax(open: &mut OpenList, closed: &mut ClosedList, record: NodeRecord) -> bool {
    let node = record.node;
    if let Some(existing) = closed.get(node) {
        if existing.cost_so_far <= record.cost_so_far {
            return false;
        }
        closed.remove(node);
    }
    if let Some(existing) = open.get(node) {
        if existing.cost_so_far <= record.cost_so_far {
            return false;
        }
        open.remove(node);
    }
    open.push(record);
    true
}

/// Follows parent links back from `end`, preferring closed records over open ones.
pub(crate) fn backtrack(closed: &ClosedList, open: &OpenList, end: NodeIndex) -> Vec<NodeIndex> {
    let mut path = vec![end];
    let mut current = end;
    while let Some(parent) = closed
        .get(current)
        .or_else(|| open.get(current))
        .and_then(NodeRecord::parent)
    {
        path.push(parent);
        current = parent;
    }
    path.reverse();
    path
}
