//! Per-state search statistics, stored in an arena and indexed by state so
//! that transpositions share one node.

use fxhash::FxHashMap;
use pocket_core::{ACTION_COUNT, Action, CubeState};

pub type NodeId = u32;

/// Statistics of one state and its outgoing edges, indexed by action.
#[derive(Debug, Clone)]
pub struct SearchNode {
    pub(crate) state: CubeState,
    pub(crate) visit_count: [u32; ACTION_COUNT],
    pub(crate) max_action_value: [f32; ACTION_COUNT],
    pub(crate) prior_probability: [f32; ACTION_COUNT],
    pub(crate) virtual_loss: [f32; ACTION_COUNT],
    pub(crate) children: Option<[CubeState; ACTION_COUNT]>,
}

impl SearchNode {
    fn new(state: CubeState) -> Self {
        Self {
            state,
            visit_count: [0; ACTION_COUNT],
            max_action_value: [0.0; ACTION_COUNT],
            prior_probability: [0.0; ACTION_COUNT],
            virtual_loss: [0.0; ACTION_COUNT],
            children: None,
        }
    }

    pub fn state(&self) -> &CubeState {
        &self.state
    }

    pub fn visit_count(&self) -> &[u32; ACTION_COUNT] {
        &self.visit_count
    }

    pub fn max_action_value(&self) -> &[f32; ACTION_COUNT] {
        &self.max_action_value
    }

    pub fn prior_probability(&self) -> &[f32; ACTION_COUNT] {
        &self.prior_probability
    }

    pub fn virtual_loss(&self) -> &[f32; ACTION_COUNT] {
        &self.virtual_loss
    }

    /// The successor under every action, once this node has been expanded.
    pub fn children(&self) -> Option<&[CubeState; ACTION_COUNT]> {
        self.children.as_ref()
    }

    pub fn is_expanded(&self) -> bool {
        self.children.is_some()
    }

    pub fn total_visits(&self) -> u32 {
        self.visit_count.iter().sum()
    }
}

/// The tree was asked to hold more than its configured number of nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeFull(pub usize);

/// Every state the search has touched, each with exactly one node.
#[derive(Debug, Clone, Default)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
    index: FxHashMap<CubeState, NodeId>,
    max_nodes: Option<usize>,
}

impl SearchTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tree that refuses to create more than `max_nodes` nodes.
    #[must_use]
    pub fn with_max_nodes(mut self, max_nodes: Option<usize>) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// The node of `state`, created with zeroed statistics if absent.
    ///
    /// # Errors
    ///
    /// If creating the node would exceed the node limit.
    pub(crate) fn get_or_create(&mut self, state: &CubeState) -> Result<NodeId, TreeFull> {
        if let Some(&id) = self.index.get(state) {
            return Ok(id);
        }
        let limit = self.max_nodes.unwrap_or(NodeId::MAX as usize);
        if self.nodes.len() >= limit {
            return Err(TreeFull(limit));
        }
        // The limit above keeps every index within `NodeId`
        #[allow(clippy::cast_possible_truncation)]
        let id = self.nodes.len() as NodeId;
        self.nodes.push(SearchNode::new(*state));
        self.index.insert(*state, id);
        Ok(id)
    }

    pub fn id(&self, state: &CubeState) -> Option<NodeId> {
        self.index.get(state).copied()
    }

    pub fn get(&self, state: &CubeState) -> Option<&SearchNode> {
        self.id(state).map(|id| self.node(id))
    }

    /// # Panics
    ///
    /// If `id` was not handed out by this tree.
    pub fn node(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id as usize]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id as usize]
    }

    pub fn has_children(&self, state: &CubeState) -> bool {
        self.get(state).is_some_and(SearchNode::is_expanded)
    }

    pub fn children(&self, state: &CubeState) -> Option<&[CubeState; ACTION_COUNT]> {
        self.get(state).and_then(SearchNode::children)
    }

    /// Record the successors of `id`. A node's children never change once
    /// recorded.
    pub(crate) fn record_edges(&mut self, id: NodeId, children: [CubeState; ACTION_COUNT]) {
        let node = self.node_mut(id);
        debug_assert!(node.children.is_none_or(|recorded| recorded == children));
        node.children.get_or_insert(children);
    }

    pub(crate) fn set_priors(&mut self, id: NodeId, priors: [f32; ACTION_COUNT]) {
        self.node_mut(id).prior_probability = priors;
    }

    pub(crate) fn add_virtual_loss(&mut self, id: NodeId, action: Action, amount: f32) {
        self.node_mut(id).virtual_loss[action.index()] += amount;
    }

    /// Fold a leaf value into the edge `(id, action)` and release the virtual
    /// loss the pending path placed on it.
    pub(crate) fn backup_edge(&mut self, id: NodeId, action: Action, value: f32, virtual_loss: f32) {
        let node = self.node_mut(id);
        let i = action.index();
        node.visit_count[i] += 1;
        node.max_action_value[i] = node.max_action_value[i].max(value);
        node.virtual_loss[i] -= virtual_loss;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn expanded_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_expanded()).count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SearchNode> {
        self.nodes.iter()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
    }
}
