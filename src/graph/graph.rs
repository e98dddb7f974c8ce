//! Ordered node and edge collections behind the designer canvas.
//!
//! Nodes keep insertion order because the renderer paints them in that
//! order. A `petgraph` view is built on demand for traversals (exporting
//! state transitions).

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::{
    FlowdraftError, Result,
    graph::{
        edge::{Edge, EdgeId},
        node::{Node, NodeAction, NodeId, NodeKind, SelectMode},
    },
};

/// Result of inserting one node.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InsertOutcome {
    /// ids of nodes dropped because a start-flow node replaced the graph
    pub replaced: Vec<NodeId>,
    /// ids of placeholder nodes evicted by the insert
    pub evicted: Vec<NodeId>,
    /// ids of edges dropped along with those nodes
    pub dropped_edges: Vec<EdgeId>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FlowGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from stored parts, checking the invariants the editor
    /// relies on: unique ids, at most one start-flow node, edges between
    /// existing nodes.
    pub fn from_parts(
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    ) -> Result<Self> {
        let mut node_ids = HashSet::new();
        for node in nodes.iter() {
            if !node_ids.insert(node.id.as_str()) {
                return Err(FlowdraftError::Node(format!("duplicate node id {}", node.id)));
            }
        }

        let start_flows = nodes.iter().filter(|n| n.is_start_flow()).count();
        if start_flows > 1 {
            return Err(FlowdraftError::Node(format!("expected at most one start-flow node, found {}", start_flows)));
        }

        let mut edge_ids = HashSet::new();
        for edge in edges.iter() {
            if !edge_ids.insert(edge.id.as_str()) {
                return Err(FlowdraftError::Edge(format!("duplicate edge id {}", edge.id)));
            }
            if !node_ids.contains(edge.source.as_str()) {
                return Err(FlowdraftError::Edge(format!("source node {} not found", edge.source)));
            }
            if !node_ids.contains(edge.target.as_str()) {
                return Err(FlowdraftError::Edge(format!("target node {} not found", edge.target)));
            }
        }

        Ok(Self {
            nodes,
            edges,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// get node by id
    pub fn node(
        &self,
        id: &str,
    ) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// get edge by id
    pub fn edge(
        &self,
        id: &str,
    ) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn contains(
        &self,
        id: &str,
    ) -> bool {
        self.node(id).is_some()
    }

    pub fn start_flow(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.is_start_flow())
    }

    /// Resets selection marks and pending action on every node.
    pub fn mark_all_not_selected(&mut self) {
        for node in self.nodes.iter_mut() {
            node.data.mode_of_select = SelectMode::NotSelect;
            node.data.action = NodeAction::Create;
        }
    }

    /// Marks `id` selected and every other node not selected.
    pub fn mark_selected(
        &mut self,
        id: &str,
    ) {
        for node in self.nodes.iter_mut() {
            node.data.mode_of_select = if node.id == id {
                SelectMode::Select
            } else {
                SelectMode::NotSelect
            };
        }
    }

    /// Adds a node.
    ///
    /// A start-flow node replaces the whole graph. Any other node evicts the
    /// placeholder nodes first and is appended.
    pub fn insert_node(
        &mut self,
        node: Node,
    ) -> InsertOutcome {
        let mut outcome = InsertOutcome::default();

        if node.is_start_flow() {
            outcome.replaced = self.nodes.drain(..).map(|n| n.id).collect();
            outcome.dropped_edges = self.edges.drain(..).map(|e| e.id).collect();
            debug!("start-flow {} replaced {} nodes", node.id, outcome.replaced.len());
        } else {
            let placeholders: Vec<NodeId> = self.nodes.iter().filter(|n| n.is_placeholder()).map(|n| n.id.clone()).collect();
            for id in placeholders {
                if let Some((_, edges)) = self.remove_node(&id) {
                    outcome.dropped_edges.extend(edges.into_iter().map(|e| e.id));
                }
                outcome.evicted.push(id);
            }
        }

        self.nodes.push(node);
        outcome
    }

    /// Adds an edge whose endpoints must already exist.
    pub fn add_edge(
        &mut self,
        edge: Edge,
    ) -> Result<()> {
        if !self.contains(&edge.source) {
            return Err(FlowdraftError::Edge(format!("source node {} not found", edge.source)));
        }
        if !self.contains(&edge.target) {
            return Err(FlowdraftError::Edge(format!("target node {} not found", edge.target)));
        }
        self.edges.push(edge);
        Ok(())
    }

    /// Removes a node together with every edge touching it.
    pub fn remove_node(
        &mut self,
        id: &str,
    ) -> Option<(Node, Vec<Edge>)> {
        let idx = self.nodes.iter().position(|n| n.id == id)?;
        let node = self.nodes.remove(idx);

        let (removed, kept): (Vec<Edge>, Vec<Edge>) = self.edges.drain(..).partition(|e| e.touches(id));
        self.edges = kept;

        Some((node, removed))
    }

    /// Changes a node's kind and display label in place.
    pub fn relabel_node(
        &mut self,
        id: &str,
        kind: NodeKind,
        label: Option<String>,
    ) -> Result<()> {
        if !self.contains(id) {
            return Err(FlowdraftError::Node(format!("node {} not found", id)));
        }
        if kind == NodeKind::StartFlow && self.start_flow_other_than(id) {
            return Err(FlowdraftError::Node("a start-flow node already exists".into()));
        }

        let node = self.nodes.iter_mut().find(|n| n.id == id).ok_or(FlowdraftError::Node(format!("node {} not found", id)))?;
        node.data.node_type = kind;
        node.data.label = label;
        Ok(())
    }

    fn start_flow_other_than(
        &self,
        id: &str,
    ) -> bool {
        self.nodes.iter().any(|n| n.is_start_flow() && n.id != id)
    }

    /// Directed `petgraph` view over the current nodes and edges.
    pub fn digraph(&self) -> (DiGraph<&Node, &Edge>, HashMap<&str, NodeIndex>) {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        for node in self.nodes.iter() {
            index.insert(node.id.as_str(), graph.add_node(node));
        }
        for edge in self.edges.iter() {
            if let (Some(s), Some(t)) = (index.get(edge.source.as_str()), index.get(edge.target.as_str())) {
                graph.add_edge(*s, *t, edge);
            }
        }

        (graph, index)
    }

    /// Output a human-readable representation of the graph
    pub fn schema(&self) -> String {
        let mut lines = Vec::new();

        lines.push("=== Designer Graph ===".to_string());
        lines.push(format!("Nodes: {}, Edges: {}", self.nodes.len(), self.edges.len()));
        lines.push(String::new());

        lines.push("--- Nodes ---".to_string());
        for node in self.nodes.iter() {
            lines.push(format!(
                "[{}] {} (type: {}, at: {:.0},{:.0}, size: {:.0}x{:.0})",
                node.id,
                node.state_name(),
                node.kind(),
                node.position.x,
                node.position.y,
                node.data.dimensions.width,
                node.data.dimensions.height
            ));
        }
        lines.push(String::new());

        lines.push("--- Edges ---".to_string());
        for edge in self.edges.iter() {
            let arrow = if edge.marker_end.is_some() { "-->" } else { "---" };
            lines.push(format!("{} {} {} (id: {})", edge.source, arrow, edge.target, edge.id));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        node::{Dimensions, NewNode, PLACEHOLDER_ROOT_ID, Position},
        state::StateData,
    };

    fn node(
        id: &str,
        kind: &str,
    ) -> Node {
        Node::new(NewNode {
            id: id.into(),
            kind: NodeKind::from(kind),
            position: Position::default(),
            state_data: StateData::default(),
            dimensions: Dimensions::new(150.0, 60.0),
            parent_state_name: String::new(),
            parent_info_node_id: None,
        })
    }

    fn sample() -> FlowGraph {
        let mut graph = FlowGraph::new();
        graph.insert_node(node("start-flow-root-0", "start-flow"));
        graph.insert_node(node("approval-start-flow-root-0-1", "approval"));
        let edge = Edge::connect(&graph.nodes()[0], &graph.nodes()[1], "2");
        graph.add_edge(edge).unwrap();
        graph
    }

    #[test]
    fn test_start_flow_replaces_everything() {
        let mut graph = sample();
        let outcome = graph.insert_node(node("start-flow-root-9", "start-flow"));

        assert_eq!(graph.nodes().len(), 1);
        assert_eq!(graph.nodes()[0].id, "start-flow-root-9");
        assert!(graph.edges().is_empty());
        assert_eq!(outcome.replaced.len(), 2);
        assert_eq!(outcome.dropped_edges.len(), 1);
    }

    #[test]
    fn test_placeholder_evicted_by_real_node() {
        let mut graph = FlowGraph::new();
        graph.insert_node(node(PLACEHOLDER_ROOT_ID, "defalt"));
        let outcome = graph.insert_node(node("approval-root-1", "approval"));

        assert_eq!(outcome.evicted, vec![PLACEHOLDER_ROOT_ID.to_string()]);
        assert_eq!(graph.nodes().len(), 1);
        assert!(!graph.contains(PLACEHOLDER_ROOT_ID));
    }

    #[test]
    fn test_add_edge_requires_endpoints() {
        let mut graph = sample();
        let ghost = node("ghost", "approval");
        let edge = Edge::connect(&graph.nodes()[0], &ghost, "3");
        assert!(graph.add_edge(edge).is_err());
        assert_eq!(graph.edges().len(), 1);
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let mut graph = sample();
        let (removed, edges) = graph.remove_node("approval-start-flow-root-0-1").unwrap();

        assert_eq!(removed.id, "approval-start-flow-root-0-1");
        assert_eq!(edges.len(), 1);
        assert!(graph.edges().is_empty());
        assert!(graph.remove_node("missing").is_none());
    }

    #[test]
    fn test_mark_all_not_selected() {
        let mut graph = sample();
        graph.mark_all_not_selected();
        assert!(graph.nodes().iter().all(|n| n.data.mode_of_select == SelectMode::NotSelect));

        graph.mark_selected("start-flow-root-0");
        assert_eq!(graph.nodes()[0].data.mode_of_select, SelectMode::Select);
        assert_eq!(graph.nodes()[1].data.mode_of_select, SelectMode::NotSelect);
    }

    #[test]
    fn test_relabel_node() {
        let mut graph = sample();
        graph.relabel_node("approval-start-flow-root-0-1", NodeKind::from("review"), Some("HR Review".into())).unwrap();

        let node = graph.node("approval-start-flow-root-0-1").unwrap();
        assert_eq!(node.kind(), &NodeKind::State("review".into()));
        assert_eq!(node.state_name(), "HR Review");

        assert!(graph.relabel_node("missing", NodeKind::Info, None).is_err());
        assert!(graph.relabel_node("approval-start-flow-root-0-1", NodeKind::StartFlow, None).is_err());
    }

    #[test]
    fn test_from_parts_validates() {
        let graph = sample();
        let rebuilt = FlowGraph::from_parts(graph.nodes().to_vec(), graph.edges().to_vec()).unwrap();
        assert_eq!(rebuilt, graph);

        let dup = vec![node("a", "approval"), node("a", "approval")];
        assert!(FlowGraph::from_parts(dup, vec![]).is_err());

        let two_starts = vec![node("s1", "start-flow"), node("s2", "start-flow")];
        assert!(FlowGraph::from_parts(two_starts, vec![]).is_err());

        let dangling = graph.edges().to_vec();
        assert!(FlowGraph::from_parts(vec![node("start-flow-root-0", "start-flow")], dangling).is_err());
    }

    #[test]
    fn test_digraph_mirrors_edges() {
        let graph = sample();
        let (dg, index) = graph.digraph();
        assert_eq!(dg.node_count(), 2);
        assert_eq!(dg.edge_count(), 1);
        let start = index["start-flow-root-0"];
        assert_eq!(dg.neighbors(start).count(), 1);
    }

    #[test]
    fn test_schema_lists_nodes_and_edges() {
        let schema = sample().schema();
        assert!(schema.contains("Nodes: 2, Edges: 1"));
        assert!(schema.contains("start-flow-root-0 --> approval-start-flow-root-0-1"));
    }
}
