//! The workflow document stored by the workflow backend.
//!
//! Besides the raw canvas (`workflowui`), the document carries a state list
//! and a transition list derived from the graph: `state -> info -> state`
//! chains collapse into one named transition.

use petgraph::{Direction, visit::EdgeRef};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    FlowdraftError, Result,
    graph::{Edge, FlowGraph, Node, NodeId, NodeKind, StateData},
};

/// Identity fields of a stored workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowHeader {
    pub tenant: String,
    pub action: String,
    pub id: String,
    pub name: String,
    pub collection_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowModel {
    pub tenant: String,
    pub action: String,
    pub id: String,
    pub name: String,
    pub collection_name: String,
    pub data: WorkflowData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowData {
    pub initial_state: Option<String>,
    pub states: Vec<StateModel>,
    pub transitions: Vec<TransitionModel>,
    pub workflowui: WorkflowUi,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkflowUi {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StateModel {
    pub name: String,
    pub node_id: NodeId,
    pub node_type: NodeKind,
    pub state_data: StateData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransitionModel {
    /// title or action of the info node between the two states
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub from: String,
    pub to: String,
    /// info node the transition passes through
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via: Option<NodeId>,
}

impl WorkflowModel {
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str::<WorkflowModel>(s).map_err(|e| FlowdraftError::Workflow(format!("{}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Builds the document for `graph`.
    pub fn from_graph(
        header: WorkflowHeader,
        graph: &FlowGraph,
    ) -> Result<Self> {
        trace!("model::from_graph({})", header.id);
        if header.id.is_empty() {
            return Err(FlowdraftError::Workflow("missing id in workflow".into()));
        }

        let states: Vec<StateModel> = graph
            .nodes()
            .iter()
            .filter(|n| is_state(n))
            .map(|n| StateModel {
                name: n.state_name(),
                node_id: n.id.clone(),
                node_type: n.kind().clone(),
                state_data: n.data.state_data.clone(),
            })
            .collect();

        Ok(Self {
            tenant: header.tenant,
            action: header.action,
            id: header.id,
            name: header.name,
            collection_name: header.collection_name,
            data: WorkflowData {
                initial_state: initial_state(graph),
                states,
                transitions: transitions(graph),
                workflowui: WorkflowUi {
                    nodes: graph.nodes().to_vec(),
                    edges: graph.edges().to_vec(),
                },
            },
        })
    }

    /// Rebuilds the canvas graph stored in `workflowui`.
    pub fn to_graph(&self) -> Result<FlowGraph> {
        FlowGraph::from_parts(self.data.workflowui.nodes.clone(), self.data.workflowui.edges.clone())
    }
}

fn is_state(node: &Node) -> bool {
    !node.is_info() && !node.is_placeholder()
}

/// The start-flow node, else the first state nothing points to.
fn initial_state(graph: &FlowGraph) -> Option<String> {
    if let Some(start) = graph.start_flow() {
        return Some(start.state_name());
    }

    let (dg, _) = graph.digraph();
    dg.node_indices()
        .find(|idx| is_state(dg[*idx]) && dg.neighbors_directed(*idx, Direction::Incoming).count() == 0)
        .map(|idx| dg[idx].state_name())
}

fn transitions(graph: &FlowGraph) -> Vec<TransitionModel> {
    let (dg, _) = graph.digraph();
    let mut transitions = Vec::new();

    for idx in dg.node_indices() {
        let source = dg[idx];
        if !is_state(source) {
            continue;
        }

        let mut outgoing: Vec<_> = dg.edges_directed(idx, Direction::Outgoing).collect();
        outgoing.sort_by_key(|e| e.id());

        for edge in outgoing {
            let next = dg[edge.target()];
            if next.is_info() {
                let mut hops: Vec<_> = dg.edges_directed(edge.target(), Direction::Outgoing).collect();
                hops.sort_by_key(|e| e.id());

                for hop in hops {
                    let target = dg[hop.target()];
                    if !is_state(target) {
                        continue;
                    }
                    transitions.push(TransitionModel {
                        name: next.state_title().map(str::to_string).or_else(|| next.data.state_data.action.clone()),
                        from: source.state_name(),
                        to: target.state_name(),
                        via: Some(next.id.clone()),
                    });
                }
            } else if is_state(next) {
                transitions.push(TransitionModel {
                    name: None,
                    from: source.state_name(),
                    to: next.state_name(),
                    via: None,
                });
            }
        }
    }

    transitions
}
