//! Designer edges between nodes.
//!
//! Edges always leave a node's right handle and enter the next node's left
//! handle. Only state-to-state transitions carry an arrowhead; edges touching
//! an info node are plain connectors.

use serde::{Deserialize, Serialize};

use crate::graph::node::{INFO_NODE_PREFIX, Node, NodeId};

/// Unique identifier for an edge within a designer graph.
pub type EdgeId = String;

/// Renderer edge type every designer edge uses.
pub const DEFAULT_EDGE_TYPE: &str = "default";

const EDGE_STROKE: &str = "#b1b1b7";
const INFO_EDGE_STROKE: &str = "#d0d0d5";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HandleSide {
    Left,
    Right,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MarkerType {
    Arrow,
    #[default]
    ArrowClosed,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ArrowMarker {
    #[serde(rename = "type")]
    pub marker_type: MarkerType,
    pub width: f64,
    pub height: f64,
    pub color: String,
}

impl Default for ArrowMarker {
    fn default() -> Self {
        Self {
            marker_type: MarkerType::ArrowClosed,
            width: 20.0,
            height: 20.0,
            color: EDGE_STROKE.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke: String,
    pub stroke_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<String>,
}

impl EdgeStyle {
    /// Style for transitions between states.
    pub fn transition() -> Self {
        Self {
            stroke: EDGE_STROKE.to_string(),
            stroke_width: 1.5,
            stroke_dasharray: None,
        }
    }

    /// Lighter, dashed style for edges entering an info node.
    pub fn annotation() -> Self {
        Self {
            stroke: INFO_EDGE_STROKE.to_string(),
            stroke_width: 1.0,
            stroke_dasharray: Some("4 2".to_string()),
        }
    }
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self::transition()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub source_handle: HandleSide,
    pub target_handle: HandleSide,
    #[serde(rename = "type")]
    pub edge_type: String,
    #[serde(default)]
    pub style: EdgeStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_end: Option<ArrowMarker>,
}

impl Edge {
    /// Builds the directed edge `source -> target`.
    ///
    /// `suffix` makes the id unique even when the same pair is connected twice.
    pub fn connect(
        source: &Node,
        target: &Node,
        suffix: &str,
    ) -> Self {
        let id = format!("edge-{}-{}-{}", source.id, target.id, suffix);

        let (style, marker_end) = if target.id.starts_with(INFO_NODE_PREFIX) {
            (EdgeStyle::annotation(), None)
        } else if Self::shows_arrow(source, target) {
            (EdgeStyle::transition(), Some(ArrowMarker::default()))
        } else {
            (EdgeStyle::transition(), None)
        };

        Self {
            id,
            source: source.id.clone(),
            target: target.id.clone(),
            source_handle: HandleSide::Right,
            target_handle: HandleSide::Left,
            edge_type: DEFAULT_EDGE_TYPE.to_string(),
            style,
            marker_end,
        }
    }

    /// Info nodes are passthrough annotations, so only edges between two
    /// non-info nodes get an arrowhead.
    pub fn shows_arrow(
        source: &Node,
        target: &Node,
    ) -> bool {
        !source.is_info() && !target.is_info()
    }

    pub fn touches(
        &self,
        nid: &str,
    ) -> bool {
        self.source == nid || self.target == nid
    }
}

/// Renderer-owned bookkeeping of which node handles are connected.
///
/// The designer calls this after every edge it creates; it never reads
/// handle state back.
pub trait HandleConnectivity: Send + Sync {
    fn update_handles(
        &self,
        edge: &Edge,
    );
}

/// Handle tracker for hosts that do not track handles.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandles;

impl HandleConnectivity for NoopHandles {
    fn update_handles(
        &self,
        _: &Edge,
    ) {
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::graph::{
        node::{Dimensions, NewNode, NodeKind, Position},
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

    #[test]
    fn test_state_to_state_edge_has_closed_arrow() {
        let edge = Edge::connect(&node("start-flow-root-0", "start-flow"), &node("approval-x-1", "approval"), "2");

        assert_eq!(edge.id, "edge-start-flow-root-0-approval-x-1-2");
        assert_eq!(edge.marker_end.as_ref().map(|m| m.marker_type), Some(MarkerType::ArrowClosed));
        assert_eq!(edge.source_handle, HandleSide::Right);
        assert_eq!(edge.target_handle, HandleSide::Left);
    }

    #[test]
    fn test_edge_from_info_node_has_no_arrow() {
        let edge = Edge::connect(&node("info-node-a-1", "info"), &node("approval-info-node-a-1-2", "approval"), "3");
        assert!(edge.marker_end.is_none());
        assert_eq!(edge.style, EdgeStyle::transition());
    }

    #[test]
    fn test_edge_into_info_node_uses_annotation_style() {
        let edge = Edge::connect(&node("approval-root-0", "approval"), &node("info-node-approval-root-0-1", "info"), "2");
        assert!(edge.marker_end.is_none());
        assert_eq!(edge.style, EdgeStyle::annotation());
    }

    #[test]
    fn test_info_prefix_alone_drops_marker() {
        // id looks like an info node even though the kind says otherwise
        let edge = Edge::connect(&node("approval-root-0", "approval"), &node("info-node-legacy", "approval"), "1");
        assert!(edge.marker_end.is_none());
    }

    #[test]
    fn test_edge_wire_shape() {
        let edge = Edge::connect(&node("a", "approval"), &node("b", "approval"), "1");
        let value = serde_json::to_value(&edge).unwrap();

        assert_eq!(value["sourceHandle"], json!("right"));
        assert_eq!(value["targetHandle"], json!("left"));
        assert_eq!(value["type"], json!("default"));
        assert_eq!(value["markerEnd"]["type"], json!("arrowclosed"));
        assert_eq!(value["style"]["strokeWidth"], json!(1.5));
    }
}
