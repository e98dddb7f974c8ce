//! Events emitted while the designer graph changes.
//!
//! Renderers and property panels subscribe to these through the
//! [`ChannelEvent`](crate::ChannelEvent) instead of polling the graph.

use crate::{
    graph::{EdgeId, NodeId, NodeKind},
    runtime::OperationId,
    utils,
    viewport::Viewport,
};

#[derive(Debug, Clone, PartialEq)]
pub enum DesignerEvent {
    NodeAdded {
        node: NodeId,
        kind: NodeKind,
    },
    /// a start-flow node replaced the previous graph
    NodesReplaced {
        by: NodeId,
        removed: usize,
    },
    PlaceholderEvicted(NodeId),
    NodeRemoved(NodeId),
    NodeRelabeled(NodeId),
    EdgeAdded {
        edge: EdgeId,
        source: NodeId,
        target: NodeId,
    },
    EdgeRemoved(EdgeId),
    SelectionChanged(Option<NodeId>),
    ViewportChanged(Viewport),
    OperationCompleted {
        operation: OperationId,
        node: NodeId,
    },
    OperationCancelled(OperationId),
}

impl DesignerEvent {
    pub fn str(&self) -> &str {
        match self {
            DesignerEvent::NodeAdded { .. } => "NodeAdded",
            DesignerEvent::NodesReplaced { .. } => "NodesReplaced",
            DesignerEvent::PlaceholderEvicted(_) => "PlaceholderEvicted",
            DesignerEvent::NodeRemoved(_) => "NodeRemoved",
            DesignerEvent::NodeRelabeled(_) => "NodeRelabeled",
            DesignerEvent::EdgeAdded { .. } => "EdgeAdded",
            DesignerEvent::EdgeRemoved(_) => "EdgeRemoved",
            DesignerEvent::SelectionChanged(_) => "SelectionChanged",
            DesignerEvent::ViewportChanged(_) => "ViewportChanged",
            DesignerEvent::OperationCompleted { .. } => "OperationCompleted",
            DesignerEvent::OperationCancelled(_) => "OperationCancelled",
        }
    }

    /// Node the event is about, used for subscription filtering.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            DesignerEvent::NodeAdded { node, .. } => Some(node),
            DesignerEvent::NodesReplaced { by, .. } => Some(by),
            DesignerEvent::PlaceholderEvicted(node) => Some(node),
            DesignerEvent::NodeRemoved(node) => Some(node),
            DesignerEvent::NodeRelabeled(node) => Some(node),
            DesignerEvent::EdgeAdded { target, .. } => Some(target),
            DesignerEvent::SelectionChanged(node) => node.as_deref(),
            DesignerEvent::OperationCompleted { node, .. } => Some(node),
            DesignerEvent::EdgeRemoved(_) | DesignerEvent::ViewportChanged(_) | DesignerEvent::OperationCancelled(_) => None,
        }
    }
}

/// Event envelope delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub event: DesignerEvent,
    /// Timestamp in milliseconds.
    pub timestamp: i64,
}

impl Message {
    pub fn new(event: DesignerEvent) -> Self {
        Self {
            event,
            timestamp: utils::time::time_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_stamps_time() {
        let before = utils::time::time_millis();
        let message = Message::new(DesignerEvent::NodeRemoved("approval-root-0".into()));

        assert!(message.timestamp >= before);
        assert_eq!(message.event.str(), "NodeRemoved");
        assert_eq!(message.event.node_id(), Some("approval-root-0"));
        assert_eq!(DesignerEvent::SelectionChanged(None).node_id(), None);
    }
}
