use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::state::StateData;

/// node id
pub type NodeId = String;

/// Prefix shared by placeholder node ids.
pub const PLACEHOLDER_PREFIX: &str = "defalt-";
/// Id of the empty-canvas placeholder.
pub const PLACEHOLDER_ROOT_ID: &str = "defalt-root";
/// Prefix shared by info node ids.
pub const INFO_NODE_PREFIX: &str = "info-node";
/// Renderer node type every designer node uses.
pub const CUSTOM_NODE_TYPE: &str = "custom";

/// The `nodeType` of a designer node.
///
/// Serialized as a plain string: `"defalt"`, `"start-flow"`, `"info"`, or the
/// palette's state type (e.g. `"approval"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    /// empty-canvas stand-in, evicted by the first real node
    Placeholder,
    /// unique entry point of the workflow
    StartFlow,
    /// transition annotation between two states
    Info,
    /// concrete workflow state
    State(String),
}

impl NodeKind {
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Placeholder => "defalt",
            NodeKind::StartFlow => "start-flow",
            NodeKind::Info => "info",
            NodeKind::State(s) => s.as_str(),
        }
    }
}

impl From<&str> for NodeKind {
    fn from(s: &str) -> Self {
        match s {
            "defalt" => NodeKind::Placeholder,
            "start-flow" => NodeKind::StartFlow,
            "info" => NodeKind::Info,
            other => NodeKind::State(other.to_string()),
        }
    }
}

impl From<String> for NodeKind {
    fn from(s: String) -> Self {
        NodeKind::from(s.as_str())
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::State(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(
        x: f64,
        y: f64,
    ) -> Self {
        Self {
            x,
            y,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            width,
            height,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SelectMode {
    #[default]
    Select,
    NotSelect,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NodeAction {
    #[default]
    Create,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HandleRole {
    Source,
    Target,
}

/// Which role each side handle plays. Edges always leave on the right and
/// enter on the left.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectedHandles {
    pub left: HandleRole,
    pub right: HandleRole,
}

impl Default for ConnectedHandles {
    fn default() -> Self {
        Self {
            left: HandleRole::Target,
            right: HandleRole::Source,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub node_type: NodeKind,
    #[serde(default)]
    pub state_data: StateData,
    #[serde(default)]
    pub mode_of_select: SelectMode,
    #[serde(default)]
    pub connected_handles: ConnectedHandles,
    #[serde(default)]
    pub parent_state_name: String,
    #[serde(default)]
    pub action: NodeAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_info_node_id: Option<NodeId>,
    pub present_node_id: NodeId,
    pub dimensions: Dimensions,
    /// display label set by relabeling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A node on the designer canvas.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// renderer node type, always "custom"
    #[serde(rename = "type", default = "custom_node_type")]
    pub render_type: String,
    pub position: Position,
    pub data: NodeData,
}

fn custom_node_type() -> String {
    CUSTOM_NODE_TYPE.to_string()
}

/// Everything needed to build a node.
#[derive(Debug, Clone)]
pub struct NewNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub position: Position,
    pub state_data: StateData,
    pub dimensions: Dimensions,
    pub parent_state_name: String,
    pub parent_info_node_id: Option<NodeId>,
}

impl Node {
    /// Builds a freshly created, selected node.
    pub fn new(fields: NewNode) -> Self {
        Self {
            id: fields.id.clone(),
            render_type: custom_node_type(),
            position: fields.position,
            data: NodeData {
                node_type: fields.kind,
                state_data: fields.state_data,
                mode_of_select: SelectMode::Select,
                connected_handles: ConnectedHandles::default(),
                parent_state_name: fields.parent_state_name,
                action: NodeAction::Create,
                parent_info_node_id: fields.parent_info_node_id,
                present_node_id: fields.id,
                dimensions: fields.dimensions,
                label: None,
            },
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.data.node_type
    }

    pub fn is_info(&self) -> bool {
        self.data.node_type == NodeKind::Info
    }

    pub fn is_start_flow(&self) -> bool {
        self.data.node_type == NodeKind::StartFlow
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.starts_with(PLACEHOLDER_PREFIX)
    }

    pub fn dimensions(&self) -> Dimensions {
        self.data.dimensions
    }

    /// Title of the node's state, if the palette gave one.
    pub fn state_title(&self) -> Option<&str> {
        self.data.state_data.title.as_deref()
    }

    /// Name used for this node in exported state lists.
    pub fn state_name(&self) -> String {
        self.data.label.clone().or_else(|| self.data.state_data.title.clone()).unwrap_or_else(|| self.id.clone())
    }

    /// `[top, bottom)` of the node's box.
    pub fn vertical_span(&self) -> (f64, f64) {
        (self.position.y, self.position.y + self.data.dimensions.height)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn approval() -> Node {
        Node::new(NewNode {
            id: "approval-root-1".into(),
            kind: NodeKind::from("approval"),
            position: Position::new(10.0, 20.0),
            state_data: StateData::titled("Manager Approval"),
            dimensions: Dimensions::new(150.0, 60.0),
            parent_state_name: String::new(),
            parent_info_node_id: None,
        })
    }

    #[test]
    fn test_node_kind_from_str() {
        assert_eq!(NodeKind::from("defalt"), NodeKind::Placeholder);
        assert_eq!(NodeKind::from("start-flow"), NodeKind::StartFlow);
        assert_eq!(NodeKind::from("info"), NodeKind::Info);
        assert_eq!(NodeKind::from("approval"), NodeKind::State("approval".into()));
        assert_eq!(NodeKind::State("approval".into()).as_str(), "approval");
    }

    #[test]
    fn test_node_serializes_to_canvas_shape() {
        let value = serde_json::to_value(approval()).unwrap();

        assert_eq!(value["type"], json!("custom"));
        assert_eq!(value["position"], json!({"x": 10.0, "y": 20.0}));
        assert_eq!(value["data"]["nodeType"], json!("approval"));
        assert_eq!(value["data"]["modeOfSelect"], json!("select"));
        assert_eq!(value["data"]["connectedHandles"], json!({"left": "target", "right": "source"}));
        assert_eq!(value["data"]["action"], json!("create"));
        assert_eq!(value["data"]["presentNodeId"], json!("approval-root-1"));
        assert_eq!(value["data"]["dimensions"], json!({"width": 150.0, "height": 60.0}));
        assert!(value["data"].get("parentInfoNodeId").is_none());
    }

    #[test]
    fn test_node_deserialize_round_trip_keeps_kind() {
        let text = serde_json::to_string(&approval()).unwrap();
        let node: Node = serde_json::from_str(&text).unwrap();
        assert_eq!(node, approval());
    }

    #[test]
    fn test_not_select_wire_name() {
        assert_eq!(serde_json::to_value(SelectMode::NotSelect).unwrap(), json!("notselect"));
    }

    #[test]
    fn test_state_name_prefers_label_then_title() {
        let mut node = approval();
        assert_eq!(node.state_name(), "Manager Approval");
        node.data.label = Some("Director Approval".into());
        assert_eq!(node.state_name(), "Director Approval");
        node.data.label = None;
        node.data.state_data.title = None;
        assert_eq!(node.state_name(), "approval-root-1");
    }

    #[test]
    fn test_placeholder_detection_uses_id_prefix() {
        let mut node = approval();
        assert!(!node.is_placeholder());
        node.id = PLACEHOLDER_ROOT_ID.into();
        assert!(node.is_placeholder());
    }
}
