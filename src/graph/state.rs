//! Typed state payloads carried by designer nodes.
//!
//! A node's `stateData` has a handful of fields the engine understands
//! (title, description, action, path direction) and a free-form bag for
//! everything else the palette attaches.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::node::NodeKind;

/// Vertical bias used when searching for a free slot in a column.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PathDirection {
    /// search upward (towards smaller y)
    Positive,
    /// search downward (towards larger y)
    #[default]
    Down,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StateData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// transition verb shown on info nodes, e.g. "approve"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_direction: Option<PathDirection>,
    /// any other palette fields, kept verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl StateData {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_direction(
        mut self,
        direction: PathDirection,
    ) -> Self {
        self.path_direction = Some(direction);
        self
    }

    pub fn with_action(
        mut self,
        action: impl Into<String>,
    ) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_field(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn direction(&self) -> PathDirection {
        self.path_direction.unwrap_or_default()
    }

    /// Every displayable text value, in field order then extra-key order.
    ///
    /// Strings are used verbatim, nulls are skipped and any other JSON value
    /// is rendered with its compact JSON form.
    pub fn text_values(&self) -> Vec<String> {
        let mut values: Vec<String> = [&self.title, &self.description, &self.action].into_iter().flatten().cloned().collect();

        for value in self.extra.values() {
            match value {
                serde_json::Value::Null => {}
                serde_json::Value::String(s) => values.push(s.clone()),
                other => values.push(other.to_string()),
            }
        }

        values
    }
}

/// What the node palette asks the designer to add.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeTypeDescriptor {
    pub node: NodeKind,
    #[serde(default)]
    pub state_data: StateData,
}

impl NodeTypeDescriptor {
    pub fn new(
        node: impl Into<NodeKind>,
        state_data: StateData,
    ) -> Self {
        Self {
            node: node.into(),
            state_data,
        }
    }

    pub fn direction(&self) -> PathDirection {
        self.state_data.direction()
    }
}
