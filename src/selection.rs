//! The "currently selected node" slice of editor state.

use crate::graph::NodeId;

/// Selected node pointer, owned by the designer and passed explicitly to
/// whatever needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: Option<NodeId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    pub fn is_selected(
        &self,
        id: &str,
    ) -> bool {
        self.selected.as_deref() == Some(id)
    }

    /// Points the selection at `id`. Returns false when it already did.
    pub fn select(
        &mut self,
        id: NodeId,
    ) -> bool {
        if self.is_selected(&id) {
            return false;
        }
        self.selected = Some(id);
        true
    }

    /// Returns the id that was selected, if any.
    pub fn clear(&mut self) -> Option<NodeId> {
        self.selected.take()
    }
}
