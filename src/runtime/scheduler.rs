//! Frame-deferred steps of the designer.
//!
//! Adding a state node happens in two visible steps: the info node appears
//! and the canvas centres on it, then on a later frame the real node is
//! placed next to it. The second step is queued here as data, and is dropped
//! when the node it depends on is deleted.

use std::collections::VecDeque;

use crate::graph::{NodeId, NodeTypeDescriptor};

/// Identifier of one add-node call.
pub type OperationId = u64;

/// Lifecycle of an add-node call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddNodePhase {
    /// the info node has not been placed yet
    PendingInfoNode,
    /// the info node is on the canvas; the real node waits for a frame
    PendingRealNode { info_node: NodeId },
    Done { node: NodeId },
    Cancelled,
}

impl AddNodePhase {
    pub fn is_finished(&self) -> bool {
        matches!(self, AddNodePhase::Done { .. } | AddNodePhase::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeferredStep {
    /// centre the viewport on a node
    Recenter(NodeId),
    /// create the real node of a two-step add under `parent`
    CreateRealNode {
        operation: OperationId,
        descriptor: NodeTypeDescriptor,
        parent: NodeId,
    },
}

impl DeferredStep {
    /// Node the step needs to still exist when it runs.
    pub fn depends_on(&self) -> &NodeId {
        match self {
            DeferredStep::Recenter(nid) => nid,
            DeferredStep::CreateRealNode { parent, .. } => parent,
        }
    }
}

/// Steps waiting for the next frame.
#[derive(Debug, Default)]
pub struct FrameQueue {
    steps: VecDeque<DeferredStep>,
    frame: u64,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        step: DeferredStep,
    ) {
        self.steps.push_back(step);
    }

    /// Takes the steps due this frame. Steps pushed while they run belong
    /// to the next frame.
    pub fn take_frame(&mut self) -> Vec<DeferredStep> {
        self.frame += 1;
        self.steps.drain(..).collect()
    }

    /// Drops every queued step and returns them.
    pub fn cancel_all(&mut self) -> Vec<DeferredStep> {
        self.steps.drain(..).collect()
    }

    /// Drops the steps depending on `nid` and returns them.
    pub fn cancel_dependents(
        &mut self,
        nid: &str,
    ) -> Vec<DeferredStep> {
        let (dropped, kept): (Vec<DeferredStep>, Vec<DeferredStep>) = self.steps.drain(..).partition(|s| s.depends_on() == nid);
        self.steps = kept.into();
        dropped
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of frames run so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}
