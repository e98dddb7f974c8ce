//! Workflow designer - the main entry point for Flowdraft.
//!
//! The designer owns the canvas graph and everything that changes it:
//! - Placing new nodes next to the selection without overlaps
//! - Interposing info nodes between consecutive states
//! - Keeping the selection and viewport in step with the newest node
//! - Running frame-deferred steps and cancelling them on teardown


use std::{collections::BTreeMap, sync::Arc};

use tracing::{debug, trace, warn};

use crate::{
    Config, FlowdraftError, Result, SchedulePolicy,
    events::DesignerEvent,
    graph::{
        Dimensions, Edge, FlowGraph, HandleConnectivity, INFO_NODE_PREFIX, InsertOutcome, NewNode, Node, NodeId, NodeKind, NodeTypeDescriptor,
        PLACEHOLDER_ROOT_ID, Position,
    },
    layout::{Placement, estimate_info_dimensions},
    model::{WorkflowHeader, WorkflowModel},
    runtime::{AddNodePhase, Channel, DeferredStep, FrameQueue, OperationId},
    selection::SelectionState,
    utils::IdGenerator,
    viewport::{CoordinateSpace, Viewport, ViewportControls},
};

/// Finished add-node phases kept for [`Designer::operation_phase`].
pub const FINISHED_OPERATIONS_KEPT: usize = 64;

/// Outcome of [`Designer::add_node`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedNode {
    /// handle for following the operation's phase
    pub operation: OperationId,
    /// first node created: the info node of a two-step add, else the node itself
    pub node: NodeId,
}

/// The interactive workflow graph builder.
///
/// # Example
///
/// ```rust,ignore
/// let mut designer = DesignerBuilder::new().build()?;
///
/// designer.add_node(NodeTypeDescriptor::new("start-flow", StateData::titled("Submitted")));
/// designer.add_node(NodeTypeDescriptor::new("approval", StateData::titled("Manager Approval")));
///
/// // once per rendered frame
/// designer.on_frame();
/// ```
pub struct Designer {
    config: Config,
    graph: FlowGraph,
    selection: SelectionState,
    space: Box<dyn CoordinateSpace>,
    viewport: ViewportControls,
    ids: Box<dyn IdGenerator>,
    handles: Arc<dyn HandleConnectivity>,
    channel: Arc<Channel>,
    queue: FrameQueue,
    operations: BTreeMap<OperationId, AddNodePhase>,
    next_operation: OperationId,
}

impl Designer {
    pub(crate) fn new(
        config: Config,
        space: Box<dyn CoordinateSpace>,
        ids: Box<dyn IdGenerator>,
        handles: Arc<dyn HandleConnectivity>,
    ) -> Self {
        let viewport = ViewportControls::new(config.viewport.clone());

        Self {
            config,
            graph: FlowGraph::new(),
            selection: SelectionState::new(),
            space,
            viewport,
            ids,
            handles,
            channel: Arc::new(Channel::new()),
            queue: FrameQueue::new(),
            operations: BTreeMap::new(),
            next_operation: 0,
        }
    }

    /// Adds a node of the palette type `descriptor` relative to the current
    /// selection.
    ///
    /// Placeholder, start-flow and info nodes are created directly. A state
    /// node gets an info node between it and the selection: the info node is
    /// placed now, the state node on the next frame. When the selection is
    /// the start-flow node, the state node is created directly.
    pub fn add_node(
        &mut self,
        descriptor: NodeTypeDescriptor,
    ) -> AddedNode {
        trace!("designer::add_node({})", descriptor.node);
        let operation = self.next_operation;
        self.next_operation += 1;

        let kind = descriptor.node.clone();
        let node = match kind {
            NodeKind::Placeholder | NodeKind::StartFlow => {
                let nid = self.create_node(&descriptor, None);
                self.finish_operation(operation, nid.clone());
                nid
            }
            NodeKind::Info => {
                let parent = self.selected_parent().map(|n| n.id);
                let nid = self.create_node(&descriptor, parent.as_deref());
                self.finish_operation(operation, nid.clone());
                nid
            }
            NodeKind::State(_) => self.add_state_node(operation, descriptor),
        };

        self.pump();
        AddedNode {
            operation,
            node,
        }
    }

    /// Creates one node under `parent` and connects it.
    ///
    /// Returns the new id right away; centring on it waits for the next
    /// frame.
    pub fn create_actual_node(
        &mut self,
        descriptor: &NodeTypeDescriptor,
        parent: Option<&str>,
    ) -> NodeId {
        trace!("designer::create_actual_node({}, parent: {:?})", descriptor.node, parent);
        let nid = self.create_node(descriptor, parent);
        self.pump();
        nid
    }

    /// Runs the steps deferred to this frame and returns how many ran.
    pub fn on_frame(&mut self) -> usize {
        let steps = self.queue.take_frame();
        let count = steps.len();

        for step in steps {
            match step {
                DeferredStep::Recenter(nid) => {
                    self.recenter(&nid);
                }
                DeferredStep::CreateRealNode {
                    operation,
                    descriptor,
                    parent,
                } => {
                    if !self.graph.contains(&parent) {
                        warn!("info node {} vanished before its state node was created", parent);
                        self.cancel_operation(operation);
                        continue;
                    }
                    let nid = self.create_node(&descriptor, Some(parent.as_str()));
                    self.finish_operation(operation, nid);
                }
            }
        }

        count
    }

    /// Runs frames until nothing is deferred.
    pub fn run_until_idle(&mut self) -> usize {
        let mut frames = 0;
        while !self.queue.is_empty() {
            self.on_frame();
            frames += 1;
        }
        frames
    }

    /// Drops every deferred step; unfinished operations become cancelled.
    pub fn cancel_pending(&mut self) {
        let steps = self.queue.cancel_all();
        debug!("cancelled {} deferred steps", steps.len());
        self.cancel_steps(steps);
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Number of steps waiting for the next frame.
    pub fn pending_steps(&self) -> usize {
        self.queue.len()
    }

    /// Number of frames run so far.
    pub fn frame(&self) -> u64 {
        self.queue.frame()
    }

    /// Phase of an add-node call. Only the most recent finished calls are
    /// kept; older ones return `None`.
    pub fn operation_phase(
        &self,
        operation: OperationId,
    ) -> Option<&AddNodePhase> {
        self.operations.get(&operation)
    }

    pub fn select(
        &mut self,
        nid: &str,
    ) -> Result<()> {
        if !self.graph.contains(nid) {
            return Err(FlowdraftError::Selection(format!("node {} not found", nid)));
        }
        self.graph.mark_selected(nid);
        self.set_selected(nid.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        if self.selection.clear().is_some() {
            self.graph.mark_all_not_selected();
            self.channel.emit(DesignerEvent::SelectionChanged(None));
        }
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selection.selected()
    }

    /// Changes a node's type and display label.
    pub fn relabel_node(
        &mut self,
        nid: &str,
        kind: NodeKind,
        label: Option<String>,
    ) -> Result<()> {
        trace!("designer::relabel_node({}, {})", nid, kind);
        self.graph.relabel_node(nid, kind, label)?;
        self.channel.emit(DesignerEvent::NodeRelabeled(nid.to_string()));
        Ok(())
    }

    /// Removes a node and its edges.
    ///
    /// Clears the selection if it pointed at the node and cancels deferred
    /// steps that depend on it.
    pub fn delete_node(
        &mut self,
        nid: &str,
    ) -> Result<Node> {
        trace!("designer::delete_node({})", nid);
        let (node, edges) = self.graph.remove_node(nid).ok_or(FlowdraftError::Node(format!("node {} not found", nid)))?;

        for edge in edges {
            self.channel.emit(DesignerEvent::EdgeRemoved(edge.id));
        }
        self.channel.emit(DesignerEvent::NodeRemoved(node.id.clone()));

        if self.selection.is_selected(nid) {
            self.selection.clear();
            self.channel.emit(DesignerEvent::SelectionChanged(None));
        }

        let dropped = self.queue.cancel_dependents(nid);
        self.cancel_steps(dropped);

        Ok(node)
    }

    /// Centres the viewport on a node now.
    pub fn center_on(
        &mut self,
        nid: &str,
    ) -> Result<Viewport> {
        self.recenter(nid).ok_or(FlowdraftError::Viewport(format!("node {} not found", nid)))
    }

    pub fn zoom_in(&mut self) -> Viewport {
        let viewport = self.viewport.zoom_in(self.space.as_mut());
        self.channel.emit(DesignerEvent::ViewportChanged(viewport));
        viewport
    }

    pub fn zoom_out(&mut self) -> Viewport {
        let viewport = self.viewport.zoom_out(self.space.as_mut());
        self.channel.emit(DesignerEvent::ViewportChanged(viewport));
        viewport
    }

    pub fn reset_viewport(&mut self) -> Viewport {
        let viewport = self.viewport.reset(self.space.as_mut());
        self.channel.emit(DesignerEvent::ViewportChanged(viewport));
        viewport
    }

    /// Builds the workflow document for the current graph.
    pub fn export(
        &self,
        header: WorkflowHeader,
    ) -> Result<WorkflowModel> {
        trace!("designer::export({})", header.id);
        WorkflowModel::from_graph(header, &self.graph)
    }

    /// Replaces the graph with the one stored in `model`.
    ///
    /// Deferred steps are cancelled and the selection is cleared.
    pub fn import(
        &mut self,
        model: &WorkflowModel,
    ) -> Result<()> {
        trace!("designer::import({})", model.id);
        let graph = model.to_graph()?;

        self.cancel_pending();
        self.operations.clear();
        self.graph = graph;
        if self.selection.clear().is_some() {
            self.channel.emit(DesignerEvent::SelectionChanged(None));
        }
        Ok(())
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn nodes(&self) -> &[Node] {
        self.graph.nodes()
    }

    pub fn edges(&self) -> &[Edge] {
        self.graph.edges()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a reference to the event channel.
    pub fn channel(&self) -> Arc<Channel> {
        self.channel.clone()
    }

    pub fn coordinate_space(&self) -> &dyn CoordinateSpace {
        self.space.as_ref()
    }

    fn add_state_node(
        &mut self,
        operation: OperationId,
        descriptor: NodeTypeDescriptor,
    ) -> NodeId {
        let selected = self.selected_parent();

        if let Some(parent) = selected.as_ref().filter(|n| n.is_start_flow()) {
            let nid = self.create_node(&descriptor, Some(parent.id.as_str()));
            self.finish_operation(operation, nid.clone());
            return nid;
        }

        self.operations.insert(operation, AddNodePhase::PendingInfoNode);

        let info_id = format!("{}-{}-{}", INFO_NODE_PREFIX, selected.as_ref().map_or("root", |n| n.id.as_str()), self.ids.next_suffix());
        let dimensions = estimate_info_dimensions(&descriptor.state_data, &self.config.info);
        let position = match &selected {
            Some(parent) => self.next_to(parent, &descriptor, dimensions),
            None => self.space.screen_center(),
        };

        let info = Node::new(NewNode {
            id: info_id.clone(),
            kind: NodeKind::Info,
            position,
            state_data: descriptor.state_data.clone(),
            dimensions,
            parent_state_name: selected.as_ref().and_then(|n| n.state_title()).unwrap_or_default().to_string(),
            parent_info_node_id: None,
        });

        self.graph.mark_all_not_selected();
        self.insert(info);
        if let Some(parent) = &selected {
            self.connect(&parent.id, &info_id);
        }
        self.set_selected(info_id.clone());

        self.queue.push(DeferredStep::Recenter(info_id.clone()));
        self.queue.push(DeferredStep::CreateRealNode {
            operation,
            descriptor,
            parent: info_id.clone(),
        });
        self.operations.insert(
            operation,
            AddNodePhase::PendingRealNode {
                info_node: info_id.clone(),
            },
        );

        info_id
    }

    /// Builds, inserts, connects and selects one node, and queues the
    /// recenter on it.
    fn create_node(
        &mut self,
        descriptor: &NodeTypeDescriptor,
        parent: Option<&str>,
    ) -> NodeId {
        if let Some(nid) = parent.filter(|nid| !self.graph.contains(nid)) {
            warn!("parent node {} not found, placing at canvas center", nid);
        }
        // the insert evicts placeholders, so they never parent a node
        let parent_node = parent.and_then(|nid| self.graph.node(nid)).filter(|n| !n.is_placeholder()).cloned();

        let dimensions = match descriptor.node {
            NodeKind::Info => estimate_info_dimensions(&descriptor.state_data, &self.config.info),
            _ => Dimensions::new(self.config.node.width, self.config.node.height),
        };

        let position = match (&descriptor.node, &parent_node) {
            (NodeKind::Placeholder, _) => self.space.screen_center(),
            (_, Some(p)) => self.next_to(p, descriptor, dimensions),
            (_, None) => self.space.screen_center(),
        };

        let nid = match descriptor.node {
            NodeKind::Placeholder => PLACEHOLDER_ROOT_ID.to_string(),
            _ => format!("{}-{}-{}", descriptor.node, parent_node.as_ref().map_or("root", |n| n.id.as_str()), self.ids.next_suffix()),
        };

        let node = Node::new(NewNode {
            id: nid.clone(),
            kind: descriptor.node.clone(),
            position,
            state_data: descriptor.state_data.clone(),
            dimensions,
            parent_state_name: parent_node.as_ref().and_then(|n| n.state_title()).unwrap_or_default().to_string(),
            parent_info_node_id: parent_node.as_ref().filter(|n| n.is_info()).map(|n| n.id.clone()),
        });

        self.graph.mark_all_not_selected();
        self.insert(node);
        if let Some(p) = &parent_node {
            self.connect(&p.id, &nid);
        }
        self.set_selected(nid.clone());
        self.queue.push(DeferredStep::Recenter(nid.clone()));

        nid
    }

    /// Position one column right of `parent`, at the free y nearest to it.
    fn next_to(
        &self,
        parent: &Node,
        descriptor: &NodeTypeDescriptor,
        dimensions: Dimensions,
    ) -> Position {
        let x = parent.position.x + self.config.layout.node_spacing;
        let y = Placement::new(self.graph.nodes(), &self.config.layout).free_y(x, parent.position.y, descriptor.direction(), dimensions.height);
        Position::new(x, y)
    }

    fn insert(
        &mut self,
        node: Node,
    ) {
        let nid = node.id.clone();
        let kind = node.kind().clone();
        let InsertOutcome {
            replaced,
            evicted,
            dropped_edges,
        } = self.graph.insert_node(node);

        for edge in dropped_edges {
            self.channel.emit(DesignerEvent::EdgeRemoved(edge));
        }
        if !replaced.is_empty() {
            self.channel.emit(DesignerEvent::NodesReplaced {
                by: nid.clone(),
                removed: replaced.len(),
            });
        }
        for placeholder in evicted {
            debug!("evicted placeholder {}", placeholder);
            self.channel.emit(DesignerEvent::PlaceholderEvicted(placeholder));
        }
        self.channel.emit(DesignerEvent::NodeAdded {
            node: nid,
            kind,
        });
    }

    fn connect(
        &mut self,
        source: &str,
        target: &str,
    ) {
        let edge = match (self.graph.node(source), self.graph.node(target)) {
            (Some(s), Some(t)) => Edge::connect(s, t, &self.ids.next_suffix()),
            _ => {
                warn!("cannot connect {} -> {}: endpoint missing", source, target);
                return;
            }
        };

        let event = DesignerEvent::EdgeAdded {
            edge: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
        };
        self.handles.update_handles(&edge);
        if let Err(e) = self.graph.add_edge(edge) {
            warn!("{}", e);
            return;
        }
        self.channel.emit(event);
    }

    fn set_selected(
        &mut self,
        nid: NodeId,
    ) {
        if self.selection.select(nid.clone()) {
            self.channel.emit(DesignerEvent::SelectionChanged(Some(nid)));
        }
    }

    /// The selected node, unless it is missing or a placeholder.
    fn selected_parent(&self) -> Option<Node> {
        let nid = self.selection.selected()?;
        match self.graph.node(nid) {
            Some(node) if node.is_placeholder() => None,
            Some(node) => Some(node.clone()),
            None => {
                warn!("selected node {} not found, placing at canvas center", nid);
                None
            }
        }
    }

    fn recenter(
        &mut self,
        nid: &str,
    ) -> Option<Viewport> {
        let Some(node) = self.graph.node(nid) else {
            debug!("skip recenter on removed node {}", nid);
            return None;
        };
        let viewport = self.viewport.center_on(self.space.as_mut(), node);
        self.channel.emit(DesignerEvent::ViewportChanged(viewport));
        Some(viewport)
    }

    fn finish_operation(
        &mut self,
        operation: OperationId,
        node: NodeId,
    ) {
        self.operations.insert(
            operation,
            AddNodePhase::Done {
                node: node.clone(),
            },
        );
        self.channel.emit(DesignerEvent::OperationCompleted {
            operation,
            node,
        });
        self.prune_operations();
    }

    fn cancel_operation(
        &mut self,
        operation: OperationId,
    ) {
        self.operations.insert(operation, AddNodePhase::Cancelled);
        self.channel.emit(DesignerEvent::OperationCancelled(operation));
        self.prune_operations();
    }

    /// Drops the oldest finished operations beyond the retention bound.
    fn prune_operations(&mut self) {
        let finished: Vec<OperationId> = self.operations.iter().filter(|(_, phase)| phase.is_finished()).map(|(id, _)| *id).collect();
        let excess = finished.len().saturating_sub(FINISHED_OPERATIONS_KEPT);
        for id in finished.into_iter().take(excess) {
            self.operations.remove(&id);
        }
    }

    fn cancel_steps(
        &mut self,
        steps: Vec<DeferredStep>,
    ) {
        for step in steps {
            if let DeferredStep::CreateRealNode {
                operation,
                ..
            } = step
            {
                self.cancel_operation(operation);
            }
        }
    }

    /// Drains deferred steps right away under the immediate policy.
    fn pump(&mut self) {
        if self.config.schedule == SchedulePolicy::Immediate {
            self.run_until_idle();
        }
    }
}
