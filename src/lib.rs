//! # Flowdraft
//!
//! Flowdraft is the layout and construction engine behind an interactive
//! approval-workflow designer. It grows a directed graph of state nodes,
//! joined through info nodes that label each transition, and places every new
//! node so that it never overlaps the nodes already on the canvas.
//!
//! ## Core Features
//!
//! - **Overlap-free placement**: column-based gap search with a directional bias
//! - **Two-step adds**: info node first, real state node on the next frame
//! - **Renderer agnostic**: the canvas is reached only through [`CoordinateSpace`]
//! - **Workflow documents**: export and import of the stored workflow JSON
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flowdraft::{DesignerBuilder, NodeTypeDescriptor, StateData, WorkflowHeader};
//!
//! let mut designer = DesignerBuilder::new().build()?;
//!
//! designer.add_node(NodeTypeDescriptor::new("start-flow", StateData::titled("Submitted")));
//! designer.add_node(NodeTypeDescriptor::new("approval", StateData::titled("Manager Approval")));
//! designer.run_until_idle();
//!
//! let document = designer.export(WorkflowHeader::default())?.to_json()?;
//! ```

mod builder;
mod config;
mod designer;
mod error;
mod events;
pub mod graph;
pub mod layout;
mod model;
mod runtime;
mod selection;
pub mod utils;
pub mod viewport;

use std::sync::{Arc, RwLock};

pub use builder::DesignerBuilder;
pub use config::*;
pub use designer::{AddedNode, Designer, FINISHED_OPERATIONS_KEPT};
pub use error::FlowdraftError;
pub use events::{DesignerEvent, Message};
pub use graph::{Edge, FlowGraph, Node, NodeId, NodeKind, NodeTypeDescriptor, PathDirection, StateData};
pub use model::*;
pub use runtime::{AddNodePhase, Channel, ChannelEvent, ChannelOptions, DesignerEventHandle, OperationId};
pub use selection::SelectionState;
pub use viewport::{CoordinateSpace, Viewport, VirtualCanvas};

/// Result type alias for Flowdraft operations.
pub type Result<T> = std::result::Result<T, FlowdraftError>;

/// Thread-safe shared lock wrapper using Arc<RwLock<T>>.
pub(crate) type ShareLock<T> = Arc<RwLock<T>>;
