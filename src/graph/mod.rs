pub mod edge;
mod graph;
pub mod node;
pub mod state;

pub use edge::{ArrowMarker, Edge, EdgeId, EdgeStyle, HandleConnectivity, HandleSide, MarkerType, NoopHandles};
pub use graph::{FlowGraph, InsertOutcome};
pub use node::{
    ConnectedHandles, Dimensions, HandleRole, INFO_NODE_PREFIX, NewNode, Node, NodeAction, NodeData, NodeId, NodeKind, PLACEHOLDER_PREFIX, PLACEHOLDER_ROOT_ID,
    Position, SelectMode,
};
pub use state::{NodeTypeDescriptor, PathDirection, StateData};
