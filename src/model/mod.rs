mod workflow;

pub use workflow::{StateModel, TransitionModel, WorkflowData, WorkflowHeader, WorkflowModel, WorkflowUi};
