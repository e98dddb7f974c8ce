mod channel;
mod scheduler;

pub use channel::{Channel, ChannelEvent, ChannelOptions, DesignerEventHandle};
pub use scheduler::{AddNodePhase, DeferredStep, FrameQueue, OperationId};
