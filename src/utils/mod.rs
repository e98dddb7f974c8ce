pub mod ids;
pub mod time;

pub use ids::{IdGenerator, NanoIds, SequenceIds};
