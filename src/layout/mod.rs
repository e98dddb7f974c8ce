//! Node placement math. Pure functions over node snapshots; nothing here
//! touches the renderer.

mod dimensions;
mod position;

pub use dimensions::{estimate_info_dimensions, wrapped_line_count};
pub use position::Placement;
