mod sketch;
mod union;

pub use sketch::{Sketch, SketchProperties};
pub use union::union_of_children;
