mod bbox;
mod index;
mod measure;
mod union;

use bbox::BoundingBox;
pub(crate) use bbox::merge_rects;
pub(crate) use index::SpatialIndex;
pub use measure::AreaMethod;
pub use union::union_all;
