use geo::MultiPolygon;

use crate::geom::union_all;

use super::Sketch;

/// The shape a sketch covers for overlap purposes.
///
/// For a leaf this is its own geometry. For a collection it is the union of
/// every leaf geometry below it, so overlapping children count once. A
/// collection without any child geometry falls back to its own geometry.
pub fn union_of_children(sketch: &Sketch) -> Option<MultiPolygon<f64>> {
    if !sketch.is_collection() { return sketch.geometry().cloned() }

    union_all(sketch.leaves().into_iter().filter_map(Sketch::geometry))
        .or_else(|| sketch.geometry().cloned())
}
