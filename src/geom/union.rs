use geo::{BooleanOps, MultiPolygon};

/// Union of all shapes into a single MultiPolygon, or `None` for no shapes.
/// This may be slow for large numbers of complex polygons.
pub fn union_all<'a>(shapes: impl IntoIterator<Item = &'a MultiPolygon<f64>>) -> Option<MultiPolygon<f64>> {
    shapes.into_iter().cloned().reduce(|a, b| a.union(&b))
}
