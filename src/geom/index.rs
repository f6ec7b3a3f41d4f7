use geo::Rect;
use rstar::{RTree, AABB};

use super::BoundingBox;

/// R-tree over the bounding boxes of an indexed slice of geometries.
///
/// Queries return candidate indices in ascending (input) order, so sums over
/// candidates are reproducible regardless of tree layout.
#[derive(Debug, Clone)]
pub(crate) struct SpatialIndex {
    rtree: RTree<BoundingBox>,
}

impl SpatialIndex {
    /// Build from `(index, bbox)` pairs; geometries without a bbox are simply left out.
    pub(crate) fn new(boxes: impl IntoIterator<Item = (usize, Rect<f64>)>) -> Self {
        Self {
            rtree: RTree::bulk_load(
                boxes.into_iter()
                    .map(|(i, bbox)| BoundingBox::new(i, bbox))
                    .collect()
            ),
        }
    }

    /// Indices whose bbox intersects `rect` grown by `pad` on every side, ascending.
    pub(crate) fn candidates(&self, rect: &Rect<f64>, pad: (f64, f64)) -> Vec<usize> {
        let search = AABB::from_corners(
            [rect.min().x - pad.0, rect.min().y - pad.1],
            [rect.max().x + pad.0, rect.max().y + pad.1],
        );

        let mut found = self.rtree.locate_in_envelope_intersecting(&search)
            .map(|bb| bb.idx())
            .collect::<Vec<_>>();
        found.sort_unstable();
        found
    }
}
