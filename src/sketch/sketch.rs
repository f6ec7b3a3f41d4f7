use geo::{BoundingRect, MultiPolygon, Rect};
use serde::{Deserialize, Serialize};

use crate::geom::merge_rects;

/// Identity of a sketch as seen by reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SketchProperties {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_collection: bool,
}

/// A user-drawn planning polygon, or a collection of child sketches.
#[derive(Debug, Clone, PartialEq)]
pub struct Sketch {
    properties: SketchProperties,
    geometry: Option<MultiPolygon<f64>>,
    bbox: Option<Rect<f64>>,
    children: Vec<Sketch>,
}

impl Sketch {
    /// A single (leaf) sketch.
    pub fn new(id: impl Into<String>, name: impl Into<String>, geometry: impl Into<MultiPolygon<f64>>) -> Self {
        let geometry = geometry.into();
        Self {
            properties: SketchProperties { id: id.into(), name: name.into(), is_collection: false },
            bbox: geometry.bounding_rect(),
            geometry: Some(geometry),
            children: Vec::new(),
        }
    }

    /// A collection owning `children`, in order.
    pub fn collection(id: impl Into<String>, name: impl Into<String>, children: Vec<Sketch>) -> Self {
        let bbox = children.iter()
            .filter_map(Sketch::bbox)
            .reduce(merge_rects);

        Self {
            properties: SketchProperties { id: id.into(), name: name.into(), is_collection: true },
            geometry: None,
            bbox,
            children,
        }
    }

    /// Replace the bounding box, e.g. with the one supplied by the sketch document.
    pub fn with_bbox(mut self, bbox: Rect<f64>) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Attach a geometry to a collection (the stored union of its children).
    pub fn with_geometry(mut self, geometry: impl Into<MultiPolygon<f64>>) -> Self {
        self.geometry = Some(geometry.into());
        self
    }

    #[inline] pub fn id(&self) -> &str { &self.properties.id }

    #[inline] pub fn name(&self) -> &str { &self.properties.name }

    #[inline] pub fn properties(&self) -> &SketchProperties { &self.properties }

    #[inline] pub fn is_collection(&self) -> bool { self.properties.is_collection }

    /// The sketch's own geometry. Collections usually have none; use
    /// [`union_of_children`](super::union_of_children) for overlap work.
    #[inline] pub fn geometry(&self) -> Option<&MultiPolygon<f64>> { self.geometry.as_ref() }

    #[inline] pub fn children(&self) -> &[Sketch] { &self.children }

    #[inline] pub fn bbox(&self) -> Option<Rect<f64>> { self.bbox }

    /// Properties of the direct children, in order.
    pub fn child_properties(&self) -> Vec<SketchProperties> {
        self.children.iter().map(|child| child.properties.clone()).collect()
    }

    /// All leaf sketches under this one (itself if it is a leaf), depth first.
    pub fn leaves(&self) -> Vec<&Sketch> {
        if !self.is_collection() { return vec![self] }
        self.children.iter().flat_map(Sketch::leaves).collect()
    }

    /// Find this sketch or a descendant by id.
    pub fn find(&self, id: &str) -> Option<&Sketch> {
        if self.id() == id { return Some(self) }
        self.children.iter().find_map(|child| child.find(id))
    }
}

#[cfg(test)]
mod tests {
    use geo::{coord, Rect};

    use super::*;

    fn leaf(id: &str, x0: f64, x1: f64) -> Sketch {
        Sketch::new(id, id.to_uppercase(), Rect::new(coord! { x: x0, y: 0.0 }, coord! { x: x1, y: 1.0 }).to_polygon())
    }

    #[test]
    fn collection_bbox_covers_children() {
        let collection = Sketch::collection("c", "Plan", vec![leaf("a", 0.0, 2.0), leaf("b", 5.0, 9.0)]);
        let bbox = collection.bbox().unwrap();
        assert_eq!((bbox.min().x, bbox.max().x), (0.0, 9.0));
        assert!(collection.is_collection());
        assert!(collection.geometry().is_none());
    }

    #[test]
    fn leaves_flatten_nested_collections() {
        let inner = Sketch::collection("inner", "Inner", vec![leaf("b", 1.0, 2.0), leaf("c", 2.0, 3.0)]);
        let outer = Sketch::collection("outer", "Outer", vec![leaf("a", 0.0, 1.0), inner]);

        let ids = outer.leaves().iter().map(|s| s.id()).collect::<Vec<_>>();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(outer.child_properties().len(), 2);
        assert_eq!(outer.find("c").map(Sketch::name), Some("C"));
    }
}
