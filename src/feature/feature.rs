use std::borrow::Cow;

use geo::{BoundingRect, Geometry, MultiPolygon, Rect};
use serde_json::{Map, Value};

/// A classified reference-geometry record: geometry plus property bag.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    geometry: Option<Geometry<f64>>,
    properties: Map<String, Value>,
    bbox: Option<Rect<f64>>,
}

impl Feature {
    pub fn new(geometry: impl Into<Geometry<f64>>, properties: Map<String, Value>) -> Self {
        let geometry = geometry.into();
        Self { bbox: geometry.bounding_rect(), geometry: Some(geometry), properties }
    }

    /// A feature with a null geometry. It is never a member of any class.
    pub fn without_geometry(properties: Map<String, Value>) -> Self {
        Self { geometry: None, properties, bbox: None }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    #[inline] pub fn geometry(&self) -> Option<&Geometry<f64>> { self.geometry.as_ref() }

    #[inline] pub fn properties(&self) -> &Map<String, Value> { &self.properties }

    /// Bounding box of the geometry, if it has one.
    #[inline] pub fn bbox(&self) -> Option<Rect<f64>> { self.bbox }

    #[inline] pub fn property(&self, key: &str) -> Option<&Value> { self.properties.get(key) }

    /// Numeric value of a property; `None` if missing or not a number.
    #[inline]
    pub fn property_f64(&self, key: &str) -> Option<f64> {
        self.property(key).and_then(Value::as_f64)
    }

    /// Whether this feature belongs to class `class_id`.
    ///
    /// Without a class key every feature with a geometry is a member. With one,
    /// the property must be present and equal `class_id`: strings compare
    /// exactly, numbers and booleans by their JSON text. Missing or null
    /// properties are not members.
    pub fn is_member(&self, class_key: Option<&str>, class_id: &str) -> bool {
        if self.geometry.is_none() { return false }
        let Some(key) = class_key else { return true };

        match self.property(key) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => s == class_id,
            Some(value @ (Value::Number(_) | Value::Bool(_))) => value.to_string() == class_id,
            Some(_) => false,
        }
    }

    /// Polygonal part of the geometry, if it has one.
    pub fn polygons(&self) -> Option<Cow<'_, MultiPolygon<f64>>> {
        match self.geometry.as_ref()? {
            Geometry::MultiPolygon(mp) => Some(Cow::Borrowed(mp)),
            Geometry::Polygon(p) => Some(Cow::Owned(MultiPolygon::from(p.clone()))),
            Geometry::Rect(r) => Some(Cow::Owned(MultiPolygon::from(r.to_polygon()))),
            Geometry::Triangle(t) => Some(Cow::Owned(MultiPolygon::from(t.to_polygon()))),
            _ => None,
        }
    }
}
