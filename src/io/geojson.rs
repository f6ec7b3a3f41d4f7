use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon, Rect};
use serde_json::{Map, Value};

use crate::{feature::Feature, sketch::Sketch};

/// Read a GeoJSON `FeatureCollection` (or a single `Feature`) into features.
/// Features with a null geometry are kept; they never join a class.
pub fn read_features_from_geojson_bytes(bytes: &[u8]) -> Result<Vec<Feature>> {
    let value: Value = serde_json::from_slice(bytes).context("Failed to parse GeoJSON bytes")?;

    match value["type"].as_str() {
        Some("FeatureCollection") => value["features"].as_array()
            .ok_or_else(|| anyhow!("FeatureCollection is missing its features array"))?
            .iter()
            .enumerate()
            .map(|(i, feature)| parse_feature(feature).with_context(|| format!("Invalid feature at index {i}")))
            .collect(),
        Some("Feature") => Ok(vec![parse_feature(&value)?]),
        other => bail!("Expected a GeoJSON Feature or FeatureCollection, found {other:?}"),
    }
}

/// Read a sketch from GeoJSON.
///
/// A `Feature` is a single sketch. A `FeatureCollection` is a sketch
/// collection: its `properties` identify the collection and each feature is a
/// child (nested collections are features whose properties say
/// `isCollection` and that carry their own `features`).
pub fn read_sketch_from_geojson_bytes(bytes: &[u8]) -> Result<Sketch> {
    let value: Value = serde_json::from_slice(bytes).context("Failed to parse sketch GeoJSON")?;
    parse_sketch(&value)
}

fn parse_sketch(value: &Value) -> Result<Sketch> {
    let props = &value["properties"];
    let id = props["id"].as_str()
        .ok_or_else(|| anyhow!("Sketch is missing properties.id"))?;
    let name = props["name"].as_str().unwrap_or(id);
    let is_collection = props["isCollection"].as_bool().unwrap_or(false)
        || value["type"].as_str() == Some("FeatureCollection");

    let sketch = if is_collection {
        let children = value["features"].as_array()
            .ok_or_else(|| anyhow!("Sketch collection '{id}' is missing its features array"))?
            .iter()
            .map(parse_sketch)
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Invalid child in sketch collection '{id}'"))?;
        let collection = Sketch::collection(id, name, children);
        match parse_geometry(&value["geometry"])? {
            Some(geometry) => collection.with_geometry(polygonal(geometry, id)?),
            None => collection,
        }
    } else {
        let geometry = parse_geometry(&value["geometry"])?
            .ok_or_else(|| anyhow!("Sketch '{id}' has no geometry"))?;
        Sketch::new(id, name, polygonal(geometry, id)?)
    };

    Ok(match parse_bbox(&value["bbox"]) {
        Some(bbox) => sketch.with_bbox(bbox),
        None => sketch,
    })
}

fn polygonal(geometry: Geometry<f64>, id: &str) -> Result<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => Ok(MultiPolygon::from(p)),
        Geometry::MultiPolygon(mp) => Ok(mp),
        _ => bail!("Sketch '{id}' must be a Polygon or MultiPolygon"),
    }
}

fn parse_feature(value: &Value) -> Result<Feature> {
    let properties = match &value["properties"] {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    Ok(match parse_geometry(&value["geometry"])? {
        Some(geometry) => Feature::new(geometry, properties),
        None => Feature::without_geometry(properties),
    })
}

/// Parse a GeoJSON bbox `[minx, miny, maxx, maxy]`.
fn parse_bbox(value: &Value) -> Option<Rect<f64>> {
    let coords = value.as_array()?
        .iter()
        .map(Value::as_f64)
        .collect::<Option<Vec<_>>>()?;
    match coords[..] {
        [x0, y0, x1, y1] => Some(Rect::new(Coord { x: x0, y: y0 }, Coord { x: x1, y: y1 })),
        _ => None,
    }
}

/// Parse a GeoJSON geometry object. `null` yields `None`.
fn parse_geometry(value: &Value) -> Result<Option<Geometry<f64>>> {
    if value.is_null() { return Ok(None) }

    let coords = &value["coordinates"];
    let geometry = match value["type"].as_str() {
        Some("Point") => Geometry::Point(Point::from(parse_coord(coords)?)),
        Some("MultiPoint") => Geometry::MultiPoint(MultiPoint(
            array(coords)?.iter().map(|c| parse_coord(c).map(Point::from)).collect::<Result<_>>()?
        )),
        Some("LineString") => Geometry::LineString(parse_line(coords, false)?),
        Some("MultiLineString") => Geometry::MultiLineString(MultiLineString(
            array(coords)?.iter().map(|l| parse_line(l, false)).collect::<Result<_>>()?
        )),
        Some("Polygon") => Geometry::Polygon(parse_polygon(coords)?),
        Some("MultiPolygon") => Geometry::MultiPolygon(MultiPolygon(
            array(coords)?.iter().map(parse_polygon).collect::<Result<_>>()?
        )),
        other => bail!("Unsupported GeoJSON geometry type: {other:?}"),
    };

    Ok(Some(geometry))
}

fn array(value: &Value) -> Result<&Vec<Value>> {
    value.as_array().ok_or_else(|| anyhow!("Invalid coordinates: expected an array"))
}

/// Parse a single `[x, y]` position (extra dimensions are ignored).
fn parse_coord(value: &Value) -> Result<Coord<f64>> {
    let pair = array(value)?;
    if pair.len() < 2 { bail!("Invalid position: expected at least two numbers") }

    let x = pair[0].as_f64()
        .ok_or_else(|| anyhow!("Invalid coordinate: x must be a number"))?;
    let y = pair[1].as_f64()
        .ok_or_else(|| anyhow!("Invalid coordinate: y must be a number"))?;
    Ok(Coord { x, y })
}

/// Parse a line or ring; rings are closed if the input left them open.
fn parse_line(value: &Value, ring: bool) -> Result<LineString<f64>> {
    let mut points = array(value)?.iter().map(parse_coord).collect::<Result<Vec<_>>>()?;

    if ring && !points.is_empty() && points[0] != points[points.len() - 1] {
        points.push(points[0]);
    }

    Ok(LineString(points))
}

/// Parse polygon rings: first the exterior, then any holes.
fn parse_polygon(value: &Value) -> Result<Polygon<f64>> {
    let rings = array(value)?;
    let exterior = rings.first()
        .ok_or_else(|| anyhow!("Invalid Polygon: missing exterior ring"))?;

    Ok(Polygon::new(
        parse_line(exterior, true)?,
        rings[1..].iter().map(|r| parse_line(r, true)).collect::<Result<_>>()?,
    ))
}

#[cfg(test)]
mod tests {
    use geo::Area;
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_feature_collection_with_properties() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "species": "tjeld", "count": 4 },
                    "geometry": { "type": "Point", "coordinates": [8.5, 58.3] }
                },
                {
                    "type": "Feature",
                    "properties": { "habitat": "eelgrass" },
                    "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [4, 0], [4, 4], [0, 4]]] }
                },
                { "type": "Feature", "properties": null, "geometry": null }
            ]
        });

        let features = read_features_from_geojson_bytes(doc.to_string().as_bytes()).unwrap();
        assert_eq!(features.len(), 3);
        assert!(features[0].is_member(Some("species"), "tjeld"));
        assert_eq!(features[0].property_f64("count"), Some(4.0));
        assert_eq!(features[1].polygons().unwrap().unsigned_area(), 16.0);
        assert!(features[2].geometry().is_none());
    }

    #[test]
    fn reads_sketch_collection() {
        let doc = json!({
            "type": "FeatureCollection",
            "properties": { "id": "plan", "name": "My plan", "isCollection": true },
            "bbox": [0, 0, 20, 10],
            "features": [
                {
                    "type": "Feature",
                    "properties": { "id": "a", "name": "North" },
                    "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]] }
                },
                {
                    "type": "Feature",
                    "properties": { "id": "b", "name": "South" },
                    "geometry": { "type": "MultiPolygon", "coordinates": [[[[10, 0], [20, 0], [20, 10], [10, 10], [10, 0]]]] }
                }
            ]
        });

        let sketch = read_sketch_from_geojson_bytes(doc.to_string().as_bytes()).unwrap();
        assert!(sketch.is_collection());
        assert_eq!(sketch.name(), "My plan");
        assert_eq!(sketch.children().len(), 2);
        assert_eq!(sketch.children()[1].name(), "South");
        assert_eq!(sketch.bbox().unwrap().max().x, 20.0);
    }

    #[test]
    fn rejects_point_sketch() {
        let doc = json!({
            "type": "Feature",
            "properties": { "id": "p" },
            "geometry": { "type": "Point", "coordinates": [1, 2] }
        });
        assert!(read_sketch_from_geojson_bytes(doc.to_string().as_bytes()).is_err());
    }
}
