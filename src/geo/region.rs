//! Region definitions and GeoJSON loading
//!
//! Regions come from GeoJSON `FeatureCollection`s. Geometry is kept as loaded;
//! [`Region::prepared_geometry`] repairs invalid shapes before they are tiled.

use crate::GeoError;
use geo::{Area, BooleanOps, Coord, LineString, MultiPolygon, Polygon, Validation};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

/// Property names tried, in order, when naming a region
const NAME_PROPERTIES: &[&str] = &["DISTRICT", "name", "NAME", "district", "region", "area"];

const UNNAMED_REGION: &str = "Unnamed Boundary";

/// Geometry of a region as supplied by the user
#[derive(Debug, Clone, PartialEq)]
pub enum RegionGeometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
    /// Any geometry type that cannot be tiled (points, lines, collections)
    Unsupported,
}

/// A named search area
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub geometry: RegionGeometry,
}

impl Region {
    pub fn new(name: impl Into<String>, geometry: RegionGeometry) -> Self {
        Self {
            name: name.into(),
            geometry,
        }
    }

    /// Returns the geometry as a valid multipolygon ready for tiling
    ///
    /// Invalid (e.g. self-intersecting) shapes are repaired by a self-union,
    /// the zero-width-buffer equivalent. Returns `None` for unsupported types
    /// and for shapes with no area left after repair.
    pub fn prepared_geometry(&self) -> Option<MultiPolygon<f64>> {
        let shape = match &self.geometry {
            RegionGeometry::Polygon(polygon) => MultiPolygon::new(vec![polygon.clone()]),
            RegionGeometry::MultiPolygon(multi) => multi.clone(),
            RegionGeometry::Unsupported => {
                tracing::warn!(region = %self.name, "Unsupported geometry type, skipping region");
                return None;
            }
        };

        let shape = if shape.is_valid() {
            shape
        } else {
            tracing::warn!(region = %self.name, "Invalid polygon geometry, attempting to fix");
            shape.union(&MultiPolygon::new(vec![]))
        };

        if shape.0.is_empty() || shape.unsigned_area() <= 0.0 {
            tracing::warn!(region = %self.name, "Region has no area after repair");
            return None;
        }

        Some(shape)
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<GeometryObject>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum GeometryObject {
    Polygon {
        #[serde(default)]
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        #[serde(default)]
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Other,
}

/// Loads every region of a GeoJSON `FeatureCollection` file
pub fn load_regions(path: &Path) -> Result<Vec<Region>, GeoError> {
    let content = std::fs::read_to_string(path)?;
    parse_regions(&content)
}

/// Parses regions from GeoJSON `FeatureCollection` text
///
/// Features without properties or without geometry are skipped, matching how
/// boundary exports from most GIS tools mark placeholder rows.
pub fn parse_regions(content: &str) -> Result<Vec<Region>, GeoError> {
    let collection: FeatureCollection = serde_json::from_str(content)?;

    let regions = collection
        .features
        .into_iter()
        .filter_map(|feature| {
            let properties = feature.properties.filter(|p| !p.is_empty())?;
            let geometry = feature.geometry?;
            Some(Region::new(region_name(&properties), convert_geometry(geometry)))
        })
        .collect();

    Ok(regions)
}

fn region_name(properties: &Map<String, Value>) -> String {
    NAME_PROPERTIES
        .iter()
        .filter_map(|key| properties.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| UNNAMED_REGION.to_string())
}

fn convert_geometry(geometry: GeometryObject) -> RegionGeometry {
    match geometry {
        GeometryObject::Polygon { coordinates } => match build_polygon(coordinates) {
            Some(polygon) => RegionGeometry::Polygon(polygon),
            None => RegionGeometry::Unsupported,
        },
        GeometryObject::MultiPolygon { coordinates } => {
            let polygons: Vec<Polygon<f64>> =
                coordinates.into_iter().filter_map(build_polygon).collect();
            if polygons.is_empty() {
                RegionGeometry::Unsupported
            } else {
                RegionGeometry::MultiPolygon(MultiPolygon::new(polygons))
            }
        }
        GeometryObject::Other => RegionGeometry::Unsupported,
    }
}

/// First ring is the exterior, any further rings are holes
fn build_polygon(rings: Vec<Vec<Vec<f64>>>) -> Option<Polygon<f64>> {
    let mut rings = rings.into_iter().map(build_ring);
    let exterior = rings.next()?;
    if exterior.0.is_empty() {
        return None;
    }
    let interiors = rings.filter(|ring| !ring.0.is_empty()).collect();
    Some(Polygon::new(exterior, interiors))
}

fn build_ring(positions: Vec<Vec<f64>>) -> LineString<f64> {
    positions
        .into_iter()
        .filter_map(|position| match position.as_slice() {
            [x, y, ..] => Some(Coord { x: *x, y: *y }),
            _ => None,
        })
        .collect::<Vec<_>>()
        .into()
}
