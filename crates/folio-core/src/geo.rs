//! Country lookup for geotagged photos.
//!
//! Boundaries come from a GeoJSON `FeatureCollection` of `Polygon` /
//! `MultiPolygon` features. Points are tested feature by feature in load
//! order; a per-feature bounding box is the only pre-filter.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::logging::subsystem;

/// Property keys searched (in order) for a feature's country name.
const NAME_KEYS: [&str; 4] = ["ADMIN", "name", "NAME", "admin"];

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    #[serde(other)]
    Unsupported,
}

/// A closed ring of `(lng, lat)` points.
type Ring = Vec<(f64, f64)>;

/// Outer ring followed by holes.
#[derive(Debug, Clone)]
struct Polygon {
    outer: Ring,
    holes: Vec<Ring>,
}

impl Polygon {
    fn contains(&self, lng: f64, lat: f64) -> bool {
        ring_contains(&self.outer, lng, lat)
            && !self.holes.iter().any(|hole| ring_contains(hole, lng, lat))
    }
}

#[derive(Debug, Clone, Copy)]
struct BoundingBox {
    min_lng: f64,
    min_lat: f64,
    max_lng: f64,
    max_lat: f64,
}

impl BoundingBox {
    fn of(polygons: &[Polygon]) -> Option<Self> {
        let mut points = polygons.iter().flat_map(|p| p.outer.iter());
        let &(lng, lat) = points.next()?;
        let mut bbox = BoundingBox {
            min_lng: lng,
            min_lat: lat,
            max_lng: lng,
            max_lat: lat,
        };
        for &(lng, lat) in points {
            bbox.min_lng = bbox.min_lng.min(lng);
            bbox.min_lat = bbox.min_lat.min(lat);
            bbox.max_lng = bbox.max_lng.max(lng);
            bbox.max_lat = bbox.max_lat.max(lat);
        }
        Some(bbox)
    }

    fn contains(&self, lng: f64, lat: f64) -> bool {
        lng >= self.min_lng && lng <= self.max_lng && lat >= self.min_lat && lat <= self.max_lat
    }
}

#[derive(Debug, Clone)]
struct Country {
    name: String,
    bbox: BoundingBox,
    polygons: Vec<Polygon>,
}

/// Pre-loaded country polygons.
#[derive(Debug, Clone, Default)]
pub struct CountryIndex {
    countries: Vec<Country>,
}

impl CountryIndex {
    /// An index that never resolves anything (lookup disabled).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a GeoJSON FeatureCollection.
    ///
    /// Features without a usable name or polygon geometry are skipped; a
    /// document that is not a FeatureCollection is a parse error.
    pub fn from_geojson(text: &str) -> Result<Self> {
        let collection: FeatureCollection = serde_json::from_str(text)
            .map_err(|e| Error::Parse(format!("Invalid country GeoJSON: {}", e)))?;

        let mut countries = Vec::new();
        for feature in collection.features {
            let Some(name) = feature.properties.as_ref().and_then(feature_name) else {
                continue;
            };
            let polygons = match feature.geometry {
                Some(Geometry::Polygon { coordinates }) => vec![polygon(coordinates)],
                Some(Geometry::MultiPolygon { coordinates }) => {
                    coordinates.into_iter().map(polygon).collect()
                }
                _ => continue,
            };
            let Some(bbox) = BoundingBox::of(&polygons) else {
                continue;
            };
            countries.push(Country {
                name,
                bbox,
                polygons,
            });
        }

        debug!(
            subsystem = subsystem::GEO,
            record_count = countries.len(),
            "Loaded country boundaries"
        );
        Ok(Self { countries })
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Name of the first country containing the point, if any.
    pub fn lookup(&self, lat: f64, lng: f64) -> Option<&str> {
        if !valid_coordinates(lat, lng) {
            return None;
        }
        self.countries
            .iter()
            .filter(|c| c.bbox.contains(lng, lat))
            .find(|c| c.polygons.iter().any(|p| p.contains(lng, lat)))
            .map(|c| c.name.as_str())
    }

    /// Fill in `country` on photos that lack one. Returns how many were set.
    ///
    /// Photos with a non-blank `country` are never touched, so applying this
    /// twice changes nothing the second time.
    pub fn assign_countries(&self, photos: &mut Value) -> usize {
        if self.is_empty() {
            return 0;
        }
        let Some(items) = photos.as_array_mut() else {
            return 0;
        };

        let mut assigned = 0;
        for (i, photo) in items.iter_mut().enumerate() {
            let Some(obj) = photo.as_object_mut() else {
                continue;
            };
            if has_country(obj) {
                continue;
            }
            let (Some(lat), Some(lng)) = (
                obj.get("lat").and_then(Value::as_f64),
                obj.get("lng").and_then(Value::as_f64),
            ) else {
                continue;
            };
            if let Some(name) = self.lookup(lat, lng) {
                trace!(subsystem = subsystem::GEO, index = i, country = name, "Assigned country");
                obj.insert("country".to_string(), Value::String(name.to_string()));
                assigned += 1;
            }
        }
        assigned
    }
}

fn feature_name(properties: &Map<String, Value>) -> Option<String> {
    NAME_KEYS
        .iter()
        .filter_map(|key| properties.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
}

fn polygon(rings: Vec<Vec<Vec<f64>>>) -> Polygon {
    let mut rings = rings.into_iter().map(|ring| {
        ring.into_iter()
            .filter(|pos| pos.len() >= 2)
            .map(|pos| (pos[0], pos[1]))
            .collect::<Ring>()
    });
    let outer = rings.next().unwrap_or_default();
    Polygon {
        outer,
        holes: rings.collect(),
    }
}

fn has_country(photo: &Map<String, Value>) -> bool {
    match photo.get("country") {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

/// Finite latitude in [-90, 90] and longitude in [-180, 180].
pub fn valid_coordinates(lat: f64, lng: f64) -> bool {
    lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng)
}

/// Even-odd ray casting with x = longitude, y = latitude.
fn ring_contains(ring: &[(f64, f64)], x: f64, y: f64) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
