// Boundary file handling: region listing and centroid building.
//
// Centroids are vertex means of a single exterior ring, not area-weighted
// centroids. For a MultiPolygon the ring with the most vertices stands in for
// the largest part.
use crate::error::{GeometryError, Result};
use crate::types::{BoundaryRegion, RegionCentroid};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Property keys holding the boundary code, country level first.
const CODE_KEYS: [&str; 2] = ["CTRY24CD", "RGN24CD"];
const NAME_KEYS: [&str; 2] = ["CTRY24NM", "RGN24NM"];

pub fn load_geojson<P: AsRef<Path>>(path: P) -> Result<Value> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Reading GeoJSON");
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn features(geojson: &Value) -> impl Iterator<Item = &Value> {
    geojson
        .get("features")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn first_property(feature: &Value, keys: &[&str]) -> Option<String> {
    let props = feature.get("properties")?;
    keys.iter().find_map(|k| match props.get(*k)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

pub fn feature_code(feature: &Value) -> Option<String> {
    first_property(feature, &CODE_KEYS)
}

pub fn feature_name(feature: &Value) -> Option<String> {
    first_property(feature, &NAME_KEYS)
}

/// Mean of the usable `[x, y, ..]` points of a ring, returned as `(lat, lon)`.
///
/// Points that are not arrays of at least two finite numbers are skipped.
pub fn polygon_centroid(ring: &Value) -> Option<(f64, f64)> {
    let (mut sum_x, mut sum_y, mut n) = (0.0, 0.0, 0usize);
    for p in ring.as_array()? {
        let Some(p) = p.as_array() else { continue };
        if p.len() < 2 {
            continue;
        }
        let (Some(x), Some(y)) = (p[0].as_f64(), p[1].as_f64()) else {
            continue;
        };
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        sum_x += x;
        sum_y += y;
        n += 1;
    }
    if n == 0 {
        return None;
    }
    Some((sum_y / n as f64, sum_x / n as f64))
}

fn exterior_ring(polygon: &Value) -> Option<&Value> {
    polygon.as_array()?.first()
}

fn ring_len(ring: &Value) -> usize {
    ring.as_array().map_or(0, Vec::len)
}

/// Representative `(lat, lon)` of one feature's geometry.
pub fn feature_centroid(feature: &Value) -> std::result::Result<(f64, f64), GeometryError> {
    let geometry = feature
        .get("geometry")
        .filter(|g| !g.is_null())
        .ok_or(GeometryError::MissingCoordinates)?;
    let gtype = geometry.get("type").and_then(Value::as_str).unwrap_or("");
    let coords = geometry.get("coordinates");

    let centroid = match gtype {
        "Polygon" => coords
            .and_then(exterior_ring)
            .and_then(polygon_centroid)
            .ok_or(GeometryError::MissingCoordinates)?,
        "MultiPolygon" => {
            let mut best: Option<((f64, f64), usize)> = None;
            for polygon in coords.and_then(Value::as_array).into_iter().flatten() {
                let Some(ring) = exterior_ring(polygon) else { continue };
                let Some(c) = polygon_centroid(ring) else { continue };
                let len = ring_len(ring);
                if best.map_or(true, |(_, best_len)| len > best_len) {
                    best = Some((c, len));
                }
            }
            best.map(|(c, _)| c).ok_or(GeometryError::MissingCoordinates)?
        }
        other => return Err(GeometryError::UnsupportedType(other.to_string())),
    };

    if !(centroid.0.is_finite() && centroid.1.is_finite()) {
        return Err(GeometryError::NonFinite);
    }
    Ok(centroid)
}

/// Centroid per boundary code. Features that fail are logged and left out.
pub fn build_region_centroids(geojson: &Value) -> BTreeMap<String, RegionCentroid> {
    let mut centroids = BTreeMap::new();
    let mut skipped = 0usize;
    for feature in features(geojson) {
        let outcome = feature_code(feature)
            .ok_or(GeometryError::MissingCode)
            .and_then(|code| feature_centroid(feature).map(|c| (code, c)));
        match outcome {
            Ok((code, (lat, lon))) => {
                centroids.insert(
                    code.clone(),
                    RegionCentroid {
                        region_code: code,
                        lat,
                        lon,
                    },
                );
            }
            Err(e) => {
                skipped += 1;
                debug!(error = %e, "Skipping boundary feature");
            }
        }
    }
    info!(regions = centroids.len(), skipped, "Built region centroids");
    centroids
}

/// Every feature that carries a code, in file order.
pub fn boundary_regions(geojson: &Value) -> Vec<BoundaryRegion> {
    features(geojson)
        .filter_map(|f| {
            let code = feature_code(f)?;
            Some(BoundaryRegion {
                code,
                name: feature_name(f).unwrap_or_default(),
            })
        })
        .collect()
}
