use crate::types::{AggregatedRegionValue, BoundaryRegion, ChoroplethRow};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use tracing::warn;

// Country-level trend exports name the nation rather than its ONS code.
static COUNTRY_CODES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("England", "E92000001"),
        ("Northern Ireland", "N92000002"),
        ("Scotland", "S92000003"),
        ("Wales", "W92000004"),
    ])
});

pub fn country_code(name: &str) -> Option<&'static str> {
    COUNTRY_CODES.get(name.trim()).copied()
}

/// Boundary code a trend region refers to, if any.
pub fn region_code(region: &str, known_codes: &HashSet<&str>) -> Option<String> {
    if let Some(code) = country_code(region) {
        return Some(code.to_string());
    }
    known_codes.contains(region).then(|| region.to_string())
}

/// One row per boundary feature, carrying the matching aggregated value.
///
/// A value matches a boundary when its region resolves to the boundary code
/// or equals the boundary name.
pub fn choropleth_rows(
    values: &[AggregatedRegionValue],
    boundaries: &[BoundaryRegion],
) -> Vec<ChoroplethRow> {
    let known: HashSet<&str> = boundaries.iter().map(|b| b.code.as_str()).collect();
    let mut by_code: HashMap<String, f64> = HashMap::new();
    let mut by_name: HashMap<&str, f64> = HashMap::new();
    for v in values {
        if let Some(code) = region_code(&v.region, &known) {
            by_code.insert(code, v.value);
        }
        by_name.insert(v.region.as_str(), v.value);
    }

    let rows: Vec<ChoroplethRow> = boundaries
        .iter()
        .map(|b| {
            let value = by_code
                .get(&b.code)
                .or_else(|| by_name.get(b.name.as_str()))
                .copied();
            let shown = value.map(|v| format!("{:.1}", v)).unwrap_or_default();
            ChoroplethRow {
                code: b.code.clone(),
                name: b.name.clone(),
                value,
                tooltip: format!("{} ({}) - {}", b.name, b.code, shown),
            }
        })
        .collect();

    let matched = rows.iter().filter(|r| r.value.is_some()).count();
    if matched < values.len() {
        warn!(
            unmatched = values.len() - matched,
            "Some regions have no matching boundary"
        );
    }
    rows
}
