use crate::aggregate::{aggregate_by_region, filter_topic, Aggregation};
use crate::types::{
    AggregatedRegionValue, RegionCentroid, RegionMarker, SeriesSummary, TrendDirection,
    TrendRecord, WeeklyPoint,
};
use crate::util::{average, week_end};
use chrono::{Duration, NaiveDate};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Weekly means labelled by the Sunday ending each week.
///
/// Weeks between the first and last observation with no rows are kept as
/// gaps (`None`) so the series stays evenly spaced.
pub fn weekly_series(rows: &[&TrendRecord]) -> Vec<WeeklyPoint> {
    let mut weeks: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for r in rows {
        let Some(week) = week_end(r.date) else {
            continue;
        };
        weeks
            .entry(week)
            .or_default()
            .push(r.interest_value);
    }
    let (Some(first), Some(last)) = (
        weeks.keys().next().copied(),
        weeks.keys().next_back().copied(),
    ) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut week = first;
    while week <= last {
        out.push(WeeklyPoint {
            week_end: week,
            value: weeks.get(&week).map(|v| average(v)),
        });
        match week.checked_add_signed(Duration::days(7)) {
            Some(next) => week = next,
            None => break,
        }
    }
    out
}

/// Sparkline data for every centroid region that has rows for `topic`.
pub fn region_markers(
    records: &[TrendRecord],
    topic: &str,
    centroids: &BTreeMap<String, RegionCentroid>,
) -> Vec<RegionMarker> {
    let mut by_region: BTreeMap<&str, Vec<&TrendRecord>> = BTreeMap::new();
    for r in filter_topic(records, topic, None, None) {
        by_region.entry(r.region.as_str()).or_default().push(r);
    }

    centroids
        .values()
        .filter_map(|c| {
            let rows = by_region.get(c.region_code.as_str())?;
            let series = weekly_series(rows);
            if series.is_empty() {
                return None;
            }
            let latest = series.iter().rev().find_map(|p| p.value);
            Some(RegionMarker {
                region: c.region_code.clone(),
                lat: c.lat,
                lon: c.lon,
                latest,
                series,
            })
        })
        .collect()
}

/// Mean value per day for a topic, across all regions or just one.
pub fn daily_series(
    records: &[TrendRecord],
    topic: &str,
    region: Option<&str>,
) -> Vec<(NaiveDate, f64)> {
    let mut days: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for r in filter_topic(records, topic, None, None) {
        if region.map_or(true, |want| r.region == want) {
            days.entry(r.date).or_default().push(r.interest_value);
        }
    }
    days.into_iter().map(|(d, v)| (d, average(&v))).collect()
}

/// Headline numbers for a dated series; `None` when it is empty.
///
/// The trend compares the mean of the last four points against the four
/// before them.
pub fn summarize_series(points: &[(NaiveDate, f64)]) -> Option<SeriesSummary> {
    let &(_, current) = points.last()?;
    let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();

    let (mut peak_date, mut peak) = points[0];
    for &(d, v) in &points[1..] {
        if v > peak {
            peak = v;
            peak_date = d;
        }
    }

    let trend = if values.len() >= 8 {
        let recent = &values[values.len() - 8..];
        let previous_avg = average(&recent[..4]);
        let recent_avg = average(&recent[4..]);
        match recent_avg.partial_cmp(&previous_avg) {
            Some(Ordering::Greater) => TrendDirection::Increasing,
            Some(Ordering::Less) => TrendDirection::Decreasing,
            _ => TrendDirection::Stable,
        }
    } else {
        TrendDirection::InsufficientData
    };

    Some(SeriesSummary {
        average: average(&values),
        peak,
        peak_date,
        current,
        trend,
    })
}

/// Regions ranked by mean interest in `topic`, highest first.
pub fn top_regions(records: &[TrendRecord], topic: &str, n: usize) -> Vec<AggregatedRegionValue> {
    let rows = filter_topic(records, topic, None, None);
    let mut ranked = aggregate_by_region(&rows, Aggregation::Mean);
    ranked.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.region.cmp(&b.region))
    });
    ranked.truncate(n);
    ranked
}
