use crate::types::{Frame, RegionCentroid, TrendRecord};
use crate::util::{average, week_start};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

/// Min-max scale `values` onto `[0, 100]`.
///
/// A frame whose values are all equal maps every weight to 0.
pub fn normalize_weights(values: &[f64]) -> Vec<f64> {
    let (mut min, mut max) = (f64::MAX, f64::MIN);
    for v in values {
        min = min.min(*v);
        max = max.max(*v);
    }
    let range = max - min;
    values
        .iter()
        .map(|v| {
            if range > 0.0 && range.is_finite() {
                ((v - min) / range * 100.0).clamp(0.0, 100.0)
            } else {
                0.0
            }
        })
        .collect()
}

/// Weekly heat-map frames at region centroids.
///
/// Rows are bucketed by the Monday starting their week and averaged per
/// (week, region). Regions without a centroid are left out, and a week left
/// with no points produces no frame.
pub fn build_frames(
    rows: &[&TrendRecord],
    centroids: &BTreeMap<String, RegionCentroid>,
) -> Vec<Frame> {
    let mut buckets: BTreeMap<NaiveDate, BTreeMap<&str, Vec<f64>>> = BTreeMap::new();
    for r in rows {
        let Some(week) = week_start(r.date) else {
            debug!(date = %r.date, "Skipping row outside the calendar range");
            continue;
        };
        buckets
            .entry(week)
            .or_default()
            .entry(r.region.as_str())
            .or_default()
            .push(r.interest_value);
    }

    let mut frames = Vec::with_capacity(buckets.len());
    for (week, regions) in buckets {
        let located: Vec<(&RegionCentroid, f64)> = regions
            .into_iter()
            .filter_map(|(region, values)| {
                centroids.get(region).map(|c| (c, average(&values)))
            })
            .collect();
        if located.is_empty() {
            debug!(%week, "No located regions for week");
            continue;
        }

        let values: Vec<f64> = located.iter().map(|(_, v)| *v).collect();
        let points = located
            .iter()
            .zip(normalize_weights(&values))
            .map(|((c, _), w)| [c.lat, c.lon, w])
            .collect();
        frames.push(Frame {
            label: week.format("%Y-%m-%d").to_string(),
            points,
        });
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HeatmapAnimation;

    fn rec(date: &str, region: &str, value: f64) -> TrendRecord {
        TrendRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            topic_name: "HS2".to_string(),
            region: region.to_string(),
            region_name: region.to_string(),
            interest_value: value,
        }
    }

    fn centroids() -> BTreeMap<String, RegionCentroid> {
        [("A", 51.0, -1.0), ("B", 53.0, -2.0), ("C", 55.0, -4.0)]
            .into_iter()
            .map(|(code, lat, lon)| {
                (
                    code.to_string(),
                    RegionCentroid {
                        region_code: code.to_string(),
                        lat,
                        lon,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn flat_frame_floors_to_zero() {
        assert_eq!(normalize_weights(&[5.0, 5.0, 5.0]), vec![0.0, 0.0, 0.0]);
        assert_eq!(normalize_weights(&[7.0]), vec![0.0]);
    }

    #[test]
    fn stretches_to_full_range() {
        assert_eq!(normalize_weights(&[0.0, 10.0]), vec![0.0, 100.0]);
        assert_eq!(normalize_weights(&[20.0, 30.0, 40.0]), vec![0.0, 50.0, 100.0]);
    }

    #[test]
    fn buckets_weeks_and_averages_regions() {
        let data = vec![
            // Week of Mon 2024-07-01.
            rec("2024-07-01", "A", 10.0),
            rec("2024-07-03", "A", 30.0),
            rec("2024-07-07", "B", 40.0),
            rec("2024-07-02", "Z", 99.0),
            // Week of Mon 2024-07-08.
            rec("2024-07-09", "A", 5.0),
            rec("2024-07-09", "B", 5.0),
            // Week of Mon 2024-07-15, only an unknown region.
            rec("2024-07-16", "Z", 50.0),
        ];
        let rows: Vec<&TrendRecord> = data.iter().collect();
        let frames = build_frames(&rows, &centroids());

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].label, "2024-07-01");
        // A averages to 20, B is 40.
        assert_eq!(
            frames[0].points,
            vec![[51.0, -1.0, 0.0], [53.0, -2.0, 100.0]]
        );
        assert_eq!(frames[1].label, "2024-07-08");
        assert!(frames[1].points.iter().all(|p| p[2] == 0.0));

        let anim = HeatmapAnimation::from(frames);
        assert_eq!(anim.index, vec!["2024-07-01", "2024-07-08"]);
        assert_eq!(anim.data.len(), 2);
    }

    #[test]
    fn rows_at_calendar_edge_are_skipped() {
        let mut edge = rec("2024-07-01", "A", 10.0);
        edge.date = NaiveDate::MIN;
        let data = vec![edge, rec("2024-07-02", "B", 20.0)];
        let rows: Vec<&TrendRecord> = data.iter().collect();
        let frames = build_frames(&rows, &centroids());
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].points, vec![[53.0, -2.0, 0.0]]);
    }
}
