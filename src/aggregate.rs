use crate::types::{AggregatedRegionValue, TrendRecord};
use crate::util::average;
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// How several rows for one region collapse into a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Mean,
    Sum,
    /// Value of the most recent row per region.
    Latest,
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Aggregation::Mean => "mean",
            Aggregation::Sum => "sum",
            Aggregation::Latest => "latest",
        })
    }
}

/// Rows for one topic on one calendar day.
pub fn filter_records<'a>(
    records: &'a [TrendRecord],
    topic: &str,
    date: NaiveDate,
) -> Vec<&'a TrendRecord> {
    records
        .iter()
        .filter(|r| r.topic_name == topic && r.date == date)
        .collect()
}

/// Rows for one topic, optionally limited to an inclusive date range.
pub fn filter_topic<'a>(
    records: &'a [TrendRecord],
    topic: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<&'a TrendRecord> {
    records
        .iter()
        .filter(|r| r.topic_name == topic)
        .filter(|r| from.map_or(true, |f| r.date >= f))
        .filter(|r| to.map_or(true, |t| r.date <= t))
        .collect()
}

/// One value per region present in `rows`, ordered by region.
///
/// Regions with no rows get no entry, so an empty input gives an empty
/// result rather than zeros.
pub fn aggregate_by_region(rows: &[&TrendRecord], mode: Aggregation) -> Vec<AggregatedRegionValue> {
    match mode {
        Aggregation::Mean | Aggregation::Sum => {
            let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
            for r in rows {
                groups
                    .entry(r.region.as_str())
                    .or_default()
                    .push(r.interest_value);
            }
            groups
                .into_iter()
                .map(|(region, values)| AggregatedRegionValue {
                    region: region.to_string(),
                    value: match mode {
                        Aggregation::Sum => values.iter().sum(),
                        _ => average(&values),
                    },
                })
                .collect()
        }
        Aggregation::Latest => {
            let mut sorted: Vec<&TrendRecord> = rows.to_vec();
            // Stable sort: among rows sharing a date the later one in the input wins.
            sorted.sort_by_key(|r| r.date);
            let mut latest: BTreeMap<&str, f64> = BTreeMap::new();
            for r in sorted {
                latest.insert(r.region.as_str(), r.interest_value);
            }
            latest
                .into_iter()
                .map(|(region, value)| AggregatedRegionValue {
                    region: region.to_string(),
                    value,
                })
                .collect()
        }
    }
}

/// Sorted distinct topics.
pub fn topics(records: &[TrendRecord]) -> Vec<String> {
    let mut topics: Vec<String> = records.iter().map(|r| r.topic_name.clone()).collect();
    topics.sort();
    topics.dedup();
    topics
}

/// Sorted distinct dates.
pub fn dates(records: &[TrendRecord]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = records.iter().map(|r| r.date).collect();
    dates.sort();
    dates.dedup();
    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(date: &str, topic: &str, region: &str, value: f64) -> TrendRecord {
        TrendRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            topic_name: topic.to_string(),
            region: region.to_string(),
            region_name: region.to_string(),
            interest_value: value,
        }
    }

    fn sample() -> Vec<TrendRecord> {
        vec![
            rec("2024-07-01", "HS2", "Wales", 10.0),
            rec("2024-07-01", "HS2", "Wales", 20.0),
            rec("2024-07-01", "HS2", "Wales", 30.0),
            rec("2024-07-01", "HS2", "England", 70.0),
            rec("2024-07-01", "Sizewell C", "Wales", 99.0),
            rec("2024-07-02", "HS2", "Wales", 5.0),
        ]
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn mean_and_sum() {
        let data = sample();
        let rows = filter_records(&data, "HS2", day("2024-07-01"));
        assert_eq!(rows.len(), 4);

        let mean = aggregate_by_region(&rows, Aggregation::Mean);
        assert_eq!(mean.len(), 2);
        assert_eq!(mean[0].region, "England");
        assert_eq!(mean[1].value, 20.0);

        let sum = aggregate_by_region(&rows, Aggregation::Sum);
        assert_eq!(sum[1].value, 60.0);
    }

    #[test]
    fn latest_keeps_most_recent_row() {
        let data = sample();
        let rows = filter_topic(&data, "HS2", None, None);
        let latest = aggregate_by_region(&rows, Aggregation::Latest);
        assert_eq!(latest[1].region, "Wales");
        assert_eq!(latest[1].value, 5.0);

        // Same-day ties resolve to the last row in input order.
        let rows = filter_records(&data, "HS2", day("2024-07-01"));
        let latest = aggregate_by_region(&rows, Aggregation::Latest);
        assert_eq!(latest[1].value, 30.0);
    }

    #[test]
    fn no_matching_rows_gives_empty_result() {
        let data = sample();
        let rows = filter_records(&data, "AUKUS", day("2024-07-01"));
        assert!(rows.is_empty());
        assert!(aggregate_by_region(&rows, Aggregation::Sum).is_empty());

        let rows = filter_records(&data, "HS2", day("2023-01-01"));
        assert!(aggregate_by_region(&rows, Aggregation::Mean).is_empty());
    }

    #[test]
    fn topic_filter_respects_range() {
        let data = sample();
        let rows = filter_topic(&data, "HS2", Some(day("2024-07-02")), None);
        assert_eq!(rows.len(), 1);
        let rows = filter_topic(&data, "HS2", None, Some(day("2024-07-01")));
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn lists_topics_and_dates() {
        let data = sample();
        assert_eq!(topics(&data), vec!["HS2", "Sizewell C"]);
        assert_eq!(dates(&data), vec![day("2024-07-01"), day("2024-07-02")]);
    }
}
