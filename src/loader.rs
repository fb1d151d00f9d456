use crate::error::{Result, TrendsError};
use crate::types::TrendRecord;
use crate::util::{parse_date_safe, parse_f64_safe};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub dropped_rows: usize,
    pub region_names_filled: usize,
}

/// Column positions for the trends schema, resolved from the header row.
///
/// Canonical names win over the legacy `Program` / `value` headers when a
/// file carries both.
#[derive(Debug, Clone, PartialEq)]
struct ColumnMap {
    date: usize,
    topic_name: usize,
    region: usize,
    region_name: Option<usize>,
    interest_value: usize,
}

impl ColumnMap {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str, legacy: Option<&str>| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .or_else(|| legacy.and_then(|l| headers.iter().position(|h| h.trim() == l)))
        };

        let date = find("date", None);
        let topic_name = find("topic_name", Some("Program"));
        let region = find("region", None);
        let interest_value = find("interest_value", Some("value"));

        let mut missing: Vec<String> = [
            ("date", date),
            ("interest_value", interest_value),
            ("region", region),
            ("topic_name", topic_name),
        ]
        .iter()
        .filter(|(_, idx)| idx.is_none())
        .map(|(name, _)| name.to_string())
        .collect();
        // Without `region` there is nothing to derive `region_name` from either.
        if region.is_none() && find("region_name", None).is_none() {
            missing.push("region_name".to_string());
        }
        missing.sort();

        match (date, topic_name, region, interest_value) {
            (Some(date), Some(topic_name), Some(region), Some(interest_value)) => Ok(ColumnMap {
                date,
                topic_name,
                region,
                region_name: find("region_name", None),
                interest_value,
            }),
            _ => Err(TrendsError::Schema { missing }),
        }
    }
}

/// Load the combined trends CSV from disk.
pub fn load_trends<P: AsRef<Path>>(path: P) -> Result<(Vec<TrendRecord>, LoadReport)> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Opening trends CSV");
    let file = std::fs::File::open(path)?;
    load_trends_from_reader(file)
}

/// Load trend rows from any CSV source.
///
/// Fails only when the header is missing a required column. Rows whose date,
/// interest value, region or topic cannot be read are dropped and counted.
pub fn load_trends_from_reader<R: Read>(reader: R) -> Result<(Vec<TrendRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = ColumnMap::resolve(rdr.headers()?)?;

    let mut report = LoadReport::default();
    let mut records = Vec::new();

    for result in rdr.records() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                report.dropped_rows += 1;
                continue;
            }
        };

        let Some(date) = parse_date_safe(row.get(columns.date)) else {
            report.dropped_rows += 1;
            continue;
        };
        let Some(interest_value) = parse_f64_safe(row.get(columns.interest_value)) else {
            report.dropped_rows += 1;
            continue;
        };
        let region = non_blank(row.get(columns.region));
        let topic_name = non_blank(row.get(columns.topic_name));
        let (Some(region), Some(topic_name)) = (region, topic_name) else {
            report.dropped_rows += 1;
            continue;
        };

        let region_name = match non_blank(columns.region_name.and_then(|i| row.get(i))) {
            Some(name) => name,
            None => {
                report.region_names_filled += 1;
                region.clone()
            }
        };

        records.push(TrendRecord {
            date,
            topic_name,
            region,
            region_name,
            interest_value,
        });
    }

    report.loaded_rows = records.len();
    info!(
        total = report.total_rows,
        loaded = report.loaded_rows,
        dropped = report.dropped_rows,
        "Loaded trends CSV"
    );
    Ok((records, report))
}

fn non_blank(s: Option<&str>) -> Option<String> {
    let s = s?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
