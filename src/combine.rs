// Merge per-programme trend exports into one combined CSV.
//
// Each input file is paired with its programme name on the command line
// (`HS2_uk_regional_daily.csv=HS2`) instead of inferring it from the file.
use crate::error::{Result, TrendsError};
use csv::{ReaderBuilder, StringRecord, Writer};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

pub const PROGRAM_COLUMN: &str = "Program";

#[derive(Debug, Clone, PartialEq)]
pub struct TrendSource {
    pub path: PathBuf,
    pub program: String,
}

impl FromStr for TrendSource {
    type Err = TrendsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.rsplit_once('=') {
            Some((path, program)) if !path.trim().is_empty() && !program.trim().is_empty() => {
                Ok(TrendSource {
                    path: PathBuf::from(path.trim()),
                    program: program.trim().to_string(),
                })
            }
            _ => Err(TrendsError::InvalidArgument(format!(
                "expected FILE=PROGRAM, got `{s}`"
            ))),
        }
    }
}

struct Table {
    headers: StringRecord,
    rows: Vec<StringRecord>,
    program: String,
}

fn read_table<R: Read>(reader: R, program: &str) -> Result<Table> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let rows = rdr.records().collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(Table {
        headers,
        rows,
        program: program.to_string(),
    })
}

pub fn combine_trend_files(sources: &[TrendSource], output: &Path) -> Result<usize> {
    let mut inputs = Vec::with_capacity(sources.len());
    for s in sources {
        inputs.push((std::fs::File::open(&s.path)?, s.program.as_str()));
    }
    let out = std::fs::File::create(output)?;
    let rows = combine(inputs, out)?;
    info!(files = sources.len(), rows, output = %output.display(), "Combined trend files");
    Ok(rows)
}

/// Concatenate CSV inputs, tagging every row with its programme.
///
/// Columns are the union of the input headers in first-seen order followed by
/// `Program`; cells an input does not have are left blank. Returns the number
/// of rows written.
pub fn combine<'a, R, W, I>(inputs: I, writer: W) -> Result<usize>
where
    R: Read,
    W: Write,
    I: IntoIterator<Item = (R, &'a str)>,
{
    let tables = inputs
        .into_iter()
        .map(|(r, program)| read_table(r, program))
        .collect::<Result<Vec<_>>>()?;

    let mut columns: Vec<String> = Vec::new();
    for t in &tables {
        for h in t.headers.iter() {
            if h != PROGRAM_COLUMN && !columns.iter().any(|c| c == h) {
                columns.push(h.to_string());
            }
        }
    }

    let mut wtr = Writer::from_writer(writer);
    let mut header = columns.clone();
    header.push(PROGRAM_COLUMN.to_string());
    wtr.write_record(&header)?;

    let mut written = 0usize;
    for t in &tables {
        let positions: Vec<Option<usize>> = columns
            .iter()
            .map(|c| t.headers.iter().position(|h| h == c))
            .collect();
        for row in &t.rows {
            let mut out: Vec<&str> = positions
                .iter()
                .map(|p| p.and_then(|i| row.get(i)).unwrap_or(""))
                .collect();
            out.push(t.program.as_str());
            wtr.write_record(&out)?;
            written += 1;
        }
    }
    wtr.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_trends_from_reader;

    #[test]
    fn parses_source_argument() {
        let s: TrendSource = "data/google_data/HS2_uk_regional_daily.csv=HS2".parse().unwrap();
        assert_eq!(s.program, "HS2");
        assert_eq!(s.path, PathBuf::from("data/google_data/HS2_uk_regional_daily.csv"));
        assert!("no-program.csv".parse::<TrendSource>().is_err());
        assert!("file.csv=".parse::<TrendSource>().is_err());
    }

    #[test]
    fn unions_columns_and_tags_rows() {
        let hs2 = "date,region,value\n2024-01-01,Wales,10\n2024-01-02,Wales,12\n";
        let szc = "date,region,value,isPartial\n2024-01-01,England,40,False\n";
        let mut out = Vec::new();
        let n = combine(
            vec![(hs2.as_bytes(), "HS2"), (szc.as_bytes(), "Sizewell C")],
            &mut out,
        )
        .unwrap();
        assert_eq!(n, 3);

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("date,region,value,isPartial,Program"));
        assert_eq!(lines.next(), Some("2024-01-01,Wales,10,,HS2"));
        assert_eq!(lines.nth(1), Some("2024-01-01,England,40,False,Sizewell C"));

        // The combined file loads through the legacy column names.
        let (rows, _) = load_trends_from_reader(text.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].topic_name, "Sizewell C");
    }
}
