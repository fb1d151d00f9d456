// BlueSky post export: loading and per-day selection.
use crate::error::{Result, TrendsError};
use crate::types::{BlueSkyPost, PostScope};
use crate::util::{month_label, parse_count};
use chrono::{DateTime, NaiveDate, Utc};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::path::Path;
use tracing::info;

pub fn load_posts<P: AsRef<Path>>(path: P) -> Result<Vec<BlueSkyPost>> {
    let file = std::fs::File::open(path.as_ref())?;
    load_posts_from_reader(file)
}

/// Read the export, dropping rows whose `created_at` is not a timestamp.
///
/// `date_only` is always derived from `created_at` in UTC; `month` falls back
/// to the derived label when the column is absent or blank.
pub fn load_posts_from_reader<R: Read>(reader: R) -> Result<Vec<BlueSkyPost>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let col = |name: &str| headers.iter().position(|h| h.trim() == name);

    let mut missing: Vec<String> = ["created_at", "topic"]
        .into_iter()
        .filter(|&c| col(c).is_none())
        .map(str::to_string)
        .collect();
    let (Some(topic_idx), Some(created_idx)) = (col("topic"), col("created_at")) else {
        missing.sort();
        return Err(TrendsError::Schema { missing });
    };
    let field = |row: &StringRecord, idx: Option<usize>| -> String {
        idx.and_then(|i| row.get(i)).unwrap_or("").trim().to_string()
    };

    let (likes, reposts, replies) = (col("likes"), col("reposts"), col("replies"));
    let (author, text, month_idx) = (col("author"), col("text"), col("month"));

    let mut posts = Vec::new();
    let mut dropped = 0usize;
    for result in rdr.records() {
        let Ok(row) = result else {
            dropped += 1;
            continue;
        };
        let Some(created_at) = parse_timestamp(row.get(created_idx)) else {
            dropped += 1;
            continue;
        };
        let date_only = created_at.date_naive();
        let month = match field(&row, month_idx) {
            m if m.is_empty() => month_label(date_only),
            m => m,
        };
        posts.push(BlueSkyPost {
            topic: field(&row, Some(topic_idx)),
            created_at,
            date_only,
            likes: parse_count(likes.and_then(|i| row.get(i))),
            reposts: parse_count(reposts.and_then(|i| row.get(i))),
            replies: parse_count(replies.and_then(|i| row.get(i))),
            author: field(&row, author),
            text: field(&row, text),
            month,
        });
    }

    info!(loaded = posts.len(), dropped, "Loaded BlueSky posts");
    Ok(posts)
}

fn parse_timestamp(s: Option<&str>) -> Option<DateTime<Utc>> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Most-liked posts for a topic on `date`, or for its month when the day has none.
pub fn top_posts<'a>(
    posts: &'a [BlueSkyPost],
    topic: &str,
    date: NaiveDate,
    limit: usize,
) -> (PostScope, Vec<&'a BlueSkyPost>) {
    let pick = |keep: &dyn Fn(&BlueSkyPost) -> bool| {
        let mut hits: Vec<&BlueSkyPost> = posts
            .iter()
            .filter(|&p| p.topic == topic && keep(p))
            .collect();
        hits.sort_by(|a, b| b.likes.cmp(&a.likes));
        hits.truncate(limit);
        hits
    };

    let day = pick(&|p: &BlueSkyPost| p.date_only == date);
    if !day.is_empty() {
        return (PostScope::Day, day);
    }
    let label = month_label(date);
    let month = pick(&|p: &BlueSkyPost| p.month == label);
    (PostScope::Month(label), month)
}
