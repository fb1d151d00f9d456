// Entry point and per-command flow.
//
// Every command loads what it needs once at startup and hands the tables to
// the pure aggregation code:
// - `map` filters one topic and day, aggregates per region and joins the
//   values onto the boundary file for a choropleth.
// - `frames` and `markers` build the animated heat map and sparkline inputs.
// - `stats`, `posts`, `topics` and `combine` cover the supporting scripts.
mod aggregate;
mod cli;
mod combine;
mod error;
mod frames;
mod geo;
mod loader;
mod map;
mod output;
mod posts;
mod series;
mod types;
mod util;

use aggregate::Aggregation;
use chrono::NaiveDate;
use clap::Parser;
use cli::{Cli, Command};
use error::Result;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};
use types::{HeatmapAnimation, PostScope, StatsReport, TrendRecord};

fn load_trends(path: &Path) -> Result<Vec<TrendRecord>> {
    let (records, report) = loader::load_trends(path)?;
    println!(
        "Loaded {} rows ({} dropped as invalid).",
        util::format_int(report.loaded_rows),
        util::format_int(report.dropped_rows)
    );
    if report.region_names_filled > 0 {
        info!(
            filled = report.region_names_filled,
            "Filled missing region names from region codes"
        );
    }
    Ok(records)
}

fn handle_topics(cli: &Cli) -> Result<()> {
    let records = load_trends(&cli.trends)?;
    let dates = aggregate::dates(&records);
    let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
        println!("No valid rows in {}.", cli.trends.display());
        return Ok(());
    };
    println!("Dates: {} to {} ({} days with data)", first, last, dates.len());
    println!("Topics:");
    for topic in aggregate::topics(&records) {
        println!("  - {}", topic);
    }
    Ok(())
}

fn handle_map(
    cli: &Cli,
    topic: &str,
    date: Option<NaiveDate>,
    agg: Aggregation,
    limit: usize,
) -> Result<()> {
    let boundaries_json = geo::load_geojson(&cli.geojson)?;
    let records = load_trends(&cli.trends)?;

    let Some(date) = date.or_else(|| aggregate::dates(&records).last().copied()) else {
        warn!("No rows match your filters.");
        return Ok(());
    };
    let filtered = aggregate::filter_records(&records, topic, date);
    let values = aggregate::aggregate_by_region(&filtered, agg);
    if values.is_empty() {
        warn!(topic, %date, "No rows match your filters.");
        println!("No data for {} on {}.", topic, date);
        return Ok(());
    }

    let boundaries = geo::boundary_regions(&boundaries_json);
    let rows = map::choropleth_rows(&values, &boundaries);
    let file = cli.out_dir.join(format!(
        "choropleth_{}_{}.csv",
        util::slug(topic),
        date.format("%Y-%m-%d")
    ));
    output::write_csv(&file, &rows)?;

    println!("{} ({}) on {}\n", topic, agg, date);
    output::preview_table_rows(&values, limit);
    println!("(Choropleth values for {} boundaries exported to {})\n", rows.len(), file.display());
    Ok(())
}

fn handle_frames(
    cli: &Cli,
    topic: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<()> {
    let centroids = geo::build_region_centroids(&geo::load_geojson(&cli.geojson)?);
    let records = load_trends(&cli.trends)?;

    let rows = aggregate::filter_topic(&records, topic, from, to);
    if rows.is_empty() {
        warn!(topic, "No rows match your filters.");
        println!("No data for {}.", topic);
        return Ok(());
    }
    let frames = frames::build_frames(&rows, &centroids);
    let points: usize = frames.iter().map(|f| f.points.len()).sum();
    let animation = HeatmapAnimation::from(frames);

    let file = cli.out_dir.join(format!("frames_{}.json", util::slug(topic)));
    output::write_json(&file, &animation)?;
    println!(
        "Built {} weekly frames ({} points) for {}, exported to {}",
        util::format_int(animation.index.len()),
        util::format_int(points),
        topic,
        file.display()
    );
    Ok(())
}

fn handle_markers(cli: &Cli, topic: &str) -> Result<()> {
    let centroids = geo::build_region_centroids(&geo::load_geojson(&cli.geojson)?);
    let records = load_trends(&cli.trends)?;

    let markers = series::region_markers(&records, topic, &centroids);
    if markers.is_empty() {
        warn!(topic, "No located regions have data for this topic");
    }
    let file = cli.out_dir.join(format!("markers_{}.json", util::slug(topic)));
    output::write_json(&file, &markers)?;

    println!("{}: latest weekly interest by region\n", topic);
    output::preview_table_rows(&markers, markers.len());
    println!("(Weekly series exported to {})\n", file.display());
    Ok(())
}

fn handle_stats(cli: &Cli, topic: &str, region: Option<&str>) -> Result<()> {
    let records = load_trends(&cli.trends)?;
    let points = series::daily_series(&records, topic, region);
    let Some(summary) = series::summarize_series(&points) else {
        warn!(topic, region, "No rows match your filters.");
        println!("No data for {}.", topic);
        return Ok(());
    };
    let top_regions = series::top_regions(&records, topic, 10);

    println!("{}", "=".repeat(70));
    println!("UK GOVERNMENT PROJECT TRENDS ANALYSIS: {}", topic);
    println!("{}", "=".repeat(70));
    println!("  Average Interest: {}", util::format_number(summary.average, 2));
    println!(
        "  Peak Interest: {} on {}",
        util::format_number(summary.peak, 0),
        summary.peak_date.format("%d %B %Y")
    );
    println!("  Current Interest: {}", util::format_number(summary.current, 0));
    println!("  Recent Trend: {}\n", summary.trend);
    if region.is_none() {
        println!("Top regions by interest:\n");
        output::preview_table_rows(&top_regions, top_regions.len());
    }

    let report = StatsReport {
        topic: topic.to_string(),
        region: region.map(str::to_string),
        summary,
        top_regions,
    };
    let file = cli.out_dir.join(format!("stats_{}.json", util::slug(topic)));
    output::write_json(&file, &report)?;
    println!("(Summary exported to {})\n", file.display());
    Ok(())
}

fn handle_posts(cli: &Cli, topic: &str, date: NaiveDate, limit: usize) -> Result<()> {
    let all = posts::load_posts(&cli.posts)?;
    let (scope, picked) = posts::top_posts(&all, topic, date, limit);
    if let PostScope::Month(label) = &scope {
        println!("Showing posts for {}", label);
    }
    if picked.is_empty() {
        println!("No BlueSky posts found for this period/topic.");
        return Ok(());
    }
    for post in picked {
        println!("@{}", post.author);
        println!("{}", post.text);
        println!(
            "likes {} | reposts {} | replies {} | {}\n",
            util::format_int(post.likes),
            util::format_int(post.reposts),
            util::format_int(post.replies),
            post.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Topics => handle_topics(cli),
        Command::Map {
            topic,
            date,
            agg,
            limit,
        } => handle_map(cli, topic, *date, *agg, *limit),
        Command::Frames { topic, from, to } => handle_frames(cli, topic, *from, *to),
        Command::Markers { topic } => handle_markers(cli, topic),
        Command::Stats { topic, region } => handle_stats(cli, topic, region.as_deref()),
        Command::Posts { topic, date, limit } => handle_posts(cli, topic, *date, *limit),
        Command::Combine { sources, output } => {
            let rows = combine::combine_trend_files(sources, output)?;
            println!(
                "Combined {} files ({} rows) into {}",
                sources.len(),
                util::format_int(rows),
                output.display()
            );
            Ok(())
        }
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let cli = Cli::parse();
    if let Err(e) = std::fs::create_dir_all(&cli.out_dir) {
        error!(path = %cli.out_dir.display(), error = %e, "Output directory is not writable");
        std::process::exit(1);
    }
    if let Err(e) = run(&cli) {
        error!(error = %e, "Command failed");
        eprintln!("Failed: {}", e);
        std::process::exit(1);
    }
}
