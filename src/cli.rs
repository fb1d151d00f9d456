// Command-line interface.
//
// Data paths can come from flags or environment variables, so a dashboard
// wrapper can point every command at the same files.
use crate::aggregate::Aggregation;
use crate::combine::TrendSource;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Regional interest maps for UK infrastructure projects")]
pub struct Cli {
    /// Combined Google Trends CSV
    #[arg(long, env = "TRENDS_CSV", default_value = "data/combined_google_trends_data.csv")]
    pub trends: PathBuf,

    /// Boundary GeoJSON (country or region level)
    #[arg(
        long,
        env = "BOUNDARIES_GEOJSON",
        default_value = "data/Countries_December_2024_Boundaries_UK_BUC.geojson"
    )]
    pub geojson: PathBuf,

    /// BlueSky post export
    #[arg(long, env = "BLUESKY_CSV", default_value = "blue_sky_top_posts.csv")]
    pub posts: PathBuf,

    /// Directory for generated CSV/JSON files
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List topics and the covered date range
    Topics,

    /// Per-region values for one topic and day, joined onto the boundaries
    Map {
        #[arg(short, long)]
        topic: String,
        /// Day to map (defaults to the most recent date in the data)
        #[arg(short, long)]
        date: Option<NaiveDate>,
        #[arg(short, long, value_enum, default_value_t = Aggregation::Mean)]
        agg: Aggregation,
        /// Rows shown in the console preview
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Weekly heat-map frames at region centroids
    Frames {
        #[arg(short, long)]
        topic: String,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Weekly sparkline series per located region
    Markers {
        #[arg(short, long)]
        topic: String,
    },

    /// Headline statistics and top regions for a topic
    Stats {
        #[arg(short, long)]
        topic: String,
        /// Restrict the series to one region
        #[arg(short, long)]
        region: Option<String>,
    },

    /// Top BlueSky posts for a topic and day
    Posts {
        #[arg(short, long)]
        topic: String,
        #[arg(short, long)]
        date: NaiveDate,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Merge per-programme trend exports into the combined CSV
    Combine {
        /// Input as FILE=PROGRAM; repeat for each file
        #[arg(short, long = "source", required = true)]
        sources: Vec<TrendSource>,
        #[arg(long, default_value = "data/combined_google_trends_data.csv")]
        output: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_map_command() {
        let cli = Cli::parse_from([
            "uk_trends_map",
            "--trends",
            "trends.csv",
            "map",
            "--topic",
            "HS2",
            "--date",
            "2024-07-04",
            "--agg",
            "latest",
        ]);
        assert_eq!(cli.trends, PathBuf::from("trends.csv"));
        match cli.command {
            Command::Map { topic, date, agg, limit } => {
                assert_eq!(topic, "HS2");
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 7, 4));
                assert_eq!(agg, Aggregation::Latest);
                assert_eq!(limit, 10);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_repeated_sources() {
        let cli = Cli::parse_from([
            "uk_trends_map",
            "combine",
            "-s",
            "a.csv=HS2",
            "--source",
            "b.csv=Sizewell C",
        ]);
        match cli.command {
            Command::Combine { sources, output } => {
                assert_eq!(sources.len(), 2);
                assert_eq!(sources[1].program, "Sizewell C");
                assert_eq!(output, PathBuf::from("data/combined_google_trends_data.csv"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_dates() {
        let res = Cli::try_parse_from(["uk_trends_map", "posts", "-t", "HS2", "-d", "yesterday"]);
        assert!(res.is_err());
    }
}
