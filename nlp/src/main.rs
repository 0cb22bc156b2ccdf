use anyhow::Result;
use clap::{Parser, Subcommand};
use newsnlp_core::corpus::DaySelection;
use newsnlp_core::crap::CrapDetector;
use newsnlp_core::metapost::MetaPost;
use newsnlp_core::report::analyze_day;
use newsnlp_core::versioning::{latest_spiders, SpiderConfig};
use newsnlp_core::{NlpConfig, Post};
use serde::Serialize;
use time::macros::format_description;
use time::Date;
use tracing_subscriber::{fmt, EnvFilter};

use std::fs;
use std::path::{Path, PathBuf};

mod input;

use input::{load_lines, load_records};

#[derive(Parser)]
#[command(name = "nlp")]
#[command(about = "Similarity, metapost and version resolution over harvested posts", long_about = None)]
struct Cli {
    /// TOML configuration file (NEWSNLP_* environment variables override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a day's posts and decide which metaposts to (re)generate
    Analyze {
        /// Posts: JSON/JSONL file or directory
        #[arg(long)]
        input: PathBuf,
        /// Existing metaposts: JSON/JSONL file or directory
        #[arg(long)]
        metaposts: Option<PathBuf>,
        /// Low-quality reference corpus, one document per line
        #[arg(long)]
        reference: Option<PathBuf>,
        /// Days to process (YYYY-MM-DD), repeatable
        #[arg(long = "day", value_parser = parse_date)]
        days: Vec<Date>,
        /// First day of an inclusive range
        #[arg(long, value_parser = parse_date, requires = "to", conflicts_with = "days")]
        from: Option<Date>,
        /// Last day of an inclusive range
        #[arg(long, value_parser = parse_date, requires = "from")]
        to: Option<Date>,
        /// Report path; stdout when absent
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the latest enabled configuration of every spider
    Spiders {
        /// Spider configurations: JSON/JSONL file or directory
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn parse_date(s: &str) -> Result<Date, String> {
    Date::parse(s, format_description!("[year]-[month]-[day]")).map_err(|e| format!("invalid date `{s}`: {e}"))
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let cfg = NlpConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze { input, metaposts, reference, days, from, to, output } => {
            let selection = match (from, to) {
                (Some(from), Some(to)) => DaySelection::Range { from, to },
                _ if !days.is_empty() => DaySelection::Days(days),
                _ => DaySelection::All,
            };
            analyze(&cfg, &input, metaposts.as_deref(), reference.as_deref(), selection, output.as_deref())
        }
        Commands::Spiders { input, output } => {
            let configs: Vec<SpiderConfig> = load_records(&input)?;
            let latest = latest_spiders(&configs)?;
            tracing::info!(configs = configs.len(), spiders = latest.len(), "resolved spiders");
            write_json(&latest, output.as_deref())
        }
    }
}

fn analyze(
    cfg: &NlpConfig,
    input: &Path,
    metaposts: Option<&Path>,
    reference: Option<&Path>,
    selection: DaySelection,
    output: Option<&Path>,
) -> Result<()> {
    let posts: Vec<Post> = load_records(input)?;
    let existing: Vec<MetaPost> = match metaposts {
        Some(path) => load_records(path)?,
        None => Vec::new(),
    };
    let detector = match reference {
        Some(path) => CrapDetector::from_config(&load_lines(path)?, cfg)?,
        None => CrapDetector::from_config::<String>(&[], cfg)?,
    };

    tracing::info!(
        siblings = ?cfg.siblings,
        related = ?cfg.related,
        summary_minimum_length = cfg.summary_minimum_length,
        crap_detection = detector.is_enabled(),
        "analyzing posts"
    );
    let report = analyze_day(&posts, &existing, &detector, selection, cfg)?;
    write_json(&report, output)
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
            fs::write(path, json)?;
            tracing::info!(output = %path.display(), "report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
