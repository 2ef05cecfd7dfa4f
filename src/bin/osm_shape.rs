//! osm-shape: Convert an XML map export into JSON lines
//!
//! Usage:
//!   # Writes map.osm.json next to the input
//!   osm-shape map.osm
//!
//!   # Only shape ways and relations, report every 10k records
//!   osm-shape --entity-tags way,relation --progress-interval 10000 map.osm
//!
//!   # Explore the export first
//!   osm-shape --count-tags map.osm

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use osm_shaper::audit::{count_attrs, count_tags};
use osm_shaper::logging::{init_logging, LogConfig};
use osm_shaper::{read_json_lines, shape_file, ShapeConfig, SinkConfig};
use std::fs::File;
use std::io::{BufReader, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_PROGRESS_INTERVAL: u64 = 100_000;
const USAGE: &str = "usage: osm-shape [OPTIONS] <FILE>";

#[derive(Parser, Debug)]
#[command(name = "osm-shape")]
#[command(about = "Convert an XML map export into newline-delimited JSON", long_about = None)]
struct Args {
    /// Input XML file; output goes to <FILE>.json
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Report progress every N records (0 disables)
    #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL)]
    progress_interval: u64,

    /// Comma-separated top-level tags that become records (default: node,way)
    #[arg(long)]
    entity_tags: Option<String>,

    /// Print tag occurrence counts as JSON instead of converting
    #[arg(long, conflicts_with = "count_attrs")]
    count_tags: bool,

    /// Print attribute occurrence counts as JSON instead of converting
    #[arg(long)]
    count_attrs: bool,

    /// Log the first N records of the output after converting
    #[arg(long, value_name = "N")]
    peek: Option<usize>,

    /// Prefix log lines with timestamps
    #[arg(long)]
    log_timestamps: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
        Err(e) => e.exit(),
    };

    init_logging(
        &LogConfig::from_verbosity(args.verbose)
            .with_timestamps(args.log_timestamps)
            .with_target(args.verbose > 1)
            .with_ansi(std::io::stderr().is_terminal()),
    );

    if args.count_tags || args.count_attrs {
        return audit(&args);
    }

    // Build config
    let mut config = ShapeConfig::default();
    if let Some(tags) = &args.entity_tags {
        config.entity_tags = tags
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    let sink_config = SinkConfig::with_progress_interval(args.progress_interval);

    let summary = shape_file(&args.input, &config, &sink_config)
        .with_context(|| format!("Failed to convert {}", args.input.display()))?;

    if let (Some(n), Some(output)) = (args.peek, &summary.output) {
        peek(output, n)?;
    }

    Ok(())
}

fn audit(args: &Args) -> Result<()> {
    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let reader = BufReader::new(file);

    let counts = if args.count_tags {
        count_tags(reader)
    } else {
        count_attrs(reader)
    }
    .with_context(|| format!("Failed to read {}", args.input.display()))?;

    println!("{}", serde_json::to_string_pretty(&counts)?);
    Ok(())
}

/// Read back the first `n` lines the way a bulk loader would
fn peek(output: &Path, n: usize) -> Result<()> {
    let file = File::open(output)
        .with_context(|| format!("Failed to open {}", output.display()))?;

    for value in read_json_lines(BufReader::new(file)).take(n) {
        let value = value.context("Failed to parse output line")?;
        info!(record = %value, "peek");
    }
    Ok(())
}
