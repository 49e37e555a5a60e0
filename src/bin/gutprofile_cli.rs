//! # gutprofile
//!
//! Scores one or more single-sample abundance tables and writes one JSON
//! report per sample.
//!
//! ```bash
//! gutprofile -i sample.tsv -o reports/
//! gutprofile -i a.tsv.gz -i b.tsv --age 52 --diseases diseases.json -o out/
//! ```
//!
//! Set `RUST_LOG=debug` to see every taxon lookup.

use clap::{Arg, ArgAction, Command};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use gutprofile::config::PipelineConfig;
use gutprofile::output::write_reports;
use gutprofile::reference::ReferenceSet;
use gutprofile::types::Rank;
use gutprofile::{analyze_tables, load_tables};

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

fn spinner(color: &str, msg: &str, quiet: bool) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(TICKS)
            .template(&format!("{{spinner:.{color}}} {{msg}}"))?,
    );
    spinner.set_message(msg.to_string());
    Ok(spinner)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("gutprofile")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Gut microbiome health profile from abundance tables")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Abundance table (TSV, optionally .gz); repeat for several samples")
                .action(ArgAction::Append)
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Directory for <sample_id>.json reports")
                .default_value("."),
        )
        .arg(
            Arg::new("ranges")
                .long("ranges")
                .value_name("FILE")
                .help("Reference range JSON (default: built-in)"),
        )
        .arg(
            Arg::new("diseases")
                .long("diseases")
                .value_name("FILE")
                .help("Disease association JSON (default: built-in)"),
        )
        .arg(
            Arg::new("markers")
                .long("markers")
                .value_name("FILE")
                .help("Age marker JSON (default: built-in)"),
        )
        .arg(
            Arg::new("age")
                .long("age")
                .value_name("YEARS")
                .help("Chronological age, used only for the age status label"),
        )
        .arg(
            Arg::new("rank")
                .long("rank")
                .value_name("RANK")
                .help("Rank used for taxon lookups")
                .default_value("Genus"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Hide progress spinners")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let quiet = matches.get_flag("quiet");
    let inputs: Vec<PathBuf> = matches
        .get_many::<String>("input")
        .unwrap_or_default()
        .map(PathBuf::from)
        .collect();
    let out_dir = PathBuf::from(matches.get_one::<String>("output").map_or(".", |s| s.as_str()));

    let chronological_age = match matches.get_one::<String>("age") {
        Some(s) => {
            let age: f64 = s.parse().map_err(|_| format!("invalid age '{s}'"))?;
            if !age.is_finite() || age < 0.0 {
                return Err(format!("invalid age '{s}'").into());
            }
            Some(age)
        }
        None => None,
    };
    let match_rank: Rank = matches
        .get_one::<String>("rank")
        .map_or("Genus", |s| s.as_str())
        .parse()?;

    let config = PipelineConfig {
        ranges_path: matches.get_one::<String>("ranges").map(PathBuf::from),
        diseases_path: matches.get_one::<String>("diseases").map(PathBuf::from),
        markers_path: matches.get_one::<String>("markers").map(PathBuf::from),
        match_rank,
        chronological_age,
    };

    // 1. Reference data
    let pb = spinner("blue", "Loading reference data...", quiet)?;
    let refs = ReferenceSet::from_config(&config);
    pb.finish_with_message("Reference data ready.");

    // 2. Abundance tables
    let pb = spinner("blue", &format!("Reading {} abundance table(s)...", inputs.len()), quiet)?;
    let tables = load_tables(&inputs)?;
    pb.finish_with_message(format!("Loaded {} sample(s).", tables.len()));

    // 3. Scoring
    let pb = spinner("green", "Profiling samples...", quiet)?;
    let reports = analyze_tables(&tables, &refs, &config);
    pb.finish_with_message("Profiling finished.");

    // 4. Reports
    let pb = spinner("yellow", "Writing reports...", quiet)?;
    let written = write_reports(&reports, &out_dir)?;
    pb.finish_with_message(format!("Wrote {} report(s) to {}.", written.len(), out_dir.display()));

    Ok(())
}
