use addr_core::address::strip_apartment;
use addr_core::config::Config;
use addr_core::matching::{
    best_available, summarize, MatchMode, MatchResult, DEFAULT_THRESHOLD,
};
use addr_core::score::Weights;
use addr_core::table::Table;
use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const DEFAULT_SOURCE: &str = "artifacts/source_with_address.csv";
const DEFAULT_TARGET: &str = "artifacts/target_with_address.csv";
const DEFAULT_ARTIFACTS: &str = "artifacts";
const DEFAULT_STREET_NAME_WEIGHT: f64 = 0.60;
const DEFAULT_STREET_NUMBER_WEIGHT: f64 = 0.32;
const DEFAULT_CITY_WEIGHT: f64 = 0.08;

#[derive(Parser, Debug)]
#[command(
    name = "match-addresses",
    version,
    about = "Match source addresses to their closest target address"
)]
struct Cli {
    /// Cleaned source table (output of the clean stage).
    #[arg(long, default_value = DEFAULT_SOURCE)]
    source: PathBuf,

    /// Cleaned target table (output of the clean stage).
    #[arg(long, default_value = DEFAULT_TARGET)]
    target: PathBuf,

    /// Directory for the match-result tables.
    #[arg(long, default_value = DEFAULT_ARTIFACTS)]
    artifacts: PathBuf,

    /// Optional JSON file overriding the column configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum weighted score for an accepted match.
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Weight of the street-name similarity.
    #[arg(long, default_value_t = DEFAULT_STREET_NAME_WEIGHT)]
    street_weight: f64,

    /// Weight of the street-number similarity.
    #[arg(long, default_value_t = DEFAULT_STREET_NUMBER_WEIGHT)]
    number_weight: f64,

    /// Weight of the city similarity.
    #[arg(long, default_value_t = DEFAULT_CITY_WEIGHT)]
    city_weight: f64,

    /// Target uniqueness (unique|first).
    #[arg(long, default_value = "unique")]
    mode: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load_or_default(cli.config.as_deref())?;
    let mode = MatchMode::parse(&cli.mode)?;
    let weights = Weights {
        street_name: cli.street_weight,
        street_number: cli.number_weight,
        city: cli.city_weight,
    };

    let sources = load_matchable_addresses(&cli.source, &config)?;
    let targets = load_matchable_addresses(&cli.target, &config)?;
    info!(
        "matching {} source addresses against {} targets",
        sources.len(),
        targets.len()
    );

    let results = match_with_progress(&sources, &targets, &weights, cli.threshold, mode);

    let results_out = cli.artifacts.join("address_matching_results.csv");
    write_results(&results_out, &results)?;
    println!("Matching completed, results saved to {:?}.", results_out);

    let summary = summarize(&results, sources.len(), cli.threshold);
    println!("Number of addresses matched (Yes): {}", summary.matched);
    println!("Number of addresses not matched (No): {}", summary.unmatched);
    println!(
        "Percentage of addresses matched: {:.2}%",
        summary.percentage
    );

    // Accepted and rejected subsets, each sorted ascending by score.
    let (mut matched, mut not_matched): (Vec<&MatchResult>, Vec<&MatchResult>) = results
        .iter()
        .partition(|result| result.is_match(cli.threshold));
    matched.sort_by(|a, b| a.score.total_cmp(&b.score));
    not_matched.sort_by(|a, b| a.score.total_cmp(&b.score));

    let matched_out = cli.artifacts.join("address_matched.csv");
    let not_matched_out = cli.artifacts.join("address_not_matched.csv");
    write_result_refs(&matched_out, &matched)?;
    write_result_refs(&not_matched_out, &not_matched)?;
    println!(
        "Matched addresses saved to {:?}, not matched to {:?}.",
        matched_out, not_matched_out
    );
    Ok(())
}

/// Addresses of one artifact table with the apartment segment removed, in
/// load order, empty cells dropped.
fn load_matchable_addresses(path: &Path, config: &Config) -> Result<Vec<String>> {
    let table = Table::read_csv(path)?;
    let address_idx = table
        .require_column(&config.address_column)
        .with_context(|| format!("table {:?} was not cleaned", path))?;
    Ok(table
        .non_empty_values(address_idx)
        .iter()
        .map(|address| strip_apartment(address))
        .collect())
}

/// The same greedy scan as `matching::match_addresses`, unrolled here to
/// drive a progress bar across source addresses.
fn match_with_progress(
    sources: &[String],
    targets: &[String],
    weights: &Weights,
    threshold: f64,
    mode: MatchMode,
) -> Vec<MatchResult> {
    let bar = ProgressBar::new(sources.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap(),
    );

    let mut claimed: HashSet<usize> = HashSet::new();
    let unclaimed: HashSet<usize> = HashSet::new();
    let mut results = Vec::with_capacity(sources.len());
    for source in sources {
        let excluded = match mode {
            MatchMode::First => &unclaimed,
            MatchMode::Unique => &claimed,
        };
        match best_available(source, targets, excluded, weights) {
            Some((index, score)) => {
                if mode == MatchMode::Unique && score >= threshold {
                    claimed.insert(index);
                }
                if mode == MatchMode::Unique || score >= threshold {
                    results.push(MatchResult {
                        source: source.clone(),
                        target: Some(targets[index].clone()),
                        score,
                    });
                }
            }
            None => {
                if mode == MatchMode::Unique {
                    results.push(MatchResult {
                        source: source.clone(),
                        target: None,
                        score: 0.0,
                    });
                }
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();
    results
}

fn write_results(path: &Path, results: &[MatchResult]) -> Result<()> {
    let refs: Vec<&MatchResult> = results.iter().collect();
    write_result_refs(path, &refs)
}

fn write_result_refs(path: &Path, results: &[&MatchResult]) -> Result<()> {
    let mut table = Table::new(vec![
        "Source Address".into(),
        "Closest Target Address".into(),
        "Similarity Score".into(),
    ]);
    for result in results {
        table.push_row(vec![
            result.source.clone(),
            result.target.clone().unwrap_or_default(),
            format!("{:.2}", result.score),
        ]);
    }
    table.write_csv(path)
}
