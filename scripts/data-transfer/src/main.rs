use addr_core::address::strip_apartment;
use addr_core::config::Config;
use addr_core::matching::{match_addresses, MatchMode, DEFAULT_THRESHOLD};
use addr_core::score::Weights;
use addr_core::table::Table;
use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

const DEFAULT_SOURCE: &str = "artifacts/source_with_address.csv";
const DEFAULT_TARGET: &str = "artifacts/target_with_address.csv";
const DEFAULT_OUTPUT: &str = "output/target_with_updated_info.csv";
const DEFAULT_STREET_NAME_WEIGHT: f64 = 0.60;
const DEFAULT_STREET_NUMBER_WEIGHT: f64 = 0.32;
const DEFAULT_CITY_WEIGHT: f64 = 0.08;

#[derive(Parser, Debug)]
#[command(
    name = "data-transfer",
    version,
    about = "Copy measurement columns from matched source rows into the target table"
)]
struct Cli {
    /// Cleaned source table (output of the clean stage).
    #[arg(long, default_value = DEFAULT_SOURCE)]
    source: PathBuf,

    /// Cleaned target table (output of the clean stage).
    #[arg(long, default_value = DEFAULT_TARGET)]
    target: PathBuf,

    /// Final target table with updated measurement columns.
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

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

    /// Target uniqueness (first|unique).
    #[arg(long, default_value = "first")]
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

    let mut source = Table::read_csv(&cli.source)?;
    let mut target = Table::read_csv(&cli.target)?;
    let source_addr = source
        .require_column(&config.address_column)
        .with_context(|| format!("table {:?} was not cleaned", cli.source))?;
    let target_addr = target
        .require_column(&config.address_column)
        .with_context(|| format!("table {:?} was not cleaned", cli.target))?;

    // From here on the working address is the apartment-stripped one, for
    // row lookup as much as for scoring.
    source.map_column(source_addr, |address| strip_apartment(address));
    target.map_column(target_addr, |address| strip_apartment(address));

    let sources = source.non_empty_values(source_addr);
    let targets = target.non_empty_values(target_addr);
    info!(
        "matching {} source addresses against {} targets",
        sources.len(),
        targets.len()
    );
    let results = match_addresses(&sources, &targets, &weights, cli.threshold, mode);

    let outcome = addr_core::transfer::transfer_fields(
        &results,
        cli.threshold,
        &source,
        &mut target,
        &config.address_column,
        &config.transfer_columns,
    )?;
    for skipped in &outcome.skipped {
        warn!(
            "transfer skipped ({}): source '{}' -> target '{}'",
            skipped.reason, skipped.source_address, skipped.target_address
        );
    }
    println!(
        "Transferred {} matches, skipped {}.",
        outcome.transferred,
        outcome.skipped.len()
    );

    // Both artifacts go back with the apartment-free addresses, then the
    // final target is written without the working column.
    source.write_csv(&cli.source)?;
    target.write_csv(&cli.target)?;
    println!("Stripped address columns saved back to their artifact files.");

    target.drop_column(&config.address_column);
    target.write_csv(&cli.output)?;
    println!("Updated target data saved to {:?}.", cli.output);
    Ok(())
}
