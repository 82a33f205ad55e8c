use addr_core::address::add_address_column;
use addr_core::config::Config;
use addr_core::table::Table;
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

const DEFAULT_SOURCE: &str = "data/source_data.csv";
const DEFAULT_TARGET: &str = "data/target_data.csv";
const DEFAULT_ARTIFACTS: &str = "artifacts";

#[derive(Parser, Debug)]
#[command(
    name = "clean",
    version,
    about = "Normalize address fields and assemble a canonical Address column"
)]
struct Cli {
    /// Raw source dataset (CSV).
    #[arg(long, default_value = DEFAULT_SOURCE)]
    source: PathBuf,

    /// Raw target dataset (CSV).
    #[arg(long, default_value = DEFAULT_TARGET)]
    target: PathBuf,

    /// Directory for the cleaned artifact tables.
    #[arg(long, default_value = DEFAULT_ARTIFACTS)]
    artifacts: PathBuf,

    /// Optional JSON file overriding the column configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the first N assembled addresses of each table.
    #[arg(long, default_value_t = 0)]
    preview: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load_or_default(cli.config.as_deref())?;

    let source_out = cli.artifacts.join("source_with_address.csv");
    let target_out = cli.artifacts.join("target_with_address.csv");

    clean_one(
        "source",
        &cli.source,
        &source_out,
        &config,
        &config.source_columns,
        cli.preview,
    )?;
    clean_one(
        "target",
        &cli.target,
        &target_out,
        &config,
        &config.target_columns,
        cli.preview,
    )?;

    println!(
        "Cleaned tables written to {:?} and {:?}.",
        source_out, target_out
    );
    Ok(())
}

fn clean_one(
    label: &str,
    input: &std::path::Path,
    output: &std::path::Path,
    config: &Config,
    columns: &addr_core::config::AddressColumns,
    preview: usize,
) -> Result<()> {
    let mut table = Table::read_csv(input)?;
    info!("{label}: {} rows loaded from {:?}", table.row_count(), input);

    add_address_column(&mut table, columns, &config.address_column)
        .with_context(|| format!("cannot clean {label} table {:?}", input))?;

    if preview > 0 {
        let address_idx = table.require_column(&config.address_column)?;
        println!("First {preview} {label} addresses:");
        for row in 0..table.row_count().min(preview) {
            println!("  {}", table.value(row, address_idx));
        }
    }

    table.write_csv(output)?;
    println!("{label}: {} rows cleaned -> {:?}", table.row_count(), output);
    Ok(())
}
