use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use emere::analysis::group_aggregates;
use emere::config::Config;
use emere::dataset::{Dataset, GroupField};
use emere::report::{View, render};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde_json::json;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    /// CSV file with the transaction records.
    #[arg(long)]
    data_file: PathBuf,

    /// Optional TOML analysis configuration.
    #[arg(long)]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Overview,

    Quality,

    Gender,

    Age,

    City,

    Occupation,

    Statistics,

    Recommendations,

    /// Aggregate purchase amounts by one or two categorical fields.
    Group {
        #[arg(long, value_enum)]
        by: GroupField,

        #[arg(long, value_enum)]
        and: Option<GroupField>,
    },
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let config = match &args.config_file {
        Some(file) => Config::from_file(file).context("failed to construct config")?,
        None => Config::default(),
    };

    let dataset = Dataset::from_csv(&args.data_file).context("failed to load dataset")?;
    log::info!("loaded {} records", dataset.len());

    let mut rng = match config.clt.seed {
        Some(seed) => ChaCha12Rng::seed_from_u64(seed),
        None => ChaCha12Rng::try_from_os_rng()?,
    };

    let report = match args.command {
        Command::Overview => render(View::Overview, &dataset, &config, &mut rng)?,
        Command::Quality => render(View::DataQuality, &dataset, &config, &mut rng)?,
        Command::Gender => render(View::Gender, &dataset, &config, &mut rng)?,
        Command::Age => render(View::Age, &dataset, &config, &mut rng)?,
        Command::City => render(View::City, &dataset, &config, &mut rng)?,
        Command::Occupation => render(View::Occupation, &dataset, &config, &mut rng)?,
        Command::Statistics => render(View::Statistics, &dataset, &config, &mut rng)?,
        Command::Recommendations => render(View::Recommendations, &dataset, &config, &mut rng)?,
        Command::Group { by, and } => {
            let mut fields = vec![by];
            fields.extend(and);
            json!({
                "section": "group",
                "fields": fields.iter().map(|f| f.name()).collect::<Vec<_>>(),
                "aggregates": group_aggregates(&dataset, &fields),
            })
        }
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to serialize report")?
    );

    Ok(())
}
