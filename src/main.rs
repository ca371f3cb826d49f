use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use shopping_trends::config::DashboardConfig;
use shopping_trends::data::catalog::Catalog;
use shopping_trends::data::filter::FilterSpec;
use shopping_trends::data::loader::{load_file, rows_to_batch};
use shopping_trends::data::model::{Dataset, Field};
use shopping_trends::state::DashboardState;

#[derive(Parser)]
#[command(name = "shopping-trends")]
#[command(version)]
#[command(about = "Filter a shopping-trends dataset and compute its dashboard tables", long_about = None)]
struct Cli {
    /// Config file (defaults to ./shopping-trends.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Dataset file (.csv, .json or .parquet)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the derived tables as JSON (default)
    Tables {
        /// Filter spec JSON; defaults to every observed value
        #[arg(long)]
        spec: Option<PathBuf>,
        /// Print a single table by name
        #[arg(long)]
        table: Option<String>,
    },
    /// List columns, their types and observed values
    Describe,
    /// Print the first rows of the filtered view
    Preview {
        #[arg(long)]
        rows: Option<usize>,
        #[arg(long)]
        spec: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = DashboardConfig::load(cli.config.as_deref())?;

    let data_path = cli
        .data
        .or_else(|| config.data.path.clone())
        .context("no dataset given: pass --data or set [data] path in the config")?;
    let dataset = Arc::new(
        load_file(&data_path).with_context(|| format!("loading {}", data_path.display()))?,
    );

    let command = cli.command.unwrap_or(Commands::Tables {
        spec: None,
        table: None,
    });

    match command {
        Commands::Tables { spec, table } => {
            let state = build_state(&dataset, &config, spec.as_deref())?;
            let catalog = state.catalog();
            match table {
                Some(name) => {
                    let named = catalog.get(&name).with_context(|| {
                        let known: Vec<&str> = Catalog::names().collect();
                        format!("unknown table '{name}', expected one of: {}", known.join(", "))
                    })?;
                    print_json(named, config.output.pretty)?;
                }
                None => print_json(catalog, config.output.pretty)?,
            }
        }
        Commands::Describe => describe(&dataset),
        Commands::Preview { rows, spec } => {
            let state = build_state(&dataset, &config, spec.as_deref())?;
            let n = rows.unwrap_or(config.output.preview_rows);
            let batch = rows_to_batch(&state.view().preview(n)).context("building preview")?;
            println!("{}", arrow::util::pretty::pretty_format_batches(&[batch])?);
            println!("{} of {} rows match", state.view().len(), dataset.len());
        }
    }

    Ok(())
}

fn build_state(
    dataset: &Arc<Dataset>,
    config: &DashboardConfig,
    spec_path: Option<&Path>,
) -> Result<DashboardState> {
    let spec = match spec_path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading filter spec {}", path.display()))?;
            FilterSpec::from_json(&text)
                .with_context(|| format!("invalid filter spec {}", path.display()))?
        }
        None => {
            let spec = FilterSpec::all_values(dataset);
            match config.filters.age_range {
                Some(range) => spec.with_age_range(range),
                None => spec,
            }
        }
    };
    let state = DashboardState::new(Arc::clone(dataset), spec, config.catalog_options())?;
    log::info!(
        "{} of {} rows pass the filter",
        state.view().len(),
        dataset.len()
    );
    Ok(state)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}

fn describe(dataset: &Dataset) {
    println!("{} rows", dataset.len());
    if let Some((lo, hi)) = dataset.age_bounds {
        println!("ages {lo}..={hi}");
    }
    for field in Field::ALL {
        match field {
            Field::Categorical(c) => {
                let values = dataset
                    .unique_values
                    .get(&c)
                    .map(|vals| vals.iter().map(String::as_str).collect::<Vec<_>>().join(", "))
                    .unwrap_or_default();
                println!("{:<26} {:<8} {values}", field.header(), field.kind());
            }
            Field::Numeric(_) => println!("{:<26} {}", field.header(), field.kind()),
        }
    }
}
