//! `sales` — ETL and console dashboard for sales CSV files.
//!
//! ```bash
//! sales summary vendas.csv                      # totals, sales above 500, counts, sales in 2023
//! sales dashboard vendas.csv --threshold 1000   # text dashboard with a bar chart
//! sales total vendas.csv
//! sales above vendas.csv --threshold 500 --output caras.csv
//! sales count vendas.csv --json
//! sales by-product vendas.csv
//! sales range vendas.csv --start 2023-01-01 --end 2023-12-31
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use engine::config::AppSettings;
use engine::data::csv_parser::SalesCsvParser;
use engine::report::ReportRenderer;
use engine::{EngineError, SalesOverview, SalesTransformer, ValidationError};
use serde_json::json;
use shared::models::{NumberFormat, SaleRecord, SalesDataset};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sales")]
#[command(about = "Compute totals, per-product views and filters over a sales CSV", long_about = None)]
struct Cli {
    /// Settings JSON file (built-in defaults when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// CSV delimiter
    #[arg(long, global = true)]
    delimiter: Option<char>,

    /// Number notation in the CSV and in reports: standard or brazilian
    #[arg(long, global = true)]
    number_format: Option<NumberFormat>,

    /// chrono format of the date column and of --start/--end
    #[arg(long, global = true)]
    date_format: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grand total, sales above a limit, count per product and sales in a date range
    Summary {
        /// Input CSV file
        input: PathBuf,

        /// Limit for the "sales above" section
        #[arg(short, long)]
        threshold: Option<f64>,

        /// First day of the date range (inclusive)
        #[arg(long)]
        start: Option<String>,

        /// Last day of the date range (inclusive)
        #[arg(long)]
        end: Option<String>,
    },

    /// Text dashboard: preview, grand total, chart of totals per product, sales above a limit
    Dashboard {
        /// Input CSV file
        input: PathBuf,

        /// Limit for the "sales above" section
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// Sum of quantity x unit price over all sales
    Total {
        /// Input CSV file
        input: PathBuf,
    },

    /// Sales whose total is strictly greater than a threshold
    Above {
        /// Input CSV file
        input: PathBuf,

        #[arg(short, long)]
        threshold: f64,

        /// Write the matching sales to this CSV file instead of printing them
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Number of sales per product
    Count {
        /// Input CSV file
        input: PathBuf,
    },

    /// Total sales per product
    ByProduct {
        /// Input CSV file
        input: PathBuf,
    },

    /// Sales dated within an inclusive range
    Range {
        /// Input CSV file
        input: PathBuf,

        #[arg(long)]
        start: String,

        #[arg(long)]
        end: String,

        /// Write the matching sales to this CSV file instead of printing them
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(engine_err) = err.downcast_ref::<EngineError>() {
        engine_err.exit_code()
    } else if err.downcast_ref::<ValidationError>().is_some() {
        65
    } else {
        1
    }
}

fn load_settings(cli: &Cli) -> anyhow::Result<AppSettings> {
    let mut settings = match &cli.config {
        Some(path) => AppSettings::load_from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => AppSettings::load_default()?,
    };

    if let Some(delimiter) = cli.delimiter {
        settings.data.csv_delimiter = delimiter.to_string();
    }
    if let Some(number_format) = cli.number_format {
        settings.data.number_format = number_format;
    }
    if let Some(date_format) = &cli.date_format {
        settings.data.date_format = date_format.clone();
    }
    settings.validate()?;
    Ok(settings)
}

fn load_dataset(input: &Path, settings: &AppSettings) -> anyhow::Result<SalesDataset> {
    SalesCsvParser::load_sales_from_csv(input, &settings.data)
        .with_context(|| format!("Failed to load sales from {}", input.display()))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = load_settings(&cli)?;
    let transformer = SalesTransformer::from_settings(&settings.data);
    let renderer = ReportRenderer::new(&settings.report, &transformer);
    let json_output = cli.json;

    match &cli.command {
        Commands::Summary { input, threshold, start, end } => {
            let dataset = load_dataset(input, &settings)?;
            let threshold = threshold.unwrap_or(settings.report.default_threshold);
            let start = start.as_deref().unwrap_or(settings.report.default_start_date.as_str());
            let end = end.as_deref().unwrap_or(settings.report.default_end_date.as_str());
            let range = transformer.date_range(start, end)?;

            let overview = SalesOverview::compute(&transformer, &dataset.records, threshold, Some(range))?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&overview)?);
            } else {
                print!("{}", renderer.render_summary(&dataset, &overview)?);
            }
        }
        Commands::Dashboard { input, threshold } => {
            let dataset = load_dataset(input, &settings)?;
            let threshold = threshold.unwrap_or(settings.report.default_threshold);

            let overview = SalesOverview::compute(&transformer, &dataset.records, threshold, None)?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&overview)?);
            } else {
                print!("{}", renderer.render_dashboard(&dataset, &overview)?);
            }
        }
        Commands::Total { input } => {
            let dataset = load_dataset(input, &settings)?;
            let total = transformer.grand_total(&dataset.records)?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&json!({ "grand_total": total }))?);
            } else {
                println!("Total of all sales: {}", renderer.money(total));
            }
        }
        Commands::Above { input, threshold, output } => {
            let dataset = load_dataset(input, &settings)?;
            let selected = transformer.above_threshold(&dataset.records, *threshold)?;
            let heading = format!("Sales above {}:", renderer.money(*threshold));
            emit_records(&dataset, &selected, &heading, output.as_deref(), json_output, &settings, &renderer)?;
        }
        Commands::Count { input } => {
            let dataset = load_dataset(input, &settings)?;
            let counts = transformer.count_by_product(&dataset.records);
            if json_output {
                println!("{}", serde_json::to_string_pretty(&counts)?);
            } else {
                println!("Sales count by product:");
                print!("{}", renderer.render_counts(&counts));
            }
        }
        Commands::ByProduct { input } => {
            let dataset = load_dataset(input, &settings)?;
            let totals = transformer.total_by_product(&dataset.records)?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&totals)?);
            } else {
                println!("Total sales by product:");
                print!("{}", renderer.render_product_totals(&totals));
            }
        }
        Commands::Range { input, start, end, output } => {
            let dataset = load_dataset(input, &settings)?;
            let selected = transformer.in_date_range(&dataset.records, start, end)?;
            let heading = format!("Sales between {} and {}:", start, end);
            emit_records(&dataset, &selected, &heading, output.as_deref(), json_output, &settings, &renderer)?;
        }
    }
    Ok(())
}

// Filtered views go to a CSV file when --output is given, otherwise to stdout.
fn emit_records(
    dataset: &SalesDataset,
    records: &[&SaleRecord],
    heading: &str,
    output: Option<&Path>,
    json_output: bool,
    settings: &AppSettings,
    renderer: &ReportRenderer,
) -> anyhow::Result<()> {
    if let Some(path) = output {
        let written = SalesCsvParser::write_sales_csv(path, dataset, records.iter().copied(), &settings.data)
            .with_context(|| format!("Failed to write sales to {}", path.display()))?;
        println!("Wrote {} sales to {}", written, path.display());
    } else if json_output {
        println!("{}", serde_json::to_string_pretty(records)?);
    } else {
        println!("{}", heading);
        print!("{}", renderer.render_records(dataset, records, true)?);
    }
    Ok(())
}
