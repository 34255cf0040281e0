#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the commute corridor pipeline.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use corridor_config::PipelineConfig;
use corridor_pipeline::output::{OutputFormat, read_view};
use corridor_pipeline::views::ViewName;
use corridor_pipeline::{RunOptions, run};
use corridor_source::mode_mapping::{DEFAULT_CATEGORY, matching_rule};

#[derive(Parser)]
#[command(name = "corridor", about = "Census commute corridor analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the census feeds, compute every stage, and write the views
    Run {
        /// Directory holding the per-year area, mode, and flow CSV files
        #[arg(long)]
        input_dir: PathBuf,
        /// Pipeline config TOML (defaults to the built-in config)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Directory of feed definition TOMLs replacing the built-in ones
        #[arg(long)]
        feeds: Option<PathBuf>,
        /// Directory to write the views to
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
        /// View file format (`csv` or `json`)
        #[arg(long, default_value = "csv")]
        format: OutputFormat,
        /// Comma-separated list of views to write (default: all)
        #[arg(long, value_delimiter = ',')]
        views: Vec<ViewName>,
    },
    /// List every view name
    Views,
    /// Print a previously written view
    Show {
        /// View name (e.g., "`bus_candidates`")
        view: ViewName,
        /// Directory the views were written to
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
        /// Maximum number of rows to print
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Load and validate a config, then print the effective values
    CheckConfig {
        /// Pipeline config TOML (defaults to the built-in config)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the mode category of each travel-mode label
    Classify {
        /// Raw labels (e.g., "Train, Bus")
        #[arg(required = true)]
        labels: Vec<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input_dir,
            config,
            feeds,
            output_dir,
            format,
            views,
        } => {
            let config = PipelineConfig::load_or_default(config.as_deref())?;
            let start = Instant::now();
            let summary = run(
                &config,
                &RunOptions {
                    input_dir,
                    feeds_dir: feeds,
                    output_dir: output_dir.clone(),
                    format,
                    views,
                },
            )?;
            println!(
                "Wrote views to {} in {:.1}s: {} areas, {} bus candidates",
                output_dir.display(),
                start.elapsed().as_secs_f64(),
                summary.areas,
                summary.candidates
            );
        }
        Commands::Views => {
            println!("{:<28} DESCRIPTION", "VIEW");
            println!("{}", "-".repeat(80));
            for view in ViewName::all() {
                println!("{:<28} {}", view.to_string(), view.description());
            }
        }
        Commands::Show {
            view,
            output_dir,
            limit,
        } => {
            let table = read_view(&output_dir, view)?;
            let shown = limit.unwrap_or(table.rows.len()).min(table.rows.len());
            println!("{}", table.headers.join(" | "));
            for row in table.rows.iter().take(shown) {
                println!("{}", row.join(" | "));
            }
            if shown < table.rows.len() {
                println!("... {} more rows", table.rows.len() - shown);
            }
        }
        Commands::CheckConfig { config } => {
            let config = PipelineConfig::load_or_default(config.as_deref())?;
            println!("Config OK");
            print!("{}", config.to_toml_string()?);
        }
        Commands::Classify { labels } => {
            println!("{:<32} {:<18} {:<12} RULE", "LABEL", "CATEGORY", "INFORMATIVE");
            for label in &labels {
                let (category, rule) = matching_rule(label)
                    .map_or((DEFAULT_CATEGORY, "default"), |r| (r.category, r.name));
                println!(
                    "{:<32} {:<18} {:<12} {rule}",
                    label,
                    category.to_string(),
                    category.is_informative()
                );
            }
        }
    }

    Ok(())
}
