//! CLI module for the experiment designer
//!
//! Provides subcommands:
//! - `plan`: drive a design file through every wizard step and launch it
//! - `catalog`: list the experiment types and metrics a design may use

pub mod catalog;
pub mod plan;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Experiment Designer - plan controlled experiments with power analysis
#[derive(Parser)]
#[command(name = "experiment-designer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate, size and launch an experiment described in a JSON file
    Plan(plan::PlanArgs),

    /// Print the experiment type and metric catalogs
    Catalog(catalog::CatalogArgs),
}

/// Load `.env` and configuration, then install logging
fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    config.design.validate()?;

    logging::init_logging(&config.logging);

    Ok(config)
}
