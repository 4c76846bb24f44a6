//! Catalog command - lists the values a design file may use

use std::fmt;

use clap::Args;
use serde::Serialize;

use crate::domain::experiment::{CatalogEntry, ExperimentType, MetricCatalog, WizardStep};

/// Arguments for the catalog command
#[derive(Args, Clone)]
pub struct CatalogArgs {
    /// Print the catalogs as JSON
    #[arg(long)]
    pub json: bool,
}

/// Every catalog offered to designers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalogs {
    pub experiment_types: Vec<CatalogEntry>,
    pub metrics: Vec<CatalogEntry>,
    pub steps: Vec<&'static str>,
}

impl Catalogs {
    pub fn new(metrics: &MetricCatalog) -> Self {
        Self {
            experiment_types: ExperimentType::catalog(),
            metrics: metrics.entries().to_vec(),
            steps: WizardStep::ALL
                .iter()
                .filter(|s| !s.is_terminal())
                .map(|s| s.label())
                .collect(),
        }
    }
}

/// Run the catalog command
pub fn run(args: CatalogArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let catalogs = Catalogs::new(&config.catalog.metrics);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&catalogs)?);
    } else {
        print!("{}", render(&catalogs));
    }

    Ok(())
}

pub fn render(catalogs: &Catalogs) -> String {
    catalogs.to_string()
}

impl fmt::Display for Catalogs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Experiment types:")?;
        for entry in &self.experiment_types {
            writeln!(f, "  {:<14} {}", entry.value, entry.label)?;
        }

        writeln!(f, "Metrics:")?;
        for entry in &self.metrics {
            writeln!(f, "  {:<14} {}", entry.value, entry.label)?;
        }

        writeln!(f, "Steps: {}", self.steps.join(" > "))
    }
}
