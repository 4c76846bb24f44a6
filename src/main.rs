use clap::Parser;
use experiment_designer::cli::{self, Cli, Command};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Plan(args) => cli::plan::run(args),
        Command::Catalog(args) => cli::catalog::run(args),
    }
}
