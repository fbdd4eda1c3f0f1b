use clap::{Parser, Subcommand};

use self::{generate_data::GenerateDataArg, tune::TuneArg};

mod generate_data;
mod tune;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Search for regression hyperparameters with a genetic algorithm
    Tune(#[clap(flatten)] TuneArg),
    /// Generate a synthetic regression dataset for tuning runs
    GenerateData(#[clap(flatten)] GenerateDataArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Tune(arg) => tune::run(&arg)?,
        Mode::GenerateData(arg) => generate_data::run(&arg)?,
    }
    Ok(())
}
