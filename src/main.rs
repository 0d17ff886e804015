use clap::{Parser, Subcommand};

mod cmd;
mod comparison;
mod rdw;
mod tax;
mod vehicle;

#[derive(Parser, Debug)]
#[command(
    name = "autokosten",
    version,
    about = "Dutch vehicle cost calculator: buy privately, use for business, deduct mileage"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up a vehicle by license plate in the RDW open-data registry
    Lookup(cmd::lookup::LookupCommand),
    /// Calculate the annual/monthly cost breakdown
    Calculate(cmd::calculate::CalculateCommand),
    /// Determine the bijtelling percentage for a vehicle
    Bijtelling(cmd::bijtelling::BijtellingCommand),
    /// Manage the saved comparison list
    Compare(cmd::compare::CompareCommand),
    /// Print JSON schemas for input/output formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    tax::nl::validate_schedule()?;

    let cli = Cli::parse();
    match cli.command {
        Command::Lookup(cmd) => cmd.exec(),
        Command::Calculate(cmd) => cmd.exec(),
        Command::Bijtelling(cmd) => cmd.exec(),
        Command::Compare(cmd) => cmd.exec(),
        Command::Schema(cmd) => cmd.exec(),
    }
}
