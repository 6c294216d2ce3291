use std::error::Error;

use clap::{ArgAction, Parser, Subcommand};
use commands::{
    expand::{self, ExpandArgs},
    extract::{self, ExtractArgs},
    generate::{self, GenerateArgs},
};

mod commands;
mod logging;

#[derive(Parser, Debug)]
#[command(name = "simsweep", about = "Simulator configuration sweep generator")]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). `RUST_LOG` overrides it.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one run script per configuration and workload.
    Generate(GenerateArgs),
    /// Print the expanded configurations without writing anything.
    Expand(ExpandArgs),
    /// Collect one metric per simulator output file into a table.
    Extract(ExtractArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;
    match cli.command {
        Command::Generate(args) => generate::run(&args),
        Command::Expand(args) => expand::run(&args),
        Command::Extract(args) => extract::run(&args),
    }
}
