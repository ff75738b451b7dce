mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ringmon",
    version,
    about = "A topmost circular CPU gauge for the Windows desktop"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the CPU gauge (the default)
    Run,
    /// Create the default settings file
    Init,
    /// Run one attribution scan and print the likely offenders
    Scan(commands::scan::ScanArgs),
}

fn main() {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::execute(),
        Commands::Init => commands::init::execute(),
        Commands::Scan(args) => commands::scan::execute(&args),
    }
}
