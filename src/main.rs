use anyhow::Result;
use clap::{Parser, Subcommand};
use nascan::api;
use nascan::blastinput::{ScanArgs, SelectArgs};

#[derive(Parser)]
#[command(name = "nascan")]
#[command(version = "0.1.0")]
#[command(about = "Nucleotide word scanning over 2-bit packed subjects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan subject records against a table built from the query
    Scan(ScanArgs),

    /// Print the scan routine chosen for a table shape
    Select(SelectArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = match &cli.command {
        Commands::Scan(args) if args.verbose => "debug",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    match cli.command {
        Commands::Scan(args) => {
            api::run_scan(args)?;
        }
        Commands::Select(args) => {
            api::run_select(args)?;
        }
    }
    Ok(())
}
