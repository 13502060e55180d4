mod compare;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "medprice")]
#[command(about = "Compare medicine prices across online pharmacies")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search every enabled pharmacy and rank the prices found
    Compare {
        /// Medicine name; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        medicine: Vec<String>,

        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List the pharmacies that would be searched
    Sources,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = medprice_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Compare { medicine, json }) => {
            compare::run_compare(&config, &medicine.join(" "), json).await
        }
        Some(Commands::Sources) => compare::run_sources(&config),
        None => {
            println!("nothing to do; try `medprice compare <medicine>`");
            Ok(())
        }
    }
}
