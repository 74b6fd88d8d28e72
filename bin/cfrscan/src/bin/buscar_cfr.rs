use cfrscan::commands::lookup::{self, EMPTY_OUTPUT};
use cfrscan::{context, logging};
use cfrscan_core::Paths;
use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "buscar-cfr")]
#[command(about = "Look up a vessel in the fishing fleet census and print its CFR", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.cfrscan/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Vessel name to search for; only the first word given is used, so
    /// quote names containing spaces
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    name: Vec<String>,
}

impl Cli {
    fn vessel_name(&self) -> Option<&str> {
        self.name.first().map(String::as_str)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout must always carry a JSON array, even for unusable arguments
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            eprint!("{}", e);
            println!("{}", EMPTY_OUTPUT);
            return Ok(());
        }
    };
    logging::init(cli.verbose);

    let Some(name) = cli.vessel_name() else {
        println!("{}", lookup::missing_name_line());
        return Ok(());
    };

    let paths = Paths::new();
    let config = match context::load_config(&paths, cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config: {}", e);
            println!("{}", EMPTY_OUTPUT);
            return Ok(());
        }
    };

    let census = context::census_lookup(&config, &paths, cli.headed);
    println!("{}", lookup::render(Some(name), &census).await);
    Ok(())
}
