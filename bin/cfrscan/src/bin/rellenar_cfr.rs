use cfrscan::commands::fill::{self, FillOptions};
use cfrscan::{context, logging};
use cfrscan_core::Paths;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rellenar-cfr")]
#[command(about = "Fill in the missing CFR codes of a vessel spreadsheet", long_about = None)]
#[command(version)]
struct Cli {
    /// Input workbook (.xlsx, .xls or .ods)
    input: PathBuf,

    /// Output workbook (defaults to spreadsheet.outputFile from config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Zero-based index of the sheet to process
    #[arg(long)]
    sheet: Option<usize>,

    /// Header of the vessel name column
    #[arg(long)]
    name_column: Option<String>,

    /// Header of the CFR column
    #[arg(long)]
    cfr_column: Option<String>,

    /// Config file (defaults to ~/.cfrscan/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let paths = Paths::new();
    let config = context::load_config(&paths, cli.config.as_deref())?;

    let options = FillOptions::resolve(
        &config.spreadsheet,
        cli.input,
        cli.output,
        cli.sheet,
        cli.name_column,
        cli.cfr_column,
    );
    let census = context::census_lookup(&config, &paths, cli.headed);

    fill::run(&options, &census).await?;
    Ok(())
}
