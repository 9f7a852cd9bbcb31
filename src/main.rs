use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use packing_list_pdf::{Assets, LayoutConfig};

/// Render a shipment manifest (JSON) as a paginated PDF packing list.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Manifest JSON with sender, receiver and shippingItemList
    manifest: PathBuf,

    /// Output PDF (defaults to the manifest path with a .pdf extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// PNG logo placed at the top of every page
    #[arg(long)]
    logo: PathBuf,

    /// TrueType/OpenType font for addresses and the company name
    #[arg(long)]
    font: PathBuf,

    /// Face index when --font is a collection (.ttc)
    #[arg(long, default_value_t = 0)]
    font_index: u32,

    /// JSON file overriding layout constants
    #[arg(long)]
    config: Option<PathBuf>,
}

fn run(cli: Cli) -> Result<PathBuf, packing_list_pdf::Error> {
    let config = match &cli.config {
        Some(path) => LayoutConfig::from_json_file(path)?,
        None => LayoutConfig::default(),
    };
    let assets = Assets::load(&cli.logo, &cli.font)?.with_font_index(cli.font_index);
    let output = cli.output.unwrap_or_else(|| cli.manifest.with_extension("pdf"));
    packing_list_pdf::write_packing_list(&cli.manifest, &output, &assets, &config)?;
    Ok(output)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            log::info!("Wrote {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
