//! folio-thumbs: generate missing photo thumbnails.
//!
//! Reads `<persist>/img`, writes `<persist>/thumbs`, and prints how many
//! thumbnails were created, skipped and failed.

use clap::Parser;
use folio_core::defaults::THUMBNAIL_SIZE;
use folio_store::thumbnails::generate_thumbnails;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "folio-thumbs")]
#[command(author, version, about = "Generate photo thumbnails for folio")]
struct Cli {
    /// Persist root holding `img/` (defaults to $PERSIST_PATH, then the current directory)
    #[arg(short, long, env = "PERSIST_PATH", default_value = ".")]
    persist: PathBuf,

    /// Thumbnails are fitted inside a square of this many pixels
    #[arg(short, long, default_value_t = THUMBNAIL_SIZE)]
    size: u32,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio_store=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let report = generate_thumbnails(&cli.persist, cli.size)?;
    println!(
        "{} thumbnails created, {} skipped, {} failed (out of {} files).",
        report.created, report.skipped, report.failed, report.total
    );
    Ok(())
}
