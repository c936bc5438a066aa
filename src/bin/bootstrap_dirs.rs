use clap::Parser;
use std::path::PathBuf;
use vnnews_etl::core::bootstrap::{create_placeholders, CONFIRMATION_MESSAGE};
use vnnews_etl::utils::logger;

#[derive(Parser)]
#[command(name = "bootstrap_dirs")]
#[command(about = "Create the .gitkeep markers for the data, log and VnCoreNLP directories")]
struct Args {
    /// Directory the marker paths are relative to
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let created = create_placeholders(&args.root)?;
    tracing::debug!("Markers under {}: {:?}", args.root.display(), created);

    println!("{}", CONFIRMATION_MESSAGE);
    Ok(())
}
