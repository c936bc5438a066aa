use clap::Parser;
use std::path::PathBuf;
use vnnews_etl::core::launcher::{wait_for_keypress, ServerLauncher, ServerSettings};
use vnnews_etl::utils::logger;
use vnnews_etl::AppConfig;

#[derive(Parser)]
#[command(name = "vncorenlp_server")]
#[command(about = "Run the VnCoreNLP word segmentation server in the foreground")]
struct Args {
    /// TOML file overriding the java, jar, heap, port and annotator settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Return as soon as the server stops instead of waiting for Enter
    #[arg(long)]
    no_pause: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let settings = match &args.config {
        Some(path) => match AppConfig::from_file(path) {
            Ok(config) => ServerSettings::from(&config),
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path.display(), e);
                eprintln!("💡 {}", e.recovery_suggestion());
                std::process::exit(1);
            }
        },
        None => ServerSettings::default(),
    };

    let launcher = ServerLauncher::new(settings);
    let mut stdout = std::io::stdout();
    let result = launcher.run_and_report(&mut stdout).await;

    if !args.no_pause {
        wait_for_keypress(&mut std::io::stdin().lock(), &mut stdout)?;
    }

    if let Err(e) = result {
        tracing::error!("❌ {}", e);
        tracing::error!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    Ok(())
}
