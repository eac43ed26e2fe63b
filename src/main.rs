// src/main.rs

use tapbatch::config::load_or_default;
use tapbatch::{cli, logging, run, Settings};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("tapbatch error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    let cfg = load_or_default(args.config.as_deref())?;
    let settings = Settings::resolve(&args, &cfg)?;
    logging::init_logging(args.log_level, settings.log_file.as_deref())?;
    run(settings, &cfg).await
}
