// src/main.rs

use tsgate::actions::ActionOutcome;
use tsgate::{cli, logging, run};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(err) => {
            eprintln!("tsgate error: {err:#}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<ActionOutcome> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    Ok(run(args).await?)
}
