use anyhow::Result;
use chatrag::{config::Config, logging, repl, AppContext};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chatrag")]
#[command(about = "Ask questions about the documents in your data directory")]
#[command(version)]
struct Cli {
    /// Path to settings.toml (overrides the default search locations)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory to load documents from (overrides config)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing();

    let mut config = Config::load_from(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data.dir = dir;
    }

    let ctx = AppContext::initialize(config, true).await?;

    let stdin = std::io::stdin();
    repl::run_query_loop(ctx.chat.as_ref(), stdin.lock(), std::io::stdout()).await
}
