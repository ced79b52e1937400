use anyhow::Result;
use chatrag::gui::{self, KnowledgeBaseHandlers};
use chatrag::{config::Config, logging, AppContext};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "chatrag-gui")]
#[command(about = "Browser interface for chatting with files and GitHub repositories")]
#[command(version)]
struct Cli {
    /// Path to settings.toml (overrides the default search locations)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Address to listen on (overrides config)
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Do not launch a browser on startup
    #[arg(long)]
    no_browser: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing();

    let mut config = Config::load_from(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if cli.no_browser {
        config.server.open_browser = false;
    }
    let bind = config.server.bind.clone();
    let open_browser = config.server.open_browser;

    let ctx = AppContext::initialize(config, true).await?;
    let handlers = Arc::new(KnowledgeBaseHandlers::from_context(ctx));

    gui::run_server(&bind, handlers, open_browser).await
}
