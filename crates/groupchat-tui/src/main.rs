mod input;
mod render;
mod runtime;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use groupchat_core::tracing_setup::init_tracing;
use groupchat_core::{ChatBackend, ChatConfig, HttpBackend, SyncSettings};
use tracing::info;

use crate::runtime::run_app;
use crate::ui::App;

/// Terminal client for a single group conversation
#[derive(Parser, Debug)]
#[command(name = "groupchat-tui", version)]
struct Args {
    /// Config file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Conversation to open
    #[arg(long)]
    conversation: Option<u64>,

    /// Server base URL, overrides config and environment
    #[arg(long)]
    base_url: Option<String>,

    /// Bearer token, overrides config and environment
    #[arg(long)]
    token: Option<String>,

    /// Id of the signed-in user
    #[arg(long)]
    user_id: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ChatConfig::load_or_default(args.config.as_deref())?;
    config.apply_env();
    config.apply_overrides(args.base_url, args.token);
    if let Some(id) = args.conversation {
        config.conversation_id = Some(id);
    }
    if let Some(id) = args.user_id {
        config.current_user_id = Some(id);
    }
    let context = config.context().context("Incomplete configuration")?;

    if let Some(path) = init_tracing() {
        info!(log = %path, "Logging to file");
    }

    let settings = SyncSettings {
        conversation_id: context.conversation_id,
        page_size: config.page_size,
        interval: config.poll_interval(),
    };
    let backend: Arc<dyn ChatBackend> = Arc::new(HttpBackend::new(&context));

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ui::restore_terminal();
        original_hook(panic_info);
    }));

    let mut app = App::new(context);
    let mut terminal = ui::init_terminal()?;
    let result = run_app(&mut terminal, &mut app, backend, settings).await;
    ui::restore_terminal()?;

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
    }
    Ok(())
}
