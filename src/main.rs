use std::sync::Arc;

use canvas::camera::Point;
use canvas::doc::OverlayObject;
use clap::{Parser, Subcommand};
use sketchsync::config::SyncConfig;
use sketchsync::services::applier::Applied;
use sketchsync::services::session::{CanvasSession, SessionError};
use sketchsync::services::store::{CanvasStore, HttpStore, StoreError};
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing token; pass --token or set SKETCH_TOKEN")]
    MissingToken,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("timed out waiting for save")]
    SaveTimeout,
    #[error("save did not complete")]
    NotSaved,
}

#[derive(Parser, Debug)]
#[command(name = "sketchsync", about = "Collaborative canvas sync client")]
struct Cli {
    #[arg(long, env = "SKETCH_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "SKETCH_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a canvas and print its document as JSON.
    Dump { canvas_id: String },
    /// Join a canvas and log remote changes until the channel closes.
    Watch { canvas_id: String },
    /// Add an overlay object to a canvas and save it.
    Add {
        canvas_id: String,
        /// Object JSON, e.g. `{"type":"text","text":"hi","x":10,"y":20}`.
        #[arg(long)]
        data: String,
    },
}

struct CliContext {
    config: SyncConfig,
    token: String,
    store: Arc<dyn CanvasStore>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "failed to read .env"),
    }

    let cli = Cli::parse();
    let mut config = SyncConfig::from_env();
    if let Some(base_url) = cli.base_url {
        config = config.with_base_url(base_url);
    }
    let token = cli.token.filter(|t| !t.is_empty()).ok_or(CliError::MissingToken)?;
    let store: Arc<dyn CanvasStore> = Arc::new(HttpStore::new(config.http_base(), config.save_timeout)?);
    let ctx = CliContext { config, token, store };

    match cli.command {
        Command::Dump { canvas_id } => run_dump(&ctx, &canvas_id).await,
        Command::Watch { canvas_id } => run_watch(&ctx, &canvas_id).await,
        Command::Add { canvas_id, data } => run_add(&ctx, &canvas_id, &data).await,
    }
}

async fn run_dump(ctx: &CliContext, canvas_id: &str) -> Result<(), CliError> {
    let content = ctx.store.load(canvas_id, &ctx.token).await?;
    println!("{}", serde_json::to_string_pretty(&content)?);
    Ok(())
}

async fn run_watch(ctx: &CliContext, canvas_id: &str) -> Result<(), CliError> {
    let mut session = CanvasSession::open(&ctx.config, Arc::clone(&ctx.store), canvas_id, &ctx.token).await?;

    loop {
        let next = tokio::select! {
            next = session.next_remote() => next,
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "ctrl-c handler failed");
                }
                None
            }
        };
        match next {
            Some(Applied::Mutated(kind)) => info!(
                kind = kind.as_str(),
                objects = session.document().objects().len(),
                strokes = session.document().strokes().len(),
                "remote change applied"
            ),
            Some(Applied::Draw(point)) => debug!(x = point.x, y = point.y, "remote draw progress"),
            Some(Applied::Ignored) => {}
            None => break,
        }
    }

    if session.has_unsaved_changes() {
        session.flush();
        wait_saved(ctx, &session).await?;
    }
    finish(session).await;
    Ok(())
}

async fn run_add(ctx: &CliContext, canvas_id: &str, data: &str) -> Result<(), CliError> {
    let requested: OverlayObject = serde_json::from_str(data)?;
    let mut session = CanvasSession::open(&ctx.config, Arc::clone(&ctx.store), canvas_id, &ctx.token).await?;
    if let Err(e) = session.channel().wait_open().await {
        warn!(error = %e, canvas_id, "peers will not see the new object until they reload");
    }

    let at = Point::new(requested.x, requested.y);
    let (width, height) = (requested.width, requested.height);
    let actions = session.local(|engine| {
        let mut actions = engine.create_object(requested.kind, at);
        if let Some(id) = engine.selected_id.clone() {
            if width > 0.0 && height > 0.0 {
                actions.extend(engine.resize_object(&id, width, height));
            }
        }
        actions
    });
    if let Some(id) = session.engine().selected_id.as_deref() {
        println!("{id}");
    }
    debug!(canvas_id, actions = actions.len(), "object added");

    session.flush();
    wait_saved(ctx, &session).await?;
    finish(session).await;
    Ok(())
}

async fn wait_saved(ctx: &CliContext, session: &CanvasSession) -> Result<(), CliError> {
    match tokio::time::timeout(ctx.config.save_timeout, session.wait_until_saved()).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::NotSaved),
        Err(_) => Err(CliError::SaveTimeout),
    }
}

async fn finish(session: CanvasSession) {
    if let Err(e) = session.close().await {
        warn!(error = %e, "persistence worker did not shut down cleanly");
    }
}
