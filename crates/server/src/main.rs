use std::{path::PathBuf, sync::Arc};

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use clap::Parser;
use shared::domain::EventState;
use tracing::{error, info, warn};

mod app_state;
mod broadcast;
mod clock;
mod config;
mod dispatcher;
mod elapsed;
mod registry;
mod seed;
mod store;

use app_state::AppState;
use broadcast::Broadcaster;
use clock::SystemClock;
use config::load_settings;
use registry::frame_channel;
use seed::{default_event_state, load_seed};
use store::StateStore;

#[derive(Parser, Debug)]
#[command(version, about = "Live state server for Code-Clinic events")]
struct Cli {
    /// TOML file with bind_host, port, log_filter and seed_path.
    #[arg(long, default_value = "server.toml")]
    config: PathBuf,
    #[arg(long)]
    port: Option<u16>,
    #[arg(long)]
    bind_host: Option<String>,
    /// TOML file replacing the built-in question lists.
    #[arg(long)]
    seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config);
    if let Some(port) = cli.port {
        settings.port = port;
    }
    if let Some(bind_host) = cli.bind_host {
        settings.bind_host = bind_host;
    }
    if let Some(seed) = cli.seed {
        settings.seed_path = Some(seed);
    }

    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .init();

    let initial = match &settings.seed_path {
        Some(path) => {
            info!(path = %path.display(), "loading question seed");
            load_seed(path)?.into_event_state()
        }
        None => default_event_state(),
    };
    let broadcaster = Broadcaster::new(StateStore::new(initial), Arc::new(SystemClock));
    let app = build_router(AppState {
        broadcaster: Arc::new(broadcaster),
    });

    let addr = settings.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "code-clinic server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl+C, shutting down"),
        Err(error) => {
            error!(%error, "unable to listen for Ctrl+C; running until killed");
            std::future::pending::<()>().await;
        }
    }
}

fn build_router(state: AppState) -> Router {
    // Browser clients connect to the bare origin.
    Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .route("/healthz", get(healthz))
        .route("/state", get(current_state))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn current_state(State(state): State<AppState>) -> Json<EventState> {
    Json(state.broadcaster.snapshot().await)
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws_connection(state, socket))
}

async fn ws_connection(state: AppState, socket: WebSocket) {
    use futures::{SinkExt, StreamExt};

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = frame_channel();
    let broadcaster = state.broadcaster;
    let id = broadcaster.connect(Arc::new(tx)).await;

    let send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.to_string())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => {
                broadcaster.handle_message(id, &text).await;
            }
            Message::Binary(bytes) => match std::str::from_utf8(&bytes) {
                Ok(text) => {
                    broadcaster.handle_message(id, text).await;
                }
                Err(error) => warn!(connection_id = %id, %error, "dropping non-UTF-8 message"),
            },
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    broadcaster.disconnect(id).await;
    send_task.abort();
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
