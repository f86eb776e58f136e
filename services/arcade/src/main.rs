use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use clap::{Arg, ArgAction, Command};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use wagerhall_execution::{GameEvent, GameRng, MemoryLedger, RandomSource, WagerEngine};
use wagerhall_types::PlayerId;

mod config;
mod protocol;
mod runtime;

use config::ServiceConfig;
use protocol::{InboundMessage, OutboundResponse};
use runtime::{BroadcastSink, TokioScheduler};

#[derive(Clone)]
struct AppState {
    engine: Arc<WagerEngine>,
    broadcaster: broadcast::Sender<GameEvent>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = Command::new("wagerhall-arcade")
        .about("Serve crash, slot and hi-lo wagers over WebSocket.")
        .arg(Arg::new("config").long("config").required(false))
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Validate configuration and exit")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config = ServiceConfig::load(matches.get_one::<String>("config").map(String::as_str))?;
    tracing_subscriber::fmt()
        .with_max_level(config.level()?)
        .init();
    info!(config = ?config, "loaded config");

    if matches.get_flag("dry-run") {
        config
            .games
            .clone()
            .prepare()
            .context("invalid game configuration")?;
        info!("configuration ok");
        return Ok(());
    }

    let (broadcaster, _) = broadcast::channel(config.event_buffer);
    let rng: Box<dyn RandomSource> = match config.seed {
        Some(seed) => Box::new(GameRng::from_seed(seed)),
        None => Box::new(GameRng::from_entropy()),
    };
    let engine = WagerEngine::new(
        config.games.clone(),
        Arc::new(MemoryLedger::new(config.starting_balance)),
        Arc::new(TokioScheduler::new(Handle::current(), config.tick())),
        Arc::new(BroadcastSink::new(broadcaster.clone())),
        rng,
    )
    .context("invalid game configuration")?;
    engine.start();

    let state = AppState {
        engine,
        broadcaster,
    };
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/healthz", get(healthz))
        .with_state(state);

    let addr = config.listen_addr()?;
    info!(%addr, tick_ms = config.tick_ms, "arcade listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not bind {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let mut events = state.broadcaster.subscribe();

    let write_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    // Events are forwarded only for players this connection has acted for.
    let mut players: HashSet<PlayerId> = HashSet::new();
    loop {
        tokio::select! {
            inbound = receiver.next() => {
                let Some(Ok(message)) = inbound else {
                    break;
                };
                match message {
                    Message::Text(text) => match serde_json::from_str::<InboundMessage>(&text) {
                        Ok(inbound) => {
                            players.insert(inbound.player().clone());
                            let response = protocol::respond(&state.engine, inbound);
                            send_json(&tx, &response);
                        }
                        Err(err) => {
                            warn!(?err, "invalid inbound message");
                            send_json(
                                &tx,
                                &OutboundResponse::error("", "INVALID_MESSAGE", err.to_string()),
                            );
                        }
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if players.contains(event.player()) {
                        send_json(&tx, &event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    debug!(players = players.len(), "socket closed");
    write_task.abort();
}

fn send_json<T: Serialize>(tx: &mpsc::UnboundedSender<Message>, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => {
            let _ = tx.send(Message::Text(json));
        }
        Err(err) => warn!(?err, "failed to serialize outbound message"),
    }
}
