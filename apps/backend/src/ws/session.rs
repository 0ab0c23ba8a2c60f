use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::Serialize;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{info, warn};
use uuid::Uuid;

use crate::ai::provider_for;
use crate::protocol::{ChannelSink, Command, GameEvent};
use crate::services::{spawn_session, SessionController, SessionHandle};
use crate::state::app_state::AppState;
use crate::ws::protocol::{ClientMsg, ErrorCode, ServerMsg};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);
const DEFAULT_PLAYER_NAME: &str = "Player";

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let session = WsSession::new(Uuid::new_v4(), app_state);
    ws::start(session, &req, stream)
}

pub struct WsSession {
    conn_id: Uuid,
    app_state: web::Data<AppState>,
    session_id: Option<Uuid>,
    commands: Option<Sender<Command>>,
    last_heartbeat: Instant,
    heartbeat_handle: Option<actix::SpawnHandle>,
}

impl WsSession {
    fn new(conn_id: Uuid, app_state: web::Data<AppState>) -> Self {
        Self {
            conn_id,
            app_state,
            session_id: None,
            commands: None,
            last_heartbeat: Instant::now(),
            heartbeat_handle: None,
        }
    }

    fn send_json<T: Serialize>(ctx: &mut ws::WebsocketContext<Self>, msg: &T) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn send_error(ctx: &mut ws::WebsocketContext<Self>, code: ErrorCode, message: impl Into<String>) {
        Self::send_json(
            ctx,
            &ServerMsg::Error {
                code,
                message: message.into(),
            },
        );
    }

    fn start_heartbeat(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        let handle = ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(conn_id = %actor.conn_id, "[WS SESSION] heartbeat timed out");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
        self.heartbeat_handle = Some(handle);
    }

    fn create_game(&mut self, player_name: Option<String>, ctx: &mut ws::WebsocketContext<Self>) {
        if self.commands.as_ref().is_some_and(|tx| !tx.is_closed()) {
            Self::send_error(ctx, ErrorCode::SessionExists, "A game is already running");
            return;
        }

        let name = player_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_PLAYER_NAME.to_string());

        let (sink, events) = ChannelSink::pair();
        let built = SessionController::builder(name)
            .config(self.app_state.config.clone())
            .provider(provider_for(&self.app_state.backend, None))
            .sink(Arc::new(sink))
            .build();
        let controller = match built {
            Ok(controller) => controller,
            Err(err) => {
                warn!(conn_id = %self.conn_id, error = %err, "[WS SESSION] session setup failed");
                Self::send_error(ctx, ErrorCode::InvalidConfig, err.to_string());
                return;
            }
        };

        let SessionHandle {
            session_id,
            commands,
            task,
        } = spawn_session(controller);

        let sessions = Arc::clone(&self.app_state.sessions);
        sessions.register(session_id, &commands);
        tokio::spawn(async move {
            if let Err(err) = task.await {
                warn!(%session_id, error = %err, "[WS SESSION] session task failed");
            }
            sessions.unregister(session_id);
        });

        ctx.add_stream(UnboundedReceiverStream::new(events));
        self.session_id = Some(session_id);
        self.commands = Some(commands);
        info!(conn_id = %self.conn_id, %session_id, "[WS SESSION] game created");
    }

    fn forward(&mut self, command: Command, ctx: &mut ws::WebsocketContext<Self>) {
        let Some(tx) = &self.commands else {
            Self::send_error(ctx, ErrorCode::NoSession, "Create a game first");
            return;
        };
        match tx.try_send(command) {
            Ok(()) => {}
            Err(TrySendError::Full(command)) => {
                warn!(conn_id = %self.conn_id, command = command.name(), "[WS SESSION] command queue full");
                Self::send_error(ctx, ErrorCode::Busy, "Too many pending commands");
            }
            Err(TrySendError::Closed(_)) => {
                self.commands = None;
                self.session_id = None;
                Self::send_error(ctx, ErrorCode::SessionClosed, "The game has ended");
            }
        }
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(conn_id = %self.conn_id, "[WS SESSION] started");
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.commands = None;
        info!(
            conn_id = %self.conn_id,
            session_id = ?self.session_id,
            "[WS SESSION] stopped"
        );
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();

                let parsed: Result<ClientMsg, _> = serde_json::from_str(&text);
                let msg = match parsed {
                    Ok(msg) => msg,
                    Err(err) => {
                        Self::send_error(ctx, ErrorCode::BadRequest, format!("Malformed message: {err}"));
                        return;
                    }
                };

                match msg {
                    ClientMsg::CreateGame { player_name } => self.create_game(player_name, ctx),
                    ClientMsg::StartGame => self.forward(Command::StartGame, ctx),
                    ClientMsg::Action(command) => self.forward(command, ctx),
                    ClientMsg::Ping => Self::send_json(ctx, &ServerMsg::Pong),
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                Self::send_error(ctx, ErrorCode::BadRequest, "Binary not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(conn_id = %self.conn_id, error = %err, "[WS SESSION] protocol error");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl StreamHandler<GameEvent> for WsSession {
    fn handle(&mut self, event: GameEvent, ctx: &mut Self::Context) {
        Self::send_json(ctx, &event);
    }

    /// The session ended; the connection stays open for another game.
    fn finished(&mut self, _ctx: &mut Self::Context) {
        info!(conn_id = %self.conn_id, session_id = ?self.session_id, "[WS SESSION] event stream ended");
    }
}
