//! WebSocket Game Server
//!
//! Async WebSocket server for client connections. Handles registration,
//! login, and game message routing; all game decisions happen in
//! `game::service`.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, instrument, warn};

use crate::game::service::{GameError, GameService};
use crate::game::session::SessionId;
use crate::game::store::Store;
use crate::game::user::{Role, UserId};
use crate::network::auth::{issue_token, validate_token, AuthConfig};
use crate::network::protocol::{
    AuthenticatedInfo, ClientMessage, ErrorCode, GameStartedInfo, GameStatusInfo, GuessResultInfo,
    LoginInfo, RegisteredInfo, ServerError, ServerMessage, UserReportInfo,
};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connections.
    pub max_connections: usize,
    /// Server version string.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".parse().expect("static addr"),
            max_connections: 1000,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.bind_addr),
            max_connections: std::env::var("MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_connections),
            version: defaults.version,
        }
    }
}

/// Game server errors.
#[derive(Debug, thiserror::Error)]
pub enum GameServerError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    BindFailed(#[from] std::io::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Connection-level authentication state.
#[derive(Debug, Clone, Copy)]
struct AuthState {
    user_id: UserId,
    #[allow(dead_code)]
    role: Role,
}

/// Connected client state.
struct ConnectedClient {
    /// Authenticated identity, set by Login or Authenticate.
    auth: Option<AuthState>,
    /// Connection time.
    #[allow(dead_code)]
    connected_at: Instant,
    /// Message sender (for direct messaging to client).
    #[allow(dead_code)]
    sender: mpsc::Sender<ServerMessage>,
}

/// The game server.
pub struct GameServer<S: Store + 'static> {
    /// Server configuration.
    config: ServerConfig,
    /// Token configuration.
    auth_config: AuthConfig,
    /// Game orchestration.
    service: Arc<GameService<S>>,
    /// Connected clients.
    clients: Arc<RwLock<BTreeMap<SocketAddr, ConnectedClient>>>,
    /// Shutdown signal.
    shutdown_tx: broadcast::Sender<()>,
}

impl<S: Store + 'static> GameServer<S> {
    /// Create a new game server.
    pub fn new(config: ServerConfig, auth_config: AuthConfig, service: Arc<GameService<S>>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            auth_config,
            service,
            clients: Arc::new(RwLock::new(BTreeMap::new())),
            shutdown_tx,
        }
    }

    /// Signal all connections to shut down.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Run the server.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<(), GameServerError> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!("Game server listening on {}", self.config.bind_addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            let clients_count = self.clients.read().await.len();
                            if clients_count >= self.config.max_connections {
                                warn!("Connection limit reached, rejecting {}", addr);
                                continue;
                            }

                            info!("New connection from {}", addr);
                            self.handle_connection(stream, addr);
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle a new WebSocket connection.
    fn handle_connection(&self, stream: TcpStream, addr: SocketAddr) {
        let clients = self.clients.clone();
        let service = self.service.clone();
        let config = self.config.clone();
        let auth_config = self.auth_config.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let ws_stream = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    error!("WebSocket handshake failed for {}: {}", addr, e);
                    return;
                }
            };

            let (mut ws_sender, mut ws_receiver) = ws_stream.split();
            let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(64);

            // Register client
            {
                let mut clients = clients.write().await;
                clients.insert(
                    addr,
                    ConnectedClient {
                        auth: None,
                        connected_at: Instant::now(),
                        sender: msg_tx.clone(),
                    },
                );
            }

            // Spawn message sender task
            let sender_task = tokio::spawn(async move {
                while let Some(msg) = msg_rx.recv().await {
                    let text = match msg.to_json() {
                        Ok(t) => t,
                        Err(e) => {
                            error!("Failed to serialize message: {}", e);
                            continue;
                        }
                    };
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
            });

            // Handle incoming messages
            loop {
                tokio::select! {
                    msg = ws_receiver.next() => {
                        match msg {
                            Some(Ok(Message::Text(text))) => {
                                let client_msg = match ClientMessage::from_json(&text) {
                                    Ok(m) => m,
                                    Err(e) => {
                                        debug!("Invalid message from {}: {}", addr, e);
                                        let _ = msg_tx.send(ServerMessage::Error(ServerError {
                                            code: ErrorCode::InvalidInput,
                                            message: "Invalid message format".to_string(),
                                        })).await;
                                        continue;
                                    }
                                };

                                Self::handle_client_message(
                                    addr,
                                    client_msg,
                                    &clients,
                                    &service,
                                    &config,
                                    &auth_config,
                                    &msg_tx,
                                ).await;
                            }
                            Some(Ok(Message::Ping(_))) => {
                                // tungstenite answers pings at the protocol
                                // level; nothing to do.
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                debug!("Client {} disconnected", addr);
                                break;
                            }
                            Some(Err(e)) => {
                                error!("WebSocket error for {}: {}", addr, e);
                                break;
                            }
                            _ => {}
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        let _ = msg_tx.send(ServerMessage::Shutdown {
                            reason: "Server shutting down".to_string(),
                        }).await;
                        break;
                    }
                }
            }

            // Cleanup
            sender_task.abort();
            clients.write().await.remove(&addr);
            info!("Client {} cleaned up", addr);
        });
    }

    /// Handle a client message.
    async fn handle_client_message(
        addr: SocketAddr,
        msg: ClientMessage,
        clients: &Arc<RwLock<BTreeMap<SocketAddr, ConnectedClient>>>,
        service: &Arc<GameService<S>>,
        config: &ServerConfig,
        auth_config: &AuthConfig,
        sender: &mpsc::Sender<ServerMessage>,
    ) {
        match msg {
            ClientMessage::Register(req) => {
                let reply = match service.register(&req.username, &req.password).await {
                    Ok(user_id) => ServerMessage::Registered(RegisteredInfo {
                        user_id: user_id.to_uuid_string(),
                    }),
                    Err(e) => error_message(&e),
                };
                let _ = sender.send(reply).await;
            }

            ClientMessage::Login(req) => {
                match service.login(&req.username, &req.password).await {
                    Ok(login) => {
                        Self::set_auth(clients, addr, login.user_id, login.role).await;

                        let token = service
                            .store()
                            .find_user(&login.user_id)
                            .await
                            .and_then(|user| issue_token(&user, auth_config).ok());

                        let _ = sender.send(ServerMessage::LoginOk(LoginInfo {
                            user_id: login.user_id.to_uuid_string(),
                            username: login.username,
                            role: login.role,
                            token,
                            server_version: config.version.clone(),
                        })).await;
                    }
                    Err(e) => {
                        let _ = sender.send(error_message(&e)).await;
                    }
                }
            }

            ClientMessage::Authenticate(req) => {
                match validate_token(&req.token, auth_config) {
                    Ok(claims) => {
                        // Subject validated as a UUID during token checks.
                        if let Some(user_id) = claims.user_id() {
                            Self::set_auth(clients, addr, user_id, claims.role).await;
                            let _ = sender.send(ServerMessage::Authenticated(AuthenticatedInfo {
                                user_id: claims.sub,
                                role: claims.role,
                            })).await;
                        }
                    }
                    Err(e) => {
                        debug!("Token auth failed for {}: {}", addr, e);
                        let _ = sender.send(ServerMessage::Error(ServerError {
                            code: ErrorCode::InvalidToken,
                            message: e.to_string(),
                        })).await;
                    }
                }
            }

            ClientMessage::StartGame => {
                let Some(auth) = Self::current_auth(clients, addr).await else {
                    let _ = sender.send(not_authenticated()).await;
                    return;
                };

                let reply = match service.start_game(auth.user_id).await {
                    Ok(started) => ServerMessage::GameStarted(GameStartedInfo {
                        session_id: started.session_id.to_uuid_string(),
                        max_guesses: started.max_guesses,
                        games_remaining_today: started.games_remaining_today,
                    }),
                    Err(e) => error_message(&e),
                };
                let _ = sender.send(reply).await;
            }

            ClientMessage::Guess(req) => {
                let Some(auth) = Self::current_auth(clients, addr).await else {
                    let _ = sender.send(not_authenticated()).await;
                    return;
                };

                let Some(session_id) = SessionId::from_uuid_str(&req.session_id) else {
                    let _ = sender.send(ServerMessage::Error(ServerError {
                        code: ErrorCode::InvalidInput,
                        message: "Invalid session id".to_string(),
                    })).await;
                    return;
                };

                let reply = match service
                    .submit_guess(session_id, auth.user_id, &req.guess)
                    .await
                {
                    Ok(outcome) => ServerMessage::GuessResult(GuessResultInfo::from_feedback(
                        outcome.feedback,
                        outcome.is_correct,
                        outcome.remaining_guesses,
                        outcome.completed,
                    )),
                    Err(e) => error_message(&e),
                };
                let _ = sender.send(reply).await;
            }

            ClientMessage::GameStatus => {
                let Some(auth) = Self::current_auth(clients, addr).await else {
                    let _ = sender.send(not_authenticated()).await;
                    return;
                };

                let reply = match service.game_status(auth.user_id).await {
                    Ok(status) => ServerMessage::GameStatus(GameStatusInfo {
                        games_played_today: status.games_played_today,
                        games_remaining: status.games_remaining,
                    }),
                    Err(e) => error_message(&e),
                };
                let _ = sender.send(reply).await;
            }

            ClientMessage::DailyReport(req) => {
                let date = req.date.unwrap_or_else(|| chrono::Utc::now().date_naive());
                let report = service.daily_report(date).await;
                let _ = sender.send(ServerMessage::DailyReport(report)).await;
            }

            ClientMessage::UserReport(req) => {
                let reply = match service.user_report(&req.username).await {
                    Ok(report) => ServerMessage::UserReport(UserReportInfo {
                        username: report.username,
                        report: report.rows,
                    }),
                    Err(e) => error_message(&e),
                };
                let _ = sender.send(reply).await;
            }

            ClientMessage::Ping { timestamp } => {
                let _ = sender.send(ServerMessage::Pong {
                    timestamp,
                    server_time: std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .unwrap_or_default()
                        .as_millis() as u64,
                }).await;
            }
        }
    }

    /// Mark a connection as authenticated.
    async fn set_auth(
        clients: &Arc<RwLock<BTreeMap<SocketAddr, ConnectedClient>>>,
        addr: SocketAddr,
        user_id: UserId,
        role: Role,
    ) {
        let mut clients = clients.write().await;
        if let Some(client) = clients.get_mut(&addr) {
            client.auth = Some(AuthState { user_id, role });
        }
    }

    /// Current authentication state for a connection.
    async fn current_auth(
        clients: &Arc<RwLock<BTreeMap<SocketAddr, ConnectedClient>>>,
        addr: SocketAddr,
    ) -> Option<AuthState> {
        clients.read().await.get(&addr).and_then(|c| c.auth)
    }
}

/// Map a service error onto a protocol error message.
fn error_message(err: &GameError) -> ServerMessage {
    let code = match err {
        GameError::MalformedInput(_) | GameError::Registration(_) => ErrorCode::InvalidInput,
        GameError::UsernameTaken => ErrorCode::UsernameTaken,
        GameError::InvalidCredentials => ErrorCode::InvalidCredentials,
        GameError::UserNotFound => ErrorCode::UserNotFound,
        GameError::SessionNotFound => ErrorCode::SessionNotFound,
        GameError::SessionAlreadyTerminal => ErrorCode::SessionCompleted,
        GameError::GuessLimitExceeded => ErrorCode::GuessLimitExceeded,
        GameError::DailyLimitReached => ErrorCode::DailyLimitReached,
        GameError::EmptyWordPool => ErrorCode::InternalError,
    };

    ServerMessage::Error(ServerError {
        code,
        message: err.to_string(),
    })
}

/// Error reply for requests that need an authenticated connection.
fn not_authenticated() -> ServerMessage {
    ServerMessage::Error(ServerError {
        code: ErrorCode::NotAuthenticated,
        message: "Log in first".to_string(),
    })
}

// =============================================================================
// TESTS
// =============================================================================
