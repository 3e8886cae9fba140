//! Network Layer
//!
//! WebSocket server and wire protocol. This layer is **non-deterministic**;
//! all game decisions run through `game/`.

pub mod auth;
pub mod protocol;
pub mod server;

pub use auth::{
    hash_password, issue_token, validate_token, verify_password, AuthConfig, AuthError,
    TokenClaims,
};
pub use protocol::{ClientMessage, ErrorCode, ServerError, ServerMessage};
pub use server::{GameServer, GameServerError, ServerConfig};
