//! Daily Word Game Server
//!
//! Binds the WebSocket server over an in-memory store seeded with the
//! default word pool and an admin account.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use daily_word::game::service::GameService;
use daily_word::game::store::{MemoryStore, Store};
use daily_word::game::user::{Role, UserId, UserRecord};
use daily_word::network::auth::{hash_password, AuthConfig};
use daily_word::network::server::{GameServer, ServerConfig};
use daily_word::{WordPool, DAILY_GAME_LIMIT, MAX_GUESSES, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Daily Word Server v{}", VERSION);
    info!("Guess budget: {} per game", MAX_GUESSES);
    info!("Daily limit: {} games per user", DAILY_GAME_LIMIT);

    let store = Arc::new(MemoryStore::new());
    seed_admin(&store).await?;

    let service = Arc::new(GameService::new(store, WordPool::default()));

    let auth_config = AuthConfig::from_env();
    if !auth_config.is_configured() {
        warn!("AUTH_SECRET not set; login tokens will not be issued");
    }

    let config = ServerConfig::from_env();
    let server = GameServer::new(config, auth_config, service);
    server.run().await?;

    Ok(())
}

/// Seed the default admin account, as the original deployment shipped with.
async fn seed_admin(store: &Arc<MemoryStore>) -> anyhow::Result<()> {
    let password =
        std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "adminpass@123".to_string());

    let admin = UserRecord {
        id: UserId::generate(),
        username: "admin".to_string(),
        credential: hash_password(&password),
        role: Role::Admin,
        created_at: Utc::now(),
    };

    store.create_user(admin).await?;
    info!("Seeded admin account");
    Ok(())
}
