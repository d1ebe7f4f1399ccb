//! Auth Service entry point
//!
//! ```text
//! config/<env>.yaml ─▶ logging ─▶ user store ─▶ seed admin ─▶ HTTP gateway
//!                                (Postgres |
//!                                 in-memory)
//! ```
//!
//! Flags: `--env|-e <name>` (default `dev`), `--port <port>`.

use std::sync::Arc;

use anyhow::{Context, Result};

use auth_service::account::{Database, InMemoryUserRepository, PgUserRepository, UserRepository};
use auth_service::config::AppConfig;
use auth_service::gateway::{self, AppState};
use auth_service::token::TokenCodec;
use auth_service::user_auth::UserAuthService;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    let _log_guard = auth_service::logging::init_logging(&app_config);

    tracing::info!("Starting auth service in {} mode", env);

    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }

    let (users, pg_db): (Arc<dyn UserRepository>, Option<Arc<Database>>) =
        match &app_config.postgres_url {
            Some(url) => {
                let db = Database::connect(url)
                    .await
                    .context("Failed to connect to PostgreSQL")?;
                db.init_schema()
                    .await
                    .context("Failed to initialize users schema")?;
                tracing::info!("Using PostgreSQL user store");
                let repo = PgUserRepository::new(&db);
                (Arc::new(repo), Some(Arc::new(db)))
            }
            None => {
                tracing::warn!("No postgres_url configured, users are kept in memory");
                (Arc::new(InMemoryUserRepository::new()), None)
            }
        };

    let codec = Arc::new(TokenCodec::new(app_config.auth.jwt_secret.as_bytes()));
    let auth = Arc::new(UserAuthService::new(
        users,
        codec,
        app_config.auth.hash,
        app_config.auth.token_ttl()?,
    ));

    if let Some(admin) = &app_config.default_admin {
        auth.seed_default_admin(admin)
            .await
            .context("Failed to seed default admin")?;
    }

    let state = Arc::new(AppState::new(auth, pg_db));
    gateway::run_server(&app_config.gateway, state).await
}
