pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Json, Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use utoipa::OpenApi;

pub use state::AppState;

use crate::config::GatewayConfig;
use crate::interceptor::full_method_name;

/// Build the gateway router.
///
/// Every `auth.AuthService` route sits behind the interceptor; `/health`
/// and the OpenAPI document do not.
pub fn router(state: Arc<AppState>) -> Router {
    let service_routes = Router::new()
        .route(&full_method_name("Login"), post(handlers::login))
        .route(&full_method_name("CreateUser"), post(handlers::create_user))
        .route(&full_method_name("VerifyToken"), post(handlers::verify_token))
        .route(&full_method_name("UpdateUser"), post(handlers::update_user))
        .route(&full_method_name("DeleteUser"), post(handlers::delete_user))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .merge(service_routes)
        .route("/health", get(handlers::health_check))
        .with_state(state)
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(openapi::ApiDoc::openapi()) }),
        )
}

/// Bind and serve until the process exits.
pub async fn run_server(config: &GatewayConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {}: {} (port {} may already be in use)",
            addr,
            e,
            config.port
        )
    })?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("OpenAPI: http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
