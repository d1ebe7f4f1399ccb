//! OpenAPI description of the HTTP gateway
//!
//! Served as JSON at `/api-docs/openapi.json`; `export_openapi` writes the
//! same document to disk.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::gateway::handlers::HealthResponse;
use crate::user_auth::{
    CreateUserRequest, CreateUserResponse, DeleteUserRequest, LoginRequest, LoginResponse,
    UpdateUserRequest, VerifyTokenRequest, VerifyTokenResponse,
};

/// `Authorization: Bearer <jwt>` as issued by Login
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Auth Service API",
        version = "1.0.0",
        description = "User registration, login and role-based access with HMAC-signed bearer tokens."
    ),
    paths(
        crate::gateway::handlers::health_check,
        crate::gateway::handlers::login,
        crate::gateway::handlers::create_user,
        crate::gateway::handlers::verify_token,
        crate::gateway::handlers::update_user,
        crate::gateway::handlers::delete_user,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            LoginResponse,
            CreateUserRequest,
            CreateUserResponse,
            VerifyTokenRequest,
            VerifyTokenResponse,
            UpdateUserRequest,
            DeleteUserRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Public operations (no token required)"),
        (name = "Admin", description = "Account management (ADMIN token required)"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
