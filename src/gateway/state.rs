use std::sync::Arc;

use crate::account::Database;
use crate::interceptor::AuthInterceptor;
use crate::user_auth::UserAuthService;

/// Gateway shared state
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<UserAuthService>,
    pub interceptor: AuthInterceptor,
    /// PostgreSQL pool, pinged by the health check when present
    pub pg_db: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(auth: Arc<UserAuthService>, pg_db: Option<Arc<Database>>) -> Self {
        let interceptor = AuthInterceptor::new(auth.codec().clone());
        Self {
            auth,
            interceptor,
            pg_db,
        }
    }
}
