use chrono::Duration;
use std::sync::Arc;

use super::error::ServiceError;
use super::models::{
    CreateUserRequest, CreateUserResponse, DeleteUserRequest, LoginRequest, LoginResponse,
    UpdateUserRequest, VerifyTokenRequest, VerifyTokenResponse,
};
use crate::account::{Email, NewUser, RepositoryError, UserRepository, Username};
use crate::config::DefaultAdminConfig;
use crate::interceptor::{AuthContext, check_role};
use crate::password::{self, HashParams};
use crate::token::{Role, TokenCodec};

const MISSING_PARAMS: &str = "Invalid request, missing some request parameter(s).";
const BAD_CREDENTIALS: &str = "invalid username or password";

/// The auth service operations, independent of transport.
pub struct UserAuthService {
    users: Arc<dyn UserRepository>,
    codec: Arc<TokenCodec>,
    hash_params: HashParams,
    token_ttl: Duration,
}

impl UserAuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        codec: Arc<TokenCodec>,
        hash_params: HashParams,
        token_ttl: Duration,
    ) -> Self {
        Self {
            users,
            codec,
            hash_params,
            token_ttl,
        }
    }

    pub fn codec(&self) -> &Arc<TokenCodec> {
        &self.codec
    }

    /// Check credentials and issue a token.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, ServiceError> {
        if req.username.is_empty() || req.password.is_empty() {
            return Err(ServiceError::InvalidArgument(MISSING_PARAMS.to_string()));
        }

        let user = match self.users.find_by_username(&req.username).await {
            Ok(user) => user,
            Err(RepositoryError::NotFound) => {
                tracing::warn!("Login failed: unknown user");
                return Err(ServiceError::NotFound(BAD_CREDENTIALS.to_string()));
            }
            Err(e) => {
                tracing::error!("Login lookup failed: {}", e);
                return Err(ServiceError::Internal(BAD_CREDENTIALS.to_string()));
            }
        };

        let matched = verify_blocking(req.password, user.password_hash.clone())
            .await
            .map_err(|e| {
                tracing::error!(user_id = user.id, "Stored hash unusable: {}", e);
                ServiceError::Internal(BAD_CREDENTIALS.to_string())
            })?;
        if !matched {
            tracing::warn!(user_id = user.id, "Login failed: wrong password");
            return Err(ServiceError::PermissionDenied(BAD_CREDENTIALS.to_string()));
        }

        let token = self
            .codec
            .issue(&user.identity(), self.token_ttl)
            .map_err(|e| ServiceError::Internal(format!("failed to generate token: {}", e)))?;

        tracing::info!(user_id = user.id, "Login succeeded");
        Ok(LoginResponse { token })
    }

    /// Register a new `User`-role account.
    pub async fn create_user(
        &self,
        req: CreateUserRequest,
    ) -> Result<CreateUserResponse, ServiceError> {
        if req.email.is_empty() || req.password.is_empty() || req.username.is_empty() {
            return Err(ServiceError::InvalidArgument(MISSING_PARAMS.to_string()));
        }
        let email = Email::new(&req.email)
            .map_err(|_| ServiceError::InvalidArgument("invalid email".to_string()))?;
        let username =
            Username::new(&req.username).map_err(|e| ServiceError::InvalidArgument(e.to_string()))?;

        let password_hash = self.hash(req.password).await?;

        let user = self
            .users
            .create(NewUser {
                username: username.into_string(),
                password_hash,
                email: email.into_string(),
                role: Role::User,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => {
                    ServiceError::AlreadyExists("email or username already taken".to_string())
                }
                other => {
                    tracing::error!("Failed creating user: {}", other);
                    ServiceError::Internal("failed to create user".to_string())
                }
            })?;

        tracing::info!(user_id = user.id, username = %user.username, "Created user");
        Ok(CreateUserResponse { id: user.id })
    }

    /// Report the identity inside a token.
    pub fn verify_token(&self, req: VerifyTokenRequest) -> Result<VerifyTokenResponse, ServiceError> {
        if req.token.is_empty() {
            return Err(ServiceError::InvalidArgument(
                "invalid request, missing token".to_string(),
            ));
        }

        let claims = self.codec.validate(&req.token).map_err(|e| {
            tracing::warn!(kind = e.kind(), "VerifyToken rejected token");
            ServiceError::PermissionDenied("invalid token supplied".to_string())
        })?;

        Ok(VerifyTokenResponse {
            username: claims.username,
            id: claims.id,
            role: claims.role.as_str().to_string(),
        })
    }

    /// Change any of email, username, password, role. Admin only.
    pub async fn update_user(
        &self,
        ctx: &AuthContext,
        req: UpdateUserRequest,
    ) -> Result<(), ServiceError> {
        check_role(ctx, Role::Admin)?;

        if req.id <= 0 {
            return Err(ServiceError::InvalidArgument("invalid ID".to_string()));
        }

        let mut user = self.users.find_by_id(req.id).await.map_err(|e| match e {
            RepositoryError::NotFound => ServiceError::NotFound("invalid id supplied".to_string()),
            other => ServiceError::Internal(format!("internal server error: {}", other)),
        })?;

        let mut changed = false;

        if let Some(raw) = non_empty(req.email) {
            let email = Email::new(&raw)
                .map_err(|_| ServiceError::InvalidArgument("invalid email".to_string()))?;
            if email.as_str() != user.email {
                user.email = email.into_string();
                changed = true;
            }
        }

        if let Some(password) = non_empty(req.password) {
            user.password_hash = self.hash(password).await?;
            changed = true;
        }

        if let Some(raw) = non_empty(req.username).filter(|u| *u != user.username) {
            let username =
                Username::new(&raw).map_err(|e| ServiceError::InvalidArgument(e.to_string()))?;
            user.username = username.into_string();
            changed = true;
        }

        if let Some(raw) = non_empty(req.role) {
            let role = Role::from_role_str(&raw);
            if role != user.role {
                user.role = role;
                changed = true;
            }
        }

        if !changed {
            return Err(ServiceError::InvalidArgument(
                "no changes to be made".to_string(),
            ));
        }

        self.users.update(&user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                ServiceError::AlreadyExists("username or email already taken".to_string())
            }
            RepositoryError::NotFound => ServiceError::NotFound("invalid id supplied".to_string()),
            other => {
                tracing::error!(user_id = user.id, "Failed updating user: {}", other);
                ServiceError::Internal("internal server error".to_string())
            }
        })?;

        tracing::info!(user_id = user.id, "Updated user");
        Ok(())
    }

    /// Remove an account. Admin only.
    pub async fn delete_user(
        &self,
        ctx: &AuthContext,
        req: DeleteUserRequest,
    ) -> Result<(), ServiceError> {
        check_role(ctx, Role::Admin)?;

        if req.id <= 0 {
            return Err(ServiceError::InvalidArgument(
                "a valid User ID must be provided".to_string(),
            ));
        }

        let not_found = || ServiceError::NotFound(format!("user with id {} not found", req.id));

        let user = self.users.find_by_id(req.id).await.map_err(|e| {
            if !matches!(e, RepositoryError::NotFound) {
                tracing::error!("could not retrieve user {}: {}", req.id, e);
            }
            not_found()
        })?;

        self.users.delete(user.id).await.map_err(|e| {
            if !matches!(e, RepositoryError::NotFound) {
                tracing::error!("could not delete user {}: {}", req.id, e);
            }
            not_found()
        })?;

        tracing::info!(user_id = user.id, "Deleted user");
        Ok(())
    }

    /// Create the configured admin account unless the username is taken.
    pub async fn seed_default_admin(&self, admin: &DefaultAdminConfig) -> Result<(), ServiceError> {
        let exists = self
            .users
            .exists(&admin.username)
            .await
            .map_err(|e| ServiceError::Internal(format!("error checking if user exists: {}", e)))?;
        if exists {
            tracing::info!(
                "Default user '{}' already exists. Skipping creation.",
                admin.username
            );
            return Ok(());
        }

        let email = Email::new(&admin.email)
            .map_err(|e| ServiceError::InvalidArgument(e.to_string()))?;
        let password_hash = self.hash(admin.password.clone()).await?;

        let user = self
            .users
            .create(NewUser {
                username: admin.username.clone(),
                password_hash,
                email: email.into_string(),
                role: Role::Admin,
            })
            .await
            .map_err(|e| ServiceError::Internal(format!("cannot create default user: {}", e)))?;

        tracing::info!(user_id = user.id, "Created default admin '{}'", user.username);
        Ok(())
    }

    async fn hash(&self, password: String) -> Result<String, ServiceError> {
        let params = self.hash_params;
        tokio::task::spawn_blocking(move || password::hash_password(&password, &params))
            .await
            .map_err(|e| ServiceError::Internal(format!("hash task failed: {}", e)))?
            .map_err(|e| {
                tracing::error!("Hashing failed: {}", e);
                ServiceError::Internal("Error in hashing password.".to_string())
            })
    }
}

/// The KDF blocks for its full cost; keep it off the async workers.
async fn verify_blocking(
    password: String,
    encoded_hash: String,
) -> Result<bool, ServiceError> {
    tokio::task::spawn_blocking(move || password::verify_password(&password, &encoded_hash))
        .await
        .map_err(|e| ServiceError::Internal(format!("verify task failed: {}", e)))?
        .map_err(|e| ServiceError::Internal(e.to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::InMemoryUserRepository;
    use crate::interceptor::{AuthInterceptor, CallMetadata, full_method_name};

    fn fast_params() -> HashParams {
        HashParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
            salt_length: 16,
            key_length: 32,
        }
    }

    struct Fixture {
        service: UserAuthService,
        repo: Arc<InMemoryUserRepository>,
        interceptor: AuthInterceptor,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(InMemoryUserRepository::new());
        let codec = Arc::new(TokenCodec::new(b"service-test-secret"));
        let service = UserAuthService::new(
            repo.clone(),
            codec.clone(),
            fast_params(),
            Duration::minutes(5),
        );
        Fixture {
            service,
            repo,
            interceptor: AuthInterceptor::new(codec),
        }
    }

    async fn create(f: &Fixture, username: &str, password: &str) -> i32 {
        f.service
            .create_user(CreateUserRequest {
                email: format!("{username}@Example.com"),
                username: username.to_string(),
                password: password.to_string(),
            })
            .await
            .unwrap()
            .id
    }

    async fn make_admin(f: &Fixture, id: i32) {
        let mut user = f.repo.find_by_id(id).await.unwrap();
        user.role = Role::Admin;
        f.repo.update(&user).await.unwrap();
    }

    async fn ctx_for(f: &Fixture, username: &str, password: &str, method: &str) -> AuthContext {
        let token = f
            .service
            .login(LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await
            .unwrap()
            .token;
        let md = CallMetadata::new().with("authorization", format!("Bearer {token}"));
        f.interceptor
            .intercept(&full_method_name(method), Some(&md))
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_user_defaults() {
        let f = fixture();
        let id = create(&f, "alice", "pw-alice").await;
        let user = f.repo.find_by_id(id).await.unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.email, "alice@example.com");
        assert!(user.password_hash.starts_with("$argon2id$v=19$"));
        assert!(password::verify_password("pw-alice", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_create_user_validation() {
        let f = fixture();
        let err = f
            .service
            .create_user(CreateUserRequest {
                email: String::new(),
                username: "bob".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));

        let err = f
            .service
            .create_user(CreateUserRequest {
                email: "not-an-email".to_string(),
                username: "bob".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::InvalidArgument("invalid email".to_string()));
    }

    #[tokio::test]
    async fn test_create_user_duplicate() {
        let f = fixture();
        create(&f, "alice", "pw").await;
        let err = f
            .service
            .create_user(CreateUserRequest {
                email: "other@example.com".to_string(),
                username: "alice".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_login_outcomes() {
        let f = fixture();
        create(&f, "alice", "correct horse").await;

        let ok = f
            .service
            .login(LoginRequest {
                username: "alice".to_string(),
                password: "correct horse".to_string(),
            })
            .await
            .unwrap();
        let identity = f
            .service
            .verify_token(VerifyTokenRequest { token: ok.token })
            .unwrap();
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.role, "User");

        let wrong = f
            .service
            .login(LoginRequest {
                username: "alice".to_string(),
                password: "battery staple".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(wrong, ServiceError::PermissionDenied(_)));

        let unknown = f
            .service
            .login(LoginRequest {
                username: "mallory".to_string(),
                password: "x".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(unknown, ServiceError::NotFound(_)));

        let empty = f.service.login(LoginRequest::default()).await.unwrap_err();
        assert!(matches!(empty, ServiceError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_login_with_corrupt_hash_is_internal() {
        let f = fixture();
        let id = create(&f, "alice", "pw").await;
        let mut user = f.repo.find_by_id(id).await.unwrap();
        user.password_hash = "$argon2id$broken".to_string();
        f.repo.update(&user).await.unwrap();

        let err = f
            .service
            .login(LoginRequest {
                username: "alice".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));
    }

    #[tokio::test]
    async fn test_verify_token_rejections() {
        let f = fixture();
        assert!(matches!(
            f.service.verify_token(VerifyTokenRequest::default()),
            Err(ServiceError::InvalidArgument(_))
        ));
        assert!(matches!(
            f.service.verify_token(VerifyTokenRequest {
                token: "a.b.c".to_string()
            }),
            Err(ServiceError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_update_user_requires_admin() {
        let f = fixture();
        let id = create(&f, "alice", "pw").await;
        let ctx = ctx_for(&f, "alice", "pw", "UpdateUser").await;

        let err = f
            .service
            .update_user(
                &ctx,
                UpdateUserRequest {
                    id,
                    username: Some("alice2".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_update_user_as_admin() {
        let f = fixture();
        let admin_id = create(&f, "root", "rootpw").await;
        make_admin(&f, admin_id).await;
        let target = create(&f, "bob", "bobpw").await;
        let ctx = ctx_for(&f, "root", "rootpw", "UpdateUser").await;

        f.service
            .update_user(
                &ctx,
                UpdateUserRequest {
                    id: target,
                    email: Some("BOB@New.io".to_string()),
                    password: Some("newpw".to_string()),
                    role: Some("Admin".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let bob = f.repo.find_by_id(target).await.unwrap();
        assert_eq!(bob.email, "bob@new.io");
        assert_eq!(bob.role, Role::Admin);
        assert!(password::verify_password("newpw", &bob.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_update_user_edge_cases() {
        let f = fixture();
        let admin_id = create(&f, "root", "rootpw").await;
        make_admin(&f, admin_id).await;
        let target = create(&f, "bob", "bobpw").await;
        create(&f, "carol", "carolpw").await;
        let ctx = ctx_for(&f, "root", "rootpw", "UpdateUser").await;

        let bad_id = f
            .service
            .update_user(&ctx, UpdateUserRequest::default())
            .await
            .unwrap_err();
        assert_eq!(bad_id, ServiceError::InvalidArgument("invalid ID".to_string()));

        let missing = f
            .service
            .update_user(
                &ctx,
                UpdateUserRequest {
                    id: 999,
                    username: Some("x".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(missing, ServiceError::NotFound(_)));

        // Same values and an unknown role that decodes to the current one.
        let unchanged = f
            .service
            .update_user(
                &ctx,
                UpdateUserRequest {
                    id: target,
                    username: Some("bob".to_string()),
                    email: Some("bob@example.com".to_string()),
                    role: Some("Superuser".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(
            unchanged,
            ServiceError::InvalidArgument("no changes to be made".to_string())
        );

        let taken = f
            .service
            .update_user(
                &ctx,
                UpdateUserRequest {
                    id: target,
                    username: Some("carol".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(taken, ServiceError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_unknown_role_string_demotes_admin() {
        let f = fixture();
        let admin_id = create(&f, "root", "rootpw").await;
        make_admin(&f, admin_id).await;
        let other_admin = create(&f, "ops", "opspw").await;
        make_admin(&f, other_admin).await;
        let ctx = ctx_for(&f, "root", "rootpw", "UpdateUser").await;

        f.service
            .update_user(
                &ctx,
                UpdateUserRequest {
                    id: other_admin,
                    role: Some("admin".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(f.repo.find_by_id(other_admin).await.unwrap().role, Role::User);
    }

    #[tokio::test]
    async fn test_delete_user() {
        let f = fixture();
        let admin_id = create(&f, "root", "rootpw").await;
        make_admin(&f, admin_id).await;
        let target = create(&f, "bob", "bobpw").await;

        let user_ctx = ctx_for(&f, "bob", "bobpw", "DeleteUser").await;
        assert!(matches!(
            f.service
                .delete_user(&user_ctx, DeleteUserRequest { id: target })
                .await,
            Err(ServiceError::PermissionDenied(_))
        ));

        let ctx = ctx_for(&f, "root", "rootpw", "DeleteUser").await;
        assert!(matches!(
            f.service.delete_user(&ctx, DeleteUserRequest { id: 0 }).await,
            Err(ServiceError::InvalidArgument(_))
        ));
        f.service
            .delete_user(&ctx, DeleteUserRequest { id: target })
            .await
            .unwrap();
        assert_eq!(
            f.service
                .delete_user(&ctx, DeleteUserRequest { id: target })
                .await,
            Err(ServiceError::NotFound(format!(
                "user with id {target} not found"
            )))
        );
    }

    #[tokio::test]
    async fn test_anonymous_context_cannot_reach_admin_ops() {
        let f = fixture();
        let err = f
            .service
            .delete_user(&AuthContext::anonymous(), DeleteUserRequest { id: 1 })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));
    }

    #[tokio::test]
    async fn test_seed_default_admin_idempotent() {
        let f = fixture();
        let admin = DefaultAdminConfig {
            username: "admin".to_string(),
            email: "Admin@Example.com".to_string(),
            password: "changeme".to_string(),
        };
        f.service.seed_default_admin(&admin).await.unwrap();
        f.service.seed_default_admin(&admin).await.unwrap();
        assert_eq!(f.repo.len(), 1);

        let user = f.repo.find_by_username("admin").await.unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.email, "admin@example.com");
    }
}
