use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::entities::token::{AuthResponse, Claims, IssuedToken};
use crate::entities::user::{LoginUser, NewUser, NewUserResponse};
use crate::errors::{AppError, AuthError, FieldError, EMAIL_TAKEN, USERNAME_TAKEN};
use crate::auth::password::{hash_password, verify_password};
use crate::repositories::token::{TokenDenylist, TokenServiceRepository};
use crate::repositories::user::UserRepository;

pub struct AuthHandler {
    pub user_repo: Arc<dyn UserRepository>,
    pub token_service: Arc<dyn TokenServiceRepository>,
    pub denylist: Arc<dyn TokenDenylist>,
}

impl AuthHandler {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        token_service: Arc<dyn TokenServiceRepository>,
        denylist: Arc<dyn TokenDenylist>,
    ) -> Self {
        AuthHandler {
            user_repo,
            token_service,
            denylist,
        }
    }

    /// Registers a new user after validation and password hashing
    pub async fn register(&self, request: NewUser) -> Result<NewUserResponse, AppError> {
        let request = request.trimmed();
        request.validate()?;

        let mut taken = Vec::new();
        if self.user_repo.username_exists(&request.username).await? {
            taken.push(("username", USERNAME_TAKEN));
        }
        if self.user_repo.email_exists(&request.email.to_lowercase()).await? {
            taken.push(("email", EMAIL_TAKEN));
        }
        if !taken.is_empty() {
            return Err(AppError::ValidationError(
                taken.into_iter()
                    .map(|(field, message)| FieldError {
                        field: field.to_string(),
                        message: message.to_string(),
                    })
                    .collect()
            ));
        }

        let hashed_password = hash_password(&request.password)?;
        let user_insert = request.prepare_for_insert(hashed_password);

        let id = self.user_repo.create_user(&user_insert).await?;
        tracing::info!(user_id = id, "User registered");

        Ok(NewUserResponse {
            id,
            message: "Your account has been created! You are now able to log in".to_string(),
        })
    }

    /// Checks credentials and issues a session token
    pub async fn login(&self, request: LoginUser) -> Result<(AuthResponse, IssuedToken), AuthError> {
        request.validate()?;

        let user = self.user_repo.get_user_by_email(&request.email.trim().to_lowercase())
            .await
            .map_err(|e| {
                tracing::error!("User lookup failed during login: {}", e);
                AuthError::WrongCredentials
            })?
            .ok_or(AuthError::WrongCredentials)?;

        let is_password_valid = verify_password(&request.password, &user.password_hash)
            .map_err(|e| {
                tracing::warn!("Stored password hash unusable for user {}: {}", user.id, e);
                AuthError::WrongCredentials
            })?;
        if !is_password_valid {
            return Err(AuthError::WrongCredentials);
        }

        let issued = self.token_service.create_jwt(&user, request.remember)?;

        tracing::info!(user_id = user.id, remember = request.remember, "User logged in");
        Ok((AuthResponse::new(issued.token.clone(), issued.lifetime_secs), issued))
    }

    /// Revokes the session behind `token`. Tokens that are already invalid need no revocation.
    pub async fn logout(&self, token: Option<&str>) -> Result<(), AuthError> {
        let Some(token) = token else {
            return Ok(());
        };

        let claims = match self.token_service.decode_jwt(token) {
            Ok(data) => data.claims,
            Err(_) => return Ok(()),
        };

        let now = Utc::now().timestamp().max(0) as usize;
        let ttl = claims.exp.saturating_sub(now) as u64;
        if ttl > 0 {
            self.denylist.revoke(&claims.jti, ttl).await?;
        }

        tracing::info!(user_id = %claims.sub, "User logged out");
        Ok(())
    }

    /// Resolves a token into its claims, rejecting revoked sessions
    pub async fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.token_service.decode_jwt(token)?.claims;

        if self.denylist.is_revoked(&claims.jti).await? {
            return Err(AuthError::TokenRevoked);
        }

        Ok(claims)
    }
}
