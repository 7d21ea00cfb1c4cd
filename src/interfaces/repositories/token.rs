use async_trait::async_trait;
use jsonwebtoken::TokenData;

use crate::{entities::{token::{Claims, IssuedToken}, user::User}, errors::AuthError};


pub trait TokenServiceRepository: Send + Sync {
    /// Signs a session token for the user; `remember` selects the long lifetime
    fn create_jwt(&self, user: &User, remember: bool) -> Result<IssuedToken, AuthError>;

    /// Decodes a JWT and returns the claims
    fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError>;
}

/// Revoked session ids, kept until the token would have expired anyway.
#[async_trait]
pub trait TokenDenylist: Send + Sync {
    async fn revoke(&self, jti: &str, ttl_secs: u64) -> Result<(), AuthError>;

    async fn is_revoked(&self, jti: &str) -> Result<bool, AuthError>;

    /// Drops entries whose token has expired. Returns how many were removed.
    async fn purge_expired(&self) -> Result<u64, AuthError>;
}
