use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use deadpool_redis::{redis::AsyncCommands, Pool as RedisPool};

use crate::{errors::AuthError, repositories::token::TokenDenylist};

const SESSION_DENY_PREFIX: &str = "session_deny";

/// Process-local denylist used when no Redis is configured.
#[derive(Debug, Default)]
pub struct MemoryDenylist {
    // jti -> unix timestamp after which the entry is useless
    entries: DashMap<String, i64>,
}

impl MemoryDenylist {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenDenylist for MemoryDenylist {
    async fn revoke(&self, jti: &str, ttl_secs: u64) -> Result<(), AuthError> {
        let expires_at = Utc::now().timestamp() + ttl_secs as i64;
        self.entries.insert(jti.to_string(), expires_at);
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, AuthError> {
        let now = Utc::now().timestamp();
        Ok(self.entries.get(jti).is_some_and(|expires_at| *expires_at > now))
    }

    async fn purge_expired(&self) -> Result<u64, AuthError> {
        let now = Utc::now().timestamp();
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| *expires_at > now);
        Ok(before.saturating_sub(self.entries.len()) as u64)
    }
}

/// Redis-backed denylist shared by every server instance; keys expire on their own.
#[derive(Clone)]
pub struct RedisDenylist {
    pool: RedisPool,
}

impl RedisDenylist {
    pub fn new(pool: RedisPool) -> Self {
        RedisDenylist { pool }
    }

    fn key(jti: &str) -> String {
        format!("{}:{}", SESSION_DENY_PREFIX, jti)
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection, AuthError> {
        self.pool
            .get()
            .await
            .map_err(|e| AuthError::SessionStore(e.to_string()))
    }
}

#[async_trait]
impl TokenDenylist for RedisDenylist {
    async fn revoke(&self, jti: &str, ttl_secs: u64) -> Result<(), AuthError> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(Self::key(jti), 1, ttl_secs.max(1))
            .await
            .map_err(|e| AuthError::SessionStore(e.to_string()))
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, AuthError> {
        let mut conn = self.connection().await?;
        conn.exists::<_, bool>(Self::key(jti))
            .await
            .map_err(|e| AuthError::SessionStore(e.to_string()))
    }

    async fn purge_expired(&self) -> Result<u64, AuthError> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn revoked_ids_are_reported_until_purged() {
        let denylist = MemoryDenylist::new();
        denylist.revoke("abc", 60).await.unwrap();

        assert!(denylist.is_revoked("abc").await.unwrap());
        assert!(!denylist.is_revoked("other").await.unwrap());
        assert_eq!(denylist.purge_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn expired_entries_are_ignored_and_purged() {
        let denylist = MemoryDenylist::new();
        denylist.entries.insert("old".into(), Utc::now().timestamp() - 5);

        assert!(!denylist.is_revoked("old").await.unwrap());
        assert_eq!(denylist.purge_expired().await.unwrap(), 1);
    }
}
