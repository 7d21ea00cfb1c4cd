use std::sync::Arc;

use deadpool_redis::Pool as RedisPool;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;
pub mod shared_repos;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{auth, db, storage};

use auth::{denylist::{MemoryDenylist, RedisDenylist}, jwt::JwtService};
use repositories::token::TokenDenylist;
use shared_repos::SharedRepositories;
use storage::local::LocalImageStore;
use use_cases::{auth::AuthHandler, categories::CategoryHandler, photos::PhotoHandler};

pub struct AppState {
    pub auth_handler: AuthHandler,
    pub photo_handler: PhotoHandler,
    pub category_handler: CategoryHandler,
    /// Mark the session cookie `Secure`
    pub secure_cookies: bool,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(config: &settings::AppConfig, pool: sqlx::PgPool, redis_pool: Option<RedisPool>) -> Self {
        let denylist: Arc<dyn TokenDenylist> = match redis_pool {
            Some(pool) => Arc::new(RedisDenylist::new(pool)),
            None => {
                tracing::warn!("Redis not configured, session revocations are kept in memory");
                Arc::new(MemoryDenylist::new())
            }
        };

        let image_store = Arc::new(LocalImageStore::new(&config.upload_dir, config.thumbnail_size));

        Self::from_parts(config, SharedRepositories::new(pool, image_store, denylist))
    }

    pub fn from_parts(config: &settings::AppConfig, repos: SharedRepositories) -> Self {
        let token_service = Arc::new(JwtService::new(config));

        AppState {
            auth_handler: AuthHandler::new(repos.user_repo, token_service, repos.denylist),
            photo_handler: PhotoHandler::new(repos.photo_repo, repos.category_repo.clone(), repos.image_store),
            category_handler: CategoryHandler::new(repos.category_repo),
            secure_cookies: config.is_production(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}
