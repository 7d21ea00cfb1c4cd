use std::sync::Arc;

use sqlx::PgPool;

use crate::repositories::{
    category::CategoryRepository,
    image_store::ImageStore,
    photo::PhotoRepository,
    sqlx_repo::{SqlxCategoryRepo, SqlxPhotoRepo, SqlxUserRepo},
    token::TokenDenylist,
    user::UserRepository,
};

/// The storage backends the use cases run against.
#[derive(Clone)]
pub struct SharedRepositories {
    pub user_repo: Arc<dyn UserRepository>,
    pub photo_repo: Arc<dyn PhotoRepository>,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub image_store: Arc<dyn ImageStore>,
    pub denylist: Arc<dyn TokenDenylist>,
}

impl SharedRepositories {
    pub fn new(
        pool: PgPool,
        image_store: Arc<dyn ImageStore>,
        denylist: Arc<dyn TokenDenylist>,
    ) -> Self {
        SharedRepositories {
            user_repo: Arc::new(SqlxUserRepo::new(pool.clone())),
            photo_repo: Arc::new(SqlxPhotoRepo::new(pool.clone())),
            category_repo: Arc::new(SqlxCategoryRepo::new(pool)),
            image_store,
            denylist,
        }
    }
}
