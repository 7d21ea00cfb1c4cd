use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    entities::photo::{Photo, PhotoInsert},
    errors::AppError,
    repositories::sqlx_repo::SqlxPhotoRepo,
};

const PHOTO_COLUMNS: &str = "id, title, image_file, date_posted, user_id, is_favorite";

/// Photo storage. Every read and write is scoped to the owning user; a photo
/// owned by someone else behaves exactly like a missing one.
#[async_trait]
pub trait PhotoRepository: Send + Sync {
    async fn create_photo(&self, photo: &PhotoInsert) -> Result<Photo, AppError>;
    async fn get_photo(&self, id: i64, owner_id: i64) -> Result<Photo, AppError>;
    /// Owner's photos in insertion order.
    async fn list_photos(&self, owner_id: i64) -> Result<Vec<Photo>, AppError>;
    async fn list_favorites(&self, owner_id: i64) -> Result<Vec<Photo>, AppError>;
    async fn set_favorite(&self, id: i64, owner_id: i64, value: bool) -> Result<Photo, AppError>;
    /// Removes the photo and returns the deleted row. Category links go with it.
    async fn delete_photo(&self, id: i64, owner_id: i64) -> Result<Photo, AppError>;
    async fn photos_by_category(&self, category_id: i64, owner_id: i64) -> Result<Vec<Photo>, AppError>;
    async fn owns_image(&self, owner_id: i64, image_file: &str) -> Result<bool, AppError>;
}

impl SqlxPhotoRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxPhotoRepo { pool }
    }
}

fn photo_not_found(e: AppError) -> AppError {
    match e {
        AppError::NotFound(_) => AppError::NotFound("Photo not found".to_string()),
        _ => e,
    }
}

#[async_trait]
impl PhotoRepository for SqlxPhotoRepo {
    async fn create_photo(&self, photo: &PhotoInsert) -> Result<Photo, AppError> {
        let created = sqlx::query_as::<_, Photo>(&format!(
            r#"
            INSERT INTO photos (title, image_file, user_id, date_posted, is_favorite)
            VALUES ($1, $2, $3, $4, FALSE)
            RETURNING {PHOTO_COLUMNS}
            "#
        ))
        .bind(&photo.title)
        .bind(&photo.image_file)
        .bind(photo.user_id)
        .bind(photo.date_posted)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_photo(&self, id: i64, owner_id: i64) -> Result<Photo, AppError> {
        sqlx::query_as::<_, Photo>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| photo_not_found(e.into()))
    }

    async fn list_photos(&self, owner_id: i64) -> Result<Vec<Photo>, AppError> {
        let photos = sqlx::query_as::<_, Photo>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE user_id = $1 ORDER BY id ASC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }

    async fn list_favorites(&self, owner_id: i64) -> Result<Vec<Photo>, AppError> {
        let photos = sqlx::query_as::<_, Photo>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE user_id = $1 AND is_favorite = TRUE ORDER BY id ASC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }

    async fn set_favorite(&self, id: i64, owner_id: i64, value: bool) -> Result<Photo, AppError> {
        sqlx::query_as::<_, Photo>(&format!(
            r#"
            UPDATE photos SET is_favorite = $3
            WHERE id = $1 AND user_id = $2
            RETURNING {PHOTO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner_id)
        .bind(value)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| photo_not_found(e.into()))
    }

    async fn delete_photo(&self, id: i64, owner_id: i64) -> Result<Photo, AppError> {
        // photo_categories rows are removed by ON DELETE CASCADE
        sqlx::query_as::<_, Photo>(&format!(
            "DELETE FROM photos WHERE id = $1 AND user_id = $2 RETURNING {PHOTO_COLUMNS}"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| photo_not_found(e.into()))
    }

    async fn photos_by_category(&self, category_id: i64, owner_id: i64) -> Result<Vec<Photo>, AppError> {
        let photos = sqlx::query_as::<_, Photo>(
            r#"
            SELECT p.id, p.title, p.image_file, p.date_posted, p.user_id, p.is_favorite
            FROM photos p
            JOIN photo_categories pc ON pc.photo_id = p.id
            WHERE pc.category_id = $1 AND p.user_id = $2
            ORDER BY p.id ASC
            "#
        )
        .bind(category_id)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }

    async fn owns_image(&self, owner_id: i64, image_file: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM photos WHERE user_id = $1 AND image_file = $2)"
        )
        .bind(owner_id)
        .bind(image_file)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
