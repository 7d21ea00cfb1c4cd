use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    entities::category::{Category, CategoryInsert, CategoryLinkReport, LinkStatus},
    errors::AppError,
    repositories::sqlx_repo::SqlxCategoryRepo,
};

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Category names are unique across all users.
    async fn create_category(&self, category: &CategoryInsert) -> Result<Category, AppError>;
    async fn category_name_exists(&self, name: &str) -> Result<bool, AppError>;
    async fn list_categories(&self, owner_id: i64) -> Result<Vec<Category>, AppError>;
    async fn find_category(&self, id: i64, owner_id: i64) -> Result<Option<Category>, AppError>;
    /// Links the photo to each category owned by `owner_id`, skipping pairs
    /// that already exist. Runs as one transaction.
    async fn link_categories(
        &self,
        photo_id: i64,
        owner_id: i64,
        category_ids: &[i64],
    ) -> Result<CategoryLinkReport, AppError>;
    async fn linked_category_ids(&self, photo_id: i64) -> Result<Vec<i64>, AppError>;
}

impl SqlxCategoryRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxCategoryRepo { pool }
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepo {
    async fn create_category(&self, category: &CategoryInsert) -> Result<Category, AppError> {
        let created = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, user_id) VALUES ($1, $2) RETURNING id, name, user_id"
        )
        .bind(&category.name)
        .bind(category.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn category_name_exists(&self, name: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1)"
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list_categories(&self, owner_id: i64) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, user_id FROM categories WHERE user_id = $1 ORDER BY id ASC"
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn find_category(&self, id: i64, owner_id: i64) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, user_id FROM categories WHERE id = $1 AND user_id = $2"
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn link_categories(
        &self,
        photo_id: i64,
        owner_id: i64,
        category_ids: &[i64],
    ) -> Result<CategoryLinkReport, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut report = CategoryLinkReport::new(photo_id);

        for &category_id in category_ids {
            let owned: Option<i64> = sqlx::query_scalar(
                "SELECT id FROM categories WHERE id = $1 AND user_id = $2"
            )
            .bind(category_id)
            .bind(owner_id)
            .fetch_optional(&mut *tx)
            .await?;

            if owned.is_none() {
                report.push(category_id, LinkStatus::NotFound);
                continue;
            }

            let inserted = sqlx::query(
                r#"
                INSERT INTO photo_categories (photo_id, category_id, user_id)
                VALUES ($1, $2, $3)
                ON CONFLICT (photo_id, category_id) DO NOTHING
                "#
            )
            .bind(photo_id)
            .bind(category_id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            let status = if inserted == 0 { LinkStatus::AlreadyLinked } else { LinkStatus::Linked };
            report.push(category_id, status);
        }

        tx.commit().await?;
        Ok(report)
    }

    async fn linked_category_ids(&self, photo_id: i64) -> Result<Vec<i64>, AppError> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT category_id FROM photo_categories WHERE photo_id = $1 ORDER BY category_id"
        )
        .bind(photo_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
