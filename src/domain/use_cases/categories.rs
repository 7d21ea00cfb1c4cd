use std::sync::Arc;

use validator::Validate;

use crate::{
    entities::category::{Category, CategoryCreatedResponse, NewCategory},
    errors::{AppError, CATEGORY_TAKEN},
    repositories::category::CategoryRepository,
};

pub struct CategoryHandler {
    pub category_repo: Arc<dyn CategoryRepository>,
}

impl CategoryHandler {
    pub fn new(category_repo: Arc<dyn CategoryRepository>) -> Self {
        CategoryHandler { category_repo }
    }

    /// Creates a category owned by `user_id`. Names are unique across all users,
    /// so a name taken by anyone is rejected as a validation error.
    pub async fn create_category(
        &self,
        user_id: i64,
        request: NewCategory,
    ) -> Result<CategoryCreatedResponse, AppError> {
        let request = request.trimmed();
        request.validate()?;

        let insert = request.prepare_for_insert(user_id);

        if self.category_repo.category_name_exists(&insert.name).await? {
            return Err(AppError::field("name", CATEGORY_TAKEN));
        }

        let category = self.category_repo.create_category(&insert).await?;
        tracing::info!(user_id, category_id = category.id, "Category created");

        Ok(CategoryCreatedResponse {
            message: format!("Category '{}' has been created!", category.name),
            category,
        })
    }

    pub async fn list_categories(&self, user_id: i64) -> Result<Vec<Category>, AppError> {
        self.category_repo.list_categories(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::{mock, predicate::eq};

    use crate::entities::category::{CategoryInsert, CategoryLinkReport};

    mock! {
        pub CategoryRepo {}

        #[async_trait]
        impl CategoryRepository for CategoryRepo {
            async fn create_category(&self, category: &CategoryInsert) -> Result<Category, AppError>;
            async fn category_name_exists(&self, name: &str) -> Result<bool, AppError>;
            async fn list_categories(&self, owner_id: i64) -> Result<Vec<Category>, AppError>;
            async fn find_category(&self, id: i64, owner_id: i64) -> Result<Option<Category>, AppError>;
            async fn link_categories(
                &self,
                photo_id: i64,
                owner_id: i64,
                category_ids: &[i64],
            ) -> Result<CategoryLinkReport, AppError>;
            async fn linked_category_ids(&self, photo_id: i64) -> Result<Vec<i64>, AppError>;
        }
    }

    #[tokio::test]
    async fn whitespace_name_is_rejected() {
        let mut repo = MockCategoryRepo::new();
        repo.expect_category_name_exists().never();
        repo.expect_create_category().never();

        let result = CategoryHandler::new(Arc::new(repo))
            .create_category(1, NewCategory { name: "   ".into() })
            .await;

        assert!(matches!(result, Err(AppError::ValidationError(ref f)) if f[0].field == "name"));
    }

    #[tokio::test]
    async fn name_is_trimmed_before_the_uniqueness_check() {
        let mut repo = MockCategoryRepo::new();
        repo.expect_category_name_exists()
            .with(eq("Travel"))
            .times(1)
            .returning(|_| Ok(false));
        repo.expect_create_category()
            .withf(|insert| insert.name == "Travel" && insert.user_id == 1)
            .returning(|insert| Ok(Category { id: 3, name: insert.name.clone(), user_id: insert.user_id }));

        let created = CategoryHandler::new(Arc::new(repo))
            .create_category(1, NewCategory { name: " Travel  ".into() })
            .await
            .unwrap();

        assert_eq!(created.message, "Category 'Travel' has been created!");
    }

    #[tokio::test]
    async fn taken_name_is_a_field_error() {
        let mut repo = MockCategoryRepo::new();
        repo.expect_category_name_exists().returning(|_| Ok(true));
        repo.expect_create_category().never();

        let result = CategoryHandler::new(Arc::new(repo))
            .create_category(2, NewCategory { name: "Travel".into() })
            .await;

        assert!(matches!(result, Err(AppError::ValidationError(ref f)) if f[0].message == CATEGORY_TAKEN));
    }
}
