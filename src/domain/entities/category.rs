use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::photo::PhotoResponse;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
}

#[derive(Debug, Clone)]
pub struct CategoryInsert {
    pub name: String,
    pub user_id: i64,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct NewCategory {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
}

impl NewCategory {
    pub fn trimmed(self) -> Self {
        NewCategory { name: self.name.trim().to_string() }
    }

    pub fn prepare_for_insert(&self, user_id: i64) -> CategoryInsert {
        CategoryInsert {
            name: self.name.trim().to_string(),
            user_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryCreatedResponse {
    pub message: String,
    pub category: Category,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AddToCategoryRequest {
    #[serde(default)]
    pub category_ids: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Linked,
    AlreadyLinked,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkOutcome {
    pub category_id: i64,
    pub status: LinkStatus,
}

/// Per-category result of attaching a photo to several categories.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryLinkReport {
    pub photo_id: i64,
    pub results: Vec<LinkOutcome>,
}

impl CategoryLinkReport {
    pub fn new(photo_id: i64) -> Self {
        CategoryLinkReport { photo_id, results: Vec::new() }
    }

    pub fn push(&mut self, category_id: i64, status: LinkStatus) {
        self.results.push(LinkOutcome { category_id, status });
    }

    pub fn count(&self, status: LinkStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryPhotosResponse {
    pub category: Category,
    pub photos: Vec<PhotoResponse>,
}

#[derive(Debug, Serialize)]
pub struct PhotoCategoriesForm {
    pub photo: PhotoResponse,
    pub categories: Vec<Category>,
    /// Categories the photo is already in
    pub linked_category_ids: Vec<i64>,
}
