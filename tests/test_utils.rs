#![allow(dead_code)]

use std::{
    io::Cursor,
    sync::{Arc, Mutex},
};

use actix_web::web;
use async_trait::async_trait;
use chrono::Utc;
use image::{DynamicImage, ImageFormat, RgbImage};
use photo_gallery::{
    auth::{denylist::MemoryDenylist, jwt::JwtService},
    entities::{
        category::{Category, CategoryInsert, CategoryLinkReport, LinkStatus},
        photo::{Photo, PhotoInsert},
        user::{User, UserInsert},
    },
    errors::{AppError, AuthError, CATEGORY_TAKEN, EMAIL_TAKEN, USERNAME_TAKEN},
    repositories::{
        category::CategoryRepository, photo::PhotoRepository, token::TokenDenylist, user::UserRepository,
    },
    settings::{AppConfig, AppEnvironment},
    shared_repos::SharedRepositories,
    storage::local::LocalImageStore,
    AppState,
};
use tempfile::TempDir;

pub const BOUNDARY: &str = "----gallery-test-boundary";

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<User>,
    photos: Vec<Photo>,
    categories: Vec<Category>,
    // (photo_id, category_id, user_id)
    links: Vec<(i64, i64, i64)>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory stand-in for the Postgres schema: same uniqueness rules, same cascade.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn link_count(&self, photo_id: i64) -> usize {
        let tables = self.tables.lock().unwrap();
        tables.links.iter().filter(|(p, _, _)| *p == photo_id).count()
    }

    pub fn photo_count(&self) -> usize {
        self.tables.lock().unwrap().photos.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn check_connection(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        Ok(self.tables.lock().unwrap().users.iter().any(|u| u.username == username))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.tables.lock().unwrap().users.iter().any(|u| u.email == email))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.tables.lock().unwrap().users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.tables.lock().unwrap().users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, user: &UserInsert) -> Result<i64, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(AppError::field("username", USERNAME_TAKEN));
        }
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::field("email", EMAIL_TAKEN));
        }

        let id = tables.next_id();
        tables.users.push(User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: user.created_at,
        });
        Ok(id)
    }
}

fn photo_not_found() -> AppError {
    AppError::NotFound("Photo not found".to_string())
}

#[async_trait]
impl PhotoRepository for MemoryStore {
    async fn create_photo(&self, photo: &PhotoInsert) -> Result<Photo, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.users.iter().any(|u| u.id == photo.user_id) {
            return Err(AppError::Conflict("Foreign key violation".into()));
        }

        let row = Photo {
            id: tables.next_id(),
            title: photo.title.clone(),
            image_file: photo.image_file.clone(),
            date_posted: photo.date_posted,
            user_id: photo.user_id,
            is_favorite: false,
        };
        tables.photos.push(row.clone());
        Ok(row)
    }

    async fn get_photo(&self, id: i64, owner_id: i64) -> Result<Photo, AppError> {
        self.tables.lock().unwrap().photos
            .iter()
            .find(|p| p.id == id && p.user_id == owner_id)
            .cloned()
            .ok_or_else(photo_not_found)
    }

    async fn list_photos(&self, owner_id: i64) -> Result<Vec<Photo>, AppError> {
        Ok(self.tables.lock().unwrap().photos
            .iter()
            .filter(|p| p.user_id == owner_id)
            .cloned()
            .collect())
    }

    async fn list_favorites(&self, owner_id: i64) -> Result<Vec<Photo>, AppError> {
        Ok(self.tables.lock().unwrap().photos
            .iter()
            .filter(|p| p.user_id == owner_id && p.is_favorite)
            .cloned()
            .collect())
    }

    async fn set_favorite(&self, id: i64, owner_id: i64, value: bool) -> Result<Photo, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let photo = tables.photos
            .iter_mut()
            .find(|p| p.id == id && p.user_id == owner_id)
            .ok_or_else(photo_not_found)?;
        photo.is_favorite = value;
        Ok(photo.clone())
    }

    async fn delete_photo(&self, id: i64, owner_id: i64) -> Result<Photo, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let index = tables.photos
            .iter()
            .position(|p| p.id == id && p.user_id == owner_id)
            .ok_or_else(photo_not_found)?;

        let photo = tables.photos.remove(index);
        tables.links.retain(|(p, _, _)| *p != photo.id);
        Ok(photo)
    }

    async fn photos_by_category(&self, category_id: i64, owner_id: i64) -> Result<Vec<Photo>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.photos
            .iter()
            .filter(|p| p.user_id == owner_id)
            .filter(|p| tables.links.iter().any(|(pid, cid, _)| *pid == p.id && *cid == category_id))
            .cloned()
            .collect())
    }

    async fn owns_image(&self, owner_id: i64, image_file: &str) -> Result<bool, AppError> {
        Ok(self.tables.lock().unwrap().photos
            .iter()
            .any(|p| p.user_id == owner_id && p.image_file == image_file))
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn create_category(&self, category: &CategoryInsert) -> Result<Category, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.categories.iter().any(|c| c.name == category.name) {
            return Err(AppError::field("name", CATEGORY_TAKEN));
        }

        let row = Category {
            id: tables.next_id(),
            name: category.name.clone(),
            user_id: category.user_id,
        };
        tables.categories.push(row.clone());
        Ok(row)
    }

    async fn category_name_exists(&self, name: &str) -> Result<bool, AppError> {
        Ok(self.tables.lock().unwrap().categories.iter().any(|c| c.name == name))
    }

    async fn list_categories(&self, owner_id: i64) -> Result<Vec<Category>, AppError> {
        Ok(self.tables.lock().unwrap().categories
            .iter()
            .filter(|c| c.user_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_category(&self, id: i64, owner_id: i64) -> Result<Option<Category>, AppError> {
        Ok(self.tables.lock().unwrap().categories
            .iter()
            .find(|c| c.id == id && c.user_id == owner_id)
            .cloned())
    }

    async fn link_categories(
        &self,
        photo_id: i64,
        owner_id: i64,
        category_ids: &[i64],
    ) -> Result<CategoryLinkReport, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let mut report = CategoryLinkReport::new(photo_id);

        for &category_id in category_ids {
            let owned = tables.categories.iter().any(|c| c.id == category_id && c.user_id == owner_id);
            let status = if !owned {
                LinkStatus::NotFound
            } else if tables.links.iter().any(|(p, c, _)| *p == photo_id && *c == category_id) {
                LinkStatus::AlreadyLinked
            } else {
                tables.links.push((photo_id, category_id, owner_id));
                LinkStatus::Linked
            };
            report.push(category_id, status);
        }

        Ok(report)
    }

    async fn linked_category_ids(&self, photo_id: i64) -> Result<Vec<i64>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut ids: Vec<i64> = tables.links
            .iter()
            .filter(|(p, _, _)| *p == photo_id)
            .map(|(_, c, _)| *c)
            .collect();
        ids.sort();
        Ok(ids)
    }
}

pub fn test_config(upload_dir: &str) -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "Photo-Gallery-Test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        worker_count: 1,
        database_url: "postgres://unused".to_string(),
        redis_url: None,
        cors_allowed_origins: vec!["*".to_string()],
        jwt_secret: "test_secret_key_that_is_long_enough_for_hs512".to_string(),
        jwt_expiration_minutes: 60,
        remember_me_days: 30,
        upload_dir: upload_dir.to_string(),
        max_upload_bytes: 10 * 1024 * 1024,
        thumbnail_size: 250,
    }
}

/// Application state wired to the in-memory store and a temporary upload directory.
pub struct TestContext {
    pub store: MemoryStore,
    pub state: web::Data<AppState>,
    pub config: AppConfig,
    pub upload_dir: TempDir,
}

/// Session store whose backend is unreachable.
pub struct UnavailableDenylist;

#[async_trait]
impl TokenDenylist for UnavailableDenylist {
    async fn revoke(&self, _jti: &str, _ttl_secs: u64) -> Result<(), AuthError> {
        Err(AuthError::SessionStore("connection refused".into()))
    }

    async fn is_revoked(&self, _jti: &str) -> Result<bool, AuthError> {
        Err(AuthError::SessionStore("connection refused".into()))
    }

    async fn purge_expired(&self) -> Result<u64, AuthError> {
        Ok(0)
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_denylist(Arc::new(MemoryDenylist::new()))
    }

    pub fn with_denylist(denylist: Arc<dyn TokenDenylist>) -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let config = test_config(&upload_dir.path().to_string_lossy());
        let store = MemoryStore::default();

        let repos = SharedRepositories {
            user_repo: Arc::new(store.clone()),
            photo_repo: Arc::new(store.clone()),
            category_repo: Arc::new(store.clone()),
            image_store: Arc::new(LocalImageStore::new(upload_dir.path(), config.thumbnail_size)),
            denylist,
        };

        let state = web::Data::new(AppState::from_parts(&config, repos));

        TestContext { store, state, config, upload_dir }
    }

    /// Creates a user directly in the store and returns its id and a session token.
    pub async fn login_as(&self, username: &str) -> (i64, String) {
        let id = self.store
            .create_user(&UserInsert {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash: "not-a-real-hash".to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let user = self.store.get_user_by_id(id).await.unwrap().unwrap();
        let issued = JwtService::new(&self.config).create_jwt(&user, false).unwrap();
        (id, issued.token)
    }

    pub async fn seed_photo(&self, owner_id: i64, title: &str) -> Photo {
        self.store
            .create_photo(&PhotoInsert {
                title: title.to_string(),
                image_file: format!("{:016x}.png", owner_id * 1000 + self.store.photo_count() as i64),
                user_id: owner_id,
                date_posted: Utc::now(),
            })
            .await
            .unwrap()
    }

    pub async fn seed_category(&self, owner_id: i64, name: &str) -> Category {
        self.store
            .create_category(&CategoryInsert { name: name.to_string(), user_id: owner_id })
            .await
            .unwrap()
    }
}

/// Builds the application the way `main` does, minus CORS and request logging.
macro_rules! gallery_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($ctx.state.clone())
                .app_data(photo_gallery::routes::multipart_config($ctx.config.max_upload_bytes))
                .wrap(photo_gallery::middlewares::auth::AuthMiddleware)
                .wrap(actix_web::middleware::NormalizePath::trim())
                .configure(photo_gallery::routes::configure_routes),
        )
        .await
    };
}

pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (actix_web::http::header::AUTHORIZATION, format!("Bearer {}", token))
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([30, 120, 200])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
    buf
}

/// `multipart/form-data` body for `POST /upload`. Returns the content type and the body.
pub fn upload_body(title: &str, filename: &str, image: &[u8], categories: &[i64]) -> (String, Vec<u8>) {
    let mut body = Vec::new();

    let mut text_part = |name: &str, value: &str| {
        body.extend_from_slice(format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ).as_bytes());
    };
    text_part("title", title);
    for id in categories {
        text_part("categories", &id.to_string());
    }

    body.extend_from_slice(format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
    ).as_bytes());
    body.extend_from_slice(image);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}
