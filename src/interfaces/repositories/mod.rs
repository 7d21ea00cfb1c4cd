pub mod category;
pub mod image_store;
pub mod photo;
pub mod sqlx_repo;
pub mod token;
pub mod user;
