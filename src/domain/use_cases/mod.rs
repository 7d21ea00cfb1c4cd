pub mod auth;
pub mod categories;
pub mod extractors;
pub mod photos;
