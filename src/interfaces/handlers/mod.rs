pub mod auth;
pub mod categories;
pub mod home;
pub mod photos;
pub mod system;
