use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Cookie carrying the session token for browser clients.
pub const SESSION_COOKIE: &str = "session";

/// Extensions accepted for uploaded photos.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Random bytes in a stored image name (rendered as twice as many hex chars).
pub const IMAGE_NAME_BYTES: usize = 8;

pub const IMAGE_URL_PREFIX: &str = "/images";
