use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use validator::Validate;


#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UserInsert {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 2, max = 20, message = "Username must be between 2 and 20 characters"))]
    pub username: String,

    #[validate(
        email(message = "Invalid email format"),
        length(max = 120, message = "Email must be at most 120 characters")
    )]
    pub email: String,

    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords must match"))]
    pub confirm_password: String,
}

impl NewUser {
    /// Strips surrounding whitespace so length checks see what gets stored.
    pub fn trimmed(self) -> Self {
        NewUser {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            ..self
        }
    }

    pub fn prepare_for_insert(&self, password_hash: String) -> UserInsert {
        UserInsert {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            password_hash,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginUser {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,

    /// Keep the session cookie across browser restarts.
    #[serde(default)]
    pub remember: bool,
}

#[derive(Debug, Serialize)]
pub struct NewUserResponse {
    pub id: i64,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}
