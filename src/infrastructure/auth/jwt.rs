use jsonwebtoken::{encode, Header, decode, Validation, TokenData, Algorithm};
use chrono::{Utc, Duration};
use uuid::Uuid;
use crate::entities::token::{Claims, IssuedToken};
use crate::entities::user::User;
use crate::repositories::token::TokenServiceRepository;
use crate::settings::{AppConfig, JwtKeys};
use crate::errors::AuthError;

const JWT_ALGORITHM: Algorithm = Algorithm::HS512;


#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    session_lifetime: Duration,
    remember_lifetime: Duration,
}

impl JwtService {
    pub fn new(config: &AppConfig) -> Self {
        JwtService {
            keys: JwtKeys::from(config),
            session_lifetime: Duration::minutes(config.jwt_expiration_minutes),
            remember_lifetime: Duration::days(config.remember_me_days),
        }
    }

    pub fn create_jwt(&self, user: &User, remember: bool) -> Result<IssuedToken, AuthError> {
        let lifetime = if remember { self.remember_lifetime } else { self.session_lifetime };
        let now = Utc::now();

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            jti: Uuid::new_v4().to_string(),
            exp: (now + lifetime).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(&Header::new(JWT_ALGORITHM), &claims, &self.keys.encoding)
            .map_err(|e| {
                tracing::warn!("Failed to create JWT: {}", e);
                AuthError::TokenCreation
            })?;

        Ok(IssuedToken {
            token,
            claims,
            lifetime_secs: lifetime.num_seconds(),
        })
    }

    pub fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;

        decode::<Claims>(
            token,
            &self.keys.decoding,
            &validation
        )
        .map_err(AuthError::from)
    }
}


impl TokenServiceRepository for JwtService {
    fn create_jwt(&self, user: &User, remember: bool) -> Result<IssuedToken, AuthError> {
        self.create_jwt(user, remember)
    }

    fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        self.decode_jwt(token)
    }
}
