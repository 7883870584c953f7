// src/auth.rs
use crate::database::DatabaseConfig;
use crate::marketplace::{MarketplaceService, User, UserRole};
use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

impl SessionConfig {
    pub fn new(secret: impl Into<String>, ttl_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_hours,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub role: UserRole,
    pub exp: usize,
    pub iat: usize,
}

/// Sign an HS256 session token for the user.
pub fn issue_token(user: &User, config: &SessionConfig) -> Result<String> {
    let now = Utc::now();
    let expires_at = Duration::try_hours(config.ttl_hours)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| {
            anyhow::anyhow!("Session lifetime of {} hours is out of range", config.ttl_hours)
        })?;

    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        role: user.role,
        iat: now.timestamp() as usize,
        exp: expires_at.timestamp() as usize,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn verify_token(token: &str, config: &SessionConfig) -> Result<Claims> {
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

/// The user a request acts for, resolved from its bearer token.
pub struct Session {
    pub user: User,
}

impl Session {
    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Session {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let session_config = match req.guard::<&State<SessionConfig>>().await {
            Outcome::Success(config) => config,
            Outcome::Error((status, _)) => return reject(req, status, AuthError::DatabaseError),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let db_config = match req.guard::<&State<DatabaseConfig>>().await {
            Outcome::Success(config) => config,
            Outcome::Error((status, _)) => return reject(req, status, AuthError::DatabaseError),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let token = match req.headers().get_one("Authorization") {
            Some(header) => match header.strip_prefix("Bearer ") {
                Some(token) => token.trim(),
                None => {
                    warn!("Invalid Authorization header format");
                    return reject(req, Status::Unauthorized, AuthError::InvalidToken);
                }
            },
            None => return reject(req, Status::Unauthorized, AuthError::MissingToken),
        };

        let claims = match verify_token(token, session_config) {
            Ok(claims) => claims,
            Err(e) => {
                warn!("Session token rejected: {}", e);
                return reject(req, Status::Unauthorized, AuthError::TokenVerificationFailed);
            }
        };

        let pool = match db_config.pool() {
            Ok(pool) => pool,
            Err(e) => {
                error!("Database connection failed: {}", e);
                return reject(req, Status::InternalServerError, AuthError::DatabaseError);
            }
        };

        match MarketplaceService::new(pool).user(&claims.sub).await {
            Ok(user) => {
                info!("Request authenticated for {}", user.email);
                Outcome::Success(Session { user })
            }
            Err(e) => {
                warn!("Session for {} has no matching account: {}", claims.email, e);
                reject(req, Status::Unauthorized, AuthError::UnknownUser)
            }
        }
    }
}

/// Remember why the guard failed so the error catcher can report it.
fn reject(req: &Request<'_>, status: Status, error: AuthError) -> Outcome<Session, AuthError> {
    req.local_cache(|| AuthFailure(Some(error)));
    Outcome::Error((status, error))
}

struct AuthFailure(Option<AuthError>);

/// Why the session guard rejected this request, if it did.
pub fn auth_failure(req: &Request<'_>) -> Option<AuthError> {
    req.local_cache(|| AuthFailure(None)).0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    TokenVerificationFailed,
    UnknownUser,
    DatabaseError,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Authorization token required",
            AuthError::InvalidToken => "Invalid authorization token format",
            AuthError::TokenVerificationFailed => "Session expired or invalid",
            AuthError::UnknownUser => "Account for this session no longer exists",
            AuthError::DatabaseError => "Database error occurred",
        }
    }
}

// Optional session guard that doesn't fail if no token is provided
pub struct OptionalSession {
    pub session: Option<Session>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for OptionalSession {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match Session::from_request(req).await {
            Outcome::Success(session) => Outcome::Success(OptionalSession {
                session: Some(session),
            }),
            _ => Outcome::Success(OptionalSession { session: None }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "user_1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role: UserRole::Freelancer,
            company: None,
            skills: Vec::new(),
            telegram_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_carries_identity() {
        let config = SessionConfig::new("test-secret", 1);
        let token = issue_token(&user(), &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "user_1");
        assert_eq!(claims.role, UserRole::Freelancer);
    }

    #[test]
    fn test_token_rejected_with_other_secret() {
        let token = issue_token(&user(), &SessionConfig::new("one", 1)).unwrap();
        assert!(verify_token(&token, &SessionConfig::new("two", 1)).is_err());
    }

    #[test]
    fn test_out_of_range_lifetime_is_an_error() {
        let config = SessionConfig::new("test-secret", 9_999_999_999_999);
        assert!(issue_token(&user(), &config).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = SessionConfig::new("test-secret", -2);
        let token = issue_token(&user(), &config).unwrap();
        assert!(verify_token(&token, &config).is_err());
    }
}
