//! Authentication and role checks.
//!
//! Tokens are HS256 JWTs carried as `Authorization: Bearer <token>`. Passwords are stored as
//! Argon2id PHC strings.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::User;
use crate::db_types::Role;

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Please authenticate")]
    MissingToken,

    #[error("Please authenticate ({0})")]
    InvalidToken(String),

    #[error("Forbidden: {role} may not {permission}")]
    Forbidden { role: Role, permission: Permission },

    #[error("Failed to hash password: {0}")]
    Hashing(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),

    #[error("Authentication is not configured")]
    NotConfigured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Permission {
    #[strum(serialize = "manage mines")]
    ManageMines,
    #[strum(serialize = "delete mines")]
    DeleteMines,
    #[strum(serialize = "write emission records")]
    WriteEmissions,
    #[strum(serialize = "write mining operations")]
    WriteOperations,
    #[strum(serialize = "manage users")]
    ManageUsers,
}

impl Role {
    /// Reads are open to every authenticated user, so only writes are listed here.
    pub fn allows(self, permission: Permission) -> bool {
        use Permission::*;
        use Role::*;

        match permission {
            ManageMines => matches!(self, Admin | EnvironmentalOfficer),
            DeleteMines => matches!(self, Admin),
            WriteEmissions => matches!(self, Admin | EnvironmentalOfficer | Analyst),
            WriteOperations => matches!(self, EnvironmentalOfficer | Analyst),
            ManageUsers => matches!(self, Admin),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

fn default_token_ttl_hours() -> i64 {
    24
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub username: String,
    pub role: Role,
    pub exp: i64,
}

pub fn issue_token(user: &User, config: &AuthConfig) -> Result<String, AuthError> {
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        role: user.role,
        exp: (Utc::now() + Duration::hours(config.token_ttl_hours)).timestamp(),
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(config.jwt_secret.as_bytes()))
        .map_err(|e| AuthError::Signing(e.to_string()))
}

pub fn verify_token(token: &str, config: &AuthConfig) -> Result<Claims, AuthError> {
    decode::<Claims>(token, &DecodingKey::from_secret(config.jwt_secret.as_bytes()), &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// An unparsable stored hash is treated as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(e) => {
            log::warn!("Stored password hash is not a valid PHC string: {}", e);
            false
        }
    }
}

/// The caller, as identified by their bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn require(&self, permission: Permission) -> Result<(), AuthError> {
        if self.role.allows(permission) {
            Ok(())
        } else {
            Err(AuthError::Forbidden { role: self.role, permission })
        }
    }
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        AuthenticatedUser {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ").map(str::trim).filter(|token| !token.is_empty())
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = AuthError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let config = match request.rocket().state::<AuthConfig>() {
            Some(config) => config,
            None => return Outcome::Error((Status::InternalServerError, AuthError::NotConfigured)),
        };

        let token = match request.headers().get_one("Authorization").and_then(bearer_token) {
            Some(token) => token,
            None => return Outcome::Error((Status::Unauthorized, AuthError::MissingToken)),
        };

        match verify_token(token, config) {
            Ok(claims) => Outcome::Success(claims.into()),
            Err(e) => Outcome::Error((Status::Unauthorized, e)),
        }
    }
}
