//! Single-admin authentication.
//!
//! There is no user table: one admin identity comes from configuration and a successful
//! login yields an HS256 JWT valid for 24 hours. Tokens are trusted on signature and expiry
//! alone; nothing is revoked server-side, so logout is purely a client concern.

use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

pub const TOKEN_TTL_HOURS: i64 = 24;
pub const ADMIN_ROLE: &str = "admin";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Access token required")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Failed to generate token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("Failed to check admin password: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

/// Who a valid token speaks for. Inserted into request extensions on protected routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    pub username: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: AdminIdentity,
}

#[derive(Clone)]
enum AdminPassword {
    Plain(String),
    Bcrypt(String),
}

#[derive(Clone)]
pub struct AuthGate {
    secret: String,
    admin_username: String,
    admin_password: AdminPassword,
}

impl AuthGate {
    pub fn new(secret: impl Into<String>, admin_username: impl Into<String>, admin_password: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            admin_username: admin_username.into(),
            admin_password: AdminPassword::Plain(admin_password.into()),
        }
    }

    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.admin_password = AdminPassword::Bcrypt(hash.into());
        self
    }

    pub fn from_config(config: &Config) -> Self {
        let gate = Self::new(&config.jwt_secret, &config.admin_username, &config.admin_password);
        match &config.admin_password_hash {
            Some(hash) => gate.with_password_hash(hash),
            None => gate,
        }
    }

    pub fn login(&self, username: &str, password: &str) -> Result<Credential, AuthError> {
        if username.trim() != self.admin_username {
            return Err(AuthError::InvalidCredentials);
        }
        let valid = match &self.admin_password {
            AdminPassword::Plain(expected) => password == expected,
            AdminPassword::Bcrypt(hash) => verify(password, hash)?,
        };
        if !valid {
            return Err(AuthError::InvalidCredentials);
        }
        self.issue()
    }

    fn issue(&self) -> Result<Credential, AuthError> {
        let now = Utc::now();
        let ttl = Duration::hours(TOKEN_TTL_HOURS);
        let claims = Claims {
            sub: self.admin_username.clone(),
            role: ADMIN_ROLE.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + ttl).timestamp() as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )?;

        Ok(Credential {
            token,
            token_type: "Bearer".to_string(),
            expires_in: ttl.num_seconds(),
            user: AdminIdentity {
                username: claims.sub,
                role: claims.role,
            },
        })
    }

    pub fn verify(&self, token: Option<&str>) -> Result<AdminIdentity, AuthError> {
        let token = token.map(str::trim).filter(|t| !t.is_empty()).ok_or(AuthError::MissingToken)?;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| AuthError::InvalidToken)?;

        if data.claims.role != ADMIN_ROLE {
            return Err(AuthError::InvalidToken);
        }
        Ok(AdminIdentity {
            username: data.claims.sub,
            role: data.claims.role,
        })
    }
}
