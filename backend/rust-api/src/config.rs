use std::env;

use anyhow::Context;

use crate::image_host::ImageHostProvider;

/// 50 MiB, the per-file ceiling the admin page has always used.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub database_name: Option<String>,
    pub port: u16,
    pub jwt_secret: String,
    pub admin_username: String,
    pub admin_password: String,
    /// bcrypt hash; when present it is checked instead of `admin_password`.
    pub admin_password_hash: Option<String>,
    pub image_host_provider: ImageHostProvider,
    pub image_host_api_key: String,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .context("Missing DATABASE_URL env var. Set it to your Postgres connection string.")?;

        let image_host_provider: ImageHostProvider = env::var("IMAGE_HOST_PROVIDER")
            .unwrap_or_else(|_| "imghippo".to_string())
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;

        Ok(Self {
            database_url,
            database_name: env::var("DATABASE_NAME").ok().filter(|v| !v.is_empty()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .unwrap_or(4000),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "nuvacm-dev-secret-change-in-production".to_string()),
            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string()),
            admin_password_hash: env::var("ADMIN_PASSWORD_HASH").ok().filter(|v| !v.is_empty()),
            image_host_provider,
            image_host_api_key: env::var("IMAGE_HOST_API_KEY").unwrap_or_default(),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        })
    }
}
