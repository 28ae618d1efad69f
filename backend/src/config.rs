use anyhow::{anyhow, bail, Context};
use std::env;
use std::path::PathBuf;

use crate::domain::auth_service::{Credential, DEFAULT_SESSION_TTL_MINUTES};
use crate::domain::date_format::DEFAULT_DISPLAY_OFFSET_MINUTES;
use crate::domain::image_service::{DEFAULT_MAX_INLINE_IMAGE_BYTES, DEFAULT_PLACEHOLDER_IMAGE};
use crate::domain::models::OwnershipScheme;
use crate::storage::yaml::connection::default_data_directory;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreConfig {
    Yaml { data_dir: PathBuf },
    Memory,
    /// No store: reads come back empty, writes fail
    Disabled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
    pub ownership: OwnershipScheme,
    pub admins: Vec<Credential>,
    pub session_ttl_minutes: i64,
    pub display_offset_minutes: i32,
    pub placeholder_image: Option<String>,
    pub max_inline_image_bytes: usize,
    pub cors_origin: String,
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value.trim().parse::<T>().context(key.to_string()),
        None => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<AppConfig> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<AppConfig> {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let port = parse_or(&lookup, "PORT", 3001u16)?;

        let store = match lookup("STORE_KIND").as_deref().map(str::trim) {
            None | Some("yaml") | Some("YAML") => {
                let data_dir = match lookup("DATA_DIR") {
                    Some(dir) => PathBuf::from(dir),
                    None => default_data_directory().context("DATA_DIR")?,
                };
                StoreConfig::Yaml { data_dir }
            }
            Some("memory") | Some("MEMORY") => StoreConfig::Memory,
            Some("disabled") | Some("DISABLED") => StoreConfig::Disabled,
            Some(other) => Err(anyhow!("Invalid store kind: {}", other))?,
        };

        let ownership = match lookup("OWNERSHIP_SCHEME") {
            Some(value) => value.parse::<OwnershipScheme>().context("OWNERSHIP_SCHEME")?,
            None => OwnershipScheme::Flat,
        };

        let admins = match lookup("ADMIN_EMAIL") {
            Some(email) => {
                let password_sha256 = lookup("ADMIN_PASSWORD_SHA256").context("ADMIN_PASSWORD_SHA256")?;
                let is_digest = password_sha256.trim().len() == 64
                    && password_sha256.trim().chars().all(|c| c.is_ascii_hexdigit());
                if !is_digest {
                    bail!("ADMIN_PASSWORD_SHA256 must be a hex SHA-256 digest");
                }
                let uid = lookup("ADMIN_UID").unwrap_or_else(|| "admin".to_owned());
                vec![Credential::new(email, password_sha256, uid)]
            }
            None => Vec::new(),
        };

        let session_ttl_minutes = parse_or(&lookup, "SESSION_TTL_MINUTES", DEFAULT_SESSION_TTL_MINUTES)?;
        let display_offset_minutes =
            parse_or(&lookup, "DISPLAY_UTC_OFFSET_MINUTES", DEFAULT_DISPLAY_OFFSET_MINUTES)?;

        let placeholder_image = match lookup("PLACEHOLDER_IMAGE_URL") {
            Some(url) if url.trim().is_empty() => None,
            Some(url) => Some(url.trim().to_owned()),
            None => Some(DEFAULT_PLACEHOLDER_IMAGE.to_owned()),
        };
        let max_inline_image_bytes =
            parse_or(&lookup, "MAX_INLINE_IMAGE_BYTES", DEFAULT_MAX_INLINE_IMAGE_BYTES)?;

        let cors_origin = lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_owned());

        Ok(AppConfig {
            host,
            port,
            store,
            ownership,
            admins,
            session_ttl_minutes,
            display_offset_minutes,
            placeholder_image,
            max_inline_image_bytes,
            cors_origin,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
