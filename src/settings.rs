//! Runtime settings read from the process environment (after `.env` is loaded).

use crate::error::ConfigError;
use std::str::FromStr;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/portfolio";
const DEFAULT_SCHEMA: &str = "public";
const DEFAULT_BUCKET: &str = "portfolio";
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq)]
pub struct StorageSettings {
    pub bucket: String,
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub public_url: Option<String>,
    pub force_path_style: bool,
}

impl StorageSettings {
    /// Base URL objects are served from: explicit public URL, else `<endpoint>/<bucket>`,
    /// else the virtual-hosted AWS URL.
    pub fn public_base_url(&self) -> String {
        if let Some(url) = &self.public_url {
            return url.trim_end_matches('/').to_string();
        }
        match &self.endpoint {
            Some(ep) => format!("{}/{}", ep.trim_end_matches('/'), self.bucket),
            None => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub database_url: String,
    /// Schema holding the portfolio tables. Must be a valid PostgreSQL identifier.
    pub schema: String,
    pub max_connections: u32,
    pub storage: StorageSettings,
    pub bind_addr: String,
    pub max_upload_bytes: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let storage = StorageSettings {
            bucket: get("STORAGE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.into()),
            endpoint: get("STORAGE_ENDPOINT"),
            region: get("STORAGE_REGION").unwrap_or_else(|| DEFAULT_REGION.into()),
            access_key_id: get("STORAGE_ACCESS_KEY_ID"),
            secret_access_key: get("STORAGE_SECRET_ACCESS_KEY"),
            public_url: get("STORAGE_PUBLIC_URL"),
            force_path_style: parse_or("STORAGE_FORCE_PATH_STYLE", get("STORAGE_FORCE_PATH_STYLE"), true)?,
        };
        Ok(Settings {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            schema: get("PORTFOLIO_SCHEMA").unwrap_or_else(|| DEFAULT_SCHEMA.into()),
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", get("DATABASE_MAX_CONNECTIONS"), 5)?,
            storage,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", get("MAX_UPLOAD_BYTES"), DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(s) => s.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: format!("'{}': {}", s, e),
        }),
    }
}
