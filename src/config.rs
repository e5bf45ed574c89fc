use std::{env, path::PathBuf};

use secrecy::SecretString;
use url::Url;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: Url,
    /// Host serving the full restaurant catalogue. Falls back to `api_base_url`.
    pub catalog_base_url: Url,
    pub read_access_token: Option<SecretString>,
    pub session_file: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        let api_base_url = env::var("API_BASE_URL")
            .map_err(|_| AppError::Config("API_BASE_URL is not set".into()))
            .and_then(|raw| parse_url("API_BASE_URL", &raw))?;
        let catalog_base_url = match env::var("API_CATALOG_URL") {
            Ok(raw) if !raw.trim().is_empty() => parse_url("API_CATALOG_URL", &raw)?,
            _ => api_base_url.clone(),
        };
        let read_access_token = env::var("API_READ_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from);
        let session_file = env::var("SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".food-order-session.json"));
        Ok(Self {
            api_base_url,
            catalog_base_url,
            read_access_token,
            session_file,
        })
    }

    /// Config pointing both hosts at one base URL, with no static token.
    pub fn for_base_url(base: &str) -> AppResult<Self> {
        let api_base_url = parse_url("base url", base)?;
        Ok(Self {
            catalog_base_url: api_base_url.clone(),
            api_base_url,
            read_access_token: None,
            session_file: PathBuf::from(".food-order-session.json"),
        })
    }
}

fn parse_url(name: &str, raw: &str) -> AppResult<Url> {
    Url::parse(raw.trim()).map_err(|e| AppError::Config(format!("{name} is not a valid url: {e}")))
}
