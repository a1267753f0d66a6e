use std::env;
use std::path::PathBuf;
use std::time::Duration;

use rentdesk_core::{AppError, AppResult};
use rentdesk_domain::MAX_PAGE_SIZE;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub api_base_url: String,
    pub token_path: PathBuf,
    pub admin_role: String,
    pub page_size: u32,
    pub request_timeout: Duration,
}

impl ConsoleConfig {
    pub fn load() -> AppResult<Self> {
        let api_base_url = env::var("RENTDESK_API_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8080".to_owned())
            .trim()
            .trim_end_matches('/')
            .to_owned();
        Url::parse(api_base_url.as_str()).map_err(|error| {
            AppError::Validation(format!(
                "invalid RENTDESK_API_BASE_URL '{api_base_url}': {error}"
            ))
        })?;

        let token_path = env::var("RENTDESK_TOKEN_PATH")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .map_or_else(|| PathBuf::from(".rentdesk/token"), PathBuf::from);

        let admin_role = env::var("RENTDESK_ADMIN_ROLE")
            .ok()
            .map(|value| value.trim().to_uppercase())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "ADMIN".to_owned());

        let page_size = parse_env_u32("RENTDESK_PAGE_SIZE", 100)?;
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(AppError::Validation(format!(
                "RENTDESK_PAGE_SIZE must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        let request_timeout_secs = parse_env_u64("RENTDESK_REQUEST_TIMEOUT_SECS", 15)?;
        if request_timeout_secs == 0 {
            return Err(AppError::Validation(
                "RENTDESK_REQUEST_TIMEOUT_SECS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            api_base_url,
            token_path,
            admin_role,
            page_size,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn parse_env_u32(name: &str, default: u32) -> AppResult<u32> {
    match env::var(name) {
        Ok(value) => value.trim().parse::<u32>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value.trim().parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
