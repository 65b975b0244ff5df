//! Runtime settings resolved from the environment (after `.env` loading).

use std::net::SocketAddr;
use std::path::PathBuf;
use validator::Validate;

use crate::database::StoreConfig;
use crate::error::AppError;
use crate::fs_manager::PortablePathManager;
use crate::logging::LogFormat;

pub const HOST_ENV: &str = "ESCAPESTRESS_HOST";
pub const PORT_ENV: &str = "ESCAPESTRESS_PORT";
pub const MODEL_PATH_ENV: &str = "ESCAPESTRESS_MODEL_PATH";
pub const KNOWLEDGE_PATH_ENV: &str = "ESCAPESTRESS_KNOWLEDGE_PATH";
pub const DB_PATH_ENV: &str = "ESCAPESTRESS_DB_PATH";
pub const LOG_FORMAT_ENV: &str = "ESCAPESTRESS_LOG_FORMAT";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, Validate)]
pub struct Settings {
    #[validate(length(min = 1))]
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    pub paths: PortablePathManager,
    pub model_path: PathBuf,
    pub knowledge_path: PathBuf,
    pub store: StoreConfig,
    pub log_format: LogFormat,
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        let paths = PortablePathManager::from_env();

        let host = env_non_empty(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match env_non_empty(PORT_ENV) {
            Some(raw) => raw.trim().parse::<u16>()?,
            None => DEFAULT_PORT,
        };

        let model_path = env_non_empty(MODEL_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| paths.model_path());
        let knowledge_path = env_non_empty(KNOWLEDGE_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| paths.knowledge_path());
        let db_path = env_non_empty(DB_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| paths.db_path());

        let log_format = env_non_empty(LOG_FORMAT_ENV)
            .map(|v| LogFormat::parse(&v))
            .unwrap_or_default();

        let settings = Self {
            host,
            port,
            store: StoreConfig::from_env(&db_path),
            paths,
            model_path,
            knowledge_path,
            log_format,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid bind address: {}", e)))
    }
}
