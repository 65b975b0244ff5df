use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable pointing at the application root.
pub const HOME_ENV: &str = "ESCAPESTRESS_HOME";

/// Resolves the on-disk layout of the application relative to a root directory.
///
/// ```text
/// <root>/
///   data/
///     stress_chat.db
///     knowledge.json
///     model/emotion_model.json
///   static/
/// ```
#[derive(Debug, Clone)]
pub struct PortablePathManager {
    root: PathBuf,
}

impl PortablePathManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Uses `ESCAPESTRESS_HOME` when set, otherwise the current directory.
    pub fn from_env() -> Self {
        let root = match std::env::var(HOME_ENV) {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => std::env::current_dir().unwrap_or_else(|e| {
                warn!("Failed to read current directory: {}. Using '.'", e);
                PathBuf::from(".")
            }),
        };
        Self::new(root)
    }

    pub fn root_dir(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn models_dir(&self) -> PathBuf {
        self.data_dir().join("model")
    }

    pub fn model_path(&self) -> PathBuf {
        self.models_dir().join("emotion_model.json")
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir().join("stress_chat.db")
    }

    pub fn knowledge_path(&self) -> PathBuf {
        self.data_dir().join("knowledge.json")
    }

    pub fn static_dir(&self) -> PathBuf {
        self.root.join("static")
    }

    /// Creates the data and model directories if they don't exist.
    pub fn init(&self) -> Result<(), std::io::Error> {
        for dir in [self.data_dir(), self.models_dir()] {
            if !dir.exists() {
                info!("Creating directory: {:?}", dir);
                fs::create_dir_all(&dir)?;
            }
        }
        Ok(())
    }
}
