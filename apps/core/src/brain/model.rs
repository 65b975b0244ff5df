//! Persisted classifier artifact: the fitted vectorizer and classifier pair.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use super::classifier::LogisticRegression;
use super::vectorizer::TfidfVectorizer;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionModel {
    pub vectorizer: TfidfVectorizer,
    pub classifier: LogisticRegression,
}

impl EmotionModel {
    /// Loads the artifact. A missing or unreadable file is a [`AppError::Model`].
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            return Err(AppError::Model(format!(
                "Model not found at {}. Run train_model first.",
                path.display()
            )));
        }
        let raw = fs::read_to_string(path)
            .map_err(|e| AppError::Model(format!("Cannot read {}: {}", path.display(), e)))?;
        let model: Self = serde_json::from_str(&raw)
            .map_err(|e| AppError::Model(format!("Corrupt model {}: {}", path.display(), e)))?;
        info!(
            "Loaded emotion model from {:?} ({} features)",
            path,
            model.vectorizer.n_features()
        );
        Ok(model)
    }

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(self)
            .map_err(|e| AppError::Internal(format!("Cannot serialise model: {}", e)))?;
        fs::write(path, json)?;
        info!("Saved emotion model to {:?}", path);
        Ok(())
    }
}
