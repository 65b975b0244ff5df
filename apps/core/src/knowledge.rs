use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::AppError;

/// Loads the static knowledge base. A missing file yields an empty list;
/// a malformed one is an error.
pub fn load_knowledge(path: &Path) -> Result<Value, AppError> {
    if !path.exists() {
        warn!("Knowledge base not found at {:?}, serving an empty list", path);
        return Ok(Value::Array(Vec::new()));
    }
    let raw = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&raw)?;
    info!("Loaded knowledge base from {:?}", path);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty_list() {
        let dir = tempdir().unwrap();
        let kb = load_knowledge(&dir.path().join("knowledge.json")).unwrap();
        assert_eq!(kb, json!([]));
    }

    #[test]
    fn test_file_is_loaded_verbatim() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("knowledge.json");
        fs::write(&path, r#"[{"topic": "sleep", "text": "Keep a routine"}]"#).unwrap();
        let kb = load_knowledge(&path).unwrap();
        assert_eq!(kb[0]["topic"], "sleep");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("knowledge.json");
        fs::write(&path, "[oops").unwrap();
        assert!(load_knowledge(&path).is_err());
    }
}
