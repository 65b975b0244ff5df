//! Preflight Check System
//!
//! Verifies the data directory, the classifier artifact, the optional
//! knowledge base and store connectivity before the server starts.

use crate::config::Settings;
use crate::database::Store;
use crate::knowledge::load_knowledge;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Result of a single check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub details: Option<String>,
}

impl CheckResult {
    fn pass(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: message.to_string(),
            details: None,
        }
    }

    fn fail(name: &str, message: &str, details: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: message.to_string(),
            details,
        }
    }
}

/// Complete preflight check report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreflightReport {
    pub all_passed: bool,
    pub checks: Vec<CheckResult>,
    pub ready_to_start: bool,
    pub summary: String,
}

impl PreflightReport {
    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }
}

fn is_critical_check(name: &str) -> bool {
    matches!(name, "directories" | "model_file" | "database")
}

/// Runs every check and logs the outcome.
pub async fn run_preflight_checks(settings: &Settings, store: &Store) -> PreflightReport {
    info!("Running preflight checks");

    let checks = vec![
        check_directories(settings),
        check_model_file(settings),
        check_knowledge_file(settings),
        check_database(store).await,
    ];

    let all_passed = checks.iter().all(|c| c.passed);
    let critical_passed = checks
        .iter()
        .filter(|c| is_critical_check(&c.name))
        .all(|c| c.passed);

    let summary = if all_passed {
        "All checks passed. System ready.".to_string()
    } else if critical_passed {
        "Some non-critical checks failed. System can start with warnings.".to_string()
    } else {
        "Critical checks failed. System cannot start.".to_string()
    };

    for check in &checks {
        if check.passed {
            info!("  ✅ {}: {}", check.name, check.message);
        } else {
            warn!("  ❌ {}: {}", check.name, check.message);
            if let Some(details) = &check.details {
                warn!("      Details: {}", details);
            }
        }
    }
    info!("Summary: {}", summary);

    PreflightReport {
        all_passed,
        checks,
        ready_to_start: critical_passed,
        summary,
    }
}

// --- Individual Checks ---

fn check_directories(settings: &Settings) -> CheckResult {
    match settings.paths.init() {
        Ok(()) => CheckResult::pass("directories", "Data directories ready"),
        Err(e) => CheckResult::fail(
            "directories",
            "Failed to create directories",
            Some(e.to_string()),
        ),
    }
}

fn check_model_file(settings: &Settings) -> CheckResult {
    let path = &settings.model_path;
    if !path.exists() {
        return CheckResult::fail(
            "model_file",
            "Model file not found. Run train_model first.",
            Some(format!("Expected at: {:?}", path)),
        );
    }

    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => CheckResult::pass(
            "model_file",
            &format!("Model OK ({:.1} KB)", meta.len() as f64 / 1024.0),
        ),
        Ok(_) => CheckResult::fail("model_file", "Model file is empty", None),
        Err(e) => CheckResult::fail("model_file", "Cannot read model file", Some(e.to_string())),
    }
}

fn check_knowledge_file(settings: &Settings) -> CheckResult {
    let path = &settings.knowledge_path;
    if !path.exists() {
        return CheckResult::pass("knowledge_file", "No knowledge base (optional)");
    }
    match load_knowledge(path) {
        Ok(_) => CheckResult::pass("knowledge_file", "Knowledge base OK"),
        Err(e) => CheckResult::fail(
            "knowledge_file",
            "Knowledge base is not valid JSON",
            Some(e.to_string()),
        ),
    }
}

async fn check_database(store: &Store) -> CheckResult {
    match store.connect().await {
        Ok(conn) => {
            let dialect = conn.dialect();
            if let Err(e) = conn.close().await {
                warn!("Failed to close preflight connection: {}", e);
            }
            CheckResult::pass("database", &format!("Connected ({:?})", dialect))
        }
        Err(e) => CheckResult::fail(
            "database",
            "Cannot connect to database",
            Some(e.to_string()),
        ),
    }
}
