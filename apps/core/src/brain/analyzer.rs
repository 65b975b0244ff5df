//! Stress analyzer - orchestrates the brain components for one message.
//!
//! 1. Scope gate (keyword annotators)
//! 2. TF-IDF vectorisation and classification
//! 3. Stress type and intent annotation
//! 4. Response composition

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

use super::annotators::{
    detect_intent, detect_stress_type, is_mental_health_query, Intent, StressType,
};
use super::classifier::Classifier;
use super::composer::{compose, Guide};
use super::model::EmotionModel;
use crate::error::AppError;
use crate::models::ResourceLink;

pub const OUT_OF_SCOPE_LABEL: &str = "OutOfScope";
pub const OUT_OF_SCOPE_MESSAGE: &str =
    "Let’s focus on how you’re feeling or what’s stressing you today 💬.";

/// Full analysis payload returned for in-scope messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatAnalysis {
    pub label: String,
    pub message: String,
    pub stress_type: StressType,
    pub intent: Intent,
    pub confidence: BTreeMap<String, f64>,
    pub tips: Vec<String>,
    pub action_plan: Vec<String>,
    pub resources: Vec<ResourceLink>,
    pub guide: Option<Guide>,
}

/// Fixed reply for messages that are not about stress or mental health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deflection {
    pub label: String,
    pub message: String,
}

impl Default for Deflection {
    fn default() -> Self {
        Self {
            label: OUT_OF_SCOPE_LABEL.to_string(),
            message: OUT_OF_SCOPE_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatReply {
    Analysis(Box<ChatAnalysis>),
    OutOfScope(Deflection),
}

/// Read-only analyzer shared by every request.
pub struct StressAnalyzer {
    model: EmotionModel,
}

impl StressAnalyzer {
    pub fn new(model: EmotionModel) -> Self {
        Self { model }
    }

    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        EmotionModel::load(path).map(Self::new)
    }

    pub fn classes(&self) -> &[String] {
        self.model.classifier.classes()
    }

    /// Classifier label and per-class confidence.
    pub fn classify(&self, text: &str) -> (String, BTreeMap<String, f64>) {
        let x = self.model.vectorizer.transform(text);
        let label = self.model.classifier.predict(&x);
        let confidence = self.model.classifier.predict_proba(&x).unwrap_or_default();
        (label, confidence)
    }

    /// Gates, classifies and composes. Resources are left empty for the caller.
    pub fn analyze<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> ChatReply {
        if !is_mental_health_query(text) {
            debug!("Message out of scope");
            return ChatReply::OutOfScope(Deflection::default());
        }

        let start = Instant::now();
        let (label, confidence) = self.classify(text);
        let stress_type = detect_stress_type(text);
        let intent = detect_intent(text);
        let composition = compose(&label, stress_type, intent, rng);
        debug!(
            "Analyzed message as {} / {} / {} in {:?}",
            label,
            stress_type,
            intent,
            start.elapsed()
        );

        ChatReply::Analysis(Box::new(ChatAnalysis {
            label,
            message: composition.message,
            stress_type,
            intent,
            confidence,
            tips: composition.tips,
            action_plan: composition.action_plan,
            resources: Vec::new(),
            guide: composition.guide,
        }))
    }
}
