//! Keyword annotators: stress type, intent and the in-scope gate.
//!
//! All matching is plain case-insensitive substring containment, so
//! "friendly" still matches "friend". Lists are scanned in order and the
//! first hit wins; the order decides which tips and plans a message gets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse keyword-derived stress category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StressType {
    #[serde(rename = "Anxiety")]
    Anxiety,
    #[serde(rename = "Depression")]
    Depression,
    #[serde(rename = "Work/Academic")]
    WorkAcademic,
    #[serde(rename = "Burnout")]
    Burnout,
    #[serde(rename = "Relationship")]
    Relationship,
    #[serde(rename = "General Stress")]
    General,
}

impl StressType {
    pub fn label(&self) -> &'static str {
        match self {
            StressType::Anxiety => "Anxiety",
            StressType::Depression => "Depression",
            StressType::WorkAcademic => "Work/Academic",
            StressType::Burnout => "Burnout",
            StressType::Relationship => "Relationship",
            StressType::General => "General Stress",
        }
    }
}

impl fmt::Display for StressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Keyword-derived intent tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Workload,
    Sleep,
    Panic,
    Relationship,
    Suicidal,
    General,
}

impl Intent {
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Workload => "workload",
            Intent::Sleep => "sleep",
            Intent::Panic => "panic",
            Intent::Relationship => "relationship",
            Intent::Suicidal => "suicidal",
            Intent::General => "general",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const STRESS_KEYWORDS: &[(StressType, &[&str])] = &[
    (StressType::Anxiety, &["anxious", "panic", "worry", "nervous"]),
    (StressType::Depression, &["hopeless", "sad", "empty", "alone"]),
    (
        StressType::WorkAcademic,
        &["work", "exam", "study", "deadline", "project", "college"],
    ),
    (StressType::Burnout, &["tired", "exhaust", "overwhelm"]),
    (StressType::Relationship, &["partner", "friend", "breakup", "love"]),
];

const INTENT_KEYWORDS: &[(Intent, &[&str])] = &[
    (
        Intent::Workload,
        &["work", "exam", "deadline", "project", "study", "assignment"],
    ),
    (Intent::Sleep, &["sleep", "tired", "rest", "insomnia"]),
    (Intent::Panic, &["panic", "hypervent", "shortness of breath"]),
    (
        Intent::Relationship,
        &["partner", "relationship", "friend", "breakup"],
    ),
    (
        Intent::Suicidal,
        &["suicide", "kill myself", "worthless", "end my life"],
    ),
];

const MENTAL_HEALTH_KEYWORDS: &[&str] = &[
    "stress", "depress", "anxious", "tired", "sad", "panic", "lonely", "hopeless", "burnout",
    "overwhelm", "fear", "sleep", "mental", "worry",
];

fn first_match<T: Copy>(text: &str, table: &[(T, &[&str])]) -> Option<T> {
    let lowered = text.to_lowercase();
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|(tag, _)| *tag)
}

pub fn detect_stress_type(text: &str) -> StressType {
    first_match(text, STRESS_KEYWORDS).unwrap_or(StressType::General)
}

pub fn detect_intent(text: &str) -> Intent {
    first_match(text, INTENT_KEYWORDS).unwrap_or(Intent::General)
}

/// Whether a message is eligible for classification and logging.
pub fn is_mental_health_query(text: &str) -> bool {
    let lowered = text.to_lowercase();
    MENTAL_HEALTH_KEYWORDS.iter().any(|kw| lowered.contains(kw))
        || detect_intent(text) != Intent::General
        || detect_stress_type(text) != StressType::General
}
