//! # Brain Module
//!
//! Stress classification for EscapeStress.
//!
//! ## Components
//! - `vectorizer`: TF-IDF over unigrams and bigrams
//! - `classifier`: multinomial logistic regression
//! - `corpus` / `training`: the labelled sentences and the offline trainer
//! - `model`: the persisted vectorizer + classifier artifact
//! - `annotators`: keyword stress type, intent and scope gate
//! - `composer`: templated replies, tips, action plans
//! - `analyzer`: main orchestrator

pub mod analyzer;
pub mod annotators;
pub mod classifier;
pub mod composer;
pub mod corpus;
pub mod model;
mod stopwords;
pub mod training;
pub mod vectorizer;

pub use analyzer::{ChatAnalysis, ChatReply, Deflection, StressAnalyzer};
pub use annotators::{detect_intent, detect_stress_type, is_mental_health_query, Intent, StressType};
pub use classifier::{Classifier, LogisticRegression, LogisticRegressionParams};
pub use model::EmotionModel;
pub use vectorizer::{FeatureVector, TfidfVectorizer};
