//! Offline training: stratified split, fit and evaluation report.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

use super::classifier::{Classifier, LogisticRegression, LogisticRegressionParams};
use super::corpus::TrainingExample;
use super::model::EmotionModel;
use super::vectorizer::{TfidfVectorizer, DEFAULT_MAX_FEATURES};

pub const TEST_FRACTION: f64 = 0.2;
pub const SPLIT_SEED: u64 = 42;

/// Index sets produced by [`stratified_split`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Splits indices so every label keeps its share in the test set.
///
/// The test size is `ceil(fraction * n)`; each label gets the floor of its
/// proportional share and the leftovers go to the largest remainders (first
/// label on ties, labels in sorted order).
pub fn stratified_split(labels: &[&str], fraction: f64, seed: u64) -> Split {
    let n = labels.len();
    let n_test = (fraction * n as f64).ceil() as usize;

    let mut by_label: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, label) in labels.iter().enumerate() {
        by_label.entry(*label).or_default().push(i);
    }

    let mut quotas: Vec<(usize, f64)> = by_label
        .values()
        .map(|idx| {
            let exact = idx.len() as f64 * n_test as f64 / n as f64;
            (exact.floor() as usize, exact - exact.floor())
        })
        .collect();
    let assigned: usize = quotas.iter().map(|(q, _)| q).sum();
    let mut order: Vec<usize> = (0..quotas.len()).collect();
    order.sort_by(|a, b| quotas[*b].1.total_cmp(&quotas[*a].1));
    for &i in order.iter().take(n_test.saturating_sub(assigned)) {
        quotas[i].0 += 1;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();
    for (mut idx, (quota, _)) in by_label.into_values().zip(quotas) {
        idx.shuffle(&mut rng);
        test.extend_from_slice(&idx[..quota.min(idx.len())]);
        train.extend_from_slice(&idx[quota.min(idx.len())..]);
    }
    train.sort_unstable();
    test.sort_unstable();
    Split { train, test }
}

/// Precision / recall / F1 for one label.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub per_class: BTreeMap<String, ClassMetrics>,
}

impl ClassificationReport {
    pub fn evaluate(truth: &[String], predicted: &[String]) -> Self {
        let mut labels: Vec<&String> = truth.iter().chain(predicted.iter()).collect();
        labels.sort();
        labels.dedup();

        let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
        let accuracy = if truth.is_empty() {
            0.0
        } else {
            correct as f64 / truth.len() as f64
        };

        let per_class = labels
            .into_iter()
            .map(|label| {
                let tp = truth
                    .iter()
                    .zip(predicted)
                    .filter(|(t, p)| *t == label && *p == label)
                    .count() as f64;
                let predicted_pos = predicted.iter().filter(|p| *p == label).count() as f64;
                let support = truth.iter().filter(|t| *t == label).count();
                let precision = ratio(tp, predicted_pos);
                let recall = ratio(tp, support as f64);
                let f1 = ratio(2.0 * precision * recall, precision + recall);
                (
                    label.clone(),
                    ClassMetrics {
                        precision,
                        recall,
                        f1,
                        support,
                    },
                )
            })
            .collect();

        Self {
            accuracy,
            per_class,
        }
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>16} {:>10} {:>10} {:>10} {:>8}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for (label, m) in &self.per_class {
            writeln!(
                f,
                "{:>16} {:>10.2} {:>10.2} {:>10.2} {:>8}",
                label, m.precision, m.recall, m.f1, m.support
            )?;
        }
        write!(f, "accuracy: {:.2}%", self.accuracy * 100.0)
    }
}

/// Fits the artifact on the training split and reports held-out metrics.
pub fn train(examples: &[TrainingExample]) -> (EmotionModel, ClassificationReport) {
    info!("Loaded {} training samples", examples.len());
    let labels: Vec<&str> = examples.iter().map(|e| e.label).collect();
    let split = stratified_split(&labels, TEST_FRACTION, SPLIT_SEED);

    let train_texts: Vec<&str> = split.train.iter().map(|&i| examples[i].text).collect();
    let train_labels: Vec<String> = split
        .train
        .iter()
        .map(|&i| examples[i].label.to_string())
        .collect();

    let vectorizer = TfidfVectorizer::fit(&train_texts, DEFAULT_MAX_FEATURES);
    let features: Vec<_> = train_texts.iter().map(|t| vectorizer.transform(t)).collect();
    let classifier = LogisticRegression::fit(
        &features,
        &train_labels,
        vectorizer.n_features(),
        LogisticRegressionParams::default(),
    );

    let truth: Vec<String> = split
        .test
        .iter()
        .map(|&i| examples[i].label.to_string())
        .collect();
    let predicted: Vec<String> = split
        .test
        .iter()
        .map(|&i| classifier.predict(&vectorizer.transform(examples[i].text)))
        .collect();
    let report = ClassificationReport::evaluate(&truth, &predicted);
    info!("Accuracy: {:.2}%", report.accuracy * 100.0);

    (
        EmotionModel {
            vectorizer,
            classifier,
        },
        report,
    )
}
