//! Multinomial logistic regression over TF-IDF features.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::vectorizer::FeatureVector;

/// Inverse regularisation strength used by the trainer.
pub const DEFAULT_C: f64 = 2.0;
/// Maximum full-batch gradient iterations.
pub const DEFAULT_MAX_ITER: usize = 1500;
const GRADIENT_TOLERANCE: f64 = 1e-4;

/// A fitted text classifier.
///
/// `predict_proba` is best-effort: techniques without calibrated
/// probabilities return `None` and callers report an empty confidence map.
pub trait Classifier: Send + Sync {
    fn classes(&self) -> &[String];

    fn predict(&self, x: &FeatureVector) -> String;

    fn predict_proba(&self, x: &FeatureVector) -> Option<BTreeMap<String, f64>> {
        let _ = x;
        None
    }
}

/// Hyper-parameters for [`LogisticRegression::fit`].
#[derive(Debug, Clone, Copy)]
pub struct LogisticRegressionParams {
    pub c: f64,
    pub max_iter: usize,
}

impl Default for LogisticRegressionParams {
    fn default() -> Self {
        Self {
            c: DEFAULT_C,
            max_iter: DEFAULT_MAX_ITER,
        }
    }
}

/// One weight row and intercept per class, classes in sorted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    classes: Vec<String>,
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    n_iter: usize,
}

impl LogisticRegression {
    /// Minimises `C * Σ cross-entropy + ½‖W‖²` with gradient descent.
    ///
    /// Intercepts are not penalised. Stops early once the largest gradient
    /// component falls below the tolerance.
    pub fn fit(
        features: &[FeatureVector],
        labels: &[String],
        n_features: usize,
        params: LogisticRegressionParams,
    ) -> Self {
        let mut classes: Vec<String> = labels.to_vec();
        classes.sort();
        classes.dedup();

        let k = classes.len();
        let targets: Vec<usize> = labels
            .iter()
            .map(|l| classes.binary_search(l).unwrap_or(0))
            .collect();

        let mut weights = vec![vec![0.0; n_features]; k];
        let mut intercepts = vec![0.0; k];

        // Lipschitz bound of the smooth objective gives a safe fixed step.
        let sq_norms: f64 = features.iter().map(|x| x.norm().powi(2) + 1.0).sum();
        let step = 1.0 / (0.5 * params.c * sq_norms + 1.0);

        let mut n_iter = 0;
        for iter in 0..params.max_iter {
            n_iter = iter + 1;
            let mut grad_w: Vec<Vec<f64>> = weights.clone();
            let mut grad_b = vec![0.0; k];

            for (x, &target) in features.iter().zip(&targets) {
                let probs = softmax(&scores(&weights, &intercepts, x));
                for (c, p) in probs.iter().enumerate() {
                    let residual = params.c * (p - if c == target { 1.0 } else { 0.0 });
                    grad_b[c] += residual;
                    for (i, v) in &x.entries {
                        grad_w[c][*i] += residual * v;
                    }
                }
            }

            let max_grad = grad_w
                .iter()
                .flatten()
                .chain(grad_b.iter())
                .fold(0.0f64, |acc, g| acc.max(g.abs()));
            if max_grad < GRADIENT_TOLERANCE {
                break;
            }

            for c in 0..k {
                for (w, g) in weights[c].iter_mut().zip(&grad_w[c]) {
                    *w -= step * g;
                }
                intercepts[c] -= step * grad_b[c];
            }
        }

        debug!("Logistic regression finished after {} iterations", n_iter);

        Self {
            classes,
            weights,
            intercepts,
            n_iter,
        }
    }

    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    fn decision(&self, x: &FeatureVector) -> Vec<f64> {
        scores(&self.weights, &self.intercepts, x)
    }
}

impl Classifier for LogisticRegression {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict(&self, x: &FeatureVector) -> String {
        let scores = self.decision(x);
        let mut best = 0;
        for (i, s) in scores.iter().enumerate() {
            if *s > scores[best] {
                best = i;
            }
        }
        self.classes.get(best).cloned().unwrap_or_default()
    }

    fn predict_proba(&self, x: &FeatureVector) -> Option<BTreeMap<String, f64>> {
        let probs = softmax(&self.decision(x));
        Some(self.classes.iter().cloned().zip(probs).collect())
    }
}

fn scores(weights: &[Vec<f64>], intercepts: &[f64], x: &FeatureVector) -> Vec<f64> {
    weights
        .iter()
        .zip(intercepts)
        .map(|(row, b)| x.dot(row) + b)
        .collect()
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}
