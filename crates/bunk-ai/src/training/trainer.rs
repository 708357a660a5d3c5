use std::fs;
use std::path::Path;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

use super::data::{generate_dataset, LabeledSample};
use crate::prediction::artifact::{
    sigmoid, FeatureScaler, TrainedModelArtifact, TrainingMetrics,
};
use crate::prediction::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use crate::prediction::service::MODEL_VERSION;

/// Hyperparameters for the logistic regression fit.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub samples: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub l2_penalty: f64,
    pub holdout_ratio: f64,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            samples: 2000,
            epochs: 200,
            learning_rate: 0.1,
            l2_penalty: 0.001,
            holdout_ratio: 0.2,
            seed: 42,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("training data is degenerate: every sample carries the same label")]
    SingleClass,
    #[error("feature '{feature}' is constant across the training split")]
    ConstantFeature { feature: &'static str },
    #[error("failed to write model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize model artifact: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Fit the classifier on a fresh synthetic dataset and return the artifact.
pub fn train(config: &TrainingConfig) -> Result<TrainedModelArtifact, TrainingError> {
    let mut dataset = generate_dataset(config.samples, config.seed);

    let positives = dataset.iter().filter(|sample| sample.safe_to_bunk).count();
    if positives == 0 || positives == dataset.len() {
        return Err(TrainingError::SingleClass);
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    dataset.shuffle(&mut rng);

    let holdout = ((dataset.len() as f64) * config.holdout_ratio).round() as usize;
    let holdout = holdout.clamp(1, dataset.len() - 1);
    let (test_split, train_split) = dataset.split_at(holdout);

    let train_rows = design_matrix(train_split);
    let test_rows = design_matrix(test_split);

    let scaler = fit_scaler(&train_rows)?;
    let train_scaled: Vec<([f64; FEATURE_COUNT], f64)> = train_rows
        .iter()
        .map(|(features, label)| (scaler.transform(features), *label))
        .collect();
    let test_scaled: Vec<([f64; FEATURE_COUNT], f64)> = test_rows
        .iter()
        .map(|(features, label)| (scaler.transform(features), *label))
        .collect();

    let mut weights = [0.0; FEATURE_COUNT];
    let mut intercept = 0.0;

    for _ in 0..config.epochs {
        for (features, label) in &train_scaled {
            let predicted = sigmoid(dot(&weights, features) + intercept);
            let error = predicted - label;
            for (weight, value) in weights.iter_mut().zip(features.iter()) {
                *weight -= config.learning_rate * (error * value + config.l2_penalty * *weight);
            }
            intercept -= config.learning_rate * error;
        }
    }

    let metrics = TrainingMetrics {
        train_accuracy: accuracy(&weights, intercept, &train_scaled),
        test_accuracy: accuracy(&weights, intercept, &test_scaled),
        auc_score: roc_auc(&weights, intercept, &test_scaled),
        training_samples: train_scaled.len(),
        test_samples: test_scaled.len(),
        trained_at: Utc::now(),
    };

    info!(
        train_accuracy = metrics.train_accuracy,
        test_accuracy = metrics.test_accuracy,
        auc = metrics.auc_score,
        "classifier fit complete"
    );

    Ok(TrainedModelArtifact {
        model_version: MODEL_VERSION.to_string(),
        feature_names: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
        coefficients: weights.to_vec(),
        intercept,
        scaler,
        metrics,
    })
}

/// Train and persist the artifact as JSON at `path`.
pub fn train_to_path(
    config: &TrainingConfig,
    path: &Path,
) -> Result<TrainedModelArtifact, TrainingError> {
    let artifact = train(config)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(&artifact)?)?;

    info!(path = %path.display(), "model artifact written");
    Ok(artifact)
}

fn design_matrix(samples: &[LabeledSample]) -> Vec<([f64; FEATURE_COUNT], f64)> {
    samples
        .iter()
        .map(|sample| {
            let features = FeatureVector::from_input(&sample.input).to_array();
            let label = if sample.safe_to_bunk { 1.0 } else { 0.0 };
            (features, label)
        })
        .collect()
}

fn fit_scaler(rows: &[([f64; FEATURE_COUNT], f64)]) -> Result<FeatureScaler, TrainingError> {
    let count = rows.len() as f64;
    let mut means = vec![0.0; FEATURE_COUNT];
    let mut stds = vec![0.0; FEATURE_COUNT];

    for (features, _) in rows {
        for (i, value) in features.iter().enumerate() {
            means[i] += value;
        }
    }
    for mean in means.iter_mut() {
        *mean /= count;
    }

    for (features, _) in rows {
        for (i, value) in features.iter().enumerate() {
            let centered = value - means[i];
            stds[i] += centered * centered;
        }
    }
    for (i, std) in stds.iter_mut().enumerate() {
        *std = (*std / count).sqrt();
        if *std < 1e-9 {
            return Err(TrainingError::ConstantFeature {
                feature: FEATURE_NAMES[i],
            });
        }
    }

    Ok(FeatureScaler { means, stds })
}

fn dot(weights: &[f64; FEATURE_COUNT], features: &[f64; FEATURE_COUNT]) -> f64 {
    weights
        .iter()
        .zip(features.iter())
        .map(|(weight, value)| weight * value)
        .sum()
}

fn accuracy(
    weights: &[f64; FEATURE_COUNT],
    intercept: f64,
    rows: &[([f64; FEATURE_COUNT], f64)],
) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let correct = rows
        .iter()
        .filter(|(features, label)| {
            let predicted = sigmoid(dot(weights, features) + intercept) >= 0.5;
            predicted == (*label >= 0.5)
        })
        .count();
    correct as f64 / rows.len() as f64
}

/// Rank-based AUC (Mann-Whitney), with tied scores assigned their average
/// rank.
fn roc_auc(
    weights: &[f64; FEATURE_COUNT],
    intercept: f64,
    rows: &[([f64; FEATURE_COUNT], f64)],
) -> f64 {
    let mut scored: Vec<(f64, bool)> = rows
        .iter()
        .map(|(features, label)| {
            (sigmoid(dot(weights, features) + intercept), *label >= 0.5)
        })
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));

    let positives = scored.iter().filter(|(_, label)| *label).count();
    let negatives = scored.len() - positives;
    if positives == 0 || negatives == 0 {
        return 0.5;
    }

    let mut rank_sum = 0.0;
    let mut i = 0;
    while i < scored.len() {
        let mut j = i;
        while j < scored.len() && scored[j].0 == scored[i].0 {
            j += 1;
        }
        let average_rank = (i + 1 + j) as f64 / 2.0;
        for entry in &scored[i..j] {
            if entry.1 {
                rank_sum += average_rank;
            }
        }
        i = j;
    }

    let positives = positives as f64;
    let negatives = negatives as f64;
    (rank_sum - positives * (positives + 1.0) / 2.0) / (positives * negatives)
}
