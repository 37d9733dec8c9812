//! End-to-end clustering evaluation for labeled wearable datasets.
//!
//! [`ClusterEvaluator`] wires the pieces together: strip identifier and
//! label columns, project each dataset to a low-dimensional PCA embedding,
//! fit a diagonal Gaussian mixture on the training embedding, and score
//! the predicted component index against the known exercise label on both
//! datasets.

use crate::cluster::GaussianMixture;
use crate::data::{SensorFrame, LABEL_COLUMN, PROJECTION_EXCLUDED_COLUMNS};
use crate::decomposition::PCA;
use crate::error::{AgruparError, Result};
use crate::metrics::accuracy;
use crate::primitives::Matrix;
use crate::traits::{Transformer, UnsupervisedEstimator};
use serde::{Deserialize, Serialize};

/// How the PCA projection is fitted across the two datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionMode {
    /// Fit a fresh projection on each dataset independently.
    ///
    /// This reproduces the observed behavior of the original system: the
    /// training and validation embeddings live in independently-fitted
    /// coordinate systems, while the mixture model is fitted in only one
    /// of them.
    PerDataset,
    /// Fit the projection once on training data and apply the same
    /// transform to validation data.
    SharedFit,
}

/// The two accuracy scores produced by one evaluation, as percentages
/// in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Fraction of training rows whose predicted component matches the
    /// label, × 100.
    pub train_accuracy: f32,
    /// Same for validation rows, under the mixture fitted on training.
    pub validation_accuracy: f32,
}

/// Clustering evaluator: PCA embedding + Gaussian mixture accuracy.
///
/// One `evaluate` call is a pure, single-shot computation: all fitted
/// models and embeddings are constructed fresh and discarded before
/// returning. With the default fixed seed the result is reproducible for
/// identical input rows.
///
/// The predicted component index is compared directly against the label
/// value, so meaningful scores assume the label set is coded {0, 1} and
/// the number of clusters is 2 (the defaults). Component numbering is
/// arbitrary, which this comparison deliberately does not correct for.
///
/// # Examples
///
/// ```
/// use agrupar::prelude::*;
///
/// let readings: Vec<Observation> = (0..20)
///     .map(|i| {
///         let resting = i % 2 == 0;
///         Observation {
///             person_id: 1,
///             exercise: u8::from(!resting),
///             time: i as f32,
///             heart_rate: if resting { 65.0 + i as f32 } else { 150.0 + i as f32 },
///             spo: if resting { 98.0 } else { 94.0 },
///             heart_rate_base: 70.0,
///             spo_base: 97.0,
///             x: if resting { 0.1 } else { 8.0 },
///             y: 0.2,
///             z: 9.8,
///         }
///     })
///     .collect();
///
/// let training = SensorFrame::from_observations(&readings).unwrap();
/// let validation = training.clone();
///
/// let report = ClusterEvaluator::new().evaluate(&training, &validation).unwrap();
/// assert!(report.train_accuracy >= 0.0 && report.train_accuracy <= 100.0);
/// assert!(report.validation_accuracy >= 0.0 && report.validation_accuracy <= 100.0);
/// ```
#[derive(Debug, Clone)]
pub struct ClusterEvaluator {
    /// Dimensionality of the PCA embedding.
    embedding_dims: usize,
    /// Number of mixture components.
    n_clusters: usize,
    /// Number of EM restarts.
    n_init: usize,
    /// Seed for the mixture initialization.
    random_state: Option<u64>,
    /// Projection fitting strategy.
    projection: ProjectionMode,
}

impl Default for ClusterEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterEvaluator {
    /// Creates an evaluator with the standard configuration: 3-dimensional
    /// embedding, 2 components with diagonal covariance, 10 restarts,
    /// seed 42, per-dataset projection fitting.
    #[must_use]
    pub fn new() -> Self {
        Self {
            embedding_dims: 3,
            n_clusters: 2,
            n_init: 10,
            random_state: Some(42),
            projection: ProjectionMode::PerDataset,
        }
    }

    /// Sets the embedding dimensionality.
    #[must_use]
    pub fn with_embedding_dims(mut self, dims: usize) -> Self {
        self.embedding_dims = dims;
        self
    }

    /// Sets the number of mixture components.
    #[must_use]
    pub fn with_n_clusters(mut self, n_clusters: usize) -> Self {
        self.n_clusters = n_clusters;
        self
    }

    /// Sets the number of EM restarts.
    #[must_use]
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Sets the projection fitting strategy.
    #[must_use]
    pub fn with_projection_mode(mut self, mode: ProjectionMode) -> Self {
        self.projection = mode;
        self
    }

    /// Evaluates clustering accuracy on a training and a validation frame.
    ///
    /// Both frames must carry the full wearable schema (the label column
    /// and every column in `PROJECTION_EXCLUDED_COLUMNS`); feature values
    /// are assumed finite, per the upstream data contract.
    ///
    /// # Errors
    ///
    /// Returns an error if either frame has zero rows, a schema column is
    /// missing, or the projection/mixture fit fails numerically. A failure
    /// in any step aborts the whole evaluation with no partial result.
    pub fn evaluate(
        &self,
        training: &SensorFrame,
        validation: &SensorFrame,
    ) -> Result<EvaluationReport> {
        if training.n_rows() == 0 {
            return Err(AgruparError::empty_input("training rows"));
        }
        if validation.n_rows() == 0 {
            return Err(AgruparError::empty_input("validation rows"));
        }

        let train_labels = class_labels(training)?;
        let val_labels = class_labels(validation)?;

        let train_features = training.drop_columns(&PROJECTION_EXCLUDED_COLUMNS)?.to_matrix();
        let val_features = validation.drop_columns(&PROJECTION_EXCLUDED_COLUMNS)?.to_matrix();

        let (train_embedding, val_embedding) = match self.projection {
            ProjectionMode::PerDataset => {
                let mut train_pca = PCA::new(self.embedding_dims);
                let mut val_pca = PCA::new(self.embedding_dims);
                (
                    train_pca.fit_transform(&train_features)?,
                    val_pca.fit_transform(&val_features)?,
                )
            }
            ProjectionMode::SharedFit => {
                let mut pca = PCA::new(self.embedding_dims);
                let train_embedding = pca.fit_transform(&train_features)?;
                (train_embedding, pca.transform(&val_features)?)
            }
        };

        let mut gmm = GaussianMixture::new(self.n_clusters).with_n_init(self.n_init);
        if let Some(seed) = self.random_state {
            gmm = gmm.with_random_state(seed);
        }
        gmm.fit(&train_embedding)?;

        Ok(EvaluationReport {
            train_accuracy: score_pct(&gmm, &train_embedding, &train_labels),
            validation_accuracy: score_pct(&gmm, &val_embedding, &val_labels),
        })
    }
}

/// Predicted-component accuracy against ground truth, as a percentage.
fn score_pct(gmm: &GaussianMixture, embedding: &Matrix<f32>, labels: &[usize]) -> f32 {
    accuracy(&gmm.predict(embedding), labels) * 100.0
}

/// Extracts the exercise labels as cluster-comparable indices.
fn class_labels(frame: &SensorFrame) -> Result<Vec<usize>> {
    Ok(frame
        .column(LABEL_COLUMN)?
        .iter()
        .map(|&v| v.max(0.0).round() as usize)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Observation;

    /// Deterministic jitter in [0, 1), decorrelated from row parity.
    fn jitter(i: usize) -> f32 {
        ((i * 2_654_435_761) % 1000) as f32 / 1000.0
    }

    fn reading(i: usize, exercise: u8, base: f32) -> Observation {
        Observation {
            person_id: 1 + (i % 4) as u32,
            exercise,
            time: i as f32,
            heart_rate: base + jitter(i),
            spo: base + jitter(i + 1),
            heart_rate_base: 70.0,
            spo_base: 97.0,
            x: base + jitter(i + 2),
            y: base + jitter(i + 3),
            z: base + jitter(i + 4),
        }
    }

    /// Rows evenly split between label 0 near feature value 0 and label 1
    /// near feature value 100.
    fn separated_frame(n: usize) -> SensorFrame {
        let readings: Vec<Observation> = (0..n)
            .map(|i| {
                if i < n / 2 {
                    reading(i, 0, 0.0)
                } else {
                    reading(i, 1, 100.0)
                }
            })
            .collect();
        SensorFrame::from_observations(&readings).unwrap()
    }

    /// Alternating labels with features drawn independently of the label.
    fn uncorrelated_frame(n: usize) -> SensorFrame {
        let readings: Vec<Observation> = (0..n)
            .map(|i| reading(i, (i % 2) as u8, 50.0 * jitter(i * 7 + 13)))
            .collect();
        SensorFrame::from_observations(&readings).unwrap()
    }

    #[test]
    fn test_accuracies_in_range() {
        let training = separated_frame(40);
        let validation = separated_frame(20);

        let report = ClusterEvaluator::new().evaluate(&training, &validation).unwrap();
        assert!((0.0..=100.0).contains(&report.train_accuracy));
        assert!((0.0..=100.0).contains(&report.validation_accuracy));
    }

    #[test]
    fn test_deterministic_across_calls() {
        let training = separated_frame(40);
        let validation = separated_frame(20);
        let evaluator = ClusterEvaluator::new();

        let first = evaluator.evaluate(&training, &validation).unwrap();
        let second = evaluator.evaluate(&training, &validation).unwrap();
        assert_eq!(first.train_accuracy, second.train_accuracy);
        assert_eq!(first.validation_accuracy, second.validation_accuracy);
    }

    #[test]
    fn test_well_separated_clusters_recovered() {
        // 200 rows evenly split, clusters separated by construction. The
        // mixture recovers the split near-perfectly; component numbering
        // is arbitrary, so a clean recovery shows up as an accuracy near
        // 100 or near 0.
        let training = separated_frame(200);
        let report = ClusterEvaluator::new().evaluate(&training, &training).unwrap();

        assert!(
            report.train_accuracy >= 90.0 || report.train_accuracy <= 10.0,
            "expected extreme accuracy for separated clusters, got {}",
            report.train_accuracy
        );
    }

    #[test]
    fn test_uncorrelated_features_score_near_chance() {
        // Labels alternate independently of the features, so no cluster
        // assignment can beat chance by much.
        let training = separated_frame(200);
        let validation = uncorrelated_frame(200);
        let report = ClusterEvaluator::new().evaluate(&training, &validation).unwrap();

        assert!(
            (30.0..=70.0).contains(&report.validation_accuracy),
            "expected near-chance validation accuracy, got {}",
            report.validation_accuracy
        );
    }

    #[test]
    fn test_constant_label_identical_rows_collapses() {
        // Identical rows with a constant label: every row lands in the
        // same component, so accuracy is exactly 0 or 100.
        let readings: Vec<Observation> = (0..10).map(|_| reading(0, 0, 50.0)).collect();
        let frame = SensorFrame::from_observations(&readings).unwrap();

        let report = ClusterEvaluator::new().evaluate(&frame, &frame).unwrap();
        assert!(
            report.train_accuracy == 0.0 || report.train_accuracy == 100.0,
            "got {}",
            report.train_accuracy
        );
    }

    #[test]
    fn test_empty_training_fails() {
        let empty_cols = separated_frame(4)
            .column_names()
            .iter()
            .map(|n| ((*n).to_string(), crate::primitives::Vector::from_vec(vec![])))
            .collect();
        let empty = SensorFrame::new(empty_cols).unwrap();
        let validation = separated_frame(10);

        let result = ClusterEvaluator::new().evaluate(&empty, &validation);
        assert!(matches!(result, Err(AgruparError::EmptyInput { .. })));
    }

    #[test]
    fn test_missing_schema_column_fails() {
        // A frame lacking one of the declared drop columns is a schema
        // mismatch, not a silent no-op.
        let full = separated_frame(10);
        let truncated = full
            .select(&["exercise", "heart_rate", "spo", "x", "y", "z"])
            .unwrap();

        let result = ClusterEvaluator::new().evaluate(&truncated, &full);
        assert!(matches!(result, Err(AgruparError::SchemaMismatch { .. })));
    }

    #[test]
    fn test_shared_fit_identical_frames_agree() {
        let frame = separated_frame(60);
        let report = ClusterEvaluator::new()
            .with_projection_mode(ProjectionMode::SharedFit)
            .evaluate(&frame, &frame)
            .unwrap();

        assert_eq!(report.train_accuracy, report.validation_accuracy);
    }

    #[test]
    fn test_builder_overrides() {
        let frame = separated_frame(30);
        let report = ClusterEvaluator::new()
            .with_embedding_dims(2)
            .with_n_clusters(2)
            .with_n_init(3)
            .with_random_state(7)
            .evaluate(&frame, &frame)
            .unwrap();

        assert!((0.0..=100.0).contains(&report.train_accuracy));
    }
}
