//! Evaluation metrics.
//!
//! Classification accuracy for label-against-cluster scoring and inertia
//! (within-cluster sum of squares) for K-Means.

use crate::primitives::Matrix;

/// Compute classification accuracy.
///
/// accuracy = `correct_predictions` / `total_predictions`
///
/// # Returns
///
/// Accuracy score between 0.0 and 1.0
///
/// # Panics
///
/// Panics if the slices have different lengths or are empty.
///
/// # Examples
///
/// ```
/// use agrupar::metrics::accuracy;
///
/// let y_true = vec![0, 1, 1, 0];
/// let y_pred = vec![0, 1, 0, 0];
/// let acc = accuracy(&y_pred, &y_true);
/// assert!((acc - 0.75).abs() < 1e-6);
/// ```
#[must_use]
pub fn accuracy(y_pred: &[usize], y_true: &[usize]) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "Slices must have same length");
    assert!(!y_true.is_empty(), "Slices cannot be empty");

    let correct = y_pred
        .iter()
        .zip(y_true.iter())
        .filter(|(p, t)| p == t)
        .count();

    correct as f32 / y_true.len() as f32
}

/// Compute inertia: the sum of squared distances from each sample to its
/// assigned centroid.
///
/// # Panics
///
/// Panics if `labels` length doesn't match the number of samples or a
/// label exceeds the centroid count.
#[must_use]
pub fn inertia(x: &Matrix<f32>, centroids: &Matrix<f32>, labels: &[usize]) -> f32 {
    assert_eq!(
        labels.len(),
        x.n_rows(),
        "Labels length must match sample count"
    );

    let n_features = x.n_cols();
    let mut total = 0.0;

    for (i, &label) in labels.iter().enumerate() {
        for j in 0..n_features {
            let diff = x.get(i, j) - centroids.get(label, j);
            total += diff * diff;
        }
    }

    total
}
