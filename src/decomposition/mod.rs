//! Matrix decomposition for dimensionality reduction.
//!
//! Provides PCA, the projection step of the evaluation pipeline.

use crate::error::{AgruparError, Result};
use crate::primitives::Matrix;
use crate::traits::Transformer;

/// Principal Component Analysis (PCA) for dimensionality reduction.
///
/// PCA reduces dimensionality by projecting data onto principal components
/// (directions of maximum variance). The fit is exactly deterministic given
/// the input matrix: center, compute the sample covariance, eigendecompose,
/// and keep the top components by eigenvalue.
///
/// # Example
///
/// ```
/// use agrupar::decomposition::PCA;
/// use agrupar::traits::Transformer;
/// use agrupar::primitives::Matrix;
///
/// let data = Matrix::from_vec(4, 3, vec![
///     1.0, 2.0, 3.0,
///     4.0, 5.0, 6.0,
///     7.0, 8.0, 9.0,
///     10.0, 11.0, 12.0,
/// ]).expect("valid matrix dimensions");
///
/// let mut pca = PCA::new(2);
/// let embedded = pca.fit_transform(&data).expect("fit_transform should succeed");
/// assert_eq!(embedded.shape(), (4, 2));
/// ```
#[derive(Debug, Clone)]
pub struct PCA {
    /// Number of components to keep.
    n_components: usize,
    /// Mean of each feature (computed during fit).
    mean: Option<Vec<f32>>,
    /// Principal components (eigenvectors, one per row).
    components: Option<Matrix<f32>>,
    /// Variance explained by each component.
    explained_variance: Option<Vec<f32>>,
    /// Ratio of variance explained by each component.
    explained_variance_ratio: Option<Vec<f32>>,
}

impl PCA {
    /// Creates a new PCA transformer keeping `n_components` components.
    #[must_use]
    pub fn new(n_components: usize) -> Self {
        Self {
            n_components,
            mean: None,
            components: None,
            explained_variance: None,
            explained_variance_ratio: None,
        }
    }

    /// Returns the number of components kept.
    #[must_use]
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Returns true if the transformer has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.components.is_some()
    }

    /// Returns the variance explained by each component.
    #[must_use]
    pub fn explained_variance(&self) -> Option<&[f32]> {
        self.explained_variance.as_deref()
    }

    /// Returns the ratio of variance explained by each component.
    #[must_use]
    pub fn explained_variance_ratio(&self) -> Option<&[f32]> {
        self.explained_variance_ratio.as_deref()
    }

    /// Returns the principal components (one per row).
    #[must_use]
    pub fn components(&self) -> Option<&Matrix<f32>> {
        self.components.as_ref()
    }

    /// Reconstructs data from principal component space.
    ///
    /// # Errors
    ///
    /// Returns an error if the transformer is not fitted or the input has
    /// the wrong number of components.
    pub fn inverse_transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        let components = self
            .components
            .as_ref()
            .ok_or_else(|| AgruparError::from("PCA not fitted"))?;
        let mean = self
            .mean
            .as_ref()
            .ok_or_else(|| AgruparError::from("PCA not fitted"))?;

        let (n_samples, n_components) = x.shape();
        let n_features = mean.len();

        if n_components != self.n_components {
            return Err(AgruparError::DimensionMismatch {
                expected: format!("{} components", self.n_components),
                actual: format!("{n_components} components"),
            });
        }

        // X_reconstructed = X_pca @ components + mean
        let mut result = vec![0.0; n_samples * n_features];
        for i in 0..n_samples {
            for j in 0..n_features {
                let mut value = mean[j];
                for k in 0..n_components {
                    value += x.get(i, k) * components.get(k, j);
                }
                result[i * n_features + j] = value;
            }
        }

        Matrix::from_vec(n_samples, n_features, result)
    }
}

impl Transformer for PCA {
    fn fit(&mut self, x: &Matrix<f32>) -> Result<()> {
        use nalgebra::{DMatrix, SymmetricEigen};

        let (n_samples, n_features) = x.shape();

        if n_samples == 0 {
            return Err(AgruparError::empty_input("PCA fit data"));
        }
        if n_samples < 2 {
            return Err("PCA requires at least 2 samples".into());
        }
        if self.n_components == 0 || self.n_components > n_features {
            return Err(AgruparError::InvalidHyperparameter {
                param: "n_components".to_string(),
                value: self.n_components.to_string(),
                constraint: format!("1..={n_features} (number of features)"),
            });
        }

        let mean = x.column_means();

        // Center the data
        let mut centered = vec![0.0; n_samples * n_features];
        for i in 0..n_samples {
            for j in 0..n_features {
                centered[i * n_features + j] = x.get(i, j) - mean[j];
            }
        }

        // Sample covariance: Σ = (X^T X) / (n-1)
        let mut cov = vec![0.0; n_features * n_features];
        for i in 0..n_features {
            for j in 0..n_features {
                let mut sum = 0.0;
                for k in 0..n_samples {
                    sum += centered[k * n_features + i] * centered[k * n_features + j];
                }
                cov[i * n_features + j] = sum / (n_samples - 1) as f32;
            }
        }

        let cov_matrix = DMatrix::from_row_slice(n_features, n_features, &cov);
        let eigen = SymmetricEigen::new(cov_matrix);
        let eigenvalues = eigen.eigenvalues;
        let eigenvectors = eigen.eigenvectors;

        // Sort by eigenvalue (descending)
        let mut indices: Vec<usize> = (0..n_features).collect();
        indices.sort_by(|&a, &b| {
            eigenvalues[b]
                .partial_cmp(&eigenvalues[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        // Select top n_components
        let mut components_data = vec![0.0; self.n_components * n_features];
        let mut explained_variance = vec![0.0; self.n_components];

        for (i, &idx) in indices.iter().take(self.n_components).enumerate() {
            explained_variance[i] = eigenvalues[idx];
            for j in 0..n_features {
                components_data[i * n_features + j] = eigenvectors[(j, idx)];
            }
        }

        let total_variance: f32 = eigenvalues.iter().copied().sum();
        let explained_variance_ratio: Vec<f32> = explained_variance
            .iter()
            .map(|&v| {
                if total_variance > 0.0 {
                    v / total_variance
                } else {
                    0.0
                }
            })
            .collect();

        self.mean = Some(mean);
        self.components = Some(Matrix::from_vec(
            self.n_components,
            n_features,
            components_data,
        )?);
        self.explained_variance = Some(explained_variance);
        self.explained_variance_ratio = Some(explained_variance_ratio);

        Ok(())
    }

    fn transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        let components = self
            .components
            .as_ref()
            .ok_or_else(|| AgruparError::from("PCA not fitted"))?;
        let mean = self
            .mean
            .as_ref()
            .ok_or_else(|| AgruparError::from("PCA not fitted"))?;

        let (n_samples, n_features) = x.shape();
        if n_features != mean.len() {
            return Err(AgruparError::DimensionMismatch {
                expected: format!("{} features", mean.len()),
                actual: format!("{n_features} features"),
            });
        }

        // X_pca = (X - mean) @ components^T
        let mut result = vec![0.0; n_samples * self.n_components];
        for i in 0..n_samples {
            for k in 0..self.n_components {
                let mut value = 0.0;
                for j in 0..n_features {
                    value += (x.get(i, j) - mean[j]) * components.get(k, j);
                }
                result[i * self.n_components + k] = value;
            }
        }

        Matrix::from_vec(n_samples, self.n_components, result)
    }
}
