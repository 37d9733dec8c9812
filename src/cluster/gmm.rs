//! Gaussian Mixture Model (GMM) for probabilistic clustering.
//!
//! Uses the Expectation-Maximization (EM) algorithm to fit a mixture of
//! axis-aligned Gaussians to the data, providing soft cluster assignments.

use super::KMeans;
use crate::error::{AgruparError, Result};
use crate::primitives::{Matrix, Vector};
use crate::traits::UnsupervisedEstimator;
use serde::{Deserialize, Serialize};

/// Variance floor applied during fitting to keep densities finite.
const VAR_FLOOR: f32 = 1e-6;

/// Gaussian Mixture Model with diagonal covariance.
///
/// Each component is an axis-aligned Gaussian (no cross-feature
/// correlation is modeled). Fitting runs EM from a K-Means initialization;
/// with `n_init > 1` the fit is restarted from different initializations
/// and the parameters with the highest log-likelihood are kept. Given a
/// fixed `random_state` and identical input, the fit is reproducible.
///
/// # Algorithm
///
/// 1. **E-step**: compute responsibilities (probability each point belongs
///    to each component), in the log domain for stability
/// 2. **M-step**: update means, per-feature variances, and mixing weights
/// 3. Repeat until the mean log-likelihood change falls below `tol`
///
/// # Examples
///
/// ```
/// use agrupar::prelude::*;
///
/// let data = Matrix::from_vec(6, 2, vec![
///     1.0, 1.0, 1.1, 1.0, 1.0, 1.1,
///     5.0, 5.0, 5.1, 5.0, 5.0, 5.1,
/// ]).expect("valid matrix dimensions");
///
/// let mut gmm = GaussianMixture::new(2).with_random_state(42);
/// gmm.fit(&data).expect("fit succeeds with valid data");
///
/// let labels = gmm.predict(&data);
/// assert_eq!(labels.len(), 6);
///
/// let proba = gmm.predict_proba(&data);
/// assert_eq!(proba.shape(), (6, 2));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianMixture {
    /// Number of mixture components.
    n_components: usize,
    /// Maximum number of EM iterations per restart.
    max_iter: usize,
    /// Convergence tolerance on the mean log-likelihood.
    tol: f32,
    /// Number of EM restarts; the best run by log-likelihood wins.
    n_init: usize,
    /// Random seed for initialization.
    random_state: Option<u64>,
    /// Component means after fitting (k × d).
    means: Option<Matrix<f32>>,
    /// Per-feature component variances after fitting (k × d).
    variances: Option<Matrix<f32>>,
    /// Mixing weights after fitting (sums to 1).
    weights: Option<Vector<f32>>,
    /// Mean log-likelihood of the selected run.
    lower_bound: f32,
}

impl GaussianMixture {
    /// Creates a new `GaussianMixture` with the specified number of
    /// components.
    #[must_use]
    pub fn new(n_components: usize) -> Self {
        Self {
            n_components,
            max_iter: 100,
            tol: 1e-3,
            n_init: 1,
            random_state: None,
            means: None,
            variances: None,
            weights: None,
            lower_bound: f32::NEG_INFINITY,
        }
    }

    /// Sets the maximum number of EM iterations.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the convergence tolerance.
    #[must_use]
    pub fn with_tol(mut self, tol: f32) -> Self {
        self.tol = tol;
        self
    }

    /// Sets the number of initialization restarts.
    #[must_use]
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Sets the random seed for reproducibility.
    ///
    /// Restart `i` is seeded with `seed + i`, so the whole multi-restart
    /// fit is deterministic.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Returns the number of components.
    #[must_use]
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Returns true if the model has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.means.is_some()
    }

    /// Returns the component means (k × d).
    ///
    /// # Panics
    ///
    /// Panics if the model is not fitted.
    #[must_use]
    pub fn means(&self) -> &Matrix<f32> {
        self.means
            .as_ref()
            .expect("Model not fitted. Call fit() first.")
    }

    /// Returns the per-feature component variances (k × d).
    ///
    /// # Panics
    ///
    /// Panics if the model is not fitted.
    #[must_use]
    pub fn variances(&self) -> &Matrix<f32> {
        self.variances
            .as_ref()
            .expect("Model not fitted. Call fit() first.")
    }

    /// Returns the mixing weights.
    ///
    /// # Panics
    ///
    /// Panics if the model is not fitted.
    #[must_use]
    pub fn weights(&self) -> &Vector<f32> {
        self.weights
            .as_ref()
            .expect("Model not fitted. Call fit() first.")
    }

    /// Mean log-likelihood reached by the selected restart during fitting.
    #[must_use]
    pub fn lower_bound(&self) -> f32 {
        self.lower_bound
    }

    /// Mean log-likelihood of data under the fitted model.
    ///
    /// # Panics
    ///
    /// Panics if the model is not fitted.
    #[must_use]
    pub fn score(&self, x: &Matrix<f32>) -> f32 {
        assert!(self.is_fitted(), "Model not fitted. Call fit() first.");
        let params = Parameters {
            weights: self.weights().clone(),
            means: self.means().clone(),
            variances: self.variances().clone(),
        };
        e_step(x, &params).1
    }

    /// Predicts component probabilities for each sample (soft assignment).
    ///
    /// # Panics
    ///
    /// Panics if the model is not fitted.
    #[must_use]
    pub fn predict_proba(&self, x: &Matrix<f32>) -> Matrix<f32> {
        assert!(self.is_fitted(), "Model not fitted. Call fit() first.");
        let params = Parameters {
            weights: self.weights().clone(),
            means: self.means().clone(),
            variances: self.variances().clone(),
        };
        e_step(x, &params).0
    }

    /// Runs EM once from a seeded K-Means initialization.
    fn fit_single(&self, x: &Matrix<f32>, seed: Option<u64>) -> Result<(Parameters, f32)> {
        let (_, n_features) = x.shape();

        let mut kmeans = KMeans::new(self.n_components);
        if let Some(s) = seed {
            kmeans = kmeans.with_random_state(s);
        }
        kmeans.fit(x)?;

        // Initial variances: per-feature data variance, shared across
        // components, floored to stay positive.
        let data_vars = x.column_variances();
        let mut var_data = Vec::with_capacity(self.n_components * n_features);
        for _ in 0..self.n_components {
            for &v in &data_vars {
                var_data.push(v.max(VAR_FLOOR));
            }
        }

        let mut params = Parameters {
            weights: Vector::from_vec(vec![
                1.0 / self.n_components as f32;
                self.n_components
            ]),
            means: kmeans.centroids().clone(),
            variances: Matrix::from_vec(self.n_components, n_features, var_data)?,
        };

        let mut log_likelihood = f32::NEG_INFINITY;
        let mut iterations = 0;

        for iter in 0..self.max_iter {
            let (responsibilities, ll) = e_step(x, &params);
            params = m_step(x, &responsibilities, self.n_components)?;
            iterations = iter + 1;

            if (ll - log_likelihood).abs() < self.tol {
                log_likelihood = ll;
                break;
            }
            log_likelihood = ll;
        }

        if !log_likelihood.is_finite() {
            return Err(AgruparError::ConvergenceFailure {
                iterations,
                final_loss: f64::from(log_likelihood),
            });
        }

        Ok((params, log_likelihood))
    }
}

impl UnsupervisedEstimator for GaussianMixture {
    type Labels = Vec<usize>;

    /// Fits the mixture, keeping the best of `n_init` restarts.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is empty, has fewer samples than
    /// components, if `n_init` is zero, or if EM diverges.
    fn fit(&mut self, x: &Matrix<f32>) -> Result<()> {
        let n_samples = x.n_rows();

        if n_samples == 0 {
            return Err(AgruparError::empty_input("GaussianMixture fit data"));
        }
        if n_samples < self.n_components {
            return Err(AgruparError::InvalidHyperparameter {
                param: "n_components".to_string(),
                value: self.n_components.to_string(),
                constraint: format!("<= {n_samples} (number of samples)"),
            });
        }
        if self.n_init == 0 {
            return Err(AgruparError::InvalidHyperparameter {
                param: "n_init".to_string(),
                value: "0".to_string(),
                constraint: ">= 1".to_string(),
            });
        }

        let mut best: Option<(Parameters, f32)> = None;

        for run in 0..self.n_init {
            let seed = self.random_state.map(|s| s.wrapping_add(run as u64));
            let (params, ll) = self.fit_single(x, seed)?;

            let better = match &best {
                Some((_, best_ll)) => ll > *best_ll,
                None => true,
            };
            if better {
                best = Some((params, ll));
            }
        }

        let (params, ll) = best.expect("n_init >= 1 guarantees at least one run");
        self.weights = Some(params.weights);
        self.means = Some(params.means);
        self.variances = Some(params.variances);
        self.lower_bound = ll;

        Ok(())
    }

    /// Predicts the most likely component index for each sample.
    ///
    /// # Panics
    ///
    /// Panics if the model is not fitted.
    fn predict(&self, x: &Matrix<f32>) -> Vec<usize> {
        let responsibilities = self.predict_proba(x);
        let (n_samples, n_components) = responsibilities.shape();
        let mut labels = vec![0; n_samples];

        for (i, label) in labels.iter_mut().enumerate() {
            let mut max_prob = f32::NEG_INFINITY;
            for k in 0..n_components {
                let prob = responsibilities.get(i, k);
                if prob > max_prob {
                    max_prob = prob;
                    *label = k;
                }
            }
        }

        labels
    }
}

/// Mixture parameters carried between EM steps.
#[derive(Debug, Clone)]
struct Parameters {
    weights: Vector<f32>,
    means: Matrix<f32>,
    variances: Matrix<f32>,
}

/// Log-density of a sample under one axis-aligned Gaussian.
fn diag_log_pdf(sample: &[f32], mean: &[f32], variance: &[f32]) -> f32 {
    let mut log_p = 0.0;
    for j in 0..sample.len() {
        let var = variance[j].max(VAR_FLOOR);
        let diff = sample[j] - mean[j];
        log_p += -0.5 * ((2.0 * std::f32::consts::PI * var).ln() + diff * diff / var);
    }
    log_p
}

/// E-step: responsibilities and mean log-likelihood, via log-sum-exp.
fn e_step(x: &Matrix<f32>, params: &Parameters) -> (Matrix<f32>, f32) {
    let (n_samples, _) = x.shape();
    let n_components = params.weights.len();

    let mut responsibilities = vec![0.0; n_samples * n_components];
    let mut total_ll = 0.0;

    for i in 0..n_samples {
        let sample = x.row_slice(i);
        let mut log_probs = vec![0.0; n_components];

        for (k, log_prob) in log_probs.iter_mut().enumerate() {
            let weight = params.weights[k].max(f32::MIN_POSITIVE);
            *log_prob = weight.ln()
                + diag_log_pdf(sample, params.means.row_slice(k), params.variances.row_slice(k));
        }

        let max_log = log_probs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let sum_exp: f32 = log_probs.iter().map(|&lp| (lp - max_log).exp()).sum();
        let log_norm = max_log + sum_exp.ln();
        total_ll += log_norm;

        for (k, &lp) in log_probs.iter().enumerate() {
            responsibilities[i * n_components + k] = (lp - log_norm).exp();
        }
    }

    let responsibilities = Matrix::from_vec(n_samples, n_components, responsibilities)
        .expect("responsibility matrix dimensions match preallocated length");
    (responsibilities, total_ll / n_samples as f32)
}

/// M-step: update weights, means, and per-feature variances.
fn m_step(x: &Matrix<f32>, responsibilities: &Matrix<f32>, n_components: usize) -> Result<Parameters> {
    let (n_samples, n_features) = x.shape();

    // Effective number of points per component
    let mut n_k = vec![0.0; n_components];
    for (k, nk) in n_k.iter_mut().enumerate() {
        for i in 0..n_samples {
            *nk += responsibilities.get(i, k);
        }
        *nk = nk.max(VAR_FLOOR);
    }

    let mut new_weights = vec![0.0; n_components];
    for (k, w) in new_weights.iter_mut().enumerate() {
        *w = n_k[k] / n_samples as f32;
    }

    let mut new_means = vec![0.0; n_components * n_features];
    for k in 0..n_components {
        for j in 0..n_features {
            let mut weighted_sum = 0.0;
            for i in 0..n_samples {
                weighted_sum += responsibilities.get(i, k) * x.get(i, j);
            }
            new_means[k * n_features + j] = weighted_sum / n_k[k];
        }
    }
    let means = Matrix::from_vec(n_components, n_features, new_means)?;

    let mut new_variances = vec![0.0; n_components * n_features];
    for k in 0..n_components {
        for j in 0..n_features {
            let mut variance = 0.0;
            for i in 0..n_samples {
                let diff = x.get(i, j) - means.get(k, j);
                variance += responsibilities.get(i, k) * diff * diff;
            }
            new_variances[k * n_features + j] = (variance / n_k[k]).max(VAR_FLOOR);
        }
    }

    Ok(Parameters {
        weights: Vector::from_vec(new_weights),
        means,
        variances: Matrix::from_vec(n_components, n_features, new_variances)?,
    })
}
