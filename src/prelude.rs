//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use agrupar::prelude::*;
//! ```

pub use crate::cluster::{GaussianMixture, KMeans};
pub use crate::data::{Observation, SensorFrame, LABEL_COLUMN, PROJECTION_EXCLUDED_COLUMNS};
pub use crate::decomposition::PCA;
pub use crate::evaluate::{ClusterEvaluator, EvaluationReport, ProjectionMode};
pub use crate::metrics::{accuracy, inertia};
pub use crate::primitives::{Matrix, Vector};
pub use crate::traits::{Transformer, UnsupervisedEstimator};
