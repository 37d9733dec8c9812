//! Agrupar: clustering evaluation for wearable physiological data.
//!
//! Agrupar scores how well an unsupervised pipeline recovers exercise-type
//! labels from wearable sensor readings (heart rate, oxygen saturation,
//! accelerometer). Each labeled dataset is reduced to a low-dimensional
//! PCA embedding, a diagonal-covariance Gaussian mixture is fitted on the
//! training embedding, and the predicted component index is compared
//! against the known label on both the training and validation sets.
//!
//! The crate owns no I/O: callers supply already-parsed tabular data and
//! receive two percentage scalars back. One evaluation call is pure and
//! single-shot; with the default fixed seed it is reproducible for
//! identical input rows.
//!
//! # Quick Start
//!
//! ```
//! use agrupar::prelude::*;
//!
//! // Readings split between rest (label 0) and exercise (label 1)
//! let readings: Vec<Observation> = (0..30)
//!     .map(|i| {
//!         let at_rest = i < 15;
//!         Observation {
//!             person_id: 1,
//!             exercise: u8::from(!at_rest),
//!             time: i as f32,
//!             heart_rate: if at_rest { 62.0 + i as f32 } else { 155.0 + i as f32 },
//!             spo: if at_rest { 98.0 } else { 93.5 },
//!             heart_rate_base: 70.0,
//!             spo_base: 97.0,
//!             x: if at_rest { 0.1 } else { 7.5 },
//!             y: if at_rest { 0.2 } else { 6.0 },
//!             z: 9.8,
//!         }
//!     })
//!     .collect();
//!
//! let training = SensorFrame::from_observations(&readings).unwrap();
//! let validation = training.clone();
//!
//! let report = ClusterEvaluator::new().evaluate(&training, &validation).unwrap();
//! assert!(report.train_accuracy >= 0.0 && report.train_accuracy <= 100.0);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types
//! - [`data`]: Observation schema and the SensorFrame named-column table
//! - [`decomposition`]: PCA dimensionality reduction
//! - [`cluster`]: K-Means and the diagonal Gaussian mixture
//! - [`metrics`]: Accuracy and inertia
//! - [`evaluate`]: The ClusterEvaluator pipeline

pub mod cluster;
pub mod data;
pub mod decomposition;
pub mod error;
pub mod evaluate;
pub mod metrics;
pub mod prelude;
pub mod primitives;
pub mod traits;

pub use error::{AgruparError, Result};
pub use evaluate::{ClusterEvaluator, EvaluationReport};
pub use primitives::{Matrix, Vector};
pub use traits::{Transformer, UnsupervisedEstimator};
