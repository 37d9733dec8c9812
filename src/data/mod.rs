//! Tabular container for wearable sensor readings.
//!
//! Provides `Observation` (one typed sensor reading) and `SensorFrame`,
//! a minimal named-column f32 table. Heavy data wrangling (CSV parsing,
//! resampling) belongs to the caller; this module only models the fixed
//! schema the evaluation pipeline consumes.

use crate::error::{AgruparError, Result};
use crate::primitives::{Matrix, Vector};

/// Column holding the ground-truth exercise label.
pub const LABEL_COLUMN: &str = "exercise";

/// Columns excluded from the numeric projection.
///
/// Identifier, label, timestamp, the baseline oximeter readings, and the
/// derived acceleration magnitude are stripped before PCA; only the raw
/// wearable features (heart_rate, spo, x, y, z) are projected.
pub const PROJECTION_EXCLUDED_COLUMNS: [&str; 7] = [
    "index",
    "exercise",
    "time",
    "person_id",
    "spo_base",
    "heart_rate_base",
    "absolute",
];

/// One wearable sensor reading with its ground-truth exercise label.
///
/// `heart_rate` and `spo` come from the wearable, `heart_rate_base` and
/// `spo_base` from a commercial fingertip oximeter, and `x`/`y`/`z` from
/// the accompanying mobile device's accelerometer (m/s^2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Participant identifier.
    pub person_id: u32,
    /// Exercise type label (0 = no exercise, 1 = walking, ...).
    pub exercise: u8,
    /// Sample timestamp (seconds from session start).
    pub time: f32,
    /// Heart rate from the wearable.
    pub heart_rate: f32,
    /// Oxygen saturation from the wearable.
    pub spo: f32,
    /// Heart rate from the baseline oximeter.
    pub heart_rate_base: f32,
    /// Oxygen saturation from the baseline oximeter.
    pub spo_base: f32,
    /// Accelerometer X.
    pub x: f32,
    /// Accelerometer Y.
    pub y: f32,
    /// Accelerometer Z.
    pub z: f32,
}

impl Observation {
    /// Magnitude of the acceleration vector, the derived `absolute` column.
    #[must_use]
    pub fn absolute(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// A minimal named-column f32 table of sensor readings.
///
/// Thin wrapper around `Vec<(String, Vector<f32>)>` with the column
/// operations the evaluation pipeline needs.
///
/// # Examples
///
/// ```
/// use agrupar::data::SensorFrame;
/// use agrupar::primitives::Vector;
///
/// let frame = SensorFrame::new(vec![
///     ("heart_rate".to_string(), Vector::from_slice(&[70.0, 120.0])),
///     ("spo".to_string(), Vector::from_slice(&[98.0, 95.0])),
/// ]).unwrap();
/// assert_eq!(frame.shape(), (2, 2));
/// ```
#[derive(Debug, Clone)]
pub struct SensorFrame {
    columns: Vec<(String, Vector<f32>)>,
    n_rows: usize,
}

impl SensorFrame {
    /// Creates a frame from named columns.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no columns, columns have different
    /// lengths, a name is empty, or names are duplicated.
    pub fn new(columns: Vec<(String, Vector<f32>)>) -> Result<Self> {
        if columns.is_empty() {
            return Err("SensorFrame must have at least one column".into());
        }

        let n_rows = columns[0].1.len();
        for (name, col) in &columns {
            if col.len() != n_rows {
                return Err("All columns must have the same length".into());
            }
            if name.is_empty() {
                return Err("Column names cannot be empty".into());
            }
        }

        let mut names: Vec<&str> = columns.iter().map(|(n, _)| n.as_str()).collect();
        names.sort_unstable();
        for i in 1..names.len() {
            if names[i] == names[i - 1] {
                return Err("Duplicate column names not allowed".into());
            }
        }

        Ok(Self { columns, n_rows })
    }

    /// Builds a frame with the full wearable schema from typed readings.
    ///
    /// Produces the columns `index`, `exercise`, `time`, `person_id`,
    /// `heart_rate`, `spo`, `heart_rate_base`, `spo_base`, `x`, `y`, `z`,
    /// `absolute` in that order, with `index` the row position and
    /// `absolute` the derived acceleration magnitude.
    ///
    /// # Errors
    ///
    /// Returns an error if `observations` is empty.
    pub fn from_observations(observations: &[Observation]) -> Result<Self> {
        if observations.is_empty() {
            return Err(AgruparError::empty_input("observations"));
        }

        let n = observations.len();
        let mut cols: Vec<(String, Vec<f32>)> = [
            "index",
            "exercise",
            "time",
            "person_id",
            "heart_rate",
            "spo",
            "heart_rate_base",
            "spo_base",
            "x",
            "y",
            "z",
            "absolute",
        ]
        .iter()
        .map(|name| ((*name).to_string(), Vec::with_capacity(n)))
        .collect();

        for (i, obs) in observations.iter().enumerate() {
            let values = [
                i as f32,
                f32::from(obs.exercise),
                obs.time,
                obs.person_id as f32,
                obs.heart_rate,
                obs.spo,
                obs.heart_rate_base,
                obs.spo_base,
                obs.x,
                obs.y,
                obs.z,
                obs.absolute(),
            ];
            for (col, value) in cols.iter_mut().zip(values) {
                col.1.push(value);
            }
        }

        Self::new(
            cols.into_iter()
                .map(|(name, data)| (name, Vector::from_vec(data)))
                .collect(),
        )
    }

    /// Returns the shape as (`n_rows`, `n_cols`).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Returns the column names in storage order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Returns a reference to a column by name.
    ///
    /// # Errors
    ///
    /// Returns a schema error if the column doesn't exist.
    pub fn column(&self, name: &str) -> Result<&Vector<f32>> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .ok_or_else(|| AgruparError::missing_column(name))
    }

    /// Selects multiple columns by name, returning a new frame.
    ///
    /// # Errors
    ///
    /// Returns a schema error if any column doesn't exist.
    pub fn select(&self, names: &[&str]) -> Result<Self> {
        if names.is_empty() {
            return Err("Must select at least one column".into());
        }

        let mut selected = Vec::with_capacity(names.len());
        for &name in names {
            let col = self.column(name)?;
            selected.push((name.to_string(), col.clone()));
        }
        Self::new(selected)
    }

    /// Drops the named columns, returning a new frame with the remainder.
    ///
    /// Every listed name must be present: a missing column is a schema
    /// mismatch, not a no-op, so upstream data-preparation drift is
    /// surfaced instead of silently changing the feature set.
    ///
    /// # Errors
    ///
    /// Returns a schema error if a listed column doesn't exist, or an
    /// error if no columns would remain.
    pub fn drop_columns(&self, names: &[&str]) -> Result<Self> {
        for &name in names {
            if !self.columns.iter().any(|(n, _)| n == name) {
                return Err(AgruparError::missing_column(name));
            }
        }

        let remaining: Vec<(String, Vector<f32>)> = self
            .columns
            .iter()
            .filter(|(n, _)| !names.contains(&n.as_str()))
            .cloned()
            .collect();

        if remaining.is_empty() {
            return Err("Dropping all columns leaves an empty frame".into());
        }
        Self::new(remaining)
    }

    /// Converts the frame to a row-major Matrix with shape
    /// (`n_rows`, `n_cols`), columns in storage order.
    #[must_use]
    pub fn to_matrix(&self) -> Matrix<f32> {
        let mut data = Vec::with_capacity(self.n_rows * self.columns.len());
        for row_idx in 0..self.n_rows {
            for (_, col) in &self.columns {
                data.push(col[row_idx]);
            }
        }
        Matrix::from_vec(self.n_rows, self.columns.len(), data)
            .expect("frame dimensions match collected data length")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(exercise: u8, hr: f32) -> Observation {
        Observation {
            person_id: 1,
            exercise,
            time: 0.0,
            heart_rate: hr,
            spo: 98.0,
            heart_rate_base: hr + 2.0,
            spo_base: 97.0,
            x: 0.1,
            y: 0.2,
            z: 9.8,
        }
    }

    #[test]
    fn test_new_valid() {
        let frame = SensorFrame::new(vec![
            ("a".to_string(), Vector::from_slice(&[1.0, 2.0])),
            ("b".to_string(), Vector::from_slice(&[3.0, 4.0])),
        ])
        .unwrap();
        assert_eq!(frame.shape(), (2, 2));
        assert_eq!(frame.column_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_new_length_mismatch() {
        let result = SensorFrame::new(vec![
            ("a".to_string(), Vector::from_slice(&[1.0, 2.0])),
            ("b".to_string(), Vector::from_slice(&[3.0])),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_new_duplicate_names() {
        let result = SensorFrame::new(vec![
            ("a".to_string(), Vector::from_slice(&[1.0])),
            ("a".to_string(), Vector::from_slice(&[2.0])),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_observations_schema() {
        let frame = SensorFrame::from_observations(&[obs(0, 70.0), obs(1, 130.0)]).unwrap();
        assert_eq!(frame.shape(), (2, 12));
        assert_eq!(frame.column(LABEL_COLUMN).unwrap().as_slice(), &[0.0, 1.0]);
        // Every excluded column is present in the generated schema.
        for name in PROJECTION_EXCLUDED_COLUMNS {
            assert!(frame.column(name).is_ok(), "missing column {name}");
        }
    }

    #[test]
    fn test_from_observations_empty() {
        let result = SensorFrame::from_observations(&[]);
        assert!(matches!(
            result,
            Err(crate::error::AgruparError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_absolute_is_magnitude() {
        let o = Observation {
            x: 3.0,
            y: 4.0,
            z: 0.0,
            ..obs(0, 70.0)
        };
        assert!((o.absolute() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_column_missing_is_schema_error() {
        let frame = SensorFrame::from_observations(&[obs(0, 70.0)]).unwrap();
        let err = frame.column("nope").unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_drop_columns_retains_features() {
        let frame = SensorFrame::from_observations(&[obs(0, 70.0), obs(1, 120.0)]).unwrap();
        let features = frame.drop_columns(&PROJECTION_EXCLUDED_COLUMNS).unwrap();
        assert_eq!(
            features.column_names(),
            vec!["heart_rate", "spo", "x", "y", "z"]
        );
        assert_eq!(features.n_rows(), 2);
    }

    #[test]
    fn test_drop_columns_missing_fails() {
        let frame = SensorFrame::new(vec![(
            "heart_rate".to_string(),
            Vector::from_slice(&[70.0]),
        )])
        .unwrap();
        let err = frame.drop_columns(&["exercise"]).unwrap_err();
        assert!(err.to_string().contains("exercise"));
    }

    #[test]
    fn test_select() {
        let frame = SensorFrame::from_observations(&[obs(0, 70.0)]).unwrap();
        let sub = frame.select(&["x", "y"]).unwrap();
        assert_eq!(sub.column_names(), vec!["x", "y"]);
    }

    #[test]
    fn test_to_matrix_row_major() {
        let frame = SensorFrame::new(vec![
            ("a".to_string(), Vector::from_slice(&[1.0, 2.0])),
            ("b".to_string(), Vector::from_slice(&[3.0, 4.0])),
        ])
        .unwrap();
        let m = frame.to_matrix();
        assert_eq!(m.shape(), (2, 2));
        assert_eq!(m.row_slice(0), &[1.0, 3.0]);
        assert_eq!(m.row_slice(1), &[2.0, 4.0]);
    }
}
