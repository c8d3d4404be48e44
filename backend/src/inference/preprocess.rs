use std::fs;
use std::path::Path;

use ndarray::Array2;
use serde::Deserialize;

use super::ArtifactError;
use super::frame::{COLUMNS, FeatureFrame};
use super::service::PipelineError;

/// Fixed, pre-fitted numeric transform applied to raw feature rows
/// before prediction. Implementations are pure and stateless per call.
pub trait Preprocessor: Send + Sync {
    fn transform(&self, frame: &FeatureFrame) -> Result<Array2<f64>, PipelineError>;
}

/// Standard scaler exported from the training pipeline: per-column
/// `(x - mean) / scale`, fitted once at artifact-build time and frozen.
#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    columns: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let raw = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let scaler: StandardScaler =
            serde_json::from_str(&raw).map_err(|source| ArtifactError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        scaler.validate(path)?;
        Ok(scaler)
    }

    fn validate(&self, path: &Path) -> Result<(), ArtifactError> {
        let invalid = |reason: String| ArtifactError::Invalid {
            path: path.display().to_string(),
            reason,
        };

        if self.columns.iter().map(String::as_str).ne(COLUMNS) {
            return Err(invalid(format!(
                "column order {:?} does not match the canonical {:?}",
                self.columns, COLUMNS
            )));
        }
        if self.mean.len() != COLUMNS.len() || self.scale.len() != COLUMNS.len() {
            return Err(invalid(format!(
                "expected {} mean/scale entries, found {}/{}",
                COLUMNS.len(),
                self.mean.len(),
                self.scale.len()
            )));
        }
        if let Some(i) = self.scale.iter().position(|s| *s == 0.0 || !s.is_finite()) {
            return Err(invalid(format!(
                "scale for column \"{}\" is zero or non-finite",
                COLUMNS[i]
            )));
        }
        Ok(())
    }
}

impl Preprocessor for StandardScaler {
    fn transform(&self, frame: &FeatureFrame) -> Result<Array2<f64>, PipelineError> {
        let mut matrix = frame.to_matrix();
        for ((_, j), x) in matrix.indexed_iter_mut() {
            *x = (*x - self.mean[j]) / self.scale[j];
        }
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::frame::FeatureRow;
    use super::*;

    fn scaler(value: serde_json::Value) -> StandardScaler {
        serde_json::from_value(value).unwrap()
    }

    fn fitted() -> StandardScaler {
        scaler(json!({
            "columns": ["lux", "temp", "humid"],
            "mean": [10.0, 20.0, 30.0],
            "scale": [2.0, 4.0, 5.0],
        }))
    }

    #[test]
    fn transforms_per_column() {
        let frame = FeatureFrame::from(vec![FeatureRow {
            lux: 12.0,
            temp: 24.0,
            humid: 40.0,
        }]);
        let matrix = fitted().transform(&frame).unwrap();
        assert_eq!(matrix[[0, 0]], 1.0);
        assert_eq!(matrix[[0, 1]], 1.0);
        assert_eq!(matrix[[0, 2]], 2.0);
    }

    #[test]
    fn preserves_row_order() {
        let frame = FeatureFrame::from(vec![
            FeatureRow {
                lux: 10.0,
                temp: 20.0,
                humid: 30.0,
            },
            FeatureRow {
                lux: 14.0,
                temp: 20.0,
                humid: 30.0,
            },
        ]);
        let matrix = fitted().transform(&frame).unwrap();
        assert_eq!(matrix[[0, 0]], 0.0);
        assert_eq!(matrix[[1, 0]], 2.0);
    }

    #[test]
    fn empty_frame_transforms_to_empty_matrix() {
        let matrix = fitted().transform(&FeatureFrame::default()).unwrap();
        assert_eq!(matrix.shape(), &[0, 3]);
    }

    #[test]
    fn validate_rejects_wrong_column_order() {
        let scaler = scaler(json!({
            "columns": ["temp", "lux", "humid"],
            "mean": [0.0, 0.0, 0.0],
            "scale": [1.0, 1.0, 1.0],
        }));
        assert!(scaler.validate(Path::new("preprocessor.json")).is_err());
    }

    #[test]
    fn validate_rejects_wrong_width() {
        let scaler = scaler(json!({
            "columns": ["lux", "temp", "humid"],
            "mean": [0.0, 0.0],
            "scale": [1.0, 1.0, 1.0],
        }));
        assert!(scaler.validate(Path::new("preprocessor.json")).is_err());
    }

    #[test]
    fn validate_rejects_zero_scale() {
        let scaler = scaler(json!({
            "columns": ["lux", "temp", "humid"],
            "mean": [0.0, 0.0, 0.0],
            "scale": [1.0, 0.0, 1.0],
        }));
        assert!(scaler.validate(Path::new("preprocessor.json")).is_err());
    }
}
