use std::path::Path;
use std::sync::Arc;

use ndarray::Array2;
use shared::GrowthLabel;

use super::ArtifactError;
use super::frame::FeatureFrame;
use super::model::{Classifier, TreeModel};
use super::preprocess::{Preprocessor, StandardScaler};

/// Failures inside the preprocessing or prediction collaborators, or in
/// the scoring that consumes their output. Server faults, never retried.
#[allow(dead_code)]
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PipelineError {
    #[error("preprocessing failed: {0}")]
    Preprocess(String),
    #[error("prediction failed: {0}")]
    Predict(String),
    #[error("no label mapping for class code {0}")]
    UnmappedCode(i64),
    #[error("cannot run the pipeline on an empty feature batch")]
    EmptyBatch,
    #[error("labels and predictions have inconsistent lengths ({labels} vs {predictions})")]
    LabelMismatch { labels: usize, predictions: usize },
}

/// Immutable inference pipeline injected into request handlers.
///
/// The collaborators are loaded once at startup and shared read-only
/// across workers; per-request state never touches them.
#[derive(Clone)]
pub struct InferenceService {
    preprocessor: Arc<dyn Preprocessor>,
    model: Arc<dyn Classifier>,
}

impl InferenceService {
    pub fn new(preprocessor: Arc<dyn Preprocessor>, model: Arc<dyn Classifier>) -> Self {
        Self {
            preprocessor,
            model,
        }
    }

    pub fn load(preprocessor_path: &Path, model_path: &Path) -> Result<Self, ArtifactError> {
        let scaler = StandardScaler::load(preprocessor_path)?;
        let model = TreeModel::load(model_path)?;
        Ok(Self::new(Arc::new(scaler), Arc::new(model)))
    }

    pub fn transform(&self, frame: &FeatureFrame) -> Result<Array2<f64>, PipelineError> {
        self.preprocessor.transform(frame)
    }

    pub fn predict_codes(&self, frame: &FeatureFrame) -> Result<Vec<i64>, PipelineError> {
        let matrix = self.preprocessor.transform(frame)?;
        self.model.predict(&matrix)
    }

    /// Decoded label for the first row of the batch. The endpoint
    /// surfaces a single label even though the input accepts a batch.
    pub fn predict_label(&self, frame: &FeatureFrame) -> Result<GrowthLabel, PipelineError> {
        if frame.is_empty() {
            return Err(PipelineError::EmptyBatch);
        }
        let codes = self.predict_codes(frame)?;
        let first = codes.first().copied().ok_or(PipelineError::EmptyBatch)?;
        GrowthLabel::from_code(first).ok_or(PipelineError::UnmappedCode(first))
    }

    /// Fraction of position-aligned exact matches between the supplied
    /// ground truth and the model's predictions.
    pub fn accuracy(&self, frame: &FeatureFrame, labels: &[i64]) -> Result<f64, PipelineError> {
        let predictions = self.predict_codes(frame)?;
        if labels.is_empty() || predictions.is_empty() {
            return Err(PipelineError::EmptyBatch);
        }
        if labels.len() != predictions.len() {
            return Err(PipelineError::LabelMismatch {
                labels: labels.len(),
                predictions: predictions.len(),
            });
        }
        let matches = labels
            .iter()
            .zip(&predictions)
            .filter(|(label, prediction)| label == prediction)
            .count();
        Ok(matches as f64 / labels.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::testutil::{FailingPreprocessor, stub_service};
    use super::*;

    fn frame(rows: serde_json::Value) -> FeatureFrame {
        FeatureFrame::from_rows(rows.as_array().unwrap()).unwrap()
    }

    #[test]
    fn predict_label_decodes_first_code() {
        let (service, _, _) = stub_service(vec![2, 0]);
        let label = service
            .predict_label(&frame(json!([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])))
            .unwrap();
        assert_eq!(label, GrowthLabel::Baik);
    }

    #[test]
    fn predict_label_fails_on_unmapped_code() {
        let (service, _, _) = stub_service(vec![7]);
        assert_eq!(
            service.predict_label(&frame(json!([[1.0, 2.0, 3.0]]))),
            Err(PipelineError::UnmappedCode(7))
        );
    }

    #[test]
    fn predict_label_fails_on_empty_batch() {
        let (service, _, _) = stub_service(vec![]);
        assert_eq!(
            service.predict_label(&FeatureFrame::default()),
            Err(PipelineError::EmptyBatch)
        );
    }

    #[test]
    fn accuracy_is_exact_match_fraction() {
        let (service, _, _) = stub_service(vec![0, 1, 1]);
        let accuracy = service
            .accuracy(
                &frame(json!([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]])),
                &[0, 1, 2],
            )
            .unwrap();
        assert_eq!(accuracy, 2.0 / 3.0);
    }

    #[test]
    fn accuracy_of_perfect_predictions_is_one() {
        let (service, _, _) = stub_service(vec![1, 1]);
        let accuracy = service
            .accuracy(&frame(json!([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])), &[1, 1])
            .unwrap();
        assert_eq!(accuracy, 1.0);
    }

    #[test]
    fn accuracy_rejects_length_mismatch() {
        let (service, _, _) = stub_service(vec![0, 1]);
        assert_eq!(
            service.accuracy(&frame(json!([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])), &[0]),
            Err(PipelineError::LabelMismatch {
                labels: 1,
                predictions: 2
            })
        );
    }

    #[test]
    fn accuracy_rejects_empty_batch() {
        let (service, _, _) = stub_service(vec![]);
        assert_eq!(
            service.accuracy(&FeatureFrame::default(), &[]),
            Err(PipelineError::EmptyBatch)
        );
    }

    #[test]
    fn preprocessor_failure_aborts_the_request() {
        let (_, _, model) = stub_service(vec![0]);
        let service = InferenceService::new(Arc::new(FailingPreprocessor), model);
        assert!(matches!(
            service.predict_codes(&frame(json!([[1.0, 2.0, 3.0]]))),
            Err(PipelineError::Preprocess(_))
        ));
    }

    #[test]
    fn shipped_artifacts_load_and_round_trip() {
        let preprocessor_path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../trained-model/preprocessor.json");
        let model_path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../trained-model/chemato-weather-model.json");
        let service = InferenceService::load(&preprocessor_path, &model_path).unwrap();

        let batch = frame(json!([[120.0, 27.5, 80.0], [980.0, 30.0, 64.0]]));
        let codes = service.predict_codes(&batch).unwrap();
        assert_eq!(codes.len(), 2);

        // Feeding the transform output straight into the classifier must
        // agree with what the predict path reports for the same raw rows.
        let transformed = service.transform(&batch).unwrap();
        let direct = TreeModel::load(&model_path)
            .unwrap()
            .predict(&transformed)
            .unwrap();
        assert_eq!(direct, codes);

        // Identical input, identical artifacts, identical output.
        assert_eq!(service.predict_codes(&batch).unwrap(), codes);
    }
}
