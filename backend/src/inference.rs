use ort::session::builder::GraphOptimizationLevel;
use ort::session::{Session, SessionInputValue};
use ort::value::Tensor;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{FeatureRecord, FeatureValue, Prediction, PredictionRequest};

/// A fitted transformation-plus-model that scores one structured record.
pub trait Pipeline: Send + Sync {
    /// Column names in the order the pipeline was fitted on.
    fn expected_columns(&self) -> &[String];

    fn predict(&self, record: &FeatureRecord) -> anyhow::Result<f64>;

    fn describe(&self) -> String {
        "pipeline".to_string()
    }
}

/// Rating pipeline exported to ONNX with one `[1, 1]` input per column.
///
/// Runs on ONNX Runtime, which carries the `ai.onnx.ml` operators
/// (`TreeEnsembleRegressor`, `OneHotEncoder`, ...) scikit-learn exports use.
pub struct OnnxPipeline {
    session: Session,
    columns: Vec<String>,
    path: PathBuf,
}

impl OnnxPipeline {
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let path = model_path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(AppError::MissingFile { path });
        }

        let session = Session::builder()
            .and_then(|builder| builder.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|builder| builder.commit_from_file(&path))
            .map_err(anyhow::Error::from)?;
        let columns = session
            .inputs
            .iter()
            .map(|input| input.name.clone())
            .collect::<Vec<_>>();

        log::debug!("Loaded ONNX pipeline {} with inputs {:?}", path.display(), columns);

        Ok(Self {
            session,
            columns,
            path,
        })
    }

    fn input_value(value: &FeatureValue) -> anyhow::Result<SessionInputValue<'static>> {
        let shape = vec![1_i64, 1];
        let input = match value {
            FeatureValue::Text(text) => {
                Tensor::from_string_array((shape, vec![text.clone()]))?.into()
            }
            FeatureValue::Number(number) => {
                Tensor::from_array((shape, vec![*number as f32]))?.into()
            }
        };
        Ok(input)
    }
}

impl Pipeline for OnnxPipeline {
    fn expected_columns(&self) -> &[String] {
        &self.columns
    }

    fn predict(&self, record: &FeatureRecord) -> anyhow::Result<f64> {
        let mut inputs: Vec<(String, SessionInputValue<'static>)> =
            Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let value = record
                .get(column)
                .ok_or_else(|| anyhow::anyhow!("record has no column '{column}'"))?;
            inputs.push((column.clone(), Self::input_value(value)?));
        }

        let outputs = self.session.run(inputs)?;
        if outputs.len() == 0 {
            anyhow::bail!("pipeline returned no outputs");
        }
        let (_, scores) = outputs[0].try_extract_raw_tensor::<f32>()?;
        let score = scores
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("pipeline returned an empty prediction"))?;

        Ok(score as f64)
    }

    fn describe(&self) -> String {
        format!("onnx:{}", self.path.display())
    }
}

/// Turns form values into a displayed rating via a shared pipeline.
#[derive(Clone)]
pub struct PredictionAdapter {
    pipeline: Arc<dyn Pipeline>,
}

impl PredictionAdapter {
    pub fn new(pipeline: Arc<dyn Pipeline>) -> Self {
        Self { pipeline }
    }

    pub fn predict(&self, request: &PredictionRequest) -> Result<Prediction> {
        let record = request.to_record()?;
        self.check_schema(&record)?;

        let raw_score = self.pipeline.predict(&record)?;
        Prediction::from_log_score(raw_score)
    }

    /// Rounded rating as shown to the user.
    pub fn predict_rating(&self, request: &PredictionRequest) -> Result<f64> {
        self.predict(request).map(|prediction| prediction.rounded)
    }

    fn check_schema(&self, record: &FeatureRecord) -> Result<()> {
        let expected = self.pipeline.expected_columns();
        let found = record.columns();
        if expected.iter().map(String::as_str).ne(found.iter().copied()) {
            return Err(AppError::SchemaMismatch {
                expected: expected.to_vec(),
                found: found.into_iter().map(String::from).collect(),
            });
        }
        Ok(())
    }

    pub fn get_model_info(&self) -> ModelInfo {
        ModelInfo {
            pipeline: self.pipeline.describe(),
            features: self.pipeline.expected_columns().to_vec(),
            target_transform: "log".to_string(),
            output_decimals: 2,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub pipeline: String,
    pub features: Vec<String>,
    pub target_transform: String,
    pub output_decimals: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{sample_request, CostCategory, FEATURE_COLUMNS};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedPipeline {
        columns: Vec<String>,
        score: f64,
        calls: AtomicUsize,
    }

    impl FixedPipeline {
        fn new(score: f64) -> Self {
            Self::with_columns(&FEATURE_COLUMNS, score)
        }

        fn with_columns(columns: &[&str], score: f64) -> Self {
            Self {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                score,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Pipeline for FixedPipeline {
        fn expected_columns(&self) -> &[String] {
            &self.columns
        }

        fn predict(&self, record: &FeatureRecord) -> anyhow::Result<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(record.len(), self.columns.len());
            Ok(self.score)
        }
    }

    struct FailingPipeline(Vec<String>);

    impl Pipeline for FailingPipeline {
        fn expected_columns(&self) -> &[String] {
            &self.0
        }

        fn predict(&self, _record: &FeatureRecord) -> anyhow::Result<f64> {
            anyhow::bail!("Found unknown categories ['Fine Dining'] in column 7")
        }
    }

    #[test]
    fn stubbed_score_is_exponentiated() {
        let adapter = PredictionAdapter::new(Arc::new(FixedPipeline::new(1.5)));
        let mut request = sample_request("4.2");
        request.cost_category = CostCategory::Low;

        assert_eq!(adapter.predict_rating(&request).unwrap(), 4.48);
    }

    #[test]
    fn predictions_are_finite_and_positive() {
        for score in [-3.0, 0.0, 0.7, 1.3, 1.6, 5.0] {
            let adapter = PredictionAdapter::new(Arc::new(FixedPipeline::new(score)));
            for rate in ["0", "2.5", "4.9", "-1"] {
                let prediction = adapter.predict(&sample_request(rate)).unwrap();
                assert!(prediction.predicted_rating.is_finite());
                assert!(prediction.predicted_rating > 0.0);
            }
        }
    }

    #[test]
    fn bad_rate_never_reaches_pipeline() {
        let pipeline = Arc::new(FixedPipeline::new(1.0));
        let adapter = PredictionAdapter::new(pipeline.clone());

        let err = adapter.predict(&sample_request("four")).unwrap_err();
        assert!(matches!(err, AppError::TypeConversion { field: "rate", .. }));
        assert_eq!(pipeline.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn schema_mismatch_fails_fast() {
        let mut reordered = FEATURE_COLUMNS.to_vec();
        reordered.swap(0, 1);
        let missing = &FEATURE_COLUMNS[..15];

        for columns in [reordered.as_slice(), missing] {
            let pipeline = Arc::new(FixedPipeline::with_columns(columns, 1.0));
            let adapter = PredictionAdapter::new(pipeline.clone());

            match adapter.predict(&sample_request("4.0")) {
                Err(AppError::SchemaMismatch { expected, found }) => {
                    assert_eq!(expected.len(), columns.len());
                    assert_eq!(found, FEATURE_COLUMNS.to_vec());
                }
                other => panic!("expected schema mismatch, got {other:?}"),
            }
            assert_eq!(pipeline.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[test]
    fn pipeline_errors_propagate() {
        let columns = FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect();
        let adapter = PredictionAdapter::new(Arc::new(FailingPipeline(columns)));

        let err = adapter.predict(&sample_request("3.9")).unwrap_err();
        assert!(matches!(err, AppError::Pipeline(_)));
        assert!(err.to_string().contains("unknown categories"));
    }

    #[test]
    fn missing_artifact_is_reported() {
        let err = OnnxPipeline::load("does/not/exist/RF_pipeline.onnx")
            .err()
            .expect("load should fail");
        assert!(matches!(err, AppError::MissingFile { .. }));
        assert!(err.to_string().contains("RF_pipeline.onnx"));
    }

    #[test]
    fn model_info_lists_pipeline_schema() {
        let adapter = PredictionAdapter::new(Arc::new(FixedPipeline::new(1.0)));
        let info = adapter.get_model_info();
        assert_eq!(info.features.len(), 16);
        assert_eq!(info.features[5], "rate");
        assert_eq!(info.target_transform, "log");
    }
}
