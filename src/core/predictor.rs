use crate::adapters::http_model::HttpModel;
use crate::config::toml_config::ModelsConfig;
use crate::core::classifier::label_for_model_class;
use crate::core::scaler::StandardScaler;
use crate::domain::features::FeatureVector;
use crate::domain::model::{ModelKind, ModelVerdict};
use crate::domain::ports::ClassModel;
use crate::utils::error::{QuakeError, Result};
use serde::Serialize;
use std::sync::Arc;

/// Loaded model collaborators, built once and shared by reference.
///
/// Each piece is optional; a missing piece makes the matching model report
/// [`ModelVerdict::Unavailable`] instead of failing the whole request.
#[derive(Clone, Default)]
pub struct ModelHandles {
    tree: Option<Arc<dyn ClassModel>>,
    sequence: Option<Arc<dyn ClassModel>>,
    scaler: Option<StandardScaler>,
}

impl ModelHandles {
    pub fn new(
        tree: Option<Arc<dyn ClassModel>>,
        sequence: Option<Arc<dyn ClassModel>>,
        scaler: Option<StandardScaler>,
    ) -> Self {
        Self {
            tree,
            sequence,
            scaler,
        }
    }

    /// 依設定載入模型；載入失敗只記錄警告
    pub fn from_config(config: &ModelsConfig) -> Self {
        let timeout = config.timeout();

        let connect = |kind: ModelKind, endpoint: Option<&String>| -> Option<Arc<dyn ClassModel>> {
            let endpoint = endpoint?;
            match HttpModel::connect(kind.name(), endpoint, timeout) {
                Ok(model) => Some(Arc::new(model) as Arc<dyn ClassModel>),
                Err(e) => {
                    tracing::warn!("⚠️ {} model not loaded: {}", kind, e);
                    None
                }
            }
        };

        let tree = connect(ModelKind::GradientBoostedTree, config.tree_endpoint.as_ref());
        let sequence = connect(ModelKind::Sequence, config.sequence_endpoint.as_ref());

        let scaler = config.scaler_path.as_ref().and_then(|path| {
            match StandardScaler::from_file(path) {
                Ok(scaler) => Some(scaler),
                Err(e) => {
                    tracing::warn!("⚠️ Scaler not loaded from {}: {}", path, e);
                    None
                }
            }
        });

        let handles = Self::new(tree, sequence, scaler);
        tracing::info!(
            tree = handles.tree.is_some(),
            sequence = handles.sequence.is_some(),
            scaler = handles.scaler.is_some(),
            "🧠 Model handles ready"
        );
        handles
    }

    pub fn has_tree(&self) -> bool {
        self.tree.is_some()
    }

    pub fn has_sequence(&self) -> bool {
        self.sequence.is_some() && self.scaler.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelPrediction {
    pub model: ModelKind,
    pub class_index: Option<i64>,
    pub verdict: ModelVerdict,
}

impl ModelPrediction {
    fn unavailable(model: ModelKind) -> Self {
        Self {
            model,
            class_index: None,
            verdict: ModelVerdict::Unavailable,
        }
    }
}

impl Serialize for ModelPrediction {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ModelPrediction", 5)?;
        state.serialize_field("model", &self.model)?;
        state.serialize_field("class", &self.class_index)?;
        state.serialize_field("label", self.verdict.label())?;
        state.serialize_field("danger", self.verdict.danger_label())?;
        state.serialize_field("color", self.verdict.color())?;
        state.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PredictionReport {
    #[serde(rename = "XGBoost")]
    pub tree: ModelPrediction,
    #[serde(rename = "LSTM")]
    pub sequence: ModelPrediction,
}

async fn run_model(
    kind: ModelKind,
    model: Option<&Arc<dyn ClassModel>>,
    input: Result<Vec<f64>>,
) -> ModelPrediction {
    let Some(model) = model else {
        tracing::debug!("{} model not configured", kind);
        return ModelPrediction::unavailable(kind);
    };

    let outcome = match input {
        Ok(input) => match model.predict(&input).await {
            Ok(output) => output.class_index(),
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };

    match outcome {
        Ok(class_index) => ModelPrediction {
            model: kind,
            class_index: Some(class_index),
            verdict: label_for_model_class(class_index),
        },
        Err(e) => {
            tracing::warn!("⚠️ {} prediction unavailable: {}", kind, e);
            ModelPrediction::unavailable(kind)
        }
    }
}

/// Runs both classifiers on one feature vector.
///
/// The tree model sees raw features; the sequence model sees standardised
/// ones. Both requests run concurrently and never fail the call.
pub async fn predict_depth_class(
    handles: &ModelHandles,
    features: &FeatureVector,
) -> PredictionReport {
    let raw = Ok(features.to_array().to_vec());
    let scaled = handles
        .scaler
        .as_ref()
        .map(|scaler| scaler.transform(features).to_vec())
        .ok_or_else(|| QuakeError::ModelUnavailable {
            model: ModelKind::Sequence.name().to_string(),
            reason: "no scaler loaded".to_string(),
        });

    let (tree, sequence) = tokio::join!(
        run_model(ModelKind::GradientBoostedTree, handles.tree.as_ref(), raw),
        run_model(ModelKind::Sequence, handles.sequence.as_ref(), scaled),
    );

    PredictionReport { tree, sequence }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{DangerTier, DepthCategory};
    use crate::domain::ports::ModelOutput;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedModel {
        output: Result<ModelOutput>,
        seen: Mutex<Vec<Vec<f64>>>,
    }

    impl FixedModel {
        fn new(output: Result<ModelOutput>) -> Arc<Self> {
            Arc::new(Self {
                output,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ClassModel for FixedModel {
        async fn predict(&self, features: &[f64]) -> Result<ModelOutput> {
            self.seen.lock().unwrap().push(features.to_vec());
            match &self.output {
                Ok(output) => Ok(output.clone()),
                Err(e) => Err(QuakeError::PredictionError {
                    model: "fixed".to_string(),
                    message: e.to_string(),
                }),
            }
        }
    }

    fn features() -> FeatureVector {
        FeatureVector::from_slice(&[2023.0, -6.3, 120.1, 5.0, 80.0, 2.5, 0.7, 8.0, 5.0, 0.1])
            .unwrap()
    }

    fn unit_scaler() -> StandardScaler {
        StandardScaler::new(&[1.0; 10], &[2.0; 10]).unwrap()
    }

    #[tokio::test]
    async fn test_both_models_available() {
        let tree = FixedModel::new(Ok(ModelOutput::Class(0)));
        let sequence = FixedModel::new(Ok(ModelOutput::Probabilities(vec![0.1, 0.2, 0.7])));
        let handles = ModelHandles::new(
            Some(tree.clone()),
            Some(sequence.clone()),
            Some(unit_scaler()),
        );

        let report = predict_depth_class(&handles, &features()).await;

        assert_eq!(report.tree.verdict, ModelVerdict::Class(DepthCategory::Shallow));
        assert_eq!(report.tree.verdict.danger(), Some(DangerTier::High));
        assert_eq!(report.sequence.class_index, Some(2));
        assert_eq!(report.sequence.verdict.danger(), Some(DangerTier::Low));

        // 樹模型拿原始值，序列模型拿標準化後的值
        assert_eq!(tree.seen.lock().unwrap()[0][0], 2023.0);
        assert_eq!(sequence.seen.lock().unwrap()[0][0], 1011.0);
    }

    #[tokio::test]
    async fn test_missing_models_degrade() {
        let report = predict_depth_class(&ModelHandles::default(), &features()).await;
        assert_eq!(report.tree.verdict, ModelVerdict::Unavailable);
        assert_eq!(report.sequence.verdict, ModelVerdict::Unavailable);
        assert_eq!(report.tree.class_index, None);
    }

    #[tokio::test]
    async fn test_sequence_without_scaler_is_unavailable() {
        let sequence = FixedModel::new(Ok(ModelOutput::Class(1)));
        let handles = ModelHandles::new(None, Some(sequence.clone()), None);

        let report = predict_depth_class(&handles, &features()).await;

        assert_eq!(report.sequence.verdict, ModelVerdict::Unavailable);
        assert!(sequence.seen.lock().unwrap().is_empty());
        assert!(!handles.has_sequence());
    }

    #[tokio::test]
    async fn test_failures_and_unknown_classes() {
        let tree = FixedModel::new(Ok(ModelOutput::Class(7)));
        let sequence = FixedModel::new(Err(QuakeError::ProcessingError {
            message: "boom".to_string(),
        }));
        let handles = ModelHandles::new(Some(tree), Some(sequence), Some(unit_scaler()));

        let report = predict_depth_class(&handles, &features()).await;

        assert_eq!(report.tree.verdict, ModelVerdict::UnknownClass(7));
        assert_eq!(report.tree.verdict.label(), "Unknown");
        assert_eq!(report.sequence.verdict, ModelVerdict::Unavailable);
    }

    #[test]
    fn test_report_serializes_like_dashboard() {
        let tree = FixedModel::new(Ok(ModelOutput::Class(1)));
        let handles = ModelHandles::new(Some(tree), None, None);

        let report = tokio_test::block_on(predict_depth_class(&handles, &features()));
        let json = serde_json::to_value(report).unwrap();

        assert_eq!(json["XGBoost"]["class"], 1);
        assert_eq!(json["XGBoost"]["label"], "Intermediate (70-300 km)");
        assert_eq!(json["XGBoost"]["danger"], "Medium");
        assert_eq!(json["XGBoost"]["color"], "orange");
        assert_eq!(json["LSTM"]["label"], "Model unavailable");
        assert!(json["LSTM"]["class"].is_null());
    }

    #[test]
    fn test_from_config_skips_bad_pieces() {
        let config = ModelsConfig {
            tree_endpoint: Some("not-a-url".to_string()),
            sequence_endpoint: Some("http://localhost:9/predict".to_string()),
            scaler_path: Some("/definitely/missing/scaler.json".to_string()),
            timeout_seconds: Some(1),
        };

        let handles = ModelHandles::from_config(&config);

        assert!(!handles.has_tree());
        assert!(handles.sequence.is_some());
        assert!(!handles.has_sequence());
    }
}
