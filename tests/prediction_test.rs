use anyhow::Result;
use httpmock::prelude::*;
use quake_depth::{
    label_for_model_class, predict_depth_class, DangerTier, FeatureVector, ModelHandles,
    ModelVerdict, ModelsConfig,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn dashboard_features() -> FeatureVector {
    FeatureVector::from_json_str(
        r#"{
            "year": 2023, "latitude": -6.3, "longitude": 120.1, "mag": 5.0,
            "gap": 80, "dmin": 2.5, "rms": 0.7,
            "horizontalError": 8.0, "depthError": 5.0, "magError": 0.1
        }"#,
    )
    .unwrap()
}

fn scaler_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    let params = serde_json::json!({
        "mean": [2022.0, -5.0, 118.0, 4.5, 100.0, 2.0, 0.6, 7.0, 4.0, 0.1],
        "scale": [1.0, 2.0, 10.0, 0.5, 50.0, 1.0, 0.2, 2.0, 2.0, 0.05],
    });
    file.write_all(params.to_string().as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_both_models_served_over_http() -> Result<()> {
    let server = MockServer::start();

    let xgb_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/xgb")
            .json_body(serde_json::json!({
                "features": [2023.0, -6.3, 120.1, 5.0, 80.0, 2.5, 0.7, 8.0, 5.0, 0.1]
            }));
        then.status(200).json_body(serde_json::json!({"class": 0}));
    });

    let lstm_mock = server.mock(|when, then| {
        when.method(POST).path("/lstm");
        then.status(200)
            .json_body(serde_json::json!({"probabilities": [0.05, 0.15, 0.8]}));
    });

    let scaler = scaler_file();
    let config = ModelsConfig {
        tree_endpoint: Some(server.url("/xgb")),
        sequence_endpoint: Some(server.url("/lstm")),
        scaler_path: Some(scaler.path().to_str().unwrap().to_string()),
        timeout_seconds: Some(5),
    };

    let handles = ModelHandles::from_config(&config);
    let report = predict_depth_class(&handles, &dashboard_features()).await;

    xgb_mock.assert();
    lstm_mock.assert();

    assert_eq!(report.tree.class_index, Some(0));
    assert_eq!(report.tree.verdict.label(), "Shallow (<70 km)");
    assert_eq!(report.tree.verdict.danger(), Some(DangerTier::High));

    assert_eq!(report.sequence.class_index, Some(2));
    assert_eq!(report.sequence.verdict.label(), "Deep (>300 km)");
    assert_eq!(report.sequence.verdict.danger(), Some(DangerTier::Low));
    Ok(())
}

#[tokio::test]
async fn test_model_outage_degrades_per_model() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/xgb");
        then.status(200).json_body(serde_json::json!({"class": 7}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/lstm");
        then.status(502);
    });

    let scaler = scaler_file();
    let config = ModelsConfig {
        tree_endpoint: Some(server.url("/xgb")),
        sequence_endpoint: Some(server.url("/lstm")),
        scaler_path: Some(scaler.path().to_str().unwrap().to_string()),
        timeout_seconds: Some(5),
    };

    let handles = ModelHandles::from_config(&config);
    let report = predict_depth_class(&handles, &dashboard_features()).await;

    assert_eq!(report.tree.verdict, ModelVerdict::UnknownClass(7));
    assert_eq!(report.tree.verdict.danger_label(), "Unknown");
    assert_eq!(report.sequence.verdict, ModelVerdict::Unavailable);
    assert_eq!(report.sequence.verdict.label(), "Model unavailable");
    Ok(())
}

#[tokio::test]
async fn test_no_models_configured() {
    let handles = ModelHandles::from_config(&ModelsConfig::default());
    let report = predict_depth_class(&handles, &dashboard_features()).await;

    assert_eq!(report.tree.verdict, ModelVerdict::Unavailable);
    assert_eq!(report.sequence.verdict, ModelVerdict::Unavailable);
}

#[test]
fn test_model_class_stream_labels() {
    let verdicts: Vec<ModelVerdict> = [0, 1, 2, 7].into_iter().map(label_for_model_class).collect();

    let danger: Vec<&str> = verdicts.iter().map(|v| v.danger_label()).collect();
    assert_eq!(danger, vec!["High", "Medium", "Low", "Unknown"]);
    assert_eq!(verdicts[3].label(), "Unknown");
}
