use httpmock::prelude::*;
use quake_depth::config::BatchArgs;
use quake_depth::{BatchEngine, CatalogPipeline, LocalStorage, TomlConfig};
use std::io::Read;
use tempfile::TempDir;

const CATALOG: &str = "time,latitude,longitude,depth,mag,magType\n\
    2023-02-01T03:14:00Z,-6.31,120.10,5,5.0,mb\n\
    2023-02-02T11:02:00Z,-7.12,110.40,50,4.6,mb\n\
    2023-02-03T08:45:00Z,-8.04,118.22,120,5.4,mww\n\
    2023-02-04T19:30:00Z,-5.20,125.91,230,6.1,mww\n\
    2023-02-05T23:59:00Z,-6.90,123.33,400,5.8,mww\n\
    2023-02-06T00:10:00Z,-3.10,128.00,x,4.2,mb\n";

fn read_zip_entry(archive: &mut zip::ZipArchive<std::io::Cursor<Vec<u8>>>, name: &str) -> String {
    let mut file = archive.by_name(name).unwrap();
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    content
}

#[tokio::test]
async fn test_end_to_end_batch_from_local_file() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("catalog.csv");
    std::fs::write(&input_path, CATALOG).unwrap();
    let output_path = temp_dir.path().join("out");

    let args = BatchArgs {
        input: Some(input_path.to_str().unwrap().to_string()),
        output_path: Some(output_path.to_str().unwrap().to_string()),
        danger: true,
        ..Default::default()
    };

    let pipeline = CatalogPipeline::new(LocalStorage::new("."), args);
    let engine = BatchEngine::new(pipeline);
    let result = engine.run().await;

    assert!(result.is_ok(), "{:?}", result.err());
    assert!(result.unwrap().ends_with("classified.csv"));

    let csv_content = std::fs::read_to_string(output_path.join("classified.csv")).unwrap();
    let lines: Vec<&str> = csv_content.lines().collect();
    assert_eq!(
        lines[0],
        "time,latitude,longitude,depth,mag,magType,danger_tier,depth_category"
    );
    assert_eq!(lines.len(), 7);
    assert!(lines[1].ends_with(",5,5.0,mb,High,Shallow"));
    assert!(lines[3].ends_with(",120,5.4,mww,Medium,Intermediate"));
    assert!(lines[5].ends_with(",400,5.8,mww,Low,Deep"));
    assert!(lines[6].ends_with(",x,4.2,mb,,Invalid"));

    let summary: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(output_path.join("summary.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(summary["total_rows"], 6);
    assert_eq!(summary["valid_rows"], 5);
    assert_eq!(summary["dropped_rows"], 1);
    assert_eq!(
        summary["counts"],
        serde_json::json!({"Shallow": 2, "Intermediate": 2, "Deep": 1})
    );
}

#[tokio::test]
async fn test_end_to_end_batch_from_http_catalog_with_toml() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().replace('\\', "/");

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/fdsnws/event/1/query.csv");
        then.status(200)
            .header("Content-Type", "text/csv")
            .body(CATALOG);
    });

    let config_content = format!(
        r#"
[source]
input = "{}"

[load]
output_path = "{}"

[load.compression]
enabled = true
filename = "classified.zip"
"#,
        server.url("/fdsnws/event/1/query.csv"),
        output_path
    );
    let config = TomlConfig::from_toml_str(&config_content).unwrap();

    let pipeline = CatalogPipeline::new(LocalStorage::new("."), config);
    let engine = BatchEngine::new_with_monitoring(pipeline, true);
    let result = engine.run().await;

    assert!(result.is_ok(), "{:?}", result.err());
    api_mock.assert();

    let zip_path = std::path::Path::new(&output_path).join("classified.zip");
    assert!(zip_path.exists());

    let zip_data = std::fs::read(&zip_path).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    assert_eq!(archive.len(), 2);

    let csv_content = read_zip_entry(&mut archive, "classified.csv");
    assert!(csv_content.starts_with("time,latitude,longitude,depth,mag,magType,depth_category\n"));
    assert!(csv_content.contains(",230,6.1,mww,Intermediate\n"));

    let summary: serde_json::Value =
        serde_json::from_str(&read_zip_entry(&mut archive, "summary.json")).unwrap();
    assert_eq!(summary["counts"]["Deep"], 1);
    assert!(summary["source"]
        .as_str()
        .unwrap()
        .ends_with("/fdsnws/event/1/query.csv"));
}

#[tokio::test]
async fn test_end_to_end_with_catalog_failure() {
    let temp_dir = TempDir::new().unwrap();

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/failed.csv");
        then.status(500);
    });

    let args = BatchArgs {
        input: Some(server.url("/failed.csv")),
        output_path: Some(temp_dir.path().to_str().unwrap().to_string()),
        ..Default::default()
    };

    let pipeline = CatalogPipeline::new(LocalStorage::new("."), args);
    let result = BatchEngine::new(pipeline).run().await;

    api_mock.assert();
    let err = result.unwrap_err();
    assert!(matches!(err, quake_depth::QuakeError::HttpError(_)));
    assert!(!temp_dir.path().join("classified.csv").exists());
}

#[tokio::test]
async fn test_semicolon_catalog_with_custom_depth_column() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("bmkg.csv");
    std::fs::write(&input_path, "tgl;Kedalaman;mag\n2021-01-01;70;5.0\n2021-01-02;300;5.2\n")
        .unwrap();

    let args = BatchArgs {
        input: Some(input_path.to_str().unwrap().to_string()),
        output_path: Some(temp_dir.path().to_str().unwrap().to_string()),
        depth_column: Some("kedalaman".to_string()),
        delimiter: Some(';'),
        ..Default::default()
    };

    let pipeline = CatalogPipeline::new(LocalStorage::new("."), args);
    BatchEngine::new(pipeline).run().await.unwrap();

    let csv_content = std::fs::read_to_string(temp_dir.path().join("classified.csv")).unwrap();
    assert_eq!(
        csv_content,
        "tgl;Kedalaman;mag;depth_category\n2021-01-01;70;5.0;Intermediate\n2021-01-02;300;5.2;Intermediate\n"
    );
}
