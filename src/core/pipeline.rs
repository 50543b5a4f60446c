use crate::core::classifier::{classify_batch, summarize};
use crate::core::export::{depth_column_index, export_table};
use crate::domain::model::{BatchSummary, CatalogTable, TransformResult};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::{QuakeError, Result};
use crate::utils::validation::is_http_source;
use reqwest::Client;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const CSV_FILENAME: &str = "classified.csv";
pub const SUMMARY_FILENAME: &str = "summary.json";

/// Catalog → depth classification → CSV/JSON (optionally zipped).
pub struct CatalogPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> CatalogPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }

    async fn fetch_source(&self) -> Result<Vec<u8>> {
        let source = self.config.source();

        if is_http_source(source) {
            tracing::debug!("Fetching catalog from: {}", source);
            let response = self.client.get(source).send().await?;
            tracing::debug!("Catalog response status: {}", response.status());
            let body = response.error_for_status()?.bytes().await?;
            Ok(body.to_vec())
        } else {
            tracing::debug!("Reading catalog file: {}", source);
            self.storage.read_file(source).await
        }
    }

    fn output_file(&self, name: &str) -> String {
        let base = self.config.output_path().trim_end_matches('/');
        if base.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", base, name)
        }
    }
}

/// 解析 CSV，允許欄位數不一致的列；資料列保留原始位元組
pub fn parse_catalog(data: &[u8], delimiter: u8) -> Result<CatalogTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let rows = reader
        .byte_records()
        .collect::<std::result::Result<Vec<_>, csv::Error>>()?;

    Ok(CatalogTable { headers, rows })
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CatalogPipeline<S, C> {
    async fn extract(&self) -> Result<CatalogTable> {
        let data = self.fetch_source().await?;
        let table = parse_catalog(&data, self.config.delimiter())?;

        if table.headers.is_empty() {
            return Err(QuakeError::ValidationError {
                message: format!("Catalog '{}' has no header row", self.config.source()),
            });
        }

        Ok(table)
    }

    async fn transform(&self, table: CatalogTable) -> Result<TransformResult> {
        let depth_idx = depth_column_index(&table.headers, self.config.depth_column())?;

        // 非 UTF-8 的深度欄位視為無效
        let batch = classify_batch(
            table
                .rows
                .iter()
                .map(|row| row.get(depth_idx).and_then(|cell| std::str::from_utf8(cell).ok())),
        );
        let counts = summarize(batch.valid_categories());

        if batch.dropped > 0 {
            tracing::warn!(
                "⚠️ Dropped {} rows with unparseable depth values",
                batch.dropped
            );
        }

        let csv_output = export_table(
            &table,
            &batch.classifications,
            self.config.include_danger(),
            self.config.delimiter(),
        )?;

        let summary = BatchSummary {
            source: self.config.source().to_string(),
            total_rows: batch.len(),
            valid_rows: counts.total(),
            dropped_rows: batch.dropped,
            counts,
            generated_at: chrono::Utc::now(),
        };

        for (category, count) in summary.counts.iter() {
            tracing::debug!("{}: {}", category.label(), count);
        }

        Ok(TransformResult {
            summary,
            csv_output,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let summary_json = serde_json::to_string_pretty(&result.summary)?;

        match self.config.archive_name() {
            Some(archive_name) => {
                let archive_path = self.output_file(archive_name);

                let zip_data = {
                    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

                    zip.start_file::<_, ()>(CSV_FILENAME, FileOptions::default())?;
                    zip.write_all(&result.csv_output)?;

                    zip.start_file::<_, ()>(SUMMARY_FILENAME, FileOptions::default())?;
                    zip.write_all(summary_json.as_bytes())?;

                    let cursor = zip.finish()?;
                    cursor.into_inner()
                };

                tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
                self.storage.write_file(&archive_path, &zip_data).await?;
                Ok(archive_path)
            }
            None => {
                let csv_path = self.output_file(CSV_FILENAME);
                self.storage
                    .write_file(&csv_path, &result.csv_output)
                    .await?;
                self.storage
                    .write_file(&self.output_file(SUMMARY_FILENAME), summary_json.as_bytes())
                    .await?;
                Ok(csv_path)
            }
        }
    }
}
