use crate::domain::model::{CatalogTable, TransformResult};
use crate::utils::error::{QuakeError, Result};
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// CSV 路徑或 http(s) 目錄查詢網址
    fn source(&self) -> &str;
    fn output_path(&self) -> &str;
    fn depth_column(&self) -> &str;
    fn include_danger(&self) -> bool;
    /// 設定時輸出打包成此 ZIP 檔名
    fn archive_name(&self) -> Option<&str>;
    fn delimiter(&self) -> u8 {
        b','
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<CatalogTable>;
    async fn transform(&self, table: CatalogTable) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}

/// Raw output of an external classifier.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput {
    Class(i64),
    Probabilities(Vec<f64>),
}

impl ModelOutput {
    /// 直接回傳類別，或取機率最大者 (同分取第一個)
    pub fn class_index(&self) -> Result<i64> {
        match self {
            ModelOutput::Class(index) => Ok(*index),
            ModelOutput::Probabilities(probs) => {
                if probs.is_empty() {
                    return Err(QuakeError::ProcessingError {
                        message: "empty probability vector".to_string(),
                    });
                }
                if probs.iter().any(|p| !p.is_finite()) {
                    return Err(QuakeError::ProcessingError {
                        message: "probability vector contains non-finite values".to_string(),
                    });
                }
                let mut best = 0;
                for (i, p) in probs.iter().enumerate() {
                    if *p > probs[best] {
                        best = i;
                    }
                }
                Ok(best as i64)
            }
        }
    }
}

/// A loaded classifier. Implementations live outside the core.
#[async_trait]
pub trait ClassModel: Send + Sync {
    async fn predict(&self, features: &[f64]) -> Result<ModelOutput>;
}
