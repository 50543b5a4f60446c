pub mod classifier;
pub mod engine;
pub mod export;
pub mod pipeline;
pub mod predictor;
pub mod scaler;

pub use crate::domain::model::{CatalogTable, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
