pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::Cli;
pub use config::{ModelsConfig, TomlConfig};

pub use adapters::{http_model::HttpModel, storage::LocalStorage};
pub use self::core::classifier::{
    category_for_km, classify, classify_batch, label_for_model_class, summarize,
};
pub use self::core::engine::BatchEngine;
pub use self::core::pipeline::CatalogPipeline;
pub use self::core::predictor::{predict_depth_class, ModelHandles, PredictionReport};
pub use self::core::scaler::StandardScaler;
pub use domain::features::{FeatureVector, FEATURE_ORDER};
pub use domain::model::{
    CategoryCounts, Classification, ClassificationResult, DangerTier, DepthCategory, DepthValue,
    ModelVerdict,
};
pub use utils::error::{QuakeError, Result};
