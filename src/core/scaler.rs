use crate::domain::features::{FeatureVector, FEATURE_COUNT, FEATURE_ORDER};
use crate::utils::error::{QuakeError, Result};
use serde::Deserialize;
use std::path::Path;

/// Per-feature standardisation, `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
}

#[derive(Deserialize)]
struct ScalerParams {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: &[f64], scale: &[f64]) -> Result<Self> {
        for values in [mean, scale] {
            if values.len() != FEATURE_COUNT {
                return Err(QuakeError::FeatureArityError {
                    expected: FEATURE_COUNT,
                    actual: values.len(),
                });
            }
        }

        for (i, (m, s)) in mean.iter().zip(scale).enumerate() {
            if !m.is_finite() || !s.is_finite() || *s == 0.0 {
                return Err(QuakeError::ValidationError {
                    message: format!(
                        "Scaler parameters for '{}' are unusable (mean {}, scale {})",
                        FEATURE_ORDER[i], m, s
                    ),
                });
            }
        }

        let mut scaler = Self {
            mean: [0.0; FEATURE_COUNT],
            scale: [1.0; FEATURE_COUNT],
        };
        scaler.mean.copy_from_slice(mean);
        scaler.scale.copy_from_slice(scale);
        Ok(scaler)
    }

    /// 讀取 `{"mean": [...], "scale": [...]}` 格式的參數檔
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let params: ScalerParams = serde_json::from_str(content)?;
        Self::new(&params.mean, &params.scale)
    }

    pub fn transform(&self, features: &FeatureVector) -> [f64; FEATURE_COUNT] {
        let mut out = features.to_array();
        for (i, value) in out.iter_mut().enumerate() {
            *value = (*value - self.mean[i]) / self.scale[i];
        }
        out
    }
}
