use crate::utils::error::{QuakeError, Result};
use crate::utils::validation::{validate_range, Validate};
use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = 10;

/// Column order the trained models were fitted on.
pub const FEATURE_ORDER: [&str; FEATURE_COUNT] = [
    "year",
    "latitude",
    "longitude",
    "mag",
    "gap",
    "dmin",
    "rms",
    "horizontalError",
    "depthError",
    "magError",
];

/// Accepted input range per feature, same order as [`FEATURE_ORDER`].
pub const FEATURE_RANGES: [(f64, f64); FEATURE_COUNT] = [
    (2020.0, 2024.0),
    (-12.0, 6.0),
    (95.0, 141.0),
    (3.0, 8.0),
    (10.0, 300.0),
    (0.0, 30.0),
    (0.0, 2.0),
    (1.0, 25.0),
    (0.5, 30.0),
    (0.02, 1.0),
];

/// 模型輸入的十個地震目錄欄位
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureVector {
    pub year: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub mag: f64,
    pub gap: f64,
    pub dmin: f64,
    pub rms: f64,
    pub horizontal_error: f64,
    pub depth_error: f64,
    pub mag_error: f64,
}

impl FeatureVector {
    /// Builds a vector from values laid out in [`FEATURE_ORDER`].
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        if values.len() != FEATURE_COUNT {
            return Err(QuakeError::FeatureArityError {
                expected: FEATURE_COUNT,
                actual: values.len(),
            });
        }

        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(QuakeError::ValidationError {
                message: format!(
                    "Feature '{}' must be a finite number, got {}",
                    FEATURE_ORDER[pos], values[pos]
                ),
            });
        }

        Ok(Self {
            year: values[0],
            latitude: values[1],
            longitude: values[2],
            mag: values[3],
            gap: values[4],
            dmin: values[5],
            rms: values[6],
            horizontal_error: values[7],
            depth_error: values[8],
            mag_error: values[9],
        })
    }

    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.year,
            self.latitude,
            self.longitude,
            self.mag,
            self.gap,
            self.dmin,
            self.rms,
            self.horizontal_error,
            self.depth_error,
            self.mag_error,
        ]
    }

    /// 從 JSON 物件解析，例如 `{"year": 2023, "mag": 5.0, ...}`
    pub fn from_json_str(content: &str) -> Result<Self> {
        let features: FeatureVector = serde_json::from_str(content)?;
        Ok(features)
    }
}

impl Validate for FeatureVector {
    fn validate(&self) -> Result<()> {
        for ((name, (min, max)), value) in FEATURE_ORDER
            .iter()
            .zip(FEATURE_RANGES.iter())
            .zip(self.to_array())
        {
            validate_range(name, value, *min, *max)?;
        }
        Ok(())
    }
}
