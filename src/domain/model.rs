use serde::{Deserialize, Serialize};
use std::fmt;

/// 淺源地震的上限 (不含)
pub const SHALLOW_MAX_KM: f64 = 70.0;
/// 中源地震的上限 (含)
pub const INTERMEDIATE_MAX_KM: f64 = 300.0;

/// Hypocenter depth bucket, ordered from shallowest to deepest.
///
/// The discriminants double as the class indices emitted by the trained
/// models (0 = shallow, 1 = intermediate, 2 = deep).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DepthCategory {
    Shallow = 0,
    Intermediate = 1,
    Deep = 2,
}

impl DepthCategory {
    pub const ALL: [DepthCategory; 3] = [
        DepthCategory::Shallow,
        DepthCategory::Intermediate,
        DepthCategory::Deep,
    ];

    pub fn class_index(self) -> u8 {
        self as u8
    }

    pub fn from_class_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(DepthCategory::Shallow),
            1 => Some(DepthCategory::Intermediate),
            2 => Some(DepthCategory::Deep),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DepthCategory::Shallow => "Shallow",
            DepthCategory::Intermediate => "Intermediate",
            DepthCategory::Deep => "Deep",
        }
    }

    /// 含深度範圍的顯示標籤
    pub fn label(self) -> &'static str {
        match self {
            DepthCategory::Shallow => "Shallow (<70 km)",
            DepthCategory::Intermediate => "Intermediate (70-300 km)",
            DepthCategory::Deep => "Deep (>300 km)",
        }
    }

    pub fn danger(self) -> DangerTier {
        match self {
            DepthCategory::Shallow => DangerTier::High,
            DepthCategory::Intermediate => DangerTier::Medium,
            DepthCategory::Deep => DangerTier::Low,
        }
    }
}

impl fmt::Display for DepthCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Surface danger, inversely related to depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DangerTier {
    High,
    Medium,
    Low,
}

impl DangerTier {
    pub fn label(self) -> &'static str {
        match self {
            DangerTier::High => "High",
            DangerTier::Medium => "Medium",
            DangerTier::Low => "Low",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            DangerTier::High => "red",
            DangerTier::Medium => "orange",
            DangerTier::Low => "green",
        }
    }
}

impl fmt::Display for DangerTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A raw depth as handed over by a caller: a number, some text, or nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum DepthValue {
    Number(f64),
    Text(String),
    Missing,
}

impl DepthValue {
    /// 轉成公里數；無法解析或非有限值時回傳 None
    pub fn to_km(&self) -> Option<f64> {
        let km = match self {
            DepthValue::Number(n) => *n,
            DepthValue::Text(s) => s.trim().parse::<f64>().ok()?,
            DepthValue::Missing => return None,
        };
        km.is_finite().then_some(km)
    }
}

impl From<f64> for DepthValue {
    fn from(value: f64) -> Self {
        DepthValue::Number(value)
    }
}

impl From<f32> for DepthValue {
    fn from(value: f32) -> Self {
        DepthValue::Number(value as f64)
    }
}

impl From<i32> for DepthValue {
    fn from(value: i32) -> Self {
        DepthValue::Number(value as f64)
    }
}

impl From<i64> for DepthValue {
    fn from(value: i64) -> Self {
        DepthValue::Number(value as f64)
    }
}

impl From<&str> for DepthValue {
    fn from(value: &str) -> Self {
        DepthValue::Text(value.to_string())
    }
}

impl From<String> for DepthValue {
    fn from(value: String) -> Self {
        DepthValue::Text(value)
    }
}

impl<T: Into<DepthValue>> From<Option<T>> for DepthValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(DepthValue::Missing)
    }
}

/// Outcome of classifying one raw depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Category(DepthCategory),
    Invalid,
}

impl Classification {
    pub fn category(self) -> Option<DepthCategory> {
        match self {
            Classification::Category(category) => Some(category),
            Classification::Invalid => None,
        }
    }

    pub fn is_invalid(self) -> bool {
        matches!(self, Classification::Invalid)
    }

    pub fn label(self) -> &'static str {
        match self {
            Classification::Category(category) => category.name(),
            Classification::Invalid => "Invalid",
        }
    }
}

impl From<DepthCategory> for Classification {
    fn from(category: DepthCategory) -> Self {
        Classification::Category(category)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub depth_km: f64,
    pub category: DepthCategory,
    pub danger: DangerTier,
}

/// Per-row classifications of a batch, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchClassification {
    pub classifications: Vec<Classification>,
    pub dropped: usize,
}

impl BatchClassification {
    pub fn len(&self) -> usize {
        self.classifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classifications.is_empty()
    }

    pub fn valid_categories(&self) -> impl Iterator<Item = DepthCategory> + '_ {
        self.classifications.iter().filter_map(|c| c.category())
    }
}

/// 每個深度類別的數量，三個類別一定都存在
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    #[serde(rename = "Shallow")]
    shallow: usize,
    #[serde(rename = "Intermediate")]
    intermediate: usize,
    #[serde(rename = "Deep")]
    deep: usize,
}

impl CategoryCounts {
    pub fn get(&self, category: DepthCategory) -> usize {
        match category {
            DepthCategory::Shallow => self.shallow,
            DepthCategory::Intermediate => self.intermediate,
            DepthCategory::Deep => self.deep,
        }
    }

    pub fn increment(&mut self, category: DepthCategory) {
        match category {
            DepthCategory::Shallow => self.shallow += 1,
            DepthCategory::Intermediate => self.intermediate += 1,
            DepthCategory::Deep => self.deep += 1,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (DepthCategory, usize)> + '_ {
        DepthCategory::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    pub fn total(&self) -> usize {
        self.shallow + self.intermediate + self.deep
    }
}

/// Which external classifier produced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ModelKind {
    #[serde(rename = "XGBoost")]
    GradientBoostedTree,
    #[serde(rename = "LSTM")]
    Sequence,
}

impl ModelKind {
    pub fn name(self) -> &'static str {
        match self {
            ModelKind::GradientBoostedTree => "XGBoost",
            ModelKind::Sequence => "LSTM",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a model's output means for presentation. Never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelVerdict {
    Class(DepthCategory),
    UnknownClass(i64),
    Unavailable,
}

impl ModelVerdict {
    pub fn category(&self) -> Option<DepthCategory> {
        match self {
            ModelVerdict::Class(category) => Some(*category),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModelVerdict::Class(category) => category.label(),
            ModelVerdict::UnknownClass(_) => "Unknown",
            ModelVerdict::Unavailable => "Model unavailable",
        }
    }

    pub fn danger(&self) -> Option<DangerTier> {
        self.category().map(DepthCategory::danger)
    }

    pub fn danger_label(&self) -> &'static str {
        match self {
            ModelVerdict::Class(category) => category.danger().label(),
            ModelVerdict::UnknownClass(_) => "Unknown",
            ModelVerdict::Unavailable => "Unavailable",
        }
    }

    pub fn color(&self) -> &'static str {
        self.danger().map(DangerTier::color).unwrap_or("gray")
    }
}

/// A parsed catalog: header row plus data rows, untouched.
///
/// Data rows stay as raw bytes so one badly encoded cell only affects its
/// own row.
#[derive(Debug, Clone, Default)]
pub struct CatalogTable {
    pub headers: csv::StringRecord,
    pub rows: Vec<csv::ByteRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub source: String,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub dropped_rows: usize,
    pub counts: CategoryCounts,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub summary: BatchSummary,
    pub csv_output: Vec<u8>,
}
