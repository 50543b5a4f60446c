//! Rule-based depth bucketing and model class labelling.
//!
//! Everything here is pure: no IO, no shared state, safe to call from any
//! thread.

use crate::domain::model::{
    BatchClassification, CategoryCounts, Classification, ClassificationResult, DepthCategory,
    DepthValue, ModelVerdict, INTERMEDIATE_MAX_KM, SHALLOW_MAX_KM,
};

/// Buckets a finite depth in kilometres.
///
/// `< 70` is shallow, `70..=300` intermediate, `> 300` deep.
pub fn category_for_km(depth_km: f64) -> Option<DepthCategory> {
    if !depth_km.is_finite() {
        return None;
    }
    if depth_km < SHALLOW_MAX_KM {
        Some(DepthCategory::Shallow)
    } else if depth_km <= INTERMEDIATE_MAX_KM {
        Some(DepthCategory::Intermediate)
    } else {
        Some(DepthCategory::Deep)
    }
}

/// Classifies a number, a numeric string, or a missing value.
///
/// Anything that does not convert to a finite number comes back as
/// [`Classification::Invalid`] instead of an error.
pub fn classify(depth: impl Into<DepthValue>) -> Classification {
    depth
        .into()
        .to_km()
        .and_then(category_for_km)
        .map_or(Classification::Invalid, Classification::Category)
}

/// Classifies every row, keeping input order, and counts the invalid ones.
pub fn classify_batch<I, T>(depths: I) -> BatchClassification
where
    I: IntoIterator<Item = T>,
    T: Into<DepthValue>,
{
    let classifications: Vec<Classification> = depths.into_iter().map(classify).collect();
    let dropped = classifications.iter().filter(|c| c.is_invalid()).count();

    if dropped > 0 {
        tracing::debug!(
            "{} of {} depth values could not be parsed",
            dropped,
            classifications.len()
        );
    }

    BatchClassification {
        classifications,
        dropped,
    }
}

pub fn summarize<I>(categories: I) -> CategoryCounts
where
    I: IntoIterator<Item = DepthCategory>,
{
    let mut counts = CategoryCounts::default();
    for category in categories {
        counts.increment(category);
    }
    counts
}

/// Maps a model's class index to its label and danger tier.
///
/// The 0/1/2 ordering is fixed by the trained model artifacts.
pub fn label_for_model_class(class_index: i64) -> ModelVerdict {
    match DepthCategory::from_class_index(class_index) {
        Some(category) => ModelVerdict::Class(category),
        None => {
            tracing::warn!("⚠️ Model returned unknown class index {}", class_index);
            ModelVerdict::UnknownClass(class_index)
        }
    }
}

impl ClassificationResult {
    pub fn new(depth: impl Into<DepthValue>) -> Option<Self> {
        let depth_km = depth.into().to_km()?;
        let category = category_for_km(depth_km)?;
        Some(Self {
            depth_km,
            category,
            danger: category.danger(),
        })
    }
}
