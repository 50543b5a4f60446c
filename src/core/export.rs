use crate::domain::model::{CatalogTable, Classification, ClassificationResult};
use crate::utils::error::{QuakeError, Result};

pub const CATEGORY_COLUMN: &str = "depth_category";
pub const DANGER_COLUMN: &str = "danger_tier";
pub const DEPTH_COLUMN: &str = "depth_km";

/// 找出深度欄位的位置，先精確比對再忽略大小寫
pub fn depth_column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .or_else(|| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        })
        .ok_or_else(|| QuakeError::ValidationError {
            message: format!(
                "Depth column '{}' not found. Available columns: {}",
                name,
                headers.iter().collect::<Vec<_>>().join(", ")
            ),
        })
}

/// Writes the original table back out with derived columns appended.
///
/// Original cells and row order are left as they are, bytes included; the
/// danger tier (when requested) and the category label become the last
/// columns. Short rows are padded with empty cells so the derived values
/// stay under their own headers. Invalid rows carry `Invalid` and an empty
/// danger tier.
pub fn export_table(
    table: &CatalogTable,
    classifications: &[Classification],
    include_danger: bool,
    delimiter: u8,
) -> Result<Vec<u8>> {
    if table.rows.len() != classifications.len() {
        return Err(QuakeError::ProcessingError {
            message: format!(
                "{} rows but {} classifications",
                table.rows.len(),
                classifications.len()
            ),
        });
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(Vec::new());

    let mut header: Vec<&str> = table.headers.iter().collect();
    if include_danger {
        header.push(DANGER_COLUMN);
    }
    header.push(CATEGORY_COLUMN);
    writer.write_record(&header)?;

    let width = table.headers.len();
    for (row, classification) in table.rows.iter().zip(classifications) {
        let mut record = row.clone();
        for _ in record.len()..width {
            record.push_field(b"");
        }
        if include_danger {
            let danger = classification
                .category()
                .map(|c| c.danger().label())
                .unwrap_or("");
            record.push_field(danger.as_bytes());
        }
        record.push_field(classification.label().as_bytes());
        writer.write_byte_record(&record)?;
    }

    into_bytes(writer)
}

/// Flat `depth_km[,danger_tier],depth_category` table.
pub fn export_results(results: &[ClassificationResult], include_danger: bool) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec![DEPTH_COLUMN];
    if include_danger {
        header.push(DANGER_COLUMN);
    }
    header.push(CATEGORY_COLUMN);
    writer.write_record(&header)?;

    for result in results {
        let depth = result.depth_km.to_string();
        let mut record = vec![depth.as_str()];
        if include_danger {
            record.push(result.danger.label());
        }
        record.push(result.category.name());
        writer.write_record(&record)?;
    }

    finish(writer)
}

fn into_bytes(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer.into_inner().map_err(|e| QuakeError::ProcessingError {
        message: format!("Failed to flush CSV output: {}", e),
    })
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    String::from_utf8(into_bytes(writer)?).map_err(|e| QuakeError::ProcessingError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}
