use comfy_table::presets::ASCII_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};

use crate::error::{ErrorType, PromError};
use crate::model::Sample;

/// Column headers of the result table.
pub const HEADERS: [&str; 3] = ["metric", "Value", "Timestamp"];

/// One flattened row of an instant vector.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricEntry {
    /// Label set rendered as `name{label="value", ...}`
    pub metric: String,
    pub value: f64,
    /// Unix seconds
    pub timestamp: i64,
}

impl TryFrom<&Sample> for MetricEntry {
    type Error = PromError;

    fn try_from(sample: &Sample) -> Result<Self, Self::Error> {
        let metric = sample.metric.to_string();
        let pair = sample.pair().ok_or_else(|| {
            PromError::protocol(
                ErrorType::BadResponse,
                "sample has neither value nor histogram",
                metric.clone(),
            )
        })?;
        Ok(MetricEntry {
            metric,
            value: pair.value,
            timestamp: pair.unix_seconds(),
        })
    }
}

/// Formats a sample value with one decimal digit.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        format!("{value:.1}")
    }
}

/// Builds the bordered result table. Cells are never wrapped.
pub fn render_table(rows: &[MetricEntry]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(HEADERS.to_vec());

    for row in rows {
        table.add_row(vec![
            row.metric.clone(),
            format_value(row.value),
            row.timestamp.to_string(),
        ]);
    }
    table
}
