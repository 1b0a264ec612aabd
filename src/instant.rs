//! The instant query pipeline: query, validate, flatten, render.

use comfy_table::Table;

use crate::client::PromClient;
use crate::config::QueryConfig;
use crate::error::PromError;
use crate::model::QueryValue;
use crate::render::{render_table, MetricEntry};

/// Runs one instant query bounded by the configured timeout and flattens the vector result.
///
/// When the deadline passes the in-flight request is dropped and
/// [`PromError::QueryTimeout`] is returned.
pub async fn instant_rows(
    client: &PromClient,
    config: &QueryConfig,
    query: &str,
) -> Result<Vec<MetricEntry>, PromError> {
    let result = tokio::time::timeout(config.timeout(), client.query(query, config.time()))
        .await
        .map_err(|_| PromError::QueryTimeout(config.timeout()))??;

    for warning in &result.warnings {
        log::warn!("Query returned warning: {warning}");
    }
    for info in &result.infos {
        log::info!("Query returned info: {info}");
    }

    let samples = match result.value {
        QueryValue::Vector(samples) => samples,
        other => {
            return Err(PromError::UnexpectedResultShapeError {
                result_type: other.result_type(),
                query: query.to_string(),
            })
        }
    };
    log::debug!("{} metrics received", samples.len());

    samples.iter().map(MetricEntry::try_from).collect()
}

/// Runs the query against the configured endpoint and returns the rendered table.
pub async fn instant_table(config: &QueryConfig, query: &str) -> Result<Table, PromError> {
    let client = PromClient::from_config(config)?;
    log::debug!("Using prometheus server: {:?}", client.base_url().as_str());

    let rows = instant_rows(&client, config, query).await?;
    Ok(render_table(&rows))
}

/// Runs the query and prints the table to stdout. Nothing is printed on failure.
pub async fn print_instant(config: &QueryConfig, query: &str) -> Result<(), PromError> {
    let table = instant_table(config, query).await?;
    println!("{table}");
    Ok(())
}
