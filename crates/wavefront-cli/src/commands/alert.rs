use anyhow::{Context, Result};
use wavefront_core::ops;
use wavefront_core::{AlertParams, Connection, WavefrontClient};

use crate::cli::OutputFormat;
use crate::output::print_record;

pub async fn get(
    client: &WavefrontClient,
    connection: &Connection,
    alert_id: &str,
    format: OutputFormat,
) -> Result<()> {
    let params = AlertParams {
        connection: connection.clone(),
        alert_id: alert_id.to_string(),
    };
    let outcome = ops::get_alert(client, &params)
        .await
        .with_context(|| format!("Failed to read alert {alert_id}"))?;
    print_record(&outcome, format)
}
