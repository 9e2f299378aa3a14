use serde::Serialize;
use serde_json::Value;

use crate::client::WavefrontClient;
use crate::error::Result;
use crate::params::AlertParams;

#[derive(Debug, Clone, Serialize)]
pub struct AlertOutcome {
    pub changed: bool,
    pub alert: Value,
}

/// Reads an alert as it currently is in Wavefront. Never writes.
pub async fn get_alert(client: &WavefrontClient, params: &AlertParams) -> Result<AlertOutcome> {
    tracing::info!(alert_id = %params.alert_id, "reading alert");
    let alert = client.get_alert(&params.alert_id).await?;
    Ok(AlertOutcome {
        changed: false,
        alert,
    })
}
