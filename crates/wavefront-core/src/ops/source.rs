use serde::Serialize;

use crate::client::WavefrontClient;
use crate::error::Result;
use crate::model::Source;
use crate::params::SourceParams;
use crate::reconcile::{SourceCall, plan_source};

#[derive(Debug, Clone, Serialize)]
pub struct SourceOutcome {
    pub changed: bool,
    pub source: Source,
}

/// Creates the source if it is missing, otherwise updates only the fields
/// that differ from what Wavefront already has.
pub async fn apply_source(client: &WavefrontClient, params: &SourceParams) -> Result<SourceOutcome> {
    let observed = client.get_source(&params.source).await?;
    let plan = plan_source(&params.source, observed.as_ref(), &params.desired_state());
    let changed = plan.changed();

    let source = match plan.call {
        None => {
            tracing::info!(source = %params.source, "source already up to date");
            plan.expected
        }
        Some(SourceCall::Create(source)) => {
            tracing::info!(source = %source.name, "creating source");
            client.create_source(&source).await?
        }
        Some(SourceCall::Update(source)) => {
            tracing::info!(source = %source.name, "updating source");
            client.update_source(&source).await?
        }
    };

    Ok(SourceOutcome { changed, source })
}
