use serde::Serialize;

use crate::client::WavefrontClient;
use crate::error::Result;
use crate::model::TagSet;
use crate::params::SourceTagsParams;
use crate::reconcile::{plan_tags, reconcile_tags};

#[derive(Debug, Clone, Serialize)]
pub struct SourceTagsOutcome {
    pub changed: bool,
    pub tags: TagSet,
}

/// Converges the tags of a source. With neither `state` nor `tags` this is a
/// lookup and never writes.
pub async fn apply_source_tags(
    client: &WavefrontClient,
    params: &SourceTagsParams,
) -> Result<SourceTagsOutcome> {
    let desired = params.desired_tags();
    // Reject ambiguous arguments before touching the API.
    reconcile_tags(&TagSet::new(), desired.as_ref(), params.state)?;

    let observed = client.get_source_tags(&params.source).await?;
    let (call, reconciliation) =
        plan_tags(&params.source, &observed, desired.as_ref(), params.state)?;

    match call {
        Some(call) => {
            tracing::info!(
                source = %call.source,
                state = ?params.state,
                tags = call.tags.len(),
                "setting source tags"
            );
            client.set_source_tags(&call.source, &call.tags).await?;
        }
        None => tracing::debug!(source = %params.source, "source tags unchanged"),
    }

    Ok(SourceTagsOutcome {
        changed: reconciliation.changed,
        tags: reconciliation.tags,
    })
}
