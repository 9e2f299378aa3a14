use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

use crate::client::WavefrontClient;
use crate::error::Result;
use crate::event::{EventAction, plan_event};
use crate::params::EventParams;

#[derive(Debug, Clone, Serialize)]
pub struct EventOutcome {
    pub changed: bool,
    pub event: Value,
    /// Body sent on create or update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,
}

/// Reads, searches, creates, updates or deletes an event depending on which
/// parameters are set.
pub async fn run_event(client: &WavefrontClient, params: &EventParams) -> Result<EventOutcome> {
    let action = plan_event(params, OffsetDateTime::now_utc())?;
    let changed = action.is_write();

    let (event, request_body) = match action {
        EventAction::Get { id } => {
            tracing::info!(%id, "reading event");
            (client.get_event(&id).await?, None)
        }
        EventAction::Search { request } => {
            tracing::info!(limit = params.limit, "searching events");
            (client.search_events(&request).await?, None)
        }
        EventAction::Create { body } => {
            tracing::info!("creating event");
            let event = client.create_event(&body).await?;
            (event, Some(Value::Object(body)))
        }
        EventAction::Update { id, body } => {
            tracing::info!(%id, "updating event");
            let event = client.update_event(&id, &body).await?;
            (event, Some(Value::Object(body)))
        }
        EventAction::Delete { id } => {
            tracing::info!(%id, "deleting event");
            (client.delete_event(&id).await?, None)
        }
    };

    Ok(EventOutcome {
        changed,
        event,
        request_body,
    })
}
