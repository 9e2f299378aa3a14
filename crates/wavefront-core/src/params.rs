//! Typed invocation parameters.
//!
//! Each operation takes one of these structs instead of a loose map of named
//! options. They deserialize from the JSON argument object an automation host
//! hands to a module (unknown keys such as `_ansible_check_mode` are ignored)
//! and are built directly by the CLI.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::model::{EventQuery, TagSet};
use crate::reconcile::{DesiredState, TagState};

/// Default Wavefront cluster used when no endpoint is configured.
pub const DEFAULT_ENDPOINT: &str = "https://mon.wavefront.com";

/// Default number of events returned by a search.
pub const DEFAULT_EVENT_LIMIT: u32 = 10;

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_event_limit() -> u32 {
    DEFAULT_EVENT_LIMIT
}

/// Credentials and cluster address shared by every operation.
#[derive(Clone, Deserialize)]
pub struct Connection {
    /// API token, sent as `Authorization: Bearer <token>`.
    pub token: String,
    /// Base URL of the cluster (default: `https://mon.wavefront.com`).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Connection {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            endpoint: endpoint.into(),
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Parameters of the alert lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertParams {
    #[serde(flatten)]
    pub connection: Connection,
    /// Alert identifier.
    pub alert_id: String,
}

/// Parameters of the source create/update operation.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceParams {
    #[serde(flatten)]
    pub connection: Connection,
    /// Source name, the unique key of a source.
    pub source: String,
    /// Replaces the description when given.
    #[serde(default)]
    pub description: Option<String>,
    /// Hides or unhides the source when given.
    #[serde(default)]
    pub hidden: Option<bool>,
    /// Replaces the full tag set when given.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl SourceParams {
    pub fn desired_state(&self) -> DesiredState {
        DesiredState {
            description: self.description.clone(),
            hidden: self.hidden,
            tags: self.tags.as_ref().map(|tags| tags.iter().cloned().collect()),
        }
    }
}

/// Parameters of the source tag operation.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceTagsParams {
    #[serde(flatten)]
    pub connection: Connection,
    /// Source name.
    pub source: String,
    /// How `tags` are applied. Omitted together with `tags` for a read.
    #[serde(default)]
    pub state: Option<TagState>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl SourceTagsParams {
    pub fn desired_tags(&self) -> Option<TagSet> {
        self.tags.as_ref().map(|tags| tags.iter().cloned().collect())
    }
}

/// Parameters of the event operation.
#[derive(Debug, Clone, Deserialize)]
pub struct EventParams {
    #[serde(flatten)]
    pub connection: Connection,
    /// Event id, `<epoch millis>:<event name>`.
    #[serde(default)]
    pub id: Option<String>,
    /// Search filters. Conflicts with `id` and `body`.
    #[serde(default)]
    pub query: Option<Vec<EventQuery>>,
    /// Event body to create (without `id`) or update (with `id`).
    #[serde(default)]
    pub body: Option<Map<String, Value>>,
    /// Delete the event named by `id`.
    #[serde(default)]
    pub delete: bool,
    /// Maximum number of search results (default: 10).
    #[serde(default = "default_event_limit")]
    pub limit: u32,
    /// Window start in epoch millis (default: one hour ago).
    #[serde(default)]
    pub start_time: Option<i64>,
    /// Window end in epoch millis (default: now).
    #[serde(default)]
    pub end_time: Option<i64>,
}

impl EventParams {
    pub fn new(connection: Connection) -> Self {
        Self {
            connection,
            id: None,
            query: None,
            body: None,
            delete: false,
            limit: DEFAULT_EVENT_LIMIT,
            start_time: None,
            end_time: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_tags_params_from_module_args() {
        let params: SourceTagsParams = serde_json::from_value(json!({
            "token": "secret",
            "source": "app-01",
            "state": "absent",
            "tags": ["prod"],
            "_ansible_check_mode": false
        }))
        .unwrap();

        assert_eq!(params.connection.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(params.state, Some(TagState::Absent));
        assert_eq!(params.desired_tags(), Some(TagSet::from(["prod".to_string()])));
    }

    #[test]
    fn test_unknown_state_rejected() {
        let result = serde_json::from_value::<SourceTagsParams>(json!({
            "token": "t",
            "source": "app-01",
            "state": "latest"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_source_params_desired_state_only_has_given_fields() {
        let params: SourceParams = serde_json::from_value(json!({
            "token": "t",
            "endpoint": "https://try.wavefront.com",
            "source": "app-01",
            "hidden": true
        }))
        .unwrap();

        let desired = params.desired_state();
        assert_eq!(desired.hidden, Some(true));
        assert!(desired.description.is_none());
        assert!(desired.tags.is_none());
    }

    #[test]
    fn test_event_params_defaults() {
        let params: EventParams = serde_json::from_value(json!({
            "token": "t",
            "id": "1507307331000:deploy"
        }))
        .unwrap();
        assert_eq!(params.limit, DEFAULT_EVENT_LIMIT);
        assert!(!params.delete);
        assert!(params.query.is_none());
    }

    #[test]
    fn test_connection_debug_redacts_token() {
        let connection = Connection::new(DEFAULT_ENDPOINT, "super-secret");
        let rendered = format!("{connection:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("mon.wavefront.com"));
    }
}
