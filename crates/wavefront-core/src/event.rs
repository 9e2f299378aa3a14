//! Event request planning: action dispatch, body validation and time windows.

use serde_json::{Map, Value, json};
use time::{Duration, OffsetDateTime};

use crate::error::{Result, WavefrontError};
use crate::params::EventParams;

/// Keys the event API accepts in a body.
pub const VALID_EVENT_KEYS: &[&str] = &[
    "name",
    "annotations",
    "id",
    "table",
    "startTime",
    "endTime",
    "tags",
    "createdAt",
    "hosts",
    "isEphemeral",
    "creatorId",
    "createdEpochMillis",
    "updatedEpochMillis",
    "updaterId",
    "updatedAt",
    "summarizedEvents",
    "isUserEvent",
    "runningState",
    "canClose",
    "creatorType",
    "canDelete",
];

/// Keys the server owns; an update must not carry them.
pub const READONLY_EVENT_KEYS: &[&str] = &[
    "id",
    "isEphemeral",
    "isUserEvent",
    "runningState",
    "canDelete",
    "canClose",
    "creatorType",
    "createdAt",
    "updatedAt",
    "createdEpochMillis",
    "updatedEpochMillis",
    "updaterId",
    "creatorId",
    "summarizedEvents",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Object,
    List,
    Integer,
    Flag,
}

impl FieldKind {
    fn of(key: &str) -> Option<Self> {
        Some(match key {
            "name" | "id" | "table" | "creatorId" | "updaterId" | "runningState" => Self::Text,
            "annotations" => Self::Object,
            "tags" | "creatorType" | "hosts" => Self::List,
            "startTime" | "endTime" | "createdAt" | "createdEpochMillis" | "updatedEpochMillis"
            | "updatedAt" | "summarizedEvents" => Self::Integer,
            "isEphemeral" | "isUserEvent" | "canClose" | "canDelete" => Self::Flag,
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        match self {
            Self::Text => "string",
            Self::Object => "object",
            Self::List => "list",
            Self::Integer => "integer",
            Self::Flag => "boolean",
        }
    }

    /// Converts `value` to this kind when no information is lost.
    fn coerce(self, value: &Value) -> Option<Value> {
        match (self, value) {
            (Self::Text, Value::String(_))
            | (Self::Object, Value::Object(_))
            | (Self::List, Value::Array(_))
            | (Self::Flag, Value::Bool(_)) => Some(value.clone()),
            (Self::Text, Value::Number(n)) => Some(Value::String(n.to_string())),
            (Self::Text, Value::Bool(b)) => Some(Value::String(b.to_string())),
            (Self::List, Value::String(_)) => Some(Value::Array(vec![value.clone()])),
            (Self::Integer, Value::Number(n)) => n
                .as_i64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.is_finite() && f.fract() == 0.0)
                        .map(|f| f as i64)
                })
                .map(Value::from),
            (Self::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
            (Self::Flag, Value::String(s)) => match s.to_ascii_lowercase().as_str() {
                "true" | "yes" => Some(Value::Bool(true)),
                "false" | "no" => Some(Value::Bool(false)),
                _ => None,
            },
            (Self::Flag, Value::Number(n)) => match n.as_i64() {
                Some(0) => Some(Value::Bool(false)),
                Some(1) => Some(Value::Bool(true)),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Inclusive event time window in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    /// Fills missing bounds relative to `now`: the last hour up to now.
    pub fn resolve(start: Option<i64>, end: Option<i64>, now: OffsetDateTime) -> Self {
        let window = Self {
            start: start.unwrap_or_else(|| epoch_millis(now - Duration::hours(1))),
            end: end.unwrap_or_else(|| epoch_millis(now)),
        };
        if window.start > window.end {
            tracing::warn!(
                start = window.start,
                end = window.end,
                "event start_time is after end_time"
            );
        }
        window
    }
}

pub fn epoch_millis(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

/// The single API call an event invocation resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum EventAction {
    Get { id: String },
    Search { request: Value },
    Create { body: Map<String, Value> },
    Update { id: String, body: Map<String, Value> },
    Delete { id: String },
}

impl EventAction {
    /// Whether the action writes to the event store.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Self::Create { .. } | Self::Update { .. } | Self::Delete { .. }
        )
    }
}

/// Resolves parameters into exactly one action.
///
/// `query` conflicts with both `id` and `body`. With an `id`, a body means
/// update, `delete` means delete and neither means read.
pub fn plan_event(params: &EventParams, now: OffsetDateTime) -> Result<EventAction> {
    if params.query.is_some() && params.body.is_some() {
        return Err(WavefrontError::invalid_argument(
            "parameters are mutually exclusive: query|body",
        ));
    }
    if params.query.is_some() && params.id.is_some() {
        return Err(WavefrontError::invalid_argument(
            "parameters are mutually exclusive: query|id",
        ));
    }

    let window = TimeWindow::resolve(params.start_time, params.end_time, now);

    match (&params.id, &params.query, &params.body) {
        (Some(id), _, Some(body)) => Ok(EventAction::Update {
            id: id.clone(),
            body: validate_update_body(id, body)?,
        }),
        (Some(id), _, None) if params.delete => Ok(EventAction::Delete { id: id.clone() }),
        (Some(id), _, None) => Ok(EventAction::Get { id: id.clone() }),
        (None, Some(query), _) => Ok(EventAction::Search {
            request: json!({
                "limit": params.limit,
                "query": query,
                "timeRange": {
                    "earliestStartTimeEpochMillis": window.start,
                    "latestStartTimeEpochMillis": window.end,
                },
            }),
        }),
        (None, None, Some(body)) => Ok(EventAction::Create {
            body: validate_create_body(body, window)?,
        }),
        (None, None, None) => Err(WavefrontError::invalid_argument(
            "one of id, query or body is required",
        )),
    }
}

/// Prepares a body for `POST /api/v2/event`.
pub fn validate_create_body(body: &Map<String, Value>, window: TimeWindow) -> Result<Map<String, Value>> {
    let mut body = body.clone();
    body.entry("annotations").or_insert_with(|| json!({}));
    fill_if_unset(&mut body, "startTime", window.start);
    fill_if_unset(&mut body, "endTime", window.end);
    coerce_body(body)
}

/// Prepares a body for `PUT /api/v2/event/{id}`. The id is carried in the
/// body as well, otherwise the server re-keys the event.
pub fn validate_update_body(id: &str, body: &Map<String, Value>) -> Result<Map<String, Value>> {
    let mut readonly: Vec<&str> = body
        .keys()
        .map(String::as_str)
        .filter(|key| READONLY_EVENT_KEYS.contains(key))
        .collect();
    if !readonly.is_empty() {
        readonly.sort_unstable();
        return Err(WavefrontError::invalid_argument(format!(
            "read-only event fields cannot be updated: {}; put free-form data under annotations",
            readonly.join(", ")
        )));
    }

    let mut body = body.clone();
    body.insert("id".to_string(), Value::String(id.to_string()));
    coerce_body(body)
}

fn fill_if_unset(body: &mut Map<String, Value>, key: &str, millis: i64) {
    let unset = match body.get(key) {
        None | Some(Value::Null) => true,
        Some(Value::Number(n)) => n.as_i64() == Some(0),
        _ => false,
    };
    if unset {
        body.insert(key.to_string(), Value::from(millis));
    }
}

fn coerce_body(body: Map<String, Value>) -> Result<Map<String, Value>> {
    let mut unknown = Vec::new();
    let mut invalid = Vec::new();
    let mut coerced = Map::with_capacity(body.len());

    for (key, value) in body {
        let Some(kind) = FieldKind::of(&key) else {
            unknown.push(key);
            continue;
        };
        match kind.coerce(&value) {
            Some(value) => {
                coerced.insert(key, value);
            }
            None => invalid.push(format!("{key} (expected {}, got {value})", kind.name())),
        }
    }

    if !unknown.is_empty() {
        return Err(WavefrontError::invalid_argument(format!(
            "unknown event fields: {}; valid fields are {}",
            unknown.join(", "),
            VALID_EVENT_KEYS.join(", ")
        )));
    }
    if !invalid.is_empty() {
        return Err(WavefrontError::invalid_argument(format!(
            "event fields have the wrong type: {}",
            invalid.join("; ")
        )));
    }
    Ok(coerced)
}
