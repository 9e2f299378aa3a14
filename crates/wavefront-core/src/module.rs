//! Entry point for automation hosts that invoke a module with a JSON
//! argument object and register its JSON result record.

use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::client::WavefrontClient;
use crate::error::{Result, WavefrontError};
use crate::ops;
use crate::params::{AlertParams, Connection, EventParams, SourceParams, SourceTagsParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    Alert,
    Source,
    SourceTags,
    Event,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 4] = [Self::Alert, Self::Source, Self::SourceTags, Self::Event];

    pub fn name(self) -> &'static str {
        match self {
            Self::Alert => "wf_alert",
            Self::Source => "wf_source",
            Self::SourceTags => "wf_source_tags",
            Self::Event => "wf_event",
        }
    }
}

impl FromStr for ModuleKind {
    type Err = WavefrontError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.strip_prefix("wf_").unwrap_or(s);
        match name {
            "alert" => Ok(Self::Alert),
            "source" => Ok(Self::Source),
            "source_tags" | "tags" => Ok(Self::SourceTags),
            "event" => Ok(Self::Event),
            _ => Err(WavefrontError::invalid_argument(format!(
                "unknown module `{s}`; expected one of {}",
                Self::ALL.map(Self::name).join(", ")
            ))),
        }
    }
}

fn parse_args<T: DeserializeOwned>(kind: ModuleKind, args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| {
        WavefrontError::invalid_argument(format!("invalid arguments for {}: {e}", kind.name()))
    })
}

fn to_record<T: Serialize>(outcome: &T) -> Result<Value> {
    Ok(serde_json::to_value(outcome)?)
}

fn client_for(connection: &Connection, timeout: Duration) -> Result<WavefrontClient> {
    WavefrontClient::with_timeout(connection, timeout)
}

/// Runs one module against its argument object and returns the result record.
pub async fn run_module(kind: ModuleKind, args: Value, timeout: Duration) -> Result<Value> {
    tracing::debug!(module = kind.name(), "running module");
    match kind {
        ModuleKind::Alert => {
            let params: AlertParams = parse_args(kind, args)?;
            let client = client_for(&params.connection, timeout)?;
            to_record(&ops::get_alert(&client, &params).await?)
        }
        ModuleKind::Source => {
            let params: SourceParams = parse_args(kind, args)?;
            let client = client_for(&params.connection, timeout)?;
            to_record(&ops::apply_source(&client, &params).await?)
        }
        ModuleKind::SourceTags => {
            let params: SourceTagsParams = parse_args(kind, args)?;
            let client = client_for(&params.connection, timeout)?;
            to_record(&ops::apply_source_tags(&client, &params).await?)
        }
        ModuleKind::Event => {
            let params: EventParams = parse_args(kind, args)?;
            let client = client_for(&params.connection, timeout)?;
            to_record(&ops::run_event(&client, &params).await?)
        }
    }
}

/// Result record for a failed invocation.
pub fn failure_record(err: &WavefrontError) -> Value {
    json!({
        "failed": true,
        "changed": false,
        "msg": err.to_string(),
        "error_category": err.category().to_string(),
    })
}
