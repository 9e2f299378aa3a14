use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use wavefront_core::ops;
use wavefront_core::{Connection, EventParams, WavefrontClient};

use crate::cli::{EventBodyArgs, EventCommands, OutputFormat, WindowArgs};
use crate::output::{print_record, print_status};

fn read_body(file: Option<&Path>) -> Result<Map<String, Value>> {
    let content = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            buf
        }
    };
    parse_body(&content)
}

fn parse_body(content: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(content).context("Invalid JSON")? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("Event body must be a JSON object, got: {other}"),
    }
}

fn apply_window(params: &mut EventParams, window: &WindowArgs) {
    params.start_time = window.start_time;
    params.end_time = window.end_time;
}

fn with_body(params: &mut EventParams, args: &EventBodyArgs) -> Result<()> {
    params.body = Some(read_body(args.body.as_deref())?);
    apply_window(params, &args.window);
    Ok(())
}

pub async fn run(
    client: &WavefrontClient,
    connection: &Connection,
    command: &EventCommands,
    format: OutputFormat,
) -> Result<()> {
    let mut params = EventParams::new(connection.clone());
    let subject = match command {
        EventCommands::Get { id } => {
            params.id = Some(id.clone());
            format!("event {id}")
        }
        EventCommands::Search(args) => {
            params.query = Some(args.queries.clone());
            params.limit = args.limit;
            apply_window(&mut params, &args.window);
            "event search".to_string()
        }
        EventCommands::Create(args) => {
            with_body(&mut params, args)?;
            "new event".to_string()
        }
        EventCommands::Update { id, body } => {
            params.id = Some(id.clone());
            with_body(&mut params, body)?;
            format!("event {id}")
        }
        EventCommands::Delete { id } => {
            params.id = Some(id.clone());
            params.delete = true;
            format!("event {id}")
        }
    };

    let outcome = ops::run_event(client, &params)
        .await
        .with_context(|| format!("Failed to process {subject}"))?;
    print_status(outcome.changed, &subject);
    print_record(&outcome, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_body_requires_object() {
        assert!(parse_body(r#"{"name": "deploy"}"#).is_ok());
        assert!(parse_body("[1, 2]").is_err());
        assert!(parse_body("not json").is_err());
    }

    #[test]
    fn test_read_body_from_file() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("event.json");
        fs::write(&path, r#"{"name": "deploy", "hosts": ["web-1"]}"#).unwrap();

        let body = read_body(Some(&path)).unwrap();
        assert_eq!(body["name"], Value::String("deploy".into()));
    }
}
