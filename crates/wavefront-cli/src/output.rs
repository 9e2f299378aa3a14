use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_value(value: &Value, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Table => println!("{}", render_table(value)),
    }
    Ok(())
}

/// Prints an operation result record.
pub fn print_record<T: Serialize>(record: &T, format: OutputFormat) -> Result<()> {
    print_value(&serde_json::to_value(record)?, format)
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// One-line summary on stderr so stdout stays machine readable.
pub fn print_status(changed: bool, subject: &str) {
    if changed {
        eprintln!("{}: {}", "changed".yellow(), subject);
    } else {
        eprintln!("{}: {}", "ok".green(), subject);
    }
}

fn render_table(value: &Value) -> String {
    let mut rows = Vec::new();
    flatten_rows("", value, &mut rows);
    if rows.is_empty() {
        return "(empty)".to_string();
    }

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (field, value) in rows {
        builder.push_record([field, value]);
    }
    builder.build().with(Style::rounded()).to_string()
}

fn flatten_rows(prefix: &str, value: &Value, rows: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                let field = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_rows(&field, child, rows);
            }
        }
        _ if prefix.is_empty() => rows.push(("value".to_string(), scalar_text(value))),
        _ => rows.push((prefix.to_string(), scalar_text(value))),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) if items.iter().all(|v| !v.is_object() && !v.is_array()) => items
            .iter()
            .map(scalar_text)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
