use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde_json::{Map, Value};
use wavefront_core::{ModuleKind, WavefrontError, failure_record, run_module};

use crate::cli::{OutputFormat, RunArgs};
use crate::output::print_value;

/// Connection values from flags, env and profile, used for keys the
/// argument file leaves out.
pub struct Defaults {
    pub endpoint: String,
    pub token: Option<String>,
}

fn read_args(path: &Path) -> wavefront_core::Result<Map<String, Value>> {
    let content = fs::read_to_string(path).map_err(|e| {
        WavefrontError::invalid_argument(format!("cannot read {}: {e}", path.display()))
    })?;
    match serde_json::from_str::<Value>(&content)? {
        Value::Object(map) => Ok(map),
        _ => Err(WavefrontError::invalid_argument(format!(
            "{} must contain a JSON object of module arguments",
            path.display()
        ))),
    }
}

fn fill_defaults(args: &mut Map<String, Value>, defaults: &Defaults) {
    let endpoint_unset = matches!(args.get("endpoint"), None | Some(Value::Null));
    if endpoint_unset {
        args.insert("endpoint".into(), Value::String(defaults.endpoint.clone()));
    }
    if let Some(token) = &defaults.token
        && matches!(args.get("token"), None | Some(Value::Null))
    {
        args.insert("token".into(), Value::String(token.clone()));
    }
}

async fn invoke(args: &RunArgs, defaults: &Defaults, timeout: Duration) -> wavefront_core::Result<Value> {
    let kind: ModuleKind = args.module.parse()?;
    let mut module_args = read_args(&args.args_file)?;
    fill_defaults(&mut module_args, defaults);
    run_module(kind, Value::Object(module_args), timeout).await
}

/// Builds the record printed for a module invocation and whether it
/// succeeded.
fn outcome_record(module: &str, outcome: wavefront_core::Result<Value>) -> (bool, Value) {
    match outcome {
        Ok(record) => (true, record),
        Err(err) => {
            tracing::debug!(module = %module, category = %err.category(), "module failed");
            (false, failure_record(&err))
        }
    }
}

/// Prints the result record (or failure record) as JSON. Returns whether
/// the module succeeded. A failure to resolve `defaults` is reported as a
/// failure record too.
pub async fn run(args: &RunArgs, defaults: Result<Defaults>, timeout: Duration) -> Result<bool> {
    let outcome = match defaults {
        Ok(defaults) => invoke(args, &defaults, timeout).await,
        Err(err) => Err(WavefrontError::invalid_argument(format!("{err:#}"))),
    };
    let (ok, record) = outcome_record(&args.module, outcome);
    print_value(&record, OutputFormat::Json)?;
    Ok(ok)
}
