use anyhow::{Context, Result};
use wavefront_core::ops;
use wavefront_core::{Connection, SourceParams, WavefrontClient};

use crate::cli::{OutputFormat, SourceArgs};
use crate::output::{print_record, print_status};

pub async fn apply(
    client: &WavefrontClient,
    connection: &Connection,
    args: &SourceArgs,
    format: OutputFormat,
) -> Result<()> {
    let params = SourceParams {
        connection: connection.clone(),
        source: args.source.clone(),
        description: args.description.clone(),
        hidden: args.hidden,
        tags: args.tags.clone(),
    };
    let outcome = ops::apply_source(client, &params)
        .await
        .with_context(|| format!("Failed to converge source {}", args.source))?;
    print_status(outcome.changed, &format!("source {}", args.source));
    print_record(&outcome, format)
}
