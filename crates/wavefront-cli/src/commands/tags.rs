use anyhow::{Context, Result};
use wavefront_core::ops;
use wavefront_core::{Connection, SourceTagsParams, WavefrontClient};

use crate::cli::{OutputFormat, TagsArgs};
use crate::output::{print_record, print_status};

pub async fn apply(
    client: &WavefrontClient,
    connection: &Connection,
    args: &TagsArgs,
    format: OutputFormat,
) -> Result<()> {
    let (state, tags) = args.desired();
    let params = SourceTagsParams {
        connection: connection.clone(),
        source: args.source.clone(),
        state,
        tags,
    };
    let outcome = ops::apply_source_tags(client, &params)
        .await
        .with_context(|| format!("Failed to manage tags of source {}", args.source))?;
    if params.state.is_some() {
        print_status(outcome.changed, &format!("tags of {}", args.source));
    }
    print_record(&outcome, format)
}
