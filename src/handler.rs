//! Metrics invocation.
//!
//! Resolves the two collections from configuration, runs a full scan and
//! aggregation over each, and hands back both results or the first failure.

use crate::analysis::aggregate;
use crate::config::{Backend, Config, SourceConfig, TablesConfig};
use crate::error::MetricsError;
use crate::models::{MetricsResult, ReviewMetrics};
use crate::report::Outcome;
use crate::scanner::{scan_all, DynamoTable, JsonFileSource, PageSource, Projection};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::Client;
use std::path::Path;
use tracing::{debug, error, info};

/// Compute review metrics for both collections named by `config`.
///
/// Settings and identifiers are checked before any source is opened, so a
/// misconfigured deployment never reaches the data layer.
pub async fn handle(config: &Config) -> Outcome {
    let outcome = run(config).await;

    if let Err(ref err) = outcome {
        if err.is_config() {
            error!("Configuration error: {}", err);
        } else {
            error!("Error calculating metrics: {}", err);
        }
    }

    outcome
}

async fn run(config: &Config) -> Outcome {
    config.validate()?;
    let tables = config.tables.resolve()?;
    let page_size = config.source.page_size;
    let sequential = config.general.sequential;

    match config.source.backend {
        Backend::Dynamodb => {
            let client = dynamo_client(&config.source).await;
            let chat_logs =
                DynamoTable::new(client.clone(), &tables.chat_logs).with_page_size(page_size);
            let feedback = DynamoTable::new(client, &tables.feedback).with_page_size(page_size);

            compute_metrics(&chat_logs, &feedback, &config.tables, sequential).await
        }
        Backend::Json => {
            let chat_logs = open_json(&tables.chat_logs, page_size)?;
            let feedback = open_json(&tables.feedback, page_size)?;

            compute_metrics(&chat_logs, &feedback, &config.tables, sequential).await
        }
    }
}

fn open_json(path: &str, page_size: Option<u32>) -> Result<JsonFileSource, MetricsError> {
    JsonFileSource::open(Path::new(path))
        .map(|source| source.with_page_size(page_size))
        .map_err(|e| MetricsError::scan(path, e))
}

/// Build a DynamoDB client from the standard AWS environment, with any
/// region or endpoint overrides applied.
async fn dynamo_client(source: &SourceConfig) -> Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(ref region) = source.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(ref url) = source.endpoint_url {
        debug!("Using DynamoDB endpoint {}", url);
        loader = loader.endpoint_url(url);
    }

    Client::new(&loader.load().await)
}

/// Scan and aggregate both collections.
///
/// Unless `sequential` is set the two pipelines run concurrently; they share
/// nothing, and the first failure aborts the whole invocation either way.
pub async fn compute_metrics<C, F>(
    chat_logs: &C,
    feedback: &F,
    tables: &TablesConfig,
    sequential: bool,
) -> Outcome
where
    C: PageSource,
    F: PageSource,
{
    let chat_projection = Projection::for_collection(&tables.chat_logs_key);
    let feedback_projection = Projection::for_collection(&tables.feedback_key);

    let chat_pipeline = collect_metrics(chat_logs, &chat_projection);
    let feedback_pipeline = collect_metrics(feedback, &feedback_projection);

    let (chat_logs, feedback_logs) = if sequential {
        let chat_logs = chat_pipeline.await?;
        let feedback_logs = feedback_pipeline.await?;
        (chat_logs, feedback_logs)
    } else {
        futures::future::try_join(chat_pipeline, feedback_pipeline).await?
    };

    Ok(ReviewMetrics {
        chat_logs,
        feedback_logs,
    })
}

async fn collect_metrics<S: PageSource>(
    source: &S,
    projection: &Projection,
) -> Result<MetricsResult, MetricsError> {
    let records = scan_all(source, projection)
        .await
        .map_err(|e| MetricsError::scan(source.name(), e))?;

    let result = aggregate(&records);
    info!(
        "{}: {} total, {} reviewed, {} pending",
        source.name(),
        result.total,
        result.reviewed,
        result.pending
    );

    Ok(result)
}
