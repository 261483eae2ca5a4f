use std::sync::Arc;

use anyhow::{anyhow, Context};
use aws_config::{BehaviorVersion, Region};
use photodrop_core::Config;
use photodrop_db::PhotoMetadataRepository;
use photodrop_infra::{init_telemetry, shutdown_telemetry};
use photodrop_processing::IngestPipeline;
use photodrop_storage::create_bucket_stores;
use photodrop_worker::{ConsumerConfig, QueueConsumer};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env().context("Failed to load configuration")?;

    init_telemetry("photodrop-worker", config.json_logs())
        .map_err(|e| anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!(
        environment = %config.environment,
        project_id = %config.pipeline.project_id,
        storage_backend = %config.storage_backend,
        source_bucket = %config.pipeline.source_bucket,
        thumbnails_bucket = %config.pipeline.thumbnails_bucket,
        finals_bucket = %config.pipeline.finals_bucket,
        "Starting photodrop worker"
    );

    let stores = create_bucket_stores(&config)
        .await
        .context("Failed to create storage backends")?;

    let pool = photodrop_db::connect(&config).await?;
    photodrop_db::run_migrations(&pool).await?;

    let pipeline = Arc::new(IngestPipeline::new(
        config.pipeline.clone(),
        stores.source,
        stores.thumbnails,
        stores.finals,
        Arc::new(PhotoMetadataRepository::new(pool.clone())),
    ));

    let mut aws = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = config.s3_region() {
        aws = aws.region(Region::new(region.to_string()));
    }
    let sqs = aws_sdk_sqs::Client::new(&aws.load().await);

    let consumer = QueueConsumer::new(sqs, ConsumerConfig::from_config(&config), pipeline);

    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(()).await;
    });

    consumer.run(shutdown_rx).await;

    pool.close().await;
    shutdown_telemetry().await;
    Ok(())
}
