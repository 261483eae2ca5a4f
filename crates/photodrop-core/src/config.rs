//! Configuration module
//!
//! Everything the worker needs is read from the environment once at startup and then
//! passed down explicitly. The pipeline itself only sees [`PipelineConfig`]; storage and
//! database clients are built from [`Config`] by their own crates.

use std::env;
use std::path::PathBuf;

use crate::storage_types::StorageBackend;

// Common constants
const DB_MAX_CONNECTIONS: u32 = 5;
const DB_TIMEOUT_SECS: u64 = 30;
const SQS_WAIT_TIME_SECS: i32 = 20;
const SQS_MAX_MESSAGES: i32 = 10;

/// Settings the ingest pipeline is constructed with.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub project_id: String,
    pub source_bucket: String,
    pub thumbnails_bucket: String,
    pub finals_bucket: String,
    /// Root under which per-invocation scratch directories are created.
    pub work_dir: PathBuf,
    /// When true, a failed metadata insert fails the invocation instead of being logged.
    pub metadata_persist_required: bool,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub pipeline: PipelineConfig,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_region: Option<String>,
    pub public_url_host: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Metadata database
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Trigger queue
    pub sqs_queue_url: String,
    pub sqs_wait_time_seconds: i32,
    pub sqs_max_messages: i32,
    // Logging
    pub log_format: String,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("{} must be set", key))
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| v.trim().to_lowercase())
                .and_then(|v| match v.as_str() {
                    "true" | "1" | "yes" => Some(true),
                    "false" | "0" | "no" => Some(false),
                    _ => None,
                })
                .unwrap_or(default)
        };

        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let storage_backend = match optional("STORAGE_BACKEND") {
            Some(s) => s.parse()?,
            None => StorageBackend::S3,
        };

        let pipeline = PipelineConfig {
            project_id: required("PROJECT_ID")?,
            source_bucket: required("SOURCE_BUCKET")?,
            thumbnails_bucket: required("THUMBNAILS_BUCKET")?,
            finals_bucket: required("FINALS_BUCKET")?,
            work_dir: optional("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            metadata_persist_required: flag("METADATA_PERSIST_REQUIRED", false),
        };

        let config = Config {
            environment,
            pipeline,
            storage_backend,
            s3_region: optional("S3_REGION"),
            s3_endpoint: optional("S3_ENDPOINT"),
            aws_region: optional("AWS_REGION"),
            public_url_host: optional("PUBLIC_URL_HOST"),
            local_storage_path: optional("LOCAL_STORAGE_PATH"),
            local_storage_base_url: optional("LOCAL_STORAGE_BASE_URL"),
            database_url: required("DATABASE_URL")?,
            db_max_connections: optional("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DB_MAX_CONNECTIONS),
            db_timeout_seconds: optional("DB_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DB_TIMEOUT_SECS),
            sqs_queue_url: required("SQS_QUEUE_URL")?,
            sqs_wait_time_seconds: optional("SQS_WAIT_TIME_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(SQS_WAIT_TIME_SECS),
            sqs_max_messages: optional("SQS_MAX_MESSAGES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(SQS_MAX_MESSAGES),
            log_format: optional("LOG_FORMAT")
                .map(|s| s.to_lowercase())
                .unwrap_or_else(|| "text".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let p = &self.pipeline;
        if p.source_bucket == p.thumbnails_bucket
            || p.source_bucket == p.finals_bucket
            || p.thumbnails_bucket == p.finals_bucket
        {
            // Archiving into the source bucket would retrigger the pipeline on its own output.
            return Err(anyhow::anyhow!(
                "SOURCE_BUCKET, THUMBNAILS_BUCKET and FINALS_BUCKET must all be different"
            ));
        }

        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if !(0..=20).contains(&self.sqs_wait_time_seconds) {
            return Err(anyhow::anyhow!(
                "SQS_WAIT_TIME_SECONDS must be between 0 and 20"
            ));
        }
        if !(1..=10).contains(&self.sqs_max_messages) {
            return Err(anyhow::anyhow!("SQS_MAX_MESSAGES must be between 1 and 10"));
        }

        if !matches!(self.log_format.as_str(), "text" | "json") {
            return Err(anyhow::anyhow!("LOG_FORMAT must be 'text' or 'json'"));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn pipeline_config(&self) -> &PipelineConfig {
        &self.pipeline
    }

    /// Region for S3 clients, preferring the storage-specific setting.
    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref().or(self.aws_region.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.log_format == "json"
    }
}
