//! Photodrop Worker
//!
//! Turns S3 event notifications delivered through SQS into ingest pipeline
//! invocations. [`event`] parses notification bodies, [`context`] is the seam the
//! consumer dispatches through, and [`consumer`] runs the long-poll loop.

pub mod consumer;
pub mod context;
pub mod event;

pub use consumer::{dispatch_message, ConsumerConfig, Disposition, QueueConsumer};
pub use context::IngestHandler;
pub use event::{parse_notification, EventError, Notification, S3EventRecord};
