//! # Engine Collaborators
//!
//! ## Purpose
//!
//! The seams between the protocol core and deployment-specific behaviour.
//! Processors hold the business logic for one message type, the counter and
//! publisher observe every non card-range result. All of them may suspend;
//! nothing else in the engine does.
//!
//! ```text
//!             ┌──────────────┐   result   ┌─────────┐   ┌───────────┐
//! message ──► │  Processor   │ ─────────► │ Counter │ ─►│ Publisher │
//!             └──────────────┘            └─────────┘   └─────┬─────┘
//!                                                             │ ok
//!                                     ComplexProcessor (opt) ◄┘
//! ```

use async_trait::async_trait;
use mpi_types::{Message, MessagingResult};
use std::fmt::Debug;
use thiserror::Error;

/// Business logic for one message type
#[async_trait]
pub trait Processor: Send + Sync + Debug {
    async fn process(&self, message: Box<dyn Message>) -> MessagingResult<Box<dyn Message>>;

    /// Secondary step applied to the result after it has been published
    fn complex(&self) -> Option<&dyn ComplexProcessor> {
        None
    }
}

#[async_trait]
pub trait ComplexProcessor: Send + Sync + Debug {
    async fn process_complex(&self, message: Box<dyn Message>)
        -> MessagingResult<Box<dyn Message>>;
}

/// Per-merchant traffic accounting
pub trait Counter: Send + Sync + Debug {
    fn count(&self, message: &dyn Message, merchant_id: Option<&str>);
}

/// Downstream delivery of processed results
#[async_trait]
pub trait Publisher: Send + Sync + Debug {
    async fn publish(&self, message: &dyn Message) -> Result<(), PublishError>;
}

#[derive(Debug, Clone, Error)]
pub enum PublishError {
    #[error("Publisher unavailable: {0}")]
    Unavailable(String),

    #[error("Message {id} rejected: {reason}")]
    Rejected { id: String, reason: String },

    #[error("Timeout after {0} ms")]
    Timeout(u64),
}

/// Counter that discards everything
#[derive(Debug, Default)]
pub struct NoOpCounter;

impl Counter for NoOpCounter {
    fn count(&self, _message: &dyn Message, _merchant_id: Option<&str>) {}
}

/// Publisher that accepts everything
#[derive(Debug, Default)]
pub struct NoOpPublisher;

#[async_trait]
impl Publisher for NoOpPublisher {
    async fn publish(&self, _message: &dyn Message) -> Result<(), PublishError> {
        Ok(())
    }
}
