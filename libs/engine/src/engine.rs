//! # Message Engine
//!
//! ## Purpose
//!
//! Dispatches one validated message to the processor its definition names,
//! then accounts for and publishes the result. Publishing is fail-closed: a
//! result that cannot be published is never returned to the caller.
//!
//! ## Dispatch Sequence
//!
//! ```text
//! validate ─► observe (negotiation) ─► resolve processor ─► process
//!                                                             │
//!          ┌────────── card-range request/response? ──────────┤
//!          │ no                                               │ yes
//!          ▼                                                  │
//!  count ─► publish ──(error)──► TransactionAbandoned (97)    │
//!          │                                                  │
//!          └─────────────► complex step (optional) ◄──────────┘
//! ```
//!
//! ## Configuration Errors
//!
//! A definition without a processor name, or a name no processor was
//! registered under, is a binding failure for that message type. It is
//! logged at error level and returned; nothing is retried.

use crate::collaborators::{Counter, NoOpCounter, NoOpPublisher, Processor, Publisher};
use crate::negotiation::VersionNegotiator;
use mpi_codec::RegistryHandle;
use mpi_types::{is_card_range_message, Message, MessagingError, MessagingResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Debug)]
pub struct MessageEngine {
    registry: RegistryHandle,
    processors: HashMap<String, Arc<dyn Processor>>,
    counter: Arc<dyn Counter>,
    publisher: Arc<dyn Publisher>,
    negotiator: Option<VersionNegotiator>,
}

impl MessageEngine {
    pub fn new(registry: RegistryHandle) -> Self {
        Self {
            registry,
            processors: HashMap::new(),
            counter: Arc::new(NoOpCounter),
            publisher: Arc::new(NoOpPublisher),
            negotiator: None,
        }
    }

    /// Register the processor that definitions refer to as `name`
    pub fn with_processor(mut self, name: impl Into<String>, processor: Arc<dyn Processor>) -> Self {
        self.processors.insert(name.into(), processor);
        self
    }

    pub fn with_counter(mut self, counter: Arc<dyn Counter>) -> Self {
        self.counter = counter;
        self
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = publisher;
        self
    }

    /// Watch inbound wire errors for version renegotiation
    pub fn with_negotiator(mut self, negotiator: VersionNegotiator) -> Self {
        self.negotiator = Some(negotiator);
        self
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    pub fn processor_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.processors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub async fn process(&self, message: Box<dyn Message>) -> MessagingResult<Box<dyn Message>> {
        let id = message.id().to_string();
        message
            .validate()
            .map_err(|e| e.with_context(&id, message.message_type(), message.version()))?;

        if let Some(negotiator) = &self.negotiator {
            negotiator.observe(message.as_ref());
        }

        let processor = self.resolve_processor(message.as_ref())?;
        let observed = !is_card_range_message(message.message_type());
        let request_merchant = message.merchant_id().map(str::to_string);

        debug!(id = %id, uid = %message.uid(), "Dispatching message");
        let result = processor.process(message).await?;

        if observed {
            let merchant_id = request_merchant.as_deref().or_else(|| result.merchant_id());
            self.counter.count(result.as_ref(), merchant_id);

            if let Err(cause) = self.publisher.publish(result.as_ref()).await {
                error!(
                    id = %id,
                    message_type = %result.message_type(),
                    error = %cause,
                    "Publishing failed, abandoning transaction"
                );
                return Err(MessagingError::abandoned(&id, cause));
            }
        }

        match processor.complex() {
            Some(complex) => complex.process_complex(result).await,
            None => Ok(result),
        }
    }

    fn resolve_processor(&self, message: &dyn Message) -> MessagingResult<Arc<dyn Processor>> {
        let uid = message.uid();
        let registry = self.registry.snapshot();
        let meta = registry.lookup(&uid).ok_or_else(|| {
            MessagingError::version_not_supported(message.id(), message.message_type(), message.version())
        })?;

        let Some(name) = meta.processor.as_deref() else {
            error!(uid = %uid, "No processor configured for message type");
            return Err(MessagingError::binding(
                message.id(),
                format!("no processor configured for {}", uid),
            ));
        };

        self.processors.get(name).cloned().ok_or_else(|| {
            error!(uid = %uid, processor = name, "Configured processor is not registered");
            MessagingError::binding(
                message.id(),
                format!("processor '{}' for {} is not registered", name, uid),
            )
        })
    }
}
