use crate::collaborators::{ComplexProcessor, Processor, PublishError, Publisher};
use async_trait::async_trait;
use mpi_types::{Message, MessagingResult};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex,
};
use std::time::Duration;

/// A processor that hands the request back as its own result
#[derive(Debug, Default)]
pub struct EchoProcessor {
    calls: AtomicU64,
    delay: Option<Duration>,
}

impl EchoProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suspend for `delay` before answering
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            calls: AtomicU64::new(0),
            delay: Some(delay),
        }
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Processor for EchoProcessor {
    async fn process(&self, message: Box<dyn Message>) -> MessagingResult<Box<dyn Message>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(message)
    }
}

/// A processor answering every request with a copy of a canned response
#[derive(Debug)]
pub struct RespondingProcessor {
    response: Box<dyn Message>,
    complex: Option<RecordingComplexStep>,
    calls: AtomicU64,
}

impl RespondingProcessor {
    pub fn new(response: Box<dyn Message>) -> Self {
        Self {
            response,
            complex: None,
            calls: AtomicU64::new(0),
        }
    }

    pub fn with_complex_step(mut self) -> Self {
        self.complex = Some(RecordingComplexStep::default());
        self
    }

    pub fn complex_step(&self) -> Option<&RecordingComplexStep> {
        self.complex.as_ref()
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Processor for RespondingProcessor {
    async fn process(&self, message: Box<dyn Message>) -> MessagingResult<Box<dyn Message>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let mut response = self.response.clone_message();
        response.set_id(message.id());
        Ok(response)
    }

    fn complex(&self) -> Option<&dyn ComplexProcessor> {
        self.complex.as_ref().map(|step| step as &dyn ComplexProcessor)
    }
}

/// Complex step that records the ids it saw and passes messages through
#[derive(Debug, Default)]
pub struct RecordingComplexStep {
    seen: Mutex<Vec<String>>,
}

impl RecordingComplexStep {
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ComplexProcessor for RecordingComplexStep {
    async fn process_complex(
        &self,
        message: Box<dyn Message>,
    ) -> MessagingResult<Box<dyn Message>> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(message.id().to_string());
        }
        Ok(message)
    }
}

/// A publisher that keeps copies of everything it was given
#[derive(Debug, Default)]
pub struct CollectingPublisher {
    published: Mutex<Vec<Box<dyn Message>>>,
}

impl CollectingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message_count(&self) -> usize {
        self.published.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// (type, id) of every published message, in order
    pub fn published(&self) -> Vec<(String, String)> {
        self.published
            .lock()
            .map(|published| {
                published
                    .iter()
                    .map(|m| (m.message_type().to_string(), m.id().to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl Publisher for CollectingPublisher {
    async fn publish(&self, message: &dyn Message) -> Result<(), PublishError> {
        self.published
            .lock()
            .map_err(|e| PublishError::Unavailable(e.to_string()))?
            .push(message.clone_message());
        Ok(())
    }
}

/// A publisher that always fails
#[derive(Debug)]
pub struct FailingPublisher {
    error: PublishError,
    attempts: AtomicU64,
}

impl FailingPublisher {
    pub fn new(error: PublishError) -> Self {
        Self {
            error,
            attempts: AtomicU64::new(0),
        }
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Publisher for FailingPublisher {
    async fn publish(&self, _message: &dyn Message) -> Result<(), PublishError> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        Err(self.error.clone())
    }
}
