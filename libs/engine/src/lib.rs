//! # MPI Message Engine
//!
//! ## Purpose
//!
//! Runs converted messages through deployment-supplied collaborators:
//! - [`MessageEngine`] validates, dispatches to the processor named by the
//!   message definition, counts and publishes the result
//! - [`VersionNegotiator`] switches the wire version after a peer's
//!   "version not supported" error
//! - [`RequestHandler`] is the XML-in, XML-out surface for transports
//! - [`MessageCounter`] is an in-process [`Counter`]
//!
//! ## Architecture Role
//!
//! ```text
//! Transport ──xml──► RequestHandler ──► Converter (mpi-codec)
//!                          │
//!                          ▼
//!                    MessageEngine ──► Processor ──► Counter ──► Publisher
//!                          │
//!                          └──► VersionNegotiator ──► VersionOverride
//! ```
//!
//! ## Concurrency
//!
//! One `process` call per inbound request, many in flight at once. The engine
//! itself holds no per-request state; the registry snapshot, the binding cache
//! and the version override are the only shared data and are synchronized in
//! `mpi-codec`. Suspension happens only inside collaborators.

pub mod collaborators;
pub mod engine;
pub mod handler;
pub mod metrics;
pub mod negotiation;
pub mod test_utils;

pub use collaborators::{
    ComplexProcessor, Counter, NoOpCounter, NoOpPublisher, Processor, PublishError, Publisher,
};
pub use engine::MessageEngine;
pub use handler::RequestHandler;
pub use metrics::{CounterKey, MessageCounter};
pub use negotiation::VersionNegotiator;
