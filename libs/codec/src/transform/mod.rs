//! # Message Transformers
//!
//! ## Purpose
//!
//! Pairwise converters that fill a destination message from a differently
//! shaped source: merchant interface requests become wire requests, wire
//! responses become interface responses, and a message can be re-issued
//! under another protocol version.
//!
//! ## Lookup
//!
//! ```text
//! from.uid() ──► registry ──► MessageMetaInfo.transformers[to.uid()] ──► transform(from, to)
//!                                                                            │
//!                                                       adapt_to_version(to.version)
//! ```
//!
//! The destination is created by the caller, normally through
//! [`MessageGenerator::create`](crate::MessageGenerator::create) so that a
//! negotiated wire version override applies. Transformers only copy and
//! derive fields; they never validate the result.

pub mod builtin;

pub use builtin::{
    ErrorToMpiError, PAReqToPaymentVerifRes, PAResToPaymentAuthRes, PaymentVerifReqToPAReq,
    PaymentVerifReqToVEReq, VEResToPAReq, VEResToPaymentVerifRes, VersionAdapter,
};

use crate::registry::MessageRegistry;
use mpi_types::{Message, MessagingError, MessagingResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// Converter for one ordered (source, destination) pair
pub trait MessageTransformer: Send + Sync + fmt::Debug {
    /// Name the definition source refers to
    fn name(&self) -> &str;

    /// Copy what `from` carries into `to` and return it
    fn transform(&self, from: &dyn Message, to: Box<dyn Message>) -> MessagingResult<Box<dyn Message>>;
}

/// Transformer name → implementation
#[derive(Debug, Clone, Default)]
pub struct TransformerCatalog {
    transformers: HashMap<String, Arc<dyn MessageTransformer>>,
}

impl TransformerCatalog {
    pub fn builtin() -> Self {
        let mut catalog = Self::default();
        catalog.register(Arc::new(PaymentVerifReqToVEReq));
        catalog.register(Arc::new(PaymentVerifReqToPAReq));
        catalog.register(Arc::new(VEResToPAReq));
        catalog.register(Arc::new(VEResToPaymentVerifRes));
        catalog.register(Arc::new(PAReqToPaymentVerifRes));
        catalog.register(Arc::new(PAResToPaymentAuthRes));
        catalog.register(Arc::new(ErrorToMpiError));
        catalog.register(Arc::new(VersionAdapter));
        catalog
    }

    pub fn register(&mut self, transformer: Arc<dyn MessageTransformer>) {
        self.transformers.insert(transformer.name().to_string(), transformer);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn MessageTransformer>> {
        self.transformers.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.transformers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Transform `from` into `to` using the transformer registered for the pair
pub fn transform(
    registry: &MessageRegistry,
    from: &dyn Message,
    to: Box<dyn Message>,
) -> MessagingResult<Box<dyn Message>> {
    let source = from.uid();
    let destination = to.uid();

    let meta = registry.lookup(&source).ok_or_else(|| {
        MessagingError::message_not_recognized(from.id(), from.message_type())
    })?;
    let transformer = meta.transformer_for(&destination).ok_or_else(|| {
        error!(from = %source, to = %destination, "No transformer registered");
        MessagingError::binding(
            from.id(),
            format!("no transformer from {} to {}", source, destination),
        )
    })?;

    debug!(from = %source, to = %destination, transformer = transformer.name(), "Transforming message");
    let mut result = transformer.transform(from, to)?;
    result.adapt_to_version(destination.version.as_str());
    Ok(result)
}

/// Typed view of a transformer's source message
pub(crate) fn source_as<'a, T: Message>(from: &'a dyn Message, transformer: &str) -> MessagingResult<&'a T> {
    from.downcast_ref::<T>().ok_or_else(|| mismatch(from, transformer, "source"))
}

/// Typed view of a transformer's destination message
pub(crate) fn target_as<'a, T: Message>(to: &'a mut Box<dyn Message>, transformer: &str) -> MessagingResult<&'a mut T> {
    if !to.is::<T>() {
        return Err(mismatch(to.as_ref(), transformer, "destination"));
    }
    to.downcast_mut::<T>()
        .ok_or_else(|| MessagingError::binding("", format!("{}: destination downcast failed", transformer)))
}

fn mismatch(message: &dyn Message, transformer: &str, role: &str) -> MessagingError {
    MessagingError::binding(
        message.id(),
        format!(
            "{} cannot take {} as {}",
            transformer,
            message.message_type(),
            role
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_names() {
        let catalog = TransformerCatalog::builtin();
        assert_eq!(
            catalog.names(),
            vec![
                "ErrorToMpiError",
                "PAReqToPaymentVerifRes",
                "PAResToPaymentAuthRes",
                "PaymentVerifReqToPAReq",
                "PaymentVerifReqToVEReq",
                "VEResToPAReq",
                "VEResToPaymentVerifRes",
                "VersionAdapter",
            ]
        );
        assert!(catalog.get("Nope").is_none());
    }
}
