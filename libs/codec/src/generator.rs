//! Message generator and the process-wide wire version override

use crate::registry::{MessageRegistry, RegistryHandle};
use mpi_types::{Message, MessageHeader, MessageUID, MessagingError, MessagingResult};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared cell holding the negotiated wire protocol version
///
/// Set when a peer answers "version not supported, use X"; every wire
/// message generated afterwards uses X until the cell is changed again.
#[derive(Debug, Clone, Default)]
pub struct VersionOverride {
    inner: Arc<RwLock<Option<String>>>,
}

impl VersionOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial(version: Option<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(version)),
        }
    }

    pub fn get(&self) -> Option<String> {
        self.inner.read().clone()
    }

    /// Returns the previous value
    pub fn set(&self, version: impl Into<String>) -> Option<String> {
        let version = version.into();
        info!(version = %version, "Wire version override set");
        self.inner.write().replace(version)
    }

    pub fn clear(&self) -> Option<String> {
        self.inner.write().take()
    }
}

/// Creates empty messages for registered types
#[derive(Debug, Clone)]
pub struct MessageGenerator {
    registry: RegistryHandle,
    version_override: VersionOverride,
}

impl MessageGenerator {
    pub fn new(registry: RegistryHandle, version_override: VersionOverride) -> Self {
        Self {
            registry,
            version_override,
        }
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    pub fn version_override(&self) -> &VersionOverride {
        &self.version_override
    }

    /// New message of `message_type` with a fresh id
    ///
    /// The requested version must be supported. Wire messages then take the
    /// override version when one is set and the type supports it.
    pub fn create(&self, message_type: &str, version: &str) -> MessagingResult<Box<dyn Message>> {
        let registry = self.registry.snapshot();
        let meta = registry
            .lookup_name(message_type)
            .ok_or_else(|| MessagingError::message_not_recognized("", message_type))?;
        if !meta.supports_version(version) {
            return Err(MessagingError::version_not_supported("", message_type, version));
        }

        let overridden = if meta.family.is_wire() {
            self.version_override
                .get()
                .filter(|candidate| meta.supports_version(candidate))
        } else {
            None
        };
        let effective = match overridden {
            Some(candidate) => {
                debug!(message = message_type, requested = version, effective = %candidate, "Applying version override");
                candidate
            }
            None => version.to_string(),
        };

        let mut message = meta.implementation.create();
        *message.header_mut() = MessageHeader::new(meta.name.as_str(), effective);
        message.set_id(&MessageHeader::generate_id());
        Ok(message)
    }

    /// Message for exactly `uid`, with no id and no override applied
    pub fn instantiate(&self, uid: &MessageUID) -> MessagingResult<Box<dyn Message>> {
        instantiate(&self.registry.snapshot(), uid)
    }
}

pub(crate) fn instantiate(registry: &MessageRegistry, uid: &MessageUID) -> MessagingResult<Box<dyn Message>> {
    let meta = registry
        .lookup(uid)
        .ok_or_else(|| MessagingError::version_not_supported("", &uid.name, &uid.version))?;
    let mut message = meta.implementation.create();
    *message.header_mut() = MessageHeader::new(meta.name.as_str(), uid.version.as_str());
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpi_types::{ErrorCode, VEReq};

    fn generator() -> MessageGenerator {
        MessageGenerator::new(RegistryHandle::builtin().unwrap(), VersionOverride::new())
    }

    #[test]
    fn test_create_sets_identity() {
        let message = generator().create("VEReq", "1.0.2").unwrap();
        assert!(message.is::<VEReq>());
        assert_eq!(message.message_type(), "VEReq");
        assert_eq!(message.version(), "1.0.2");
        assert!(!message.id().is_empty());
    }

    #[test]
    fn test_unsupported_version_is_value_error() {
        let err = generator().create("VEReq", "9.9").unwrap_err();
        assert_eq!(err.error_code, ErrorCode::VersionNotSupported);
        assert!(err.is_value());

        let err = generator().create("SET", "1.0").unwrap_err();
        assert_eq!(err.error_code, ErrorCode::MessageNotRecognized);
    }

    #[test]
    fn test_override_does_not_rescue_unsupported_request() {
        let generator = generator();
        generator.version_override().set("1.0.1");

        let err = generator.create("VEReq", "9.9").unwrap_err();
        assert_eq!(err.error_code, ErrorCode::VersionNotSupported);
        assert!(err.error_detail.contains("'9.9'"));
        assert_eq!(generator.create("VEReq", "1.0.2").unwrap().version(), "1.0.1");
    }

    #[test]
    fn test_override_applies_to_wire_family_only() {
        let generator = generator();
        assert_eq!(generator.version_override().set("1.0.1"), None);

        assert_eq!(generator.create("VEReq", "1.0.2").unwrap().version(), "1.0.1");
        assert_eq!(generator.create("PaymentVerifReq", "1.0").unwrap().version(), "1.0");

        assert_eq!(generator.version_override().clear(), Some("1.0.1".to_string()));
        assert_eq!(generator.create("VEReq", "1.0.2").unwrap().version(), "1.0.2");
    }

    #[test]
    fn test_unsupported_override_is_ignored() {
        let generator = generator();
        generator.version_override().set("0.9");
        assert_eq!(generator.create("VERes", "1.0.2").unwrap().version(), "1.0.2");
    }

    #[test]
    fn test_override_shared_between_clones() {
        let generator = generator();
        let other = generator.clone();
        other.version_override().set("1.0.1");
        assert_eq!(generator.version_override().get().as_deref(), Some("1.0.1"));
    }
}
