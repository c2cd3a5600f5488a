//! # Wire Version Negotiation
//!
//! A directory or access control server that cannot handle our wire version
//! answers with an `Error` of code 6 naming the version it accepts. Seeing
//! such an error switches the shared [`VersionOverride`], so every wire
//! message generated afterwards is built for the peer's version. The override
//! stays until an operator clears it or another renegotiation replaces it.

use mpi_codec::{RegistryHandle, VersionOverride};
use mpi_types::{ErrorCode, ErrorMessage, Message, ProtocolFamily};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct VersionNegotiator {
    registry: RegistryHandle,
    version_override: VersionOverride,
}

impl VersionNegotiator {
    pub fn new(registry: RegistryHandle, version_override: VersionOverride) -> Self {
        Self {
            registry,
            version_override,
        }
    }

    pub fn version_override(&self) -> &VersionOverride {
        &self.version_override
    }

    /// Inspect an inbound message; returns the version switched to, if any
    pub fn observe(&self, message: &dyn Message) -> Option<String> {
        let error = message.downcast_ref::<ErrorMessage>()?;
        if error.code() != Some(ErrorCode::VersionNotSupported) {
            return None;
        }
        let Some(version) = error.renegotiation_version() else {
            debug!(id = %error.id(), "Version error without a usable version in errorDetail");
            return None;
        };

        if !self.is_registered_wire_version(version) {
            warn!(
                id = %error.id(),
                version,
                "Peer asked for an unregistered wire version; keeping current version"
            );
            return None;
        }

        let previous = self.version_override.set(version);
        warn!(
            id = %error.id(),
            from = ?previous,
            to = version,
            "Renegotiated wire protocol version"
        );
        Some(version.to_string())
    }

    /// Drop the override; wire messages go back to their requested versions
    pub fn clear(&self) -> Option<String> {
        self.version_override.clear()
    }

    fn is_registered_wire_version(&self, version: &str) -> bool {
        let registry = self.registry.snapshot();
        registry
            .all_message_info(Some(ProtocolFamily::ThreeDSecure.as_str()))
            .map(|uids| uids.iter().any(|uid| uid.version == version))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpi_types::{BindableMessage, MessagingError, MpiError};

    fn negotiator() -> VersionNegotiator {
        VersionNegotiator::new(RegistryHandle::builtin().unwrap(), VersionOverride::new())
    }

    fn version_error(detail: &str) -> ErrorMessage {
        let mut error = ErrorMessage::new_message("1.0.2");
        error.set_id("ds-1");
        error.set_error_code(Some("6".into())).unwrap();
        error.set_error_message(Some("Version not supported".into())).unwrap();
        error.set_error_detail(Some(detail.into())).unwrap();
        error
    }

    #[test]
    fn test_version_error_sets_override() {
        let negotiator = negotiator();
        assert_eq!(negotiator.observe(&version_error("1.0.1")), Some("1.0.1".to_string()));
        assert_eq!(negotiator.version_override().get().as_deref(), Some("1.0.1"));

        assert_eq!(negotiator.clear().as_deref(), Some("1.0.1"));
        assert_eq!(negotiator.version_override().get(), None);
    }

    #[test]
    fn test_unregistered_version_is_ignored() {
        let negotiator = negotiator();
        assert_eq!(negotiator.observe(&version_error("0.9")), None);
        assert_eq!(negotiator.version_override().get(), None);
    }

    #[test]
    fn test_other_errors_and_interface_errors_are_ignored() {
        let negotiator = negotiator();

        let mut format_error = version_error("1.0.1");
        format_error.set_error_code(Some("5".into())).unwrap();
        assert_eq!(negotiator.observe(&format_error), None);

        let source = MessagingError::version_not_supported("m-1", "VEReq", "1.0.1");
        let interface = MpiError::from_error(&source, "1.0");
        assert_eq!(negotiator.observe(&interface), None);
        assert_eq!(negotiator.version_override().get(), None);
    }
}
