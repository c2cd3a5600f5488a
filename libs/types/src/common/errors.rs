//! Uniform error carrier for protocol message handling
//!
//! Every failure raised while converting, validating, transforming or
//! dispatching a message is reported as a [`MessagingError`]. The carrier keeps
//! the five fields an error response needs (`id`, `errorCode`, `errorMsg`,
//! `errorDetail`, `vendorCode`) so the outermost handler can render it into a
//! wire `Error` or an interface `MPIError` without losing context.
//!
//! ## Error Taxonomy
//!
//! ```text
//! ErrorCode 1-3   → Structural   (missing root, unknown message, missing element)
//! ErrorCode 4-6   → Value        (critical extension, bad format, bad version)
//! ErrorCode 95    → Binding      (broken descriptors, unresolvable setter/processor)
//! ErrorCode 96    → Unexpected   (malformed document, anything unclassified)
//! ErrorCode 97    → Publishing   (transaction abandoned, fail-closed)
//! ErrorCode 98-99 → Processing   (transient / permanent processor failures)
//! ```

use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;
use thiserror::Error;

/// Numeric error codes carried in `errorCode`
///
/// Codes 1-6 follow the 3-D Secure protocol error table so they can be sent to
/// a directory or access-control server unchanged. Codes 95 and above are
/// MPI-internal and only ever leave the process inside an interface `MPIError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum ErrorCode {
    /// Root element is not `ThreeDSecure` / `MPI_Interface`
    RootElementInvalid = 1,
    /// Message element is not a defined message
    MessageNotRecognized = 2,
    /// A required element or attribute is missing
    RequiredElementMissing = 3,
    /// A critical extension is not supported by the receiver
    CriticalElementNotRecognized = 4,
    /// One or more elements have an invalid format or value
    InvalidFormat = 5,
    /// Protocol version is not supported; renegotiation may follow
    VersionNotSupported = 6,
    /// Binding descriptors or dispatch configuration are unusable
    BindingFailure = 95,
    /// Unclassified conversion failure
    ConversionFailure = 96,
    /// The result could not be published and was withheld
    TransactionAbandoned = 97,
    /// Temporary failure in a collaborator
    TransientFailure = 98,
    /// Permanent failure in a collaborator
    PermanentFailure = 99,
}

impl ErrorCode {
    /// Classification used for logging and retry decisions upstream
    pub fn kind(self) -> ErrorKind {
        match self {
            ErrorCode::RootElementInvalid
            | ErrorCode::MessageNotRecognized
            | ErrorCode::RequiredElementMissing => ErrorKind::Structural,
            ErrorCode::CriticalElementNotRecognized
            | ErrorCode::InvalidFormat
            | ErrorCode::VersionNotSupported => ErrorKind::Value,
            ErrorCode::BindingFailure => ErrorKind::Binding,
            ErrorCode::ConversionFailure => ErrorKind::Unexpected,
            ErrorCode::TransactionAbandoned => ErrorKind::Publishing,
            ErrorCode::TransientFailure | ErrorCode::PermanentFailure => ErrorKind::Processing,
        }
    }

    /// Short user-facing text used as the default `errorMsg`
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::RootElementInvalid => "Root element invalid",
            ErrorCode::MessageNotRecognized => "Message element not a defined message",
            ErrorCode::RequiredElementMissing => "Required element missing",
            ErrorCode::CriticalElementNotRecognized => "Critical element not recognized",
            ErrorCode::InvalidFormat => "Format of one or more elements is invalid",
            ErrorCode::VersionNotSupported => "Protocol version not supported",
            ErrorCode::BindingFailure => "Message binding configuration error",
            ErrorCode::ConversionFailure => "Message conversion failed",
            ErrorCode::TransactionAbandoned => "Transaction abandoned",
            ErrorCode::TransientFailure => "Transient system failure",
            ErrorCode::PermanentFailure => "Permanent system failure",
        }
    }

    /// Parse the textual `errorCode` element of an inbound error message
    pub fn from_wire(code: &str) -> Option<Self> {
        code.trim()
            .parse::<u16>()
            .ok()
            .and_then(|value| Self::try_from(value).ok())
    }

    /// Numeric value as rendered on the wire
    pub fn as_u16(self) -> u16 {
        self.into()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// Error classes of the message engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Structural,
    Value,
    Binding,
    Publishing,
    Processing,
    Unexpected,
}

/// The uniform error carrier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{error_code}] {error_msg} (id: {id}, detail: {error_detail})")]
pub struct MessagingError {
    /// Correlation id of the message being handled, empty when unknown
    pub id: String,
    /// Protocol or MPI error code
    pub error_code: ErrorCode,
    /// Short, user-facing message
    pub error_msg: String,
    /// Field or path context, echoing the offending value where there is one
    pub error_detail: String,
    /// Free-form diagnostic
    pub vendor_code: Option<String>,
}

impl MessagingError {
    /// Create an error with the code's default message
    pub fn new(id: impl Into<String>, error_code: ErrorCode, error_detail: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            error_code,
            error_msg: error_code.description().to_string(),
            error_detail: error_detail.into(),
            vendor_code: None,
        }
    }

    /// Document root is neither dialect
    pub fn root_invalid(root_tag: &str) -> Self {
        Self::new("", ErrorCode::RootElementInvalid, format!("root element '{}'", root_tag))
    }

    /// Message element names no known message
    pub fn message_not_recognized(id: &str, name: &str) -> Self {
        Self::new(id, ErrorCode::MessageNotRecognized, format!("message element '{}'", name))
    }

    /// Required element or attribute missing at `path`
    pub fn missing_element(id: &str, path: impl Into<String>) -> Self {
        Self::new(id, ErrorCode::RequiredElementMissing, path)
    }

    /// Value constraint violation, echoing the field, the value and what was expected
    pub fn invalid_value(id: &str, field: &str, value: &str, expected: impl fmt::Display) -> Self {
        Self::new(
            id,
            ErrorCode::InvalidFormat,
            format!("{}='{}': {}", field, value, expected),
        )
    }

    /// Message type does not support the requested version
    pub fn version_not_supported(id: &str, message_type: &str, version: &str) -> Self {
        Self::new(
            id,
            ErrorCode::VersionNotSupported,
            format!("{} does not support version '{}'", message_type, version),
        )
    }

    /// Critical extension the receiver does not declare
    pub fn critical_extension(id: &str, extension_id: &str) -> Self {
        Self::new(
            id,
            ErrorCode::CriticalElementNotRecognized,
            format!("critical extension '{}' is not supported", extension_id),
        )
    }

    /// Binding descriptors, setter tables or dispatch configuration are unusable
    pub fn binding(id: &str, detail: impl Into<String>) -> Self {
        Self::new(id, ErrorCode::BindingFailure, detail)
    }

    /// Unclassified conversion failure
    pub fn conversion(id: &str, detail: impl Into<String>) -> Self {
        Self::new(id, ErrorCode::ConversionFailure, detail)
    }

    /// Result withheld because publishing failed
    pub fn abandoned(id: &str, cause: impl fmt::Display) -> Self {
        Self::new(
            id,
            ErrorCode::TransactionAbandoned,
            format!("publishing failed: {}", cause),
        )
    }

    /// Attach a diagnostic vendor code
    pub fn with_vendor_code(mut self, vendor_code: impl Into<String>) -> Self {
        self.vendor_code = Some(vendor_code.into());
        self
    }

    /// Attach the in-progress message identity unless a vendor code is already set
    pub fn with_context(mut self, id: &str, message_type: &str, version: &str) -> Self {
        if self.id.is_empty() {
            self.id = id.to_string();
        }
        if self.vendor_code.is_none() {
            self.vendor_code = Some(format!("type={} version={}", message_type, version));
        }
        self
    }

    /// Error class derived from the code
    pub fn kind(&self) -> ErrorKind {
        self.error_code.kind()
    }

    pub fn is_structural(&self) -> bool {
        self.kind() == ErrorKind::Structural
    }

    pub fn is_value(&self) -> bool {
        self.kind() == ErrorKind::Value
    }
}

/// Result type for message operations
pub type MessagingResult<T> = std::result::Result<T, MessagingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_classification() {
        assert_eq!(ErrorCode::RequiredElementMissing.kind(), ErrorKind::Structural);
        assert_eq!(ErrorCode::VersionNotSupported.kind(), ErrorKind::Value);
        assert_eq!(ErrorCode::BindingFailure.kind(), ErrorKind::Binding);
        assert_eq!(ErrorCode::TransactionAbandoned.kind(), ErrorKind::Publishing);
    }

    #[test]
    fn test_wire_code_parsing() {
        assert_eq!(ErrorCode::from_wire(" 6 "), Some(ErrorCode::VersionNotSupported));
        assert_eq!(ErrorCode::from_wire("97"), Some(ErrorCode::TransactionAbandoned));
        assert_eq!(ErrorCode::from_wire("42"), None);
        assert_eq!(ErrorCode::from_wire("abc"), None);
    }

    #[test]
    fn test_display_formatting() {
        let error = MessagingError::invalid_value("tx-1", "pan", "4111", "expected 13 to 19 digits");
        let display = format!("{}", error);
        assert!(display.contains("[5]"));
        assert!(display.contains("tx-1"));
        assert!(display.contains("pan='4111'"));
    }

    #[test]
    fn test_context_does_not_override_vendor_code() {
        let error = MessagingError::missing_element("", "Message/VERes/CH/enrolled")
            .with_context("tx-2", "VERes", "1.0.2");
        assert_eq!(error.id, "tx-2");
        assert_eq!(error.vendor_code.as_deref(), Some("type=VERes version=1.0.2"));

        let error = MessagingError::binding("tx-3", "no setter").with_vendor_code("cfg");
        let error = error.with_context("tx-3", "VERes", "1.0.2");
        assert_eq!(error.vendor_code.as_deref(), Some("cfg"));
    }
}
