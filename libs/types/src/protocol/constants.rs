//! Protocol constants and message families
//!
//! Dialect tags, supported version sets and the closed list of wire message
//! names. These live in the types crate so that both the codec and the
//! engine can classify messages without depending on each other.

use std::fmt;
use std::str::FromStr;

/// Root tag of the external wire dialect
pub const WIRE_ROOT: &str = "ThreeDSecure";

/// Envelope element between the wire root and the message element
pub const WIRE_ENVELOPE: &str = "Message";

/// Root tag of the internal merchant interface dialect
pub const INTERFACE_ROOT: &str = "MPI_Interface";

/// Family name used by registry queries to select every family
pub const ALL_FAMILIES: &str = "ALL";

/// Wire protocol versions, newest first
pub const WIRE_VERSIONS: &[&str] = &["1.0.2", "1.0.1"];

/// Merchant interface versions
pub const INTERFACE_VERSIONS: &[&str] = &["1.0"];

/// Message element names allowed inside `ThreeDSecure/Message`
pub const WIRE_MESSAGE_NAMES: &[&str] = &["CRReq", "CRRes", "VEReq", "VERes", "PAReq", "PARes", "Error"];

/// Message element names allowed directly under `MPI_Interface`
pub const INTERFACE_MESSAGE_NAMES: &[&str] = &[
    "PaymentVerifReq",
    "PaymentVerifRes",
    "PaymentAuthReq",
    "PaymentAuthRes",
    "MPIError",
];

/// Card-range messages are excluded from counting and publishing
pub const CARD_RANGE_MESSAGE_NAMES: &[&str] = &["CRReq", "CRRes"];

/// Message family a definition belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProtocolFamily {
    /// External 3-D Secure wire dialect
    ThreeDSecure,
    /// Internal merchant interface dialect
    MpiInterface,
}

impl ProtocolFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            ProtocolFamily::ThreeDSecure => "3DSecure",
            ProtocolFamily::MpiInterface => "MPI_Interface",
        }
    }

    /// Document root tag of the dialect
    pub fn root_tag(self) -> &'static str {
        match self {
            ProtocolFamily::ThreeDSecure => WIRE_ROOT,
            ProtocolFamily::MpiInterface => INTERFACE_ROOT,
        }
    }

    /// Dialect of a document root, if it is one
    pub fn from_root_tag(tag: &str) -> Option<Self> {
        match tag {
            WIRE_ROOT => Some(ProtocolFamily::ThreeDSecure),
            INTERFACE_ROOT => Some(ProtocolFamily::MpiInterface),
            _ => None,
        }
    }

    /// Family of a built-in message name
    pub fn of_message(name: &str) -> Option<Self> {
        if WIRE_MESSAGE_NAMES.contains(&name) {
            Some(ProtocolFamily::ThreeDSecure)
        } else if INTERFACE_MESSAGE_NAMES.contains(&name) {
            Some(ProtocolFamily::MpiInterface)
        } else {
            None
        }
    }

    pub fn is_wire(self) -> bool {
        self == ProtocolFamily::ThreeDSecure
    }
}

impl FromStr for ProtocolFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("3DSecure") {
            Ok(ProtocolFamily::ThreeDSecure)
        } else if s.eq_ignore_ascii_case("MPI_Interface") {
            Ok(ProtocolFamily::MpiInterface)
        } else {
            Err(format!("unknown protocol family '{}'", s))
        }
    }
}

impl fmt::Display for ProtocolFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Card-range request/response test
pub fn is_card_range_message(name: &str) -> bool {
    CARD_RANGE_MESSAGE_NAMES.contains(&name)
}
