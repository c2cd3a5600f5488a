//! Protocol layer: message model, dialect constants, setter tables and the
//! concrete messages of both dialects.

pub mod binding;
pub mod constants;
pub mod message;
pub mod messages;
pub mod xml;

pub use binding::{BindableMessage, BoundValue, FieldSetter, FromBoundValue, MessageFactory, SetterFn, ValueType};
pub use constants::{
    is_card_range_message, ProtocolFamily, ALL_FAMILIES, INTERFACE_MESSAGE_NAMES, INTERFACE_ROOT,
    INTERFACE_VERSIONS, WIRE_ENVELOPE, WIRE_MESSAGE_NAMES, WIRE_ROOT, WIRE_VERSIONS,
};
pub use message::{compare_versions, Message, MessageHeader, MessageUID};
pub use messages::builtin_factories;
