//! # MPI Message Types
//!
//! Message model and protocol message definitions for the 3-D Secure
//! Merchant Plug-In.
//!
//! ## Design Philosophy
//!
//! - **Typed messages**: every wire and interface message is a plain struct
//!   with validated setters; nothing is looked up by reflection
//! - **Uniform errors**: all failures are [`MessagingError`]s carrying the
//!   five fields an error response needs
//! - **Static setter tables**: binding descriptors resolve to function
//!   pointers built once per message type
//! - **Clear boundaries**: XML parsing, registry and dispatch live in
//!   `mpi-codec` and `mpi-engine`; this crate has no shared state
//!
//! ## Quick Start
//!
//! ```rust
//! use mpi_types::{BindableMessage, Message, VERes};
//!
//! let mut veres = VERes::new_message("1.0.2");
//! veres.set_id("tx-1");
//! veres.set_enrolled(Some("N".to_string())).unwrap();
//! veres.set_ireq_code(Some("50".to_string())).unwrap();
//! assert!(veres.validate().is_ok());
//! ```
//!
//! ## Integration Points
//!
//! - **mpi-codec**: resolves descriptor attributes against
//!   [`BindableMessage::field_setters`] and serializes via
//!   [`Message::write_fields`]
//! - **mpi-engine**: dispatches `Box<dyn Message>` and renders failures with
//!   [`ErrorMessage::from_error`] / [`MpiError::from_error`]

pub mod common;
pub mod protocol;

pub use common::errors::{ErrorCode, ErrorKind, MessagingError, MessagingResult};
pub use common::validation::{
    validate_choice_field, validate_digit_field, validate_field, FieldSpec, FieldValue,
};
pub use common::values::{
    CardRange, CardRangeAction, Extension, Profile, ProfileItem, ProfileRequest, ProfileScope,
    SignatureDocument,
};

pub use protocol::binding::{
    BindableMessage, BoundValue, FieldSetter, FromBoundValue, MessageFactory, SetterFn, ValueType,
};
pub use protocol::constants::{
    is_card_range_message, ProtocolFamily, ALL_FAMILIES, INTERFACE_MESSAGE_NAMES, INTERFACE_ROOT,
    INTERFACE_VERSIONS, WIRE_ENVELOPE, WIRE_MESSAGE_NAMES, WIRE_ROOT, WIRE_VERSIONS,
};
pub use protocol::message::{compare_versions, Message, MessageHeader, MessageUID};
pub use protocol::messages::{
    builtin_factories, CRReq, CRRes, ErrorMessage, MpiError, PAReq, PARes, PaymentAuthReq,
    PaymentAuthRes, PaymentVerifReq, PaymentVerifRes, VEReq, VERes,
};
