//! Common building blocks shared by every message
//!
//! - [`errors`]: the uniform [`MessagingError`](errors::MessagingError) carrier
//! - [`validation`]: stateless field constraint checks
//! - [`values`]: structured field values (extensions, card ranges, profiles)

pub mod errors;
pub mod validation;
pub mod values;

pub use errors::{ErrorCode, ErrorKind, MessagingError, MessagingResult};
pub use validation::{validate_choice_field, validate_digit_field, validate_field, FieldSpec, FieldValue};
pub use values::{
    CardRange, CardRangeAction, Extension, Profile, ProfileItem, ProfileRequest, ProfileScope,
    SignatureDocument,
};
