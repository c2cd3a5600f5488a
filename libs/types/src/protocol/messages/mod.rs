//! # Protocol Messages
//!
//! Concrete messages of both dialects and the built-in implementation
//! catalog the registry resolves `implementation = ".."` names against.
//!
//! ```text
//! 3DSecure (wire)          MPI_Interface (merchant)
//! ───────────────          ────────────────────────
//! CRReq / CRRes
//! VEReq / VERes     ◄──►   PaymentVerifReq / PaymentVerifRes
//! PAReq / PARes     ◄──►   PaymentAuthReq  / PaymentAuthRes
//! Error             ───►   MPIError
//! ```

pub mod fields;
pub mod interface;
pub mod wire;

pub use interface::{MpiError, PaymentAuthReq, PaymentAuthRes, PaymentVerifReq, PaymentVerifRes};
pub use wire::{CRReq, CRRes, ErrorMessage, PAReq, PARes, VEReq, VERes};

use crate::protocol::binding::MessageFactory;

/// Every implementation shipped with the crate
pub fn builtin_factories() -> Vec<MessageFactory> {
    vec![
        MessageFactory::of::<CRReq>(),
        MessageFactory::of::<CRRes>(),
        MessageFactory::of::<VEReq>(),
        MessageFactory::of::<VERes>(),
        MessageFactory::of::<PAReq>(),
        MessageFactory::of::<PARes>(),
        MessageFactory::of::<ErrorMessage>(),
        MessageFactory::of::<PaymentVerifReq>(),
        MessageFactory::of::<PaymentVerifRes>(),
        MessageFactory::of::<PaymentAuthReq>(),
        MessageFactory::of::<PaymentAuthRes>(),
        MessageFactory::of::<MpiError>(),
    ]
}

/// Error message shape shared by the wire `Error` and the interface `MPIError`
#[macro_export]
macro_rules! define_error_message {
    ($name:ident, $message_type:literal, $implementation:literal) => {
        use $crate::common::errors::{ErrorCode, MessagingError, MessagingResult};
        use $crate::common::validation::FieldSpec;
        use $crate::protocol::binding::{BindableMessage, FieldSetter};
        use $crate::protocol::message::{Message, MessageHeader};
        use $crate::protocol::messages::fields::{checked, checked_digits, require};
        use $crate::protocol::xml::append_text;
        use xmltree::Element;

        pub const ERROR_CODE: FieldSpec = FieldSpec::new("errorCode", 1, 4).required();
        pub const ERROR_MESSAGE: FieldSpec = FieldSpec::new("errorMessage", 1, 1024).required();
        pub const ERROR_DETAIL: FieldSpec = FieldSpec::new("errorDetail", 1, 2048);
        pub const ERROR_VENDOR_CODE: FieldSpec = FieldSpec::new("vendorCode", 1, 256);

        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            pub header: MessageHeader,
            pub error_code: Option<String>,
            pub error_message: Option<String>,
            pub error_detail: Option<String>,
            pub vendor_code: Option<String>,
        }

        impl $name {
            /// Render a [`MessagingError`] for the peer
            pub fn from_error(error: &MessagingError, version: &str) -> Self {
                let mut message = Self::new_message(version);
                message.header.id = error.id.clone();
                message.error_code = Some(error.error_code.to_string());
                message.error_message = Some(error.error_msg.clone());
                message.error_detail = Some(error.error_detail.clone()).filter(|d| !d.is_empty());
                message.vendor_code = error.vendor_code.clone();
                message
            }

            pub fn set_error_code(&mut self, value: Option<String>) -> MessagingResult<()> {
                self.error_code = checked_digits(&self.header.id, value, &ERROR_CODE)?;
                Ok(())
            }

            pub fn set_error_message(&mut self, value: Option<String>) -> MessagingResult<()> {
                self.error_message = checked(&self.header.id, value, &ERROR_MESSAGE)?;
                Ok(())
            }

            pub fn set_error_detail(&mut self, value: Option<String>) -> MessagingResult<()> {
                self.error_detail = checked(&self.header.id, value, &ERROR_DETAIL)?;
                Ok(())
            }

            pub fn set_vendor_code(&mut self, value: Option<String>) -> MessagingResult<()> {
                self.vendor_code = checked(&self.header.id, value, &ERROR_VENDOR_CODE)?;
                Ok(())
            }

            pub fn code(&self) -> Option<ErrorCode> {
                self.error_code.as_deref().and_then(ErrorCode::from_wire)
            }

            /// Version proposed by the peer when the code is "version not supported"
            pub fn renegotiation_version(&self) -> Option<&str> {
                if self.code() != Some(ErrorCode::VersionNotSupported) {
                    return None;
                }
                self.error_detail.as_deref()?.split_whitespace().next()
            }
        }

        impl Message for $name {
            $crate::message_boilerplate!();

            fn validate(&self) -> MessagingResult<()> {
                require(&self.header.id, self.error_code.as_deref(), &ERROR_CODE)?;
                require(&self.header.id, self.error_message.as_deref(), &ERROR_MESSAGE)
            }

            fn write_fields(&self, body: &mut Element) {
                append_text(body, "errorCode", self.error_code.as_deref());
                append_text(body, "errorMessage", self.error_message.as_deref());
                append_text(body, "errorDetail", self.error_detail.as_deref());
                append_text(body, "vendorCode", self.vendor_code.as_deref());
            }
        }

        impl BindableMessage for $name {
            const IMPLEMENTATION: &'static str = $implementation;
            const MESSAGE_TYPE: &'static str = $message_type;

            fn field_setters() -> Vec<FieldSetter> {
                $crate::field_setters!($name {
                    "errorCode" => set_error_code(Option<String>),
                    "errorMessage" => set_error_message(Option<String>),
                    "errorDetail" => set_error_detail(Option<String>),
                    "vendorCode" => set_vendor_code(Option<String>),
                })
            }
        }
    };
}
