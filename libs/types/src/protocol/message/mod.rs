//! # Message Model
//!
//! ## Purpose
//!
//! The abstract protocol message. Every concrete wire and interface message
//! implements [`Message`]; the codec and the engine only ever handle
//! `Box<dyn Message>` and recover the concrete type with
//! [`downcast_ref`](trait.Message.html#method.downcast_ref) where a transformer
//! or processor needs typed access.
//!
//! ## Lifecycle
//!
//! ```text
//! MessageGenerator::create ──► typed setters (binding / code) ──► validate
//!                                                                   │
//!            serializer::to_document ◄── processor / transformer ◄──┘
//! ```
//!
//! Messages are owned by the request that created them and never persisted.

pub mod header;

pub use header::{compare_versions, MessageHeader, MessageUID};

use crate::common::errors::MessagingResult;
use crate::common::values::Extension;
use std::any::Any;
use std::fmt;
use xmltree::Element;

/// Protocol message contract
pub trait Message: Any + fmt::Debug + Send + Sync {
    fn header(&self) -> &MessageHeader;

    fn header_mut(&mut self) -> &mut MessageHeader;

    /// Message-level validation: required presence and cross-field rules
    fn validate(&self) -> MessagingResult<()>;

    /// Write the body fields (everything after `version`) into the message element
    fn write_fields(&self, body: &mut Element);

    /// Elements emitted as siblings after the message element (wire dialect only)
    fn trailing_elements(&self) -> MessagingResult<Vec<Element>> {
        Ok(Vec::new())
    }

    fn extensions(&self) -> &[Extension] {
        &[]
    }

    /// Merchant identifier used for counting, when the message carries one
    fn merchant_id(&self) -> Option<&str> {
        None
    }

    /// Drop or reshape fields the target protocol version does not define
    fn adapt_to_version(&mut self, _version: &str) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn clone_message(&self) -> Box<dyn Message>;

    fn id(&self) -> &str {
        &self.header().id
    }

    fn message_type(&self) -> &str {
        &self.header().message_type
    }

    fn version(&self) -> &str {
        &self.header().version
    }

    fn uid(&self) -> MessageUID {
        self.header().uid()
    }

    fn set_id(&mut self, id: &str) {
        self.header_mut().id = id.to_string();
    }

    fn set_version(&mut self, version: &str) {
        self.header_mut().version = version.to_string();
    }
}

impl dyn Message {
    pub fn is<T: Message>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Message>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Message>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

impl Clone for Box<dyn Message> {
    fn clone(&self) -> Self {
        self.clone_message()
    }
}

/// Accessors every message implements identically
///
/// Expects the struct to hold its identity in a field named `header`.
#[macro_export]
macro_rules! message_boilerplate {
    () => {
        fn header(&self) -> &$crate::protocol::message::MessageHeader {
            &self.header
        }

        fn header_mut(&mut self) -> &mut $crate::protocol::message::MessageHeader {
            &mut self.header
        }

        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }

        fn clone_message(&self) -> Box<dyn $crate::protocol::message::Message> {
            Box::new(self.clone())
        }
    };
}
