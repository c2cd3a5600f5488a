//! # Typed Setter Tables
//!
//! Each concrete message publishes a table of [`FieldSetter`]s keyed by the
//! attribute name used in binding descriptors. The codec resolves a
//! descriptor's `(attribute, value_type)` pair against this table once per
//! message type and caches the resulting function pointers.
//!
//! ```text
//! descriptor (path, attribute, kind, value_type)
//!        │
//!        ▼
//! FieldSetter { attribute, value_type, apply: fn(&mut dyn Message, BoundValue) }
//!        │
//!        ▼
//! VERes::set_enrolled(Option<String>)  ──► FieldSpec validation
//! ```
//!
//! Tables are built with [`field_setters!`](crate::field_setters).

use super::message::Message;
use crate::common::errors::MessagingResult;
use crate::common::values::{CardRange, Extension, Profile, ProfileRequest, SignatureDocument};
use std::fmt;
use std::str::FromStr;

/// Concrete destination type of a bound value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Text,
    TextList,
    Profiles,
    Extensions,
    ProfileRequests,
    Signature,
    CardRanges,
}

impl ValueType {
    /// Name used in the definition source
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Text => "String",
            ValueType::TextList => "String[]",
            ValueType::Profiles => "Profile[]",
            ValueType::Extensions => "Extension[]",
            ValueType::ProfileRequests => "ProfileRequest[]",
            ValueType::Signature => "Document",
            ValueType::CardRanges => "CardRange[]",
        }
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "String" => Ok(ValueType::Text),
            "String[]" => Ok(ValueType::TextList),
            "Profile[]" => Ok(ValueType::Profiles),
            "Extension[]" => Ok(ValueType::Extensions),
            "ProfileRequest[]" => Ok(ValueType::ProfileRequests),
            "Document" => Ok(ValueType::Signature),
            "CardRange[]" => Ok(ValueType::CardRanges),
            other => Err(format!("unknown value type '{}'", other)),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value extracted from a document by a binding strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundValue {
    Text(Option<String>),
    TextList(Option<Vec<String>>),
    Profiles(Vec<Profile>),
    Extensions(Vec<Extension>),
    ProfileRequests(Vec<ProfileRequest>),
    Signature(Option<SignatureDocument>),
    CardRanges(Vec<CardRange>),
}

impl BoundValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            BoundValue::Text(_) => ValueType::Text,
            BoundValue::TextList(_) => ValueType::TextList,
            BoundValue::Profiles(_) => ValueType::Profiles,
            BoundValue::Extensions(_) => ValueType::Extensions,
            BoundValue::ProfileRequests(_) => ValueType::ProfileRequests,
            BoundValue::Signature(_) => ValueType::Signature,
            BoundValue::CardRanges(_) => ValueType::CardRanges,
        }
    }
}

/// Setter argument types that can be taken out of a [`BoundValue`]
pub trait FromBoundValue: Sized {
    const VALUE_TYPE: ValueType;

    fn from_bound(value: BoundValue) -> Option<Self>;
}

macro_rules! impl_from_bound {
    ($target:ty, $variant:ident) => {
        impl FromBoundValue for $target {
            const VALUE_TYPE: ValueType = ValueType::$variant;

            fn from_bound(value: BoundValue) -> Option<Self> {
                match value {
                    BoundValue::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

impl_from_bound!(Option<String>, Text);
impl_from_bound!(Option<Vec<String>>, TextList);
impl_from_bound!(Vec<Profile>, Profiles);
impl_from_bound!(Vec<Extension>, Extensions);
impl_from_bound!(Vec<ProfileRequest>, ProfileRequests);
impl_from_bound!(Option<SignatureDocument>, Signature);
impl_from_bound!(Vec<CardRange>, CardRanges);

/// Type-erased setter invocation
pub type SetterFn = fn(&mut dyn Message, BoundValue) -> MessagingResult<()>;

/// One entry of a message's setter table
#[derive(Clone, Copy)]
pub struct FieldSetter {
    pub attribute: &'static str,
    pub value_type: ValueType,
    pub apply: SetterFn,
}

impl FieldSetter {
    pub fn matches(&self, attribute: &str, value_type: ValueType) -> bool {
        self.attribute == attribute && self.value_type == value_type
    }
}

impl fmt::Debug for FieldSetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSetter")
            .field("attribute", &self.attribute)
            .field("value_type", &self.value_type)
            .finish()
    }
}

/// Build a setter table for a message type
///
/// ```ignore
/// field_setters!(VERes {
///     "enrolled" => set_enrolled(Option<String>),
///     "extensions" => set_extensions(Vec<Extension>),
/// })
/// ```
///
/// Each entry downcasts the target and converts the bound value; a mismatch
/// on either side is reported as a binding error.
#[macro_export]
macro_rules! field_setters {
    ($message:ty { $($attr:literal => $setter:ident($value:ty)),* $(,)? }) => {
        vec![$(
            $crate::protocol::binding::FieldSetter {
                attribute: $attr,
                value_type: <$value as $crate::protocol::binding::FromBoundValue>::VALUE_TYPE,
                apply: |target: &mut dyn $crate::protocol::message::Message,
                        value: $crate::protocol::binding::BoundValue| {
                    let id = $crate::protocol::message::Message::id(target).to_string();
                    let message = $crate::protocol::message::Message::as_any_mut(target)
                        .downcast_mut::<$message>()
                        .ok_or_else(|| {
                            $crate::common::errors::MessagingError::binding(
                                &id,
                                concat!("setter '", $attr, "' applied to a foreign message type"),
                            )
                        })?;
                    let value = <$value as $crate::protocol::binding::FromBoundValue>::from_bound(value)
                        .ok_or_else(|| {
                            $crate::common::errors::MessagingError::binding(
                                &id,
                                concat!("bound value does not match setter '", $attr, "'"),
                            )
                        })?;
                    message.$setter(value)
                },
            }
        ),*]
    };
}

/// Message types that can be instantiated from the definition source
pub trait BindableMessage: Message + Default + Clone {
    /// Implementation key referenced by `implementation = ".."`
    const IMPLEMENTATION: &'static str;

    /// Message element name
    const MESSAGE_TYPE: &'static str;

    fn field_setters() -> Vec<FieldSetter>;

    /// Empty message with its type and the given version set
    fn new_message(version: &str) -> Self {
        let mut message = Self::default();
        let header = message.header_mut();
        header.message_type = Self::MESSAGE_TYPE.to_string();
        header.version = version.to_string();
        message
    }
}

/// Factory entry of the implementation registry
#[derive(Clone, Copy)]
pub struct MessageFactory {
    pub implementation: &'static str,
    pub message_type: &'static str,
    create: fn() -> Box<dyn Message>,
    setters: fn() -> Vec<FieldSetter>,
}

fn new_boxed<T: BindableMessage>() -> Box<dyn Message> {
    Box::new(T::new_message(""))
}

impl MessageFactory {
    pub fn of<T: BindableMessage>() -> Self {
        Self {
            implementation: T::IMPLEMENTATION,
            message_type: T::MESSAGE_TYPE,
            create: new_boxed::<T>,
            setters: T::field_setters,
        }
    }

    /// Fresh, empty instance without version or id
    pub fn create(&self) -> Box<dyn Message> {
        (self.create)()
    }

    pub fn setters(&self) -> Vec<FieldSetter> {
        (self.setters)()
    }

    pub fn find_setter(&self, attribute: &str, value_type: ValueType) -> Option<FieldSetter> {
        self.setters()
            .into_iter()
            .find(|setter| setter.matches(attribute, value_type))
    }
}

impl fmt::Debug for MessageFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageFactory")
            .field("implementation", &self.implementation)
            .field("message_type", &self.message_type)
            .finish()
    }
}
