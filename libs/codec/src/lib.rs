//! # MPI Protocol Codec
//!
//! ## Purpose
//!
//! The rules layer between raw XML and typed messages:
//! - Typed document tree and root-anchored paths
//! - The eight binding strategies and the per-type binding cache
//! - Declarative message definitions and the Message Type Registry
//! - Message Generator with the negotiated wire version override
//! - Converter (document → message) and serializer (message → document)
//! - Transformers between the wire and interface dialects
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → [codec] → libs/engine → services/gateway
//!     ↑           ↓            ↓
//! Messages    Registry      Dispatch
//! Setters     Binding       Collaborators
//! Errors      Transform     Error documents
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use mpi_codec::{Converter, RegistryHandle};
//! use mpi_types::VERes;
//!
//! let converter = Converter::new(RegistryHandle::builtin().unwrap());
//! let message = converter
//!     .convert_str(concat!(
//!         r#"<ThreeDSecure><Message id="tx-1"><VERes><version>1.0.2</version>"#,
//!         "<CH><enrolled>N</enrolled></CH></VERes></Message></ThreeDSecure>"
//!     ))
//!     .unwrap();
//! assert!(message.downcast_ref::<VERes>().is_some());
//! ```
//!
//! ## What This Crate Does NOT Contain
//! - Processor business logic or dispatch (belongs in libs/engine)
//! - Transport, signing or persistence

pub mod binding;
pub mod converter;
pub mod document;
pub mod error;
pub mod generator;
pub mod registry;
pub mod serializer;
pub mod transform;

pub use binding::{BindingCache, BindingKind, BindingMetaInfo, BindingRule, ResolvedBinding};
pub use converter::Converter;
pub use document::{DocPath, Document, ElementExt};
pub use error::{DefinitionError, DefinitionResult};
pub use generator::{MessageGenerator, VersionOverride};
pub use registry::{
    ExtensionInfo, ImplementationCatalog, MessageMetaInfo, MessageRegistry, RegistryHandle,
    RegistryMetadata, SupportedExtension, DEFAULT_DEFINITIONS,
};
pub use serializer::{to_document, to_xml_string};
pub use transform::{transform, MessageTransformer, TransformerCatalog};

/// Create the destination with `generator` and transform `from` into it
///
/// The destination picks up the negotiated wire version when one is set.
pub fn transform_to(
    generator: &MessageGenerator,
    from: &dyn mpi_types::Message,
    message_type: &str,
    version: &str,
) -> mpi_types::MessagingResult<Box<dyn mpi_types::Message>> {
    let destination = generator.create(message_type, version)?;
    transform(&generator.registry().snapshot(), from, destination)
}
