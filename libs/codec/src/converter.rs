//! # Document → Message Conversion
//!
//! ## Purpose
//!
//! Turns a parsed document of either dialect into a populated, typed message
//! by running the message's binding rules against the tree.
//!
//! ## Flow
//!
//! ```text
//! root tag ──► dialect ──► message element ──► type ──► id ──► version
//!                                                                 │
//!      registry: version supported? ──► bindings (cached) ──► instantiate
//!                                                                 │
//!                      for each rule: extract(kind, path) ──► setter
//!                                                                 │
//!                                              extension support check
//! ```
//!
//! Every failure carries whatever id, type and version had been read when it
//! happened.

use crate::binding::strategies;
use crate::document::{Document, ElementExt};
use crate::generator;
use crate::registry::{MessageRegistry, RegistryHandle};
use mpi_types::{
    Message, MessageUID, MessagingError, MessagingResult, ProtocolFamily, WIRE_ENVELOPE,
};
use tracing::{debug, warn};
use xmltree::Element;

/// Identity read from the document before binding
#[derive(Debug)]
struct Envelope {
    id: String,
    message_type: String,
    version: String,
}

#[derive(Debug, Clone)]
pub struct Converter {
    registry: RegistryHandle,
}

impl Converter {
    pub fn new(registry: RegistryHandle) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    pub fn convert_str(&self, xml: &str) -> MessagingResult<Box<dyn Message>> {
        let document = Document::parse_str(xml).map_err(|e| {
            debug!(error = %e.error_detail, "Rejecting unparseable document");
            e
        })?;
        self.convert(&document)
    }

    pub fn convert(&self, document: &Document) -> MessagingResult<Box<dyn Message>> {
        let registry = self.registry.snapshot();
        let mut progress = Progress::default();

        convert_with(&registry, document.root(), &mut progress).map_err(|error| {
            let error = error.with_context(&progress.id, &progress.message_type, &progress.version);
            if error.is_structural() || error.is_value() {
                debug!(
                    id = %error.id,
                    code = %error.error_code,
                    detail = %error.error_detail,
                    "Document rejected"
                );
            } else {
                warn!(
                    id = %error.id,
                    code = %error.error_code,
                    detail = %error.error_detail,
                    "Conversion failed"
                );
            }
            error
        })
    }
}

/// What has been read so far, for error context
#[derive(Debug, Default)]
struct Progress {
    id: String,
    message_type: String,
    version: String,
}

fn convert_with(
    registry: &MessageRegistry,
    root: &Element,
    progress: &mut Progress,
) -> MessagingResult<Box<dyn Message>> {
    let envelope = read_envelope(registry, root, progress)?;
    let uid = MessageUID::new(envelope.message_type.as_str(), envelope.version.as_str());

    let meta = registry.lookup(&uid).ok_or_else(|| {
        MessagingError::version_not_supported(&envelope.id, &envelope.message_type, &envelope.version)
    })?;
    let bindings = registry.bindings_for(&uid)?;

    let mut message = generator::instantiate(registry, &uid)?;
    message.set_id(&envelope.id);

    for binding in bindings.iter() {
        let value = strategies::extract(binding.kind, &binding.path, root, &envelope.id)?;
        (binding.setter.apply)(message.as_mut(), value)?;
    }

    meta.extensions.check(&envelope.id, message.extensions())?;

    debug!(id = %envelope.id, message = %uid, rules = bindings.len(), "Document converted");
    Ok(message)
}

/// Identify dialect, message type, id and version of a document
fn read_envelope(
    registry: &MessageRegistry,
    root: &Element,
    progress: &mut Progress,
) -> MessagingResult<Envelope> {
    let family = ProtocolFamily::from_root_tag(&root.name)
        .ok_or_else(|| MessagingError::root_invalid(&root.name))?;

    // Wire documents wrap the message in an envelope that carries the id
    let (carrier, body) = if family.is_wire() {
        let envelope = root
            .children_named(WIRE_ENVELOPE)
            .next()
            .ok_or_else(|| MessagingError::missing_element("", format!("{}/{}", root.name, WIRE_ENVELOPE)))?;
        let body = envelope.child_elements().next().ok_or_else(|| {
            MessagingError::missing_element("", format!("{}/{}/<message>", root.name, WIRE_ENVELOPE))
        })?;
        (envelope, body)
    } else {
        let body = root
            .child_elements()
            .next()
            .ok_or_else(|| MessagingError::missing_element("", format!("{}/<message>", root.name)))?;
        (body, body)
    };

    let id_attribute = carrier.attribute("id").map(str::trim).map(str::to_string);
    if let Some(id) = &id_attribute {
        progress.id = id.clone();
    }

    let recognized = registry
        .lookup_name(&body.name)
        .filter(|meta| meta.family == family)
        .is_some();
    if !recognized {
        return Err(MessagingError::message_not_recognized(&progress.id, &body.name));
    }
    progress.message_type = body.name.clone();

    let id = id_attribute
        .ok_or_else(|| MessagingError::missing_element("", format!("{}/@id", carrier.name)))?;
    if id.is_empty() {
        return Err(MessagingError::invalid_value("", "id", "", "non-empty message id"));
    }

    let version = body
        .child_text("version")
        .ok_or_else(|| MessagingError::missing_element(&id, format!("{}/version", body.name)))?;
    if version.is_empty() {
        return Err(MessagingError::invalid_value(&id, "version", "", "non-empty version"));
    }
    progress.version = version.clone();

    Ok(Envelope {
        id,
        message_type: body.name.clone(),
        version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpi_types::{ErrorCode, VERes};

    fn converter() -> Converter {
        Converter::new(RegistryHandle::builtin().unwrap())
    }

    #[test]
    fn test_wire_envelope() {
        let message = converter()
            .convert_str(concat!(
                r#"<ThreeDSecure><Message id="m1"><VERes><version>1.0.2</version>"#,
                "<CH><enrolled>N</enrolled><acctID></acctID></CH><url></url>",
                "<IReq><iReqCode>50</iReqCode></IReq></VERes></Message></ThreeDSecure>"
            ))
            .unwrap();
        let veres = message.downcast_ref::<VERes>().unwrap();
        assert_eq!(veres.id(), "m1");
        assert_eq!(veres.version(), "1.0.2");
        assert_eq!(veres.enrolled.as_deref(), Some("N"));
        assert_eq!(veres.acct_id, None);
        assert!(veres.validate().is_ok());
    }

    #[test]
    fn test_unknown_root_and_message() {
        let err = converter().convert_str("<SET><Message/></SET>").unwrap_err();
        assert_eq!(err.error_code, ErrorCode::RootElementInvalid);
        assert!(err.is_structural());

        let err = converter()
            .convert_str(r#"<ThreeDSecure><Message id="m1"><PayReq><version>1.0.2</version></PayReq></Message></ThreeDSecure>"#)
            .unwrap_err();
        assert_eq!(err.error_code, ErrorCode::MessageNotRecognized);
        assert_eq!(err.id, "m1");

        // Interface message names are not valid inside a wire envelope
        let err = converter()
            .convert_str(r#"<ThreeDSecure><Message id="m1"><PaymentAuthReq><version>1.0</version></PaymentAuthReq></Message></ThreeDSecure>"#)
            .unwrap_err();
        assert_eq!(err.error_code, ErrorCode::MessageNotRecognized);
    }

    #[test]
    fn test_id_presence() {
        let err = converter()
            .convert_str("<ThreeDSecure><Message><VERes><version>1.0.2</version></VERes></Message></ThreeDSecure>")
            .unwrap_err();
        assert!(err.is_structural());

        let err = converter()
            .convert_str(r#"<ThreeDSecure><Message id=""><VERes><version>1.0.2</version></VERes></Message></ThreeDSecure>"#)
            .unwrap_err();
        assert!(err.is_value());
    }

    #[test]
    fn test_version_errors() {
        let err = converter()
            .convert_str(r#"<ThreeDSecure><Message id="m1"><VERes><CH><enrolled>N</enrolled></CH></VERes></Message></ThreeDSecure>"#)
            .unwrap_err();
        assert_eq!(err.error_code, ErrorCode::RequiredElementMissing);
        assert_eq!(err.vendor_code.as_deref(), Some("type=VERes version="));

        let err = converter()
            .convert_str(r#"<ThreeDSecure><Message id="m1"><VERes><version>2.0.0</version></VERes></Message></ThreeDSecure>"#)
            .unwrap_err();
        assert_eq!(err.error_code, ErrorCode::VersionNotSupported);
        assert!(err.is_value());
        assert!(err.error_detail.contains("2.0.0"));
    }
}
