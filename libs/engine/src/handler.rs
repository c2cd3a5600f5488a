//! # Request Handler
//!
//! ## Purpose
//!
//! The transport-facing entry point: one XML document in, one XML document
//! out. Every failure becomes an error document in the dialect of the
//! request, echoing the request id, so transports never see a
//! [`MessagingError`] directly.
//!
//! ```text
//! xml ─► Document ─► Converter ─► MessageEngine ─► serializer ─► xml
//!          │            │              │               │
//!          └────────────┴──────┬───────┴───────────────┘
//!                              ▼
//!        wire request ─► <ThreeDSecure><Message><Error>
//!        otherwise    ─► <MPI_Interface><MPIError>
//! ```

use crate::engine::MessageEngine;
use mpi_codec::{to_xml_string, Converter, Document, VersionOverride};
use mpi_types::protocol::xml::text_element;
use mpi_types::{
    ErrorMessage, MessagingError, MessagingResult, MpiError, ProtocolFamily, INTERFACE_ROOT,
    INTERFACE_VERSIONS, WIRE_VERSIONS,
};
use std::sync::Arc;
use tracing::{debug, error, warn};
use xmltree::{Element, XMLNode};

/// What is known about the request when a failure has to be rendered
#[derive(Debug, Default)]
struct Origin {
    family: Option<ProtocolFamily>,
    version: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RequestHandler {
    converter: Converter,
    engine: Arc<MessageEngine>,
    version_override: VersionOverride,
}

impl RequestHandler {
    pub fn new(converter: Converter, engine: Arc<MessageEngine>) -> Self {
        Self {
            converter,
            engine,
            version_override: VersionOverride::new(),
        }
    }

    /// Wire error documents use the negotiated version when one is set
    pub fn with_version_override(mut self, version_override: VersionOverride) -> Self {
        self.version_override = version_override;
        self
    }

    pub fn engine(&self) -> &MessageEngine {
        &self.engine
    }

    /// Convert, process and serialize one request
    pub async fn handle(&self, xml: &str) -> String {
        let mut origin = Origin::default();
        match self.try_handle(xml, &mut origin).await {
            Ok(response) => response,
            Err(failure) => {
                debug!(
                    id = %failure.id,
                    code = %failure.error_code,
                    detail = %failure.error_detail,
                    "Request failed, answering with error document"
                );
                self.error_document(&origin, &failure)
            }
        }
    }

    async fn try_handle(&self, xml: &str, origin: &mut Origin) -> MessagingResult<String> {
        let document = Document::parse_str(xml)?;
        origin.family = ProtocolFamily::from_root_tag(&document.root().name);

        let request = self.converter.convert(&document)?;
        origin.version = Some(request.version().to_string());

        let response = self.engine.process(request).await?;
        to_xml_string(response.as_ref())
    }

    fn error_document(&self, origin: &Origin, failure: &MessagingError) -> String {
        let rendered = match origin.family {
            Some(family) if family.is_wire() => {
                let version = origin
                    .version
                    .clone()
                    .or_else(|| self.version_override.get())
                    .unwrap_or_else(|| WIRE_VERSIONS[0].to_string());
                to_xml_string(&ErrorMessage::from_error(failure, &version))
            }
            _ => to_xml_string(&MpiError::from_error(failure, INTERFACE_VERSIONS[0])),
        };

        rendered.unwrap_or_else(|e| {
            error!(
                id = %failure.id,
                error = %e.error_detail,
                "Cannot serialize error document, sending minimal MPIError"
            );
            minimal_error_document(failure)
        })
    }
}

/// Bare `MPIError` built directly on the element tree
fn minimal_error_document(failure: &MessagingError) -> String {
    let mut body = Element::new("MPIError");
    body.attributes.insert("id".to_string(), failure.id.clone());
    for (name, value) in [
        ("version", INTERFACE_VERSIONS[0].to_string()),
        ("errorCode", failure.error_code.to_string()),
        ("errorMessage", failure.error_msg.clone()),
    ] {
        body.children.push(XMLNode::Element(text_element(name, &value)));
    }

    let mut root = Element::new(INTERFACE_ROOT);
    root.children.push(XMLNode::Element(body));
    Document::from_element(root).to_xml_string().unwrap_or_else(|e| {
        warn!(error = %e.error_detail, "Minimal error document failed to serialize");
        String::new()
    })
}
