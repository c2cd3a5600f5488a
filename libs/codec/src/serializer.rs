//! Message → document serialization
//!
//! ```text
//! wire       <ThreeDSecure><Message id=".."><VERes><version>..</version>..</VERes>[Signature]</Message></ThreeDSecure>
//! interface  <MPI_Interface><PaymentVerifRes id=".."><version>..</version>..</PaymentVerifRes></MPI_Interface>
//! ```

use crate::document::Document;
use mpi_types::{
    Message, MessagingError, MessagingResult, ProtocolFamily, WIRE_ENVELOPE,
};
use mpi_types::protocol::xml::text_element;
use xmltree::{Element, XMLNode};

/// Build the dialect-correct document for `message`
pub fn to_document(message: &dyn Message) -> MessagingResult<Document> {
    let family = ProtocolFamily::of_message(message.message_type()).ok_or_else(|| {
        MessagingError::message_not_recognized(message.id(), message.message_type())
    })?;

    let mut body = Element::new(message.message_type());
    body.children
        .push(XMLNode::Element(text_element("version", message.version())));
    message.write_fields(&mut body);

    let mut root = Element::new(family.root_tag());
    if family.is_wire() {
        let mut envelope = Element::new(WIRE_ENVELOPE);
        envelope
            .attributes
            .insert("id".to_string(), message.id().to_string());
        envelope.children.push(XMLNode::Element(body));
        for trailing in message.trailing_elements()? {
            envelope.children.push(XMLNode::Element(trailing));
        }
        root.children.push(XMLNode::Element(envelope));
    } else {
        body.attributes
            .insert("id".to_string(), message.id().to_string());
        root.children.push(XMLNode::Element(body));
    }
    Ok(Document::from_element(root))
}

pub fn to_xml_string(message: &dyn Message) -> MessagingResult<String> {
    to_document(message)?.to_xml_string().map_err(|mut e| {
        e.id = message.id().to_string();
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ElementExt;
    use mpi_types::{BindableMessage, PaymentVerifRes, VERes};

    #[test]
    fn test_wire_layout() {
        let mut veres = VERes::new_message("1.0.2");
        veres.set_id("m1");
        veres.set_enrolled(Some("N".into())).unwrap();

        let document = to_document(&veres).unwrap();
        let root = document.root();
        assert_eq!(root.name, "ThreeDSecure");
        let envelope = root.children_named("Message").next().unwrap();
        assert_eq!(envelope.attribute("id"), Some("m1"));
        let body = envelope.children_named("VERes").next().unwrap();
        assert_eq!(body.child_elements().next().unwrap().name, "version");
        assert_eq!(body.child_text("version").as_deref(), Some("1.0.2"));
    }

    #[test]
    fn test_interface_layout() {
        let mut response = PaymentVerifRes::new_message("1.0");
        response.set_id("r1");
        response.set_enrolled(Some("U".into())).unwrap();

        let xml = to_xml_string(&response).unwrap();
        assert!(xml.contains(r#"<PaymentVerifRes id="r1"><version>1.0</version><enrolled>U</enrolled></PaymentVerifRes>"#));
        assert!(xml.starts_with("<?xml"));
    }
}
