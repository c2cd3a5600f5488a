//! Card-range synchronisation: `CRReq` / `CRRes`
//!
//! The MPI asks the directory for the card ranges participating in 3-D Secure,
//! optionally as a delta since `serialNumber`. These messages are excluded
//! from counting and publishing by the engine.

use crate::common::errors::MessagingResult;
use crate::common::values::{CardRange, Extension};
use crate::protocol::binding::{BindableMessage, FieldSetter};
use crate::protocol::message::{Message, MessageHeader};
use crate::protocol::messages::fields::{checked, IssuerRequest, MerchantInfo, SERIAL_NUMBER};
use crate::protocol::xml::{append_card_ranges, append_extensions, append_text};
use xmltree::Element;

/// Card-range request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CRReq {
    pub header: MessageHeader,
    pub merchant: MerchantInfo,
    pub serial_number: Option<String>,
    pub extensions: Vec<Extension>,
}

impl CRReq {
    pub fn set_acq_bin(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.merchant.set_acq_bin(&self.header.id, value)
    }

    pub fn set_mer_id(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.merchant.set_mer_id(&self.header.id, value)
    }

    pub fn set_password(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.merchant.set_password(&self.header.id, value)
    }

    pub fn set_serial_number(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.serial_number = checked(&self.header.id, value, &SERIAL_NUMBER)?;
        Ok(())
    }

    pub fn set_extensions(&mut self, value: Vec<Extension>) -> MessagingResult<()> {
        self.extensions = value;
        Ok(())
    }
}

impl Message for CRReq {
    crate::message_boilerplate!();

    fn validate(&self) -> MessagingResult<()> {
        self.merchant.validate(&self.header.id)
    }

    fn write_fields(&self, body: &mut Element) {
        self.merchant.write(body);
        append_text(body, "serialNumber", self.serial_number.as_deref());
        append_extensions(body, &self.extensions);
    }

    fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    fn merchant_id(&self) -> Option<&str> {
        self.merchant.mer_id.as_deref()
    }
}

impl BindableMessage for CRReq {
    const IMPLEMENTATION: &'static str = "threeds.CRReq";
    const MESSAGE_TYPE: &'static str = "CRReq";

    fn field_setters() -> Vec<FieldSetter> {
        crate::field_setters!(CRReq {
            "acqBIN" => set_acq_bin(Option<String>),
            "merID" => set_mer_id(Option<String>),
            "password" => set_password(Option<String>),
            "serialNumber" => set_serial_number(Option<String>),
            "extensions" => set_extensions(Vec<Extension>),
        })
    }
}

/// Card-range response carrying a full list or a delta
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CRRes {
    pub header: MessageHeader,
    pub ranges: Vec<CardRange>,
    pub serial_number: Option<String>,
    pub ireq: IssuerRequest,
    pub extensions: Vec<Extension>,
}

impl CRRes {
    pub fn set_ranges(&mut self, value: Vec<CardRange>) -> MessagingResult<()> {
        self.ranges = value;
        Ok(())
    }

    pub fn set_serial_number(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.serial_number = checked(&self.header.id, value, &SERIAL_NUMBER)?;
        Ok(())
    }

    pub fn set_ireq_code(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.ireq.set_code(&self.header.id, value)
    }

    pub fn set_ireq_detail(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.ireq.set_detail(&self.header.id, value)
    }

    pub fn set_vendor_code(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.ireq.set_vendor_code(&self.header.id, value)
    }

    pub fn set_extensions(&mut self, value: Vec<Extension>) -> MessagingResult<()> {
        self.extensions = value;
        Ok(())
    }
}

impl Message for CRRes {
    crate::message_boilerplate!();

    fn validate(&self) -> MessagingResult<()> {
        self.ireq.validate(&self.header.id)
    }

    fn write_fields(&self, body: &mut Element) {
        append_card_ranges(body, &self.ranges);
        append_text(body, "serialNumber", self.serial_number.as_deref());
        self.ireq.write(body);
        append_extensions(body, &self.extensions);
    }

    fn extensions(&self) -> &[Extension] {
        &self.extensions
    }
}

impl BindableMessage for CRRes {
    const IMPLEMENTATION: &'static str = "threeds.CRRes";
    const MESSAGE_TYPE: &'static str = "CRRes";

    fn field_setters() -> Vec<FieldSetter> {
        crate::field_setters!(CRRes {
            "cardRanges" => set_ranges(Vec<CardRange>),
            "serialNumber" => set_serial_number(Option<String>),
            "iReqCode" => set_ireq_code(Option<String>),
            "iReqDetail" => set_ireq_detail(Option<String>),
            "vendorCode" => set_vendor_code(Option<String>),
            "extensions" => set_extensions(Vec<Extension>),
        })
    }
}
