//! Merchant verification exchange: `PaymentVerifReq` / `PaymentVerifRes`
//!
//! The merchant submits card and purchase data once; the MPI runs the
//! enrollment check and, when the card is enrolled, hands back the ACS url
//! together with a base64 encoded wire `PAReq` to post through the browser.

use crate::common::errors::MessagingResult;
use crate::common::validation::FieldSpec;
use crate::common::values::{Extension, ProfileRequest};
use crate::protocol::binding::{BindableMessage, FieldSetter};
use crate::protocol::message::{Message, MessageHeader};
use crate::protocol::messages::fields::{
    checked, checked_choice, checked_digits, non_empty, require, ACCEPT, ACQ_BIN, DEVICE_CATEGORY,
    DEVICE_CATEGORY_VALUES, ENROLLED, ENROLLED_VALUES, MERCHANT_COUNTRY, MERCHANT_NAME, MERCHANT_URL,
    USER_AGENT, XID,
};
use crate::protocol::xml::{append_extensions, append_profile_requests, append_text};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use xmltree::Element;

pub const MERCHANT_ID: FieldSpec = FieldSpec::new("merchantID", 1, 24).required();
pub const PAN: FieldSpec = FieldSpec::new("pan", 13, 19).required();
pub const PAN_EXPIRY: FieldSpec = FieldSpec::exact("panExpiry", 4).required();
pub const PURCH_AMOUNT: FieldSpec = FieldSpec::new("purchAmount", 1, 12).required();
pub const CURRENCY: FieldSpec = FieldSpec::exact("currency", 3).required();
pub const EXPONENT: FieldSpec = FieldSpec::exact("exponent", 1);
pub const DESCRIPTION: FieldSpec = FieldSpec::new("description", 1, 125);
pub const ACS_URL: FieldSpec = FieldSpec::new("url", 1, 2048);
pub const PA_REQ: FieldSpec = FieldSpec::at_least("paReq", 1);

/// Merchant request to verify a card and start authentication
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentVerifReq {
    pub header: MessageHeader,
    pub merchant_id: Option<String>,
    pub acq_bin: Option<String>,
    pub merchant_name: Option<String>,
    pub merchant_country: Option<String>,
    pub merchant_url: Option<String>,
    pub pan: Option<String>,
    pub pan_expiry: Option<String>,
    pub purch_amount: Option<String>,
    pub currency: Option<String>,
    pub exponent: Option<String>,
    pub description: Option<String>,
    /// Transaction id; generated when the merchant does not supply one
    pub xid: Option<String>,
    pub device_category: Option<String>,
    pub accept: Option<String>,
    pub user_agent: Option<String>,
    pub profile_requests: Vec<ProfileRequest>,
    pub extensions: Vec<Extension>,
}

impl PaymentVerifReq {
    pub fn set_merchant_id(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.merchant_id = checked(&self.header.id, value, &MERCHANT_ID)?;
        Ok(())
    }

    pub fn set_acq_bin(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.acq_bin = checked_digits(&self.header.id, value, &ACQ_BIN.optional())?;
        Ok(())
    }

    pub fn set_merchant_name(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.merchant_name = checked(&self.header.id, value, &MERCHANT_NAME)?;
        Ok(())
    }

    pub fn set_merchant_country(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.merchant_country = checked_digits(&self.header.id, value, &MERCHANT_COUNTRY)?;
        Ok(())
    }

    pub fn set_merchant_url(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.merchant_url = checked(&self.header.id, value, &MERCHANT_URL)?;
        Ok(())
    }

    pub fn set_pan(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.pan = checked_digits(&self.header.id, value, &PAN)?;
        Ok(())
    }

    pub fn set_pan_expiry(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.pan_expiry = checked_digits(&self.header.id, value, &PAN_EXPIRY)?;
        Ok(())
    }

    pub fn set_purch_amount(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.purch_amount = checked_digits(&self.header.id, value, &PURCH_AMOUNT)?;
        Ok(())
    }

    pub fn set_currency(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.currency = checked_digits(&self.header.id, value, &CURRENCY)?;
        Ok(())
    }

    pub fn set_exponent(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.exponent = checked_digits(&self.header.id, value, &EXPONENT)?;
        Ok(())
    }

    pub fn set_description(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.description = checked(&self.header.id, value, &DESCRIPTION)?;
        Ok(())
    }

    pub fn set_xid(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.xid = checked(&self.header.id, value, &XID.optional())?;
        Ok(())
    }

    pub fn set_device_category(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.device_category =
            checked_choice(&self.header.id, value, &DEVICE_CATEGORY, DEVICE_CATEGORY_VALUES)?;
        Ok(())
    }

    pub fn set_accept(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.accept = checked(&self.header.id, value, &ACCEPT)?;
        Ok(())
    }

    pub fn set_user_agent(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.user_agent = checked(&self.header.id, value, &USER_AGENT)?;
        Ok(())
    }

    pub fn set_profile_requests(&mut self, value: Vec<ProfileRequest>) -> MessagingResult<()> {
        self.profile_requests = value;
        Ok(())
    }

    pub fn set_extensions(&mut self, value: Vec<Extension>) -> MessagingResult<()> {
        self.extensions = value;
        Ok(())
    }
}

impl Message for PaymentVerifReq {
    crate::message_boilerplate!();

    fn validate(&self) -> MessagingResult<()> {
        let id = &self.header.id;
        require(id, self.merchant_id.as_deref(), &MERCHANT_ID)?;
        require(id, self.pan.as_deref(), &PAN)?;
        require(id, self.pan_expiry.as_deref(), &PAN_EXPIRY)?;
        require(id, self.purch_amount.as_deref(), &PURCH_AMOUNT)?;
        require(id, self.currency.as_deref(), &CURRENCY)
    }

    fn write_fields(&self, body: &mut Element) {
        append_text(body, "merchantID", self.merchant_id.as_deref());
        append_text(body, "acqBIN", self.acq_bin.as_deref());
        append_text(body, "merchantName", self.merchant_name.as_deref());
        append_text(body, "merchantCountry", self.merchant_country.as_deref());
        append_text(body, "merchantURL", self.merchant_url.as_deref());
        append_text(body, "pan", self.pan.as_deref());
        append_text(body, "panExpiry", self.pan_expiry.as_deref());
        append_text(body, "purchAmount", self.purch_amount.as_deref());
        append_text(body, "currency", self.currency.as_deref());
        append_text(body, "exponent", self.exponent.as_deref());
        append_text(body, "description", self.description.as_deref());
        append_text(body, "xid", self.xid.as_deref());
        append_text(body, "deviceCategory", self.device_category.as_deref());
        append_text(body, "accept", self.accept.as_deref());
        append_text(body, "userAgent", self.user_agent.as_deref());
        append_profile_requests(body, &self.profile_requests);
        append_extensions(body, &self.extensions);
    }

    fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    fn merchant_id(&self) -> Option<&str> {
        self.merchant_id.as_deref()
    }
}

impl BindableMessage for PaymentVerifReq {
    const IMPLEMENTATION: &'static str = "mpi.PaymentVerifReq";
    const MESSAGE_TYPE: &'static str = "PaymentVerifReq";

    fn field_setters() -> Vec<FieldSetter> {
        crate::field_setters!(PaymentVerifReq {
            "merchantID" => set_merchant_id(Option<String>),
            "acqBIN" => set_acq_bin(Option<String>),
            "merchantName" => set_merchant_name(Option<String>),
            "merchantCountry" => set_merchant_country(Option<String>),
            "merchantURL" => set_merchant_url(Option<String>),
            "pan" => set_pan(Option<String>),
            "panExpiry" => set_pan_expiry(Option<String>),
            "purchAmount" => set_purch_amount(Option<String>),
            "currency" => set_currency(Option<String>),
            "exponent" => set_exponent(Option<String>),
            "description" => set_description(Option<String>),
            "xid" => set_xid(Option<String>),
            "deviceCategory" => set_device_category(Option<String>),
            "accept" => set_accept(Option<String>),
            "userAgent" => set_user_agent(Option<String>),
            "profileRequests" => set_profile_requests(Vec<ProfileRequest>),
            "extensions" => set_extensions(Vec<Extension>),
        })
    }
}

/// Verification result returned to the merchant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentVerifRes {
    pub header: MessageHeader,
    pub enrolled: Option<String>,
    pub url: Option<String>,
    /// Base64 encoded wire `PAReq` document
    pub pa_req: Option<String>,
}

impl PaymentVerifRes {
    pub fn set_enrolled(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.enrolled = checked_choice(&self.header.id, value, &ENROLLED, ENROLLED_VALUES)?;
        Ok(())
    }

    pub fn set_url(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.url = checked(&self.header.id, non_empty(value), &ACS_URL)?;
        Ok(())
    }

    pub fn set_pa_req(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.pa_req = checked(&self.header.id, non_empty(value), &PA_REQ)?;
        Ok(())
    }

    /// Store an XML document as base64 `paReq`
    pub fn embed_pa_req(&mut self, document: &str) -> MessagingResult<()> {
        self.set_pa_req(Some(STANDARD.encode(document.as_bytes())))
    }

    pub fn is_enrolled(&self) -> bool {
        self.enrolled.as_deref() == Some("Y")
    }
}

impl Message for PaymentVerifRes {
    crate::message_boilerplate!();

    fn validate(&self) -> MessagingResult<()> {
        let id = &self.header.id;
        require(id, self.enrolled.as_deref(), &ENROLLED)?;
        if self.is_enrolled() {
            require(id, self.url.as_deref(), &ACS_URL)?;
            require(id, self.pa_req.as_deref(), &PA_REQ)?;
        }
        Ok(())
    }

    fn write_fields(&self, body: &mut Element) {
        append_text(body, "enrolled", self.enrolled.as_deref());
        append_text(body, "url", self.url.as_deref());
        append_text(body, "paReq", self.pa_req.as_deref());
    }
}

impl BindableMessage for PaymentVerifRes {
    const IMPLEMENTATION: &'static str = "mpi.PaymentVerifRes";
    const MESSAGE_TYPE: &'static str = "PaymentVerifRes";

    fn field_setters() -> Vec<FieldSetter> {
        crate::field_setters!(PaymentVerifRes {
            "enrolled" => set_enrolled(Option<String>),
            "url" => set_url(Option<String>),
            "paReq" => set_pa_req(Option<String>),
        })
    }
}
