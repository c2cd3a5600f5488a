//! Enrollment verification: `VEReq` / `VERes`
//!
//! The MPI asks the directory whether a card is enrolled in 3-D Secure. A
//! positive answer carries the ACS `url` and the account identifier to use
//! in the following `PAReq`.

use crate::common::errors::MessagingResult;
use crate::common::values::Extension;
use crate::protocol::binding::{BindableMessage, FieldSetter};
use crate::protocol::message::{compare_versions, Message, MessageHeader};
use crate::protocol::messages::fields::{
    checked, checked_choice, checked_digits, forbid_ireq, non_empty, require, BrowserInfo,
    IssuerRequest, MerchantInfo, ACCT_ID, ACS_URL, ENROLLED, ENROLLED_VALUES, PAN,
};
use crate::protocol::xml::{append_extensions, append_group, append_repeated, append_text};
use std::cmp::Ordering;
use tracing::debug;
use xmltree::Element;

/// First wire version that defines `Browser/deviceCategory`
pub const DEVICE_CATEGORY_SINCE: &str = "1.0.2";

/// Verify-enrollment request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VEReq {
    pub header: MessageHeader,
    pub pan: Option<String>,
    pub merchant: MerchantInfo,
    pub browser: BrowserInfo,
    pub extensions: Vec<Extension>,
}

impl VEReq {
    pub fn set_pan(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.pan = checked_digits(&self.header.id, value, &PAN)?;
        Ok(())
    }

    pub fn set_acq_bin(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.merchant.set_acq_bin(&self.header.id, value)
    }

    pub fn set_mer_id(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.merchant.set_mer_id(&self.header.id, value)
    }

    pub fn set_password(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.merchant.set_password(&self.header.id, value)
    }

    pub fn set_device_category(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.browser.set_device_category(&self.header.id, value)
    }

    pub fn set_accept(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.browser.set_accept(&self.header.id, value)
    }

    pub fn set_user_agent(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.browser.set_user_agent(&self.header.id, value)
    }

    pub fn set_extensions(&mut self, value: Vec<Extension>) -> MessagingResult<()> {
        self.extensions = value;
        Ok(())
    }
}

impl Message for VEReq {
    crate::message_boilerplate!();

    fn validate(&self) -> MessagingResult<()> {
        let id = &self.header.id;
        require(id, self.pan.as_deref(), &PAN)?;
        self.merchant.validate(id)
    }

    fn write_fields(&self, body: &mut Element) {
        append_text(body, "pan", self.pan.as_deref());
        self.merchant.write(body);
        self.browser.write(body);
        append_extensions(body, &self.extensions);
    }

    fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    fn merchant_id(&self) -> Option<&str> {
        self.merchant.mer_id.as_deref()
    }

    fn adapt_to_version(&mut self, version: &str) {
        if compare_versions(version, DEVICE_CATEGORY_SINCE) == Ordering::Less {
            if let Some(dropped) = self.browser.device_category.take() {
                debug!(id = %self.header.id, version, dropped = %dropped, "Dropping deviceCategory");
            }
        }
    }
}

impl BindableMessage for VEReq {
    const IMPLEMENTATION: &'static str = "threeds.VEReq";
    const MESSAGE_TYPE: &'static str = "VEReq";

    fn field_setters() -> Vec<FieldSetter> {
        crate::field_setters!(VEReq {
            "pan" => set_pan(Option<String>),
            "acqBIN" => set_acq_bin(Option<String>),
            "merID" => set_mer_id(Option<String>),
            "password" => set_password(Option<String>),
            "deviceCategory" => set_device_category(Option<String>),
            "accept" => set_accept(Option<String>),
            "userAgent" => set_user_agent(Option<String>),
            "extensions" => set_extensions(Vec<Extension>),
        })
    }
}

/// Verify-enrollment response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VERes {
    pub header: MessageHeader,
    pub enrolled: Option<String>,
    pub acct_id: Option<String>,
    pub url: Option<String>,
    pub protocols: Vec<String>,
    pub ireq: IssuerRequest,
    pub extensions: Vec<Extension>,
}

impl VERes {
    pub fn set_enrolled(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.enrolled = checked_choice(&self.header.id, value, &ENROLLED, ENROLLED_VALUES)?;
        Ok(())
    }

    pub fn set_acct_id(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.acct_id = checked(&self.header.id, non_empty(value), &ACCT_ID)?;
        Ok(())
    }

    pub fn set_url(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.url = checked(&self.header.id, non_empty(value), &ACS_URL)?;
        Ok(())
    }

    pub fn set_protocols(&mut self, value: Option<Vec<String>>) -> MessagingResult<()> {
        self.protocols = value.unwrap_or_default();
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

    pub fn is_enrolled(&self) -> bool {
        self.enrolled.as_deref() == Some("Y")
    }
}

impl Message for VERes {
    crate::message_boilerplate!();

    fn validate(&self) -> MessagingResult<()> {
        let id = &self.header.id;
        require(id, self.enrolled.as_deref(), &ENROLLED)?;
        self.ireq.validate(id)?;

        if self.is_enrolled() {
            forbid_ireq(id, &self.ireq, "issuer request not allowed when enrolled='Y'")?;
            require(id, self.acct_id.as_deref(), &ACCT_ID)?;
            require(id, self.url.as_deref(), &ACS_URL)?;
        }
        Ok(())
    }

    fn write_fields(&self, body: &mut Element) {
        append_group(body, "CH", |ch| {
            append_text(ch, "enrolled", self.enrolled.as_deref());
            append_text(ch, "acctID", self.acct_id.as_deref());
        });
        append_text(body, "url", self.url.as_deref());
        append_repeated(body, "protocol", &self.protocols);
        self.ireq.write(body);
        append_extensions(body, &self.extensions);
    }

    fn extensions(&self) -> &[Extension] {
        &self.extensions
    }
}

impl BindableMessage for VERes {
    const IMPLEMENTATION: &'static str = "threeds.VERes";
    const MESSAGE_TYPE: &'static str = "VERes";

    fn field_setters() -> Vec<FieldSetter> {
        crate::field_setters!(VERes {
            "enrolled" => set_enrolled(Option<String>),
            "acctID" => set_acct_id(Option<String>),
            "url" => set_url(Option<String>),
            "protocols" => set_protocols(Option<Vec<String>>),
            "iReqCode" => set_ireq_code(Option<String>),
            "iReqDetail" => set_ireq_detail(Option<String>),
            "vendorCode" => set_vendor_code(Option<String>),
            "extensions" => set_extensions(Vec<Extension>),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::ErrorCode;

    fn veres(enrolled: &str) -> VERes {
        let mut veres = VERes::new_message("1.0.2");
        veres.set_id("tx-1");
        veres.set_enrolled(Some(enrolled.into())).unwrap();
        veres
    }

    #[test]
    fn test_not_enrolled_with_issuer_request_validates() {
        let mut veres = veres("N");
        veres.set_acct_id(Some(String::new())).unwrap();
        veres.set_url(Some(String::new())).unwrap();
        veres.set_ireq_code(Some("50".into())).unwrap();
        assert!(veres.validate().is_ok());
    }

    #[test]
    fn test_enrolled_with_issuer_request_fails() {
        let mut veres = veres("Y");
        veres.set_acct_id(Some("YWNjdDEyMzQ1Njc4OTAxMjM0NTY3".into())).unwrap();
        veres.set_url(Some("https://acs.example/pa".into())).unwrap();
        veres.set_ireq_code(Some("50".into())).unwrap();

        let err = veres.validate().unwrap_err();
        assert_eq!(err.error_code, ErrorCode::InvalidFormat);
        assert!(err.error_detail.contains("IReq"));
    }

    #[test]
    fn test_enrolled_requires_url() {
        let mut veres = veres("Y");
        veres.set_acct_id(Some("acct".into())).unwrap();
        let err = veres.validate().unwrap_err();
        assert_eq!(err.error_code, ErrorCode::RequiredElementMissing);
        assert_eq!(err.error_detail, "url");
    }

    #[test]
    fn test_enrolled_value_restricted() {
        let mut veres = VERes::new_message("1.0.2");
        assert!(veres.set_enrolled(Some("X".into())).is_err());
    }

    #[test]
    fn test_device_category_dropped_before_1_0_2() {
        let mut vereq = VEReq::new_message("1.0.2");
        vereq.set_device_category(Some("1".into())).unwrap();
        vereq.adapt_to_version("1.0.2");
        assert_eq!(vereq.browser.device_category.as_deref(), Some("1"));
        vereq.adapt_to_version("1.0.1");
        assert_eq!(vereq.browser.device_category, None);
    }
}
