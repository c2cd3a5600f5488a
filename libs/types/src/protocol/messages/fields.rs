//! Field constraints and element groups shared across messages

use crate::common::errors::{MessagingError, MessagingResult};
use crate::common::validation::{validate_choice_field, validate_digit_field, validate_field, FieldSpec};
use crate::protocol::xml::{append_group, append_text};
use xmltree::Element;

// Merchant
pub const ACQ_BIN: FieldSpec = FieldSpec::new("Merchant/acqBIN", 1, 11).required();
pub const MER_ID: FieldSpec = FieldSpec::new("Merchant/merID", 1, 24).required();
pub const PASSWORD: FieldSpec = FieldSpec::new("Merchant/password", 1, 8);
pub const MERCHANT_NAME: FieldSpec = FieldSpec::new("Merchant/name", 1, 25);
pub const MERCHANT_COUNTRY: FieldSpec = FieldSpec::exact("Merchant/country", 3);
pub const MERCHANT_URL: FieldSpec = FieldSpec::new("Merchant/url", 1, 2048);

// Purchase
pub const XID: FieldSpec = FieldSpec::exact("Purchase/xid", 28).required();
pub const PURCHASE_DATE: FieldSpec = FieldSpec::exact("Purchase/date", 17).required();
pub const DISPLAY_AMOUNT: FieldSpec = FieldSpec::new("Purchase/amount", 1, 20);
pub const PURCH_AMOUNT: FieldSpec = FieldSpec::new("Purchase/purchAmount", 1, 12).required();
pub const CURRENCY: FieldSpec = FieldSpec::exact("Purchase/currency", 3).required();
pub const EXPONENT: FieldSpec = FieldSpec::exact("Purchase/exponent", 1).required();
pub const PURCHASE_DESC: FieldSpec = FieldSpec::new("Purchase/desc", 1, 125);

// Cardholder
pub const PAN: FieldSpec = FieldSpec::new("pan", 13, 19).required();
pub const ACCT_ID: FieldSpec = FieldSpec::new("CH/acctID", 1, 28);
pub const EXPIRY: FieldSpec = FieldSpec::exact("CH/expiry", 4);
pub const ENROLLED: FieldSpec = FieldSpec::exact("CH/enrolled", 1).required();
pub const ENROLLED_VALUES: &[&str] = &["Y", "N", "U"];
pub const ACS_URL: FieldSpec = FieldSpec::new("url", 1, 2048);

// Authentication result
pub const TX_TIME: FieldSpec = FieldSpec::exact("TX/time", 17).required();
pub const TX_STATUS: FieldSpec = FieldSpec::exact("TX/status", 1).required();
pub const TX_STATUS_VALUES: &[&str] = &["Y", "N", "U", "A"];
pub const CAVV: FieldSpec = FieldSpec::exact("TX/cavv", 28);
pub const ECI: FieldSpec = FieldSpec::exact("TX/eci", 2);
pub const CAVV_ALGORITHM: FieldSpec = FieldSpec::exact("TX/cavvAlgorithm", 1);

// Browser
pub const DEVICE_CATEGORY: FieldSpec = FieldSpec::exact("Browser/deviceCategory", 1);
pub const DEVICE_CATEGORY_VALUES: &[&str] = &["0", "1"];
pub const ACCEPT: FieldSpec = FieldSpec::new("Browser/accept", 1, 2048);
pub const USER_AGENT: FieldSpec = FieldSpec::new("Browser/userAgent", 1, 2048);

// Issuer request
pub const IREQ_CODE: FieldSpec = FieldSpec::new("IReq/iReqCode", 1, 2);
pub const IREQ_DETAIL: FieldSpec = FieldSpec::new("IReq/iReqDetail", 1, 2048);
pub const VENDOR_CODE: FieldSpec = FieldSpec::new("IReq/vendorCode", 1, 256);

pub const SERIAL_NUMBER: FieldSpec = FieldSpec::new("serialNumber", 1, 20);

/// Validated assignment of an optional text field
pub(crate) fn checked(msg_id: &str, value: Option<String>, spec: &FieldSpec) -> MessagingResult<Option<String>> {
    validate_field(msg_id, value.as_deref(), spec)?;
    Ok(value)
}

pub(crate) fn checked_digits(
    msg_id: &str,
    value: Option<String>,
    spec: &FieldSpec,
) -> MessagingResult<Option<String>> {
    validate_digit_field(msg_id, value.as_deref(), spec)?;
    Ok(value)
}

pub(crate) fn checked_choice(
    msg_id: &str,
    value: Option<String>,
    spec: &FieldSpec,
    allowed: &[&str],
) -> MessagingResult<Option<String>> {
    validate_choice_field(msg_id, value.as_deref(), spec, allowed)?;
    Ok(value)
}

/// Treat an empty element the same as an absent one
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.is_empty())
}

/// Presence check used by `Message::validate`
pub(crate) fn require(msg_id: &str, value: Option<&str>, spec: &FieldSpec) -> MessagingResult<()> {
    validate_field(msg_id, value, &spec.required())
}

/// `Merchant` group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MerchantInfo {
    pub acq_bin: Option<String>,
    pub mer_id: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub country: Option<String>,
    pub url: Option<String>,
}

impl MerchantInfo {
    pub fn set_acq_bin(&mut self, msg_id: &str, value: Option<String>) -> MessagingResult<()> {
        self.acq_bin = checked_digits(msg_id, value, &ACQ_BIN)?;
        Ok(())
    }

    pub fn set_mer_id(&mut self, msg_id: &str, value: Option<String>) -> MessagingResult<()> {
        self.mer_id = checked(msg_id, value, &MER_ID)?;
        Ok(())
    }

    pub fn set_password(&mut self, msg_id: &str, value: Option<String>) -> MessagingResult<()> {
        self.password = checked(msg_id, value, &PASSWORD)?;
        Ok(())
    }

    pub fn set_name(&mut self, msg_id: &str, value: Option<String>) -> MessagingResult<()> {
        self.name = checked(msg_id, value, &MERCHANT_NAME)?;
        Ok(())
    }

    pub fn set_country(&mut self, msg_id: &str, value: Option<String>) -> MessagingResult<()> {
        self.country = checked_digits(msg_id, value, &MERCHANT_COUNTRY)?;
        Ok(())
    }

    pub fn set_url(&mut self, msg_id: &str, value: Option<String>) -> MessagingResult<()> {
        self.url = checked(msg_id, value, &MERCHANT_URL)?;
        Ok(())
    }

    pub fn validate(&self, msg_id: &str) -> MessagingResult<()> {
        require(msg_id, self.acq_bin.as_deref(), &ACQ_BIN)?;
        require(msg_id, self.mer_id.as_deref(), &MER_ID)
    }

    pub fn write(&self, parent: &mut Element) {
        append_group(parent, "Merchant", |merchant| {
            append_text(merchant, "acqBIN", self.acq_bin.as_deref());
            append_text(merchant, "merID", self.mer_id.as_deref());
            append_text(merchant, "password", self.password.as_deref());
            append_text(merchant, "name", self.name.as_deref());
            append_text(merchant, "country", self.country.as_deref());
            append_text(merchant, "url", self.url.as_deref());
        });
    }
}

/// `Purchase` group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurchaseInfo {
    pub xid: Option<String>,
    pub date: Option<String>,
    pub amount: Option<String>,
    pub purch_amount: Option<String>,
    pub currency: Option<String>,
    pub exponent: Option<String>,
    pub desc: Option<String>,
}

impl PurchaseInfo {
    pub fn set_xid(&mut self, msg_id: &str, value: Option<String>) -> MessagingResult<()> {
        self.xid = checked(msg_id, value, &XID)?;
        Ok(())
    }

    pub fn set_date(&mut self, msg_id: &str, value: Option<String>) -> MessagingResult<()> {
        self.date = checked(msg_id, value, &PURCHASE_DATE)?;
        Ok(())
    }

    pub fn set_amount(&mut self, msg_id: &str, value: Option<String>) -> MessagingResult<()> {
        self.amount = checked(msg_id, value, &DISPLAY_AMOUNT)?;
        Ok(())
    }

    pub fn set_purch_amount(&mut self, msg_id: &str, value: Option<String>) -> MessagingResult<()> {
        self.purch_amount = checked_digits(msg_id, value, &PURCH_AMOUNT)?;
        Ok(())
    }

    pub fn set_currency(&mut self, msg_id: &str, value: Option<String>) -> MessagingResult<()> {
        self.currency = checked_digits(msg_id, value, &CURRENCY)?;
        Ok(())
    }

    pub fn set_exponent(&mut self, msg_id: &str, value: Option<String>) -> MessagingResult<()> {
        self.exponent = checked_digits(msg_id, value, &EXPONENT)?;
        Ok(())
    }

    pub fn set_desc(&mut self, msg_id: &str, value: Option<String>) -> MessagingResult<()> {
        self.desc = checked(msg_id, value, &PURCHASE_DESC)?;
        Ok(())
    }

    pub fn validate(&self, msg_id: &str) -> MessagingResult<()> {
        require(msg_id, self.xid.as_deref(), &XID)?;
        require(msg_id, self.date.as_deref(), &PURCHASE_DATE)?;
        require(msg_id, self.purch_amount.as_deref(), &PURCH_AMOUNT)?;
        require(msg_id, self.currency.as_deref(), &CURRENCY)?;
        require(msg_id, self.exponent.as_deref(), &EXPONENT)
    }

    pub fn write(&self, parent: &mut Element) {
        append_group(parent, "Purchase", |purchase| {
            append_text(purchase, "xid", self.xid.as_deref());
            append_text(purchase, "date", self.date.as_deref());
            append_text(purchase, "amount", self.amount.as_deref());
            append_text(purchase, "purchAmount", self.purch_amount.as_deref());
            append_text(purchase, "currency", self.currency.as_deref());
            append_text(purchase, "exponent", self.exponent.as_deref());
            append_text(purchase, "desc", self.desc.as_deref());
        });
    }
}

/// `IReq` group: issuer-side reason for not completing a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuerRequest {
    pub code: Option<String>,
    pub detail: Option<String>,
    pub vendor_code: Option<String>,
}

impl IssuerRequest {
    pub fn set_code(&mut self, msg_id: &str, value: Option<String>) -> MessagingResult<()> {
        self.code = checked_digits(msg_id, non_empty(value), &IREQ_CODE)?;
        Ok(())
    }

    pub fn set_detail(&mut self, msg_id: &str, value: Option<String>) -> MessagingResult<()> {
        self.detail = checked(msg_id, non_empty(value), &IREQ_DETAIL)?;
        Ok(())
    }

    pub fn set_vendor_code(&mut self, msg_id: &str, value: Option<String>) -> MessagingResult<()> {
        self.vendor_code = checked(msg_id, non_empty(value), &VENDOR_CODE)?;
        Ok(())
    }

    pub fn is_present(&self) -> bool {
        self.code.is_some() || self.detail.is_some() || self.vendor_code.is_some()
    }

    /// A present group must carry its code
    pub fn validate(&self, msg_id: &str) -> MessagingResult<()> {
        if self.is_present() {
            require(msg_id, self.code.as_deref(), &IREQ_CODE)?;
        }
        Ok(())
    }

    pub fn write(&self, parent: &mut Element) {
        append_group(parent, "IReq", |ireq| {
            append_text(ireq, "iReqCode", self.code.as_deref());
            append_text(ireq, "iReqDetail", self.detail.as_deref());
            append_text(ireq, "vendorCode", self.vendor_code.as_deref());
        });
    }
}

/// Reject an issuer request where the exchange must succeed
pub(crate) fn forbid_ireq(msg_id: &str, ireq: &IssuerRequest, reason: &str) -> MessagingResult<()> {
    if ireq.is_present() {
        return Err(MessagingError::invalid_value(
            msg_id,
            "IReq/iReqCode",
            ireq.code.as_deref().unwrap_or_default(),
            reason,
        ));
    }
    Ok(())
}

/// `Browser` group of a verification request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserInfo {
    pub device_category: Option<String>,
    pub accept: Option<String>,
    pub user_agent: Option<String>,
}

impl BrowserInfo {
    pub fn set_device_category(&mut self, msg_id: &str, value: Option<String>) -> MessagingResult<()> {
        self.device_category = checked_choice(msg_id, value, &DEVICE_CATEGORY, DEVICE_CATEGORY_VALUES)?;
        Ok(())
    }

    pub fn set_accept(&mut self, msg_id: &str, value: Option<String>) -> MessagingResult<()> {
        self.accept = checked(msg_id, value, &ACCEPT)?;
        Ok(())
    }

    pub fn set_user_agent(&mut self, msg_id: &str, value: Option<String>) -> MessagingResult<()> {
        self.user_agent = checked(msg_id, value, &USER_AGENT)?;
        Ok(())
    }

    pub fn write(&self, parent: &mut Element) {
        append_group(parent, "Browser", |browser| {
            append_text(browser, "deviceCategory", self.device_category.as_deref());
            append_text(browser, "accept", self.accept.as_deref());
            append_text(browser, "userAgent", self.user_agent.as_deref());
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::ErrorCode;

    #[test]
    fn test_merchant_setters_validate() {
        let mut merchant = MerchantInfo::default();
        merchant.set_acq_bin("m", Some("411111".into())).unwrap();
        let err = merchant.set_acq_bin("m", Some("41a111".into())).unwrap_err();
        assert_eq!(err.error_code, ErrorCode::InvalidFormat);
        let err = merchant.set_mer_id("m", None).unwrap_err();
        assert_eq!(err.error_code, ErrorCode::RequiredElementMissing);
    }

    #[test]
    fn test_ireq_requires_code_when_present() {
        let mut ireq = IssuerRequest::default();
        assert!(ireq.validate("m").is_ok());
        ireq.set_detail("m", Some("card not enrolled".into())).unwrap();
        let err = ireq.validate("m").unwrap_err();
        assert_eq!(err.error_detail, "IReq/iReqCode");
    }

    #[test]
    fn test_ireq_empty_values_are_absent() {
        let mut ireq = IssuerRequest::default();
        ireq.set_code("m", Some(String::new())).unwrap();
        assert!(!ireq.is_present());
    }
}
