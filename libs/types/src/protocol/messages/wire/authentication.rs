//! Payer authentication: `PAReq` / `PARes`
//!
//! `PAReq` is relayed to the ACS through the cardholder browser; the ACS
//! answers with a signed `PARes`. The XML signature travels as a sibling of
//! the `PARes` element inside `Message` and is carried here as an opaque
//! standalone document.

use crate::common::errors::{MessagingError, MessagingResult};
use crate::common::values::{Extension, SignatureDocument};
use crate::protocol::binding::{BindableMessage, FieldSetter};
use crate::protocol::message::{Message, MessageHeader};
use crate::protocol::messages::fields::{
    checked, checked_choice, checked_digits, require, IssuerRequest, MerchantInfo, PurchaseInfo,
    ACCT_ID, CAVV, CAVV_ALGORITHM, ECI, EXPIRY, PAN, TX_STATUS, TX_STATUS_VALUES, TX_TIME,
};
use crate::protocol::xml::{append_extensions, append_group, append_text};
use xmltree::Element;

/// Transaction statuses that carry an authentication value
pub const AUTHENTICATED_STATUSES: &[&str] = &["Y", "A"];

/// Payer authentication request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PAReq {
    pub header: MessageHeader,
    pub merchant: MerchantInfo,
    pub purchase: PurchaseInfo,
    pub acct_id: Option<String>,
    pub expiry: Option<String>,
    pub extensions: Vec<Extension>,
}

impl PAReq {
    pub fn set_acq_bin(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.merchant.set_acq_bin(&self.header.id, value)
    }

    pub fn set_mer_id(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.merchant.set_mer_id(&self.header.id, value)
    }

    pub fn set_merchant_name(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.merchant.set_name(&self.header.id, value)
    }

    pub fn set_merchant_country(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.merchant.set_country(&self.header.id, value)
    }

    pub fn set_merchant_url(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.merchant.set_url(&self.header.id, value)
    }

    pub fn set_xid(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.purchase.set_xid(&self.header.id, value)
    }

    pub fn set_date(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.purchase.set_date(&self.header.id, value)
    }

    pub fn set_amount(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.purchase.set_amount(&self.header.id, value)
    }

    pub fn set_purch_amount(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.purchase.set_purch_amount(&self.header.id, value)
    }

    pub fn set_currency(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.purchase.set_currency(&self.header.id, value)
    }

    pub fn set_exponent(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.purchase.set_exponent(&self.header.id, value)
    }

    pub fn set_desc(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.purchase.set_desc(&self.header.id, value)
    }

    pub fn set_acct_id(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.acct_id = checked(&self.header.id, value, &ACCT_ID.required())?;
        Ok(())
    }

    pub fn set_expiry(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.expiry = checked_digits(&self.header.id, value, &EXPIRY.required())?;
        Ok(())
    }

    pub fn set_extensions(&mut self, value: Vec<Extension>) -> MessagingResult<()> {
        self.extensions = value;
        Ok(())
    }
}

impl Message for PAReq {
    crate::message_boilerplate!();

    fn validate(&self) -> MessagingResult<()> {
        let id = &self.header.id;
        self.merchant.validate(id)?;
        self.purchase.validate(id)?;
        require(id, self.acct_id.as_deref(), &ACCT_ID)?;
        require(id, self.expiry.as_deref(), &EXPIRY)
    }

    fn write_fields(&self, body: &mut Element) {
        self.merchant.write(body);
        self.purchase.write(body);
        append_group(body, "CH", |ch| {
            append_text(ch, "acctID", self.acct_id.as_deref());
            append_text(ch, "expiry", self.expiry.as_deref());
        });
        append_extensions(body, &self.extensions);
    }

    fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    fn merchant_id(&self) -> Option<&str> {
        self.merchant.mer_id.as_deref()
    }
}

impl BindableMessage for PAReq {
    const IMPLEMENTATION: &'static str = "threeds.PAReq";
    const MESSAGE_TYPE: &'static str = "PAReq";

    fn field_setters() -> Vec<FieldSetter> {
        crate::field_setters!(PAReq {
            "acqBIN" => set_acq_bin(Option<String>),
            "merID" => set_mer_id(Option<String>),
            "merchantName" => set_merchant_name(Option<String>),
            "merchantCountry" => set_merchant_country(Option<String>),
            "merchantURL" => set_merchant_url(Option<String>),
            "xid" => set_xid(Option<String>),
            "date" => set_date(Option<String>),
            "amount" => set_amount(Option<String>),
            "purchAmount" => set_purch_amount(Option<String>),
            "currency" => set_currency(Option<String>),
            "exponent" => set_exponent(Option<String>),
            "desc" => set_desc(Option<String>),
            "acctID" => set_acct_id(Option<String>),
            "expiry" => set_expiry(Option<String>),
            "extensions" => set_extensions(Vec<Extension>),
        })
    }
}

/// `TX` group of a payer authentication response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionResult {
    pub time: Option<String>,
    pub status: Option<String>,
    pub cavv: Option<String>,
    pub eci: Option<String>,
    pub cavv_algorithm: Option<String>,
}

/// Payer authentication response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PARes {
    pub header: MessageHeader,
    /// `id` attribute of the `PARes` element, referenced by the signature
    pub pares_id: Option<String>,
    pub merchant: MerchantInfo,
    pub purchase: PurchaseInfo,
    pub pan: Option<String>,
    pub tx: TransactionResult,
    pub ireq: IssuerRequest,
    pub signature: Option<SignatureDocument>,
    pub extensions: Vec<Extension>,
}

impl PARes {
    pub fn set_pares_id(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.pares_id = value;
        Ok(())
    }

    pub fn set_acq_bin(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.merchant.set_acq_bin(&self.header.id, value)
    }

    pub fn set_mer_id(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.merchant.set_mer_id(&self.header.id, value)
    }

    pub fn set_xid(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.purchase.set_xid(&self.header.id, value)
    }

    pub fn set_date(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.purchase.set_date(&self.header.id, value)
    }

    pub fn set_purch_amount(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.purchase.set_purch_amount(&self.header.id, value)
    }

    pub fn set_currency(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.purchase.set_currency(&self.header.id, value)
    }

    pub fn set_exponent(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.purchase.set_exponent(&self.header.id, value)
    }

    pub fn set_pan(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.pan = checked_digits(&self.header.id, value, &PAN)?;
        Ok(())
    }

    pub fn set_time(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.tx.time = checked(&self.header.id, value, &TX_TIME)?;
        Ok(())
    }

    pub fn set_status(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.tx.status = checked_choice(&self.header.id, value, &TX_STATUS, TX_STATUS_VALUES)?;
        Ok(())
    }

    pub fn set_cavv(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.tx.cavv = checked(&self.header.id, value, &CAVV)?;
        Ok(())
    }

    pub fn set_eci(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.tx.eci = checked_digits(&self.header.id, value, &ECI)?;
        Ok(())
    }

    pub fn set_cavv_algorithm(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.tx.cavv_algorithm = checked_digits(&self.header.id, value, &CAVV_ALGORITHM)?;
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

    pub fn set_signature(&mut self, value: Option<SignatureDocument>) -> MessagingResult<()> {
        self.signature = value;
        Ok(())
    }

    pub fn set_extensions(&mut self, value: Vec<Extension>) -> MessagingResult<()> {
        self.extensions = value;
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx
            .status
            .as_deref()
            .is_some_and(|status| AUTHENTICATED_STATUSES.contains(&status))
    }
}

impl Message for PARes {
    crate::message_boilerplate!();

    fn validate(&self) -> MessagingResult<()> {
        let id = &self.header.id;
        self.merchant.validate(id)?;
        self.purchase.validate(id)?;
        require(id, self.pan.as_deref(), &PAN)?;
        require(id, self.tx.time.as_deref(), &TX_TIME)?;
        require(id, self.tx.status.as_deref(), &TX_STATUS)?;
        self.ireq.validate(id)?;

        if self.is_authenticated() {
            require(id, self.tx.cavv.as_deref(), &CAVV)?;
            require(id, self.tx.eci.as_deref(), &ECI)?;
        }
        Ok(())
    }

    fn write_fields(&self, body: &mut Element) {
        if let Some(pares_id) = &self.pares_id {
            body.attributes.insert("id".to_string(), pares_id.clone());
        }
        self.merchant.write(body);
        self.purchase.write(body);
        append_text(body, "pan", self.pan.as_deref());
        append_group(body, "TX", |tx| {
            append_text(tx, "time", self.tx.time.as_deref());
            append_text(tx, "status", self.tx.status.as_deref());
            append_text(tx, "cavv", self.tx.cavv.as_deref());
            append_text(tx, "eci", self.tx.eci.as_deref());
            append_text(tx, "cavvAlgorithm", self.tx.cavv_algorithm.as_deref());
        });
        self.ireq.write(body);
        append_extensions(body, &self.extensions);
    }

    fn trailing_elements(&self) -> MessagingResult<Vec<Element>> {
        let Some(signature) = &self.signature else {
            return Ok(Vec::new());
        };
        let element = Element::parse(signature.as_str().as_bytes())
            .map_err(|e| MessagingError::conversion(&self.header.id, format!("unreadable signature: {}", e)))?;
        Ok(vec![element])
    }

    fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    fn merchant_id(&self) -> Option<&str> {
        self.merchant.mer_id.as_deref()
    }
}

impl BindableMessage for PARes {
    const IMPLEMENTATION: &'static str = "threeds.PARes";
    const MESSAGE_TYPE: &'static str = "PARes";

    fn field_setters() -> Vec<FieldSetter> {
        crate::field_setters!(PARes {
            "paresID" => set_pares_id(Option<String>),
            "acqBIN" => set_acq_bin(Option<String>),
            "merID" => set_mer_id(Option<String>),
            "xid" => set_xid(Option<String>),
            "date" => set_date(Option<String>),
            "purchAmount" => set_purch_amount(Option<String>),
            "currency" => set_currency(Option<String>),
            "exponent" => set_exponent(Option<String>),
            "pan" => set_pan(Option<String>),
            "time" => set_time(Option<String>),
            "status" => set_status(Option<String>),
            "cavv" => set_cavv(Option<String>),
            "eci" => set_eci(Option<String>),
            "cavvAlgorithm" => set_cavv_algorithm(Option<String>),
            "iReqCode" => set_ireq_code(Option<String>),
            "iReqDetail" => set_ireq_detail(Option<String>),
            "vendorCode" => set_vendor_code(Option<String>),
            "signature" => set_signature(Option<SignatureDocument>),
            "extensions" => set_extensions(Vec<Extension>),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::ErrorCode;

    fn authenticated_pares() -> PARes {
        let mut pares = PARes::new_message("1.0.2");
        pares.set_id("tx-9");
        pares.set_acq_bin(Some("411111".into())).unwrap();
        pares.set_mer_id(Some("merchant-01".into())).unwrap();
        pares.set_xid(Some("MDAwMDAwMDAwMDAwMDAwMDAwMDE=".into())).unwrap();
        pares.set_date(Some("20240101 12:00:00".into())).unwrap();
        pares.set_purch_amount(Some("1999".into())).unwrap();
        pares.set_currency(Some("840".into())).unwrap();
        pares.set_exponent(Some("2".into())).unwrap();
        pares.set_pan(Some("0000000000001111".into())).unwrap();
        pares.set_time(Some("20240101 12:00:05".into())).unwrap();
        pares.set_status(Some("Y".into())).unwrap();
        pares
    }

    #[test]
    fn test_authenticated_status_requires_cavv() {
        let mut pares = authenticated_pares();
        let err = pares.validate().unwrap_err();
        assert_eq!(err.error_code, ErrorCode::RequiredElementMissing);
        assert_eq!(err.error_detail, "TX/cavv");

        pares.set_cavv(Some("AAABBBCCCDDDEEEFFFGGGHHHIII=".into())).unwrap();
        pares.set_eci(Some("05".into())).unwrap();
        assert!(pares.validate().is_ok());
    }

    #[test]
    fn test_failed_status_needs_no_cavv() {
        let mut pares = authenticated_pares();
        pares.set_status(Some("N".into())).unwrap();
        assert!(pares.validate().is_ok());
    }

    #[test]
    fn test_signature_emitted_as_trailing_element() {
        let mut pares = authenticated_pares();
        assert!(pares.trailing_elements().unwrap().is_empty());
        pares
            .set_signature(Some(SignatureDocument("<Signature><SignedInfo/></Signature>".into())))
            .unwrap();
        let trailing = pares.trailing_elements().unwrap();
        assert_eq!(trailing[0].name, "Signature");
    }

    #[test]
    fn test_pareq_requires_cardholder() {
        let mut pareq = PAReq::new_message("1.0.2");
        let err = pareq.set_expiry(None).unwrap_err();
        assert_eq!(err.error_code, ErrorCode::RequiredElementMissing);
        assert!(pareq.set_expiry(Some("2612".into())).is_ok());
    }
}
