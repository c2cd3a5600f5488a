//! Merchant authorization exchange: `PaymentAuthReq` / `PaymentAuthRes`
//!
//! The merchant forwards the `PaRes` posted back by the cardholder browser and
//! receives the authentication outcome needed for the authorization request.

use crate::common::errors::{MessagingError, MessagingResult};
use crate::common::validation::FieldSpec;
use crate::common::values::Profile;
use crate::protocol::binding::{BindableMessage, FieldSetter};
use crate::protocol::message::{Message, MessageHeader};
use crate::protocol::messages::fields::{
    checked, checked_choice, checked_digits, require, TX_STATUS_VALUES,
};
use crate::protocol::xml::{append_profiles, append_text};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use xmltree::Element;

pub const MERCHANT_ID: FieldSpec = FieldSpec::new("merchantID", 1, 24);
pub const PA_RES: FieldSpec = FieldSpec::at_least("paRes", 1).required();
pub const XID: FieldSpec = FieldSpec::exact("xid", 28).required();
pub const STATUS: FieldSpec = FieldSpec::exact("status", 1).required();
pub const PURCH_AMOUNT: FieldSpec = FieldSpec::new("purchAmount", 1, 12);
pub const CURRENCY: FieldSpec = FieldSpec::exact("currency", 3);
pub const CAVV: FieldSpec = FieldSpec::exact("cavv", 28);
pub const ECI: FieldSpec = FieldSpec::exact("eci", 2);
pub const CAVV_ALGORITHM: FieldSpec = FieldSpec::exact("cavvAlgorithm", 1);

/// Merchant request carrying the base64 `PaRes` from the ACS
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentAuthReq {
    pub header: MessageHeader,
    pub merchant_id: Option<String>,
    pub pa_res: Option<String>,
}

impl PaymentAuthReq {
    pub fn set_merchant_id(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.merchant_id = checked(&self.header.id, value, &MERCHANT_ID)?;
        Ok(())
    }

    pub fn set_pa_res(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.pa_res = checked(&self.header.id, value, &PA_RES)?;
        Ok(())
    }

    /// Decoded wire `PARes` document
    pub fn decoded_pa_res(&self) -> MessagingResult<String> {
        let encoded = self
            .pa_res
            .as_deref()
            .ok_or_else(|| MessagingError::missing_element(&self.header.id, "paRes"))?;
        let compact: String = encoded.split_whitespace().collect();
        let bytes = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| MessagingError::invalid_value(&self.header.id, "paRes", "<base64>", e))?;
        String::from_utf8(bytes)
            .map_err(|e| MessagingError::invalid_value(&self.header.id, "paRes", "<base64>", e))
    }
}

impl Message for PaymentAuthReq {
    crate::message_boilerplate!();

    fn validate(&self) -> MessagingResult<()> {
        require(&self.header.id, self.pa_res.as_deref(), &PA_RES)
    }

    fn write_fields(&self, body: &mut Element) {
        append_text(body, "merchantID", self.merchant_id.as_deref());
        append_text(body, "paRes", self.pa_res.as_deref());
    }

    fn merchant_id(&self) -> Option<&str> {
        self.merchant_id.as_deref()
    }
}

impl BindableMessage for PaymentAuthReq {
    const IMPLEMENTATION: &'static str = "mpi.PaymentAuthReq";
    const MESSAGE_TYPE: &'static str = "PaymentAuthReq";

    fn field_setters() -> Vec<FieldSetter> {
        crate::field_setters!(PaymentAuthReq {
            "merchantID" => set_merchant_id(Option<String>),
            "paRes" => set_pa_res(Option<String>),
        })
    }
}

/// Authentication outcome returned to the merchant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentAuthRes {
    pub header: MessageHeader,
    pub merchant_id: Option<String>,
    pub xid: Option<String>,
    pub status: Option<String>,
    pub cavv: Option<String>,
    pub eci: Option<String>,
    pub cavv_algorithm: Option<String>,
    pub purch_amount: Option<String>,
    pub currency: Option<String>,
    pub profiles: Vec<Profile>,
}

impl PaymentAuthRes {
    pub fn set_merchant_id(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.merchant_id = checked(&self.header.id, value, &MERCHANT_ID)?;
        Ok(())
    }

    pub fn set_xid(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.xid = checked(&self.header.id, value, &XID)?;
        Ok(())
    }

    pub fn set_status(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.status = checked_choice(&self.header.id, value, &STATUS, TX_STATUS_VALUES)?;
        Ok(())
    }

    pub fn set_cavv(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.cavv = checked(&self.header.id, value, &CAVV)?;
        Ok(())
    }

    pub fn set_eci(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.eci = checked_digits(&self.header.id, value, &ECI)?;
        Ok(())
    }

    pub fn set_cavv_algorithm(&mut self, value: Option<String>) -> MessagingResult<()> {
        self.cavv_algorithm = checked_digits(&self.header.id, value, &CAVV_ALGORITHM)?;
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

    pub fn set_profiles(&mut self, value: Vec<Profile>) -> MessagingResult<()> {
        self.profiles = value;
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.status.as_deref(), Some("Y") | Some("A"))
    }
}

impl Message for PaymentAuthRes {
    crate::message_boilerplate!();

    fn validate(&self) -> MessagingResult<()> {
        let id = &self.header.id;
        require(id, self.xid.as_deref(), &XID)?;
        require(id, self.status.as_deref(), &STATUS)?;
        if self.is_authenticated() {
            require(id, self.cavv.as_deref(), &CAVV)?;
        }
        Ok(())
    }

    fn write_fields(&self, body: &mut Element) {
        append_text(body, "merchantID", self.merchant_id.as_deref());
        append_text(body, "xid", self.xid.as_deref());
        append_text(body, "status", self.status.as_deref());
        append_text(body, "cavv", self.cavv.as_deref());
        append_text(body, "eci", self.eci.as_deref());
        append_text(body, "cavvAlgorithm", self.cavv_algorithm.as_deref());
        append_text(body, "purchAmount", self.purch_amount.as_deref());
        append_text(body, "currency", self.currency.as_deref());
        append_profiles(body, &self.profiles);
    }

    fn merchant_id(&self) -> Option<&str> {
        self.merchant_id.as_deref()
    }
}

impl BindableMessage for PaymentAuthRes {
    const IMPLEMENTATION: &'static str = "mpi.PaymentAuthRes";
    const MESSAGE_TYPE: &'static str = "PaymentAuthRes";

    fn field_setters() -> Vec<FieldSetter> {
        crate::field_setters!(PaymentAuthRes {
            "merchantID" => set_merchant_id(Option<String>),
            "xid" => set_xid(Option<String>),
            "status" => set_status(Option<String>),
            "cavv" => set_cavv(Option<String>),
            "eci" => set_eci(Option<String>),
            "cavvAlgorithm" => set_cavv_algorithm(Option<String>),
            "purchAmount" => set_purch_amount(Option<String>),
            "currency" => set_currency(Option<String>),
            "profiles" => set_profiles(Vec<Profile>),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::ErrorCode;

    #[test]
    fn test_pa_res_decoding() {
        let mut req = PaymentAuthReq::new_message("1.0");
        req.set_pa_res(Some("PFRocmVlRFNl\nY3VyZS8+".into())).unwrap();
        assert_eq!(req.decoded_pa_res().unwrap(), "<ThreeDSecure/>");

        req.set_pa_res(Some("!!not base64!!".into())).unwrap();
        let err = req.decoded_pa_res().unwrap_err();
        assert_eq!(err.error_code, ErrorCode::InvalidFormat);
    }

    #[test]
    fn test_attempted_status_requires_cavv() {
        let mut res = PaymentAuthRes::new_message("1.0");
        res.set_xid(Some("MDAwMDAwMDAwMDAwMDAwMDAwMDE=".into())).unwrap();
        res.set_status(Some("A".into())).unwrap();
        assert_eq!(res.validate().unwrap_err().error_detail, "cavv");

        res.set_status(Some("N".into())).unwrap();
        assert!(res.validate().is_ok());
    }
}
