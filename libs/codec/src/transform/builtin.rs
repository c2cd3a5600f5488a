//! Built-in transformers between the interface and wire dialects

use super::{source_as, target_as, MessageTransformer};
use crate::serializer;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use mpi_types::{
    ErrorMessage, Message, MessagingResult, MpiError, PAReq, PARes, PaymentAuthRes, PaymentVerifReq,
    PaymentVerifRes, VEReq, VERes,
};

/// Wire timestamp layout, `YYYYMMDD HH:MM:SS`
pub const PURCHASE_DATE_FORMAT: &str = "%Y%m%d %H:%M:%S";

/// Exponent assumed when the merchant leaves it out
pub const DEFAULT_EXPONENT: &str = "2";

/// Apply `set` only when a value is present, leaving required fields for
/// `validate` to report
fn copy_present<F>(value: &Option<String>, set: F) -> MessagingResult<()>
where
    F: FnOnce(Option<String>) -> MessagingResult<()>,
{
    match value {
        Some(value) => set(Some(value.clone())),
        None => Ok(()),
    }
}

/// Fresh transaction id: 20 random bytes, base64 (28 characters)
pub fn generate_xid() -> String {
    let mut bytes = [0u8; 20];
    bytes[..16].copy_from_slice(uuid::Uuid::new_v4().as_bytes());
    bytes[16..].copy_from_slice(&uuid::Uuid::new_v4().as_bytes()[..4]);
    STANDARD.encode(bytes)
}

pub fn purchase_timestamp() -> String {
    Utc::now().format(PURCHASE_DATE_FORMAT).to_string()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PaymentVerifReqToVEReq;

impl MessageTransformer for PaymentVerifReqToVEReq {
    fn name(&self) -> &str {
        "PaymentVerifReqToVEReq"
    }

    fn transform(&self, from: &dyn Message, mut to: Box<dyn Message>) -> MessagingResult<Box<dyn Message>> {
        let request = source_as::<PaymentVerifReq>(from, self.name())?;
        let veq = target_as::<VEReq>(&mut to, self.name())?;

        copy_present(&request.pan, |v| veq.set_pan(v))?;
        copy_present(&request.acq_bin, |v| veq.set_acq_bin(v))?;
        copy_present(&request.merchant_id, |v| veq.set_mer_id(v))?;
        veq.set_device_category(request.device_category.clone())?;
        veq.set_accept(request.accept.clone())?;
        veq.set_user_agent(request.user_agent.clone())?;
        Ok(to)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PaymentVerifReqToPAReq;

impl MessageTransformer for PaymentVerifReqToPAReq {
    fn name(&self) -> &str {
        "PaymentVerifReqToPAReq"
    }

    fn transform(&self, from: &dyn Message, mut to: Box<dyn Message>) -> MessagingResult<Box<dyn Message>> {
        let request = source_as::<PaymentVerifReq>(from, self.name())?;
        let pareq = target_as::<PAReq>(&mut to, self.name())?;

        copy_present(&request.acq_bin, |v| pareq.set_acq_bin(v))?;
        copy_present(&request.merchant_id, |v| pareq.set_mer_id(v))?;
        pareq.set_merchant_name(request.merchant_name.clone())?;
        pareq.set_merchant_country(request.merchant_country.clone())?;
        pareq.set_merchant_url(request.merchant_url.clone())?;

        pareq.set_xid(Some(request.xid.clone().unwrap_or_else(generate_xid)))?;
        pareq.set_date(Some(purchase_timestamp()))?;
        copy_present(&request.purch_amount, |v| pareq.set_purch_amount(v))?;
        copy_present(&request.currency, |v| pareq.set_currency(v))?;
        pareq.set_exponent(Some(
            request
                .exponent
                .clone()
                .unwrap_or_else(|| DEFAULT_EXPONENT.to_string()),
        ))?;
        pareq.set_desc(request.description.clone())?;
        copy_present(&request.pan_expiry, |v| pareq.set_expiry(v))?;
        Ok(to)
    }
}

/// Completes a `PAReq` with the account id the directory assigned
#[derive(Debug, Default, Clone, Copy)]
pub struct VEResToPAReq;

impl MessageTransformer for VEResToPAReq {
    fn name(&self) -> &str {
        "VEResToPAReq"
    }

    fn transform(&self, from: &dyn Message, mut to: Box<dyn Message>) -> MessagingResult<Box<dyn Message>> {
        let veres = source_as::<VERes>(from, self.name())?;
        let pareq = target_as::<PAReq>(&mut to, self.name())?;
        copy_present(&veres.acct_id, |v| pareq.set_acct_id(v))?;
        Ok(to)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct VEResToPaymentVerifRes;

impl MessageTransformer for VEResToPaymentVerifRes {
    fn name(&self) -> &str {
        "VEResToPaymentVerifRes"
    }

    fn transform(&self, from: &dyn Message, mut to: Box<dyn Message>) -> MessagingResult<Box<dyn Message>> {
        let veres = source_as::<VERes>(from, self.name())?;
        let response = target_as::<PaymentVerifRes>(&mut to, self.name())?;
        copy_present(&veres.enrolled, |v| response.set_enrolled(v))?;
        response.set_url(veres.url.clone())?;
        Ok(to)
    }
}

/// Embeds the serialized wire `PAReq` as base64 `paReq`
#[derive(Debug, Default, Clone, Copy)]
pub struct PAReqToPaymentVerifRes;

impl MessageTransformer for PAReqToPaymentVerifRes {
    fn name(&self) -> &str {
        "PAReqToPaymentVerifRes"
    }

    fn transform(&self, from: &dyn Message, mut to: Box<dyn Message>) -> MessagingResult<Box<dyn Message>> {
        let pareq = source_as::<PAReq>(from, self.name())?;
        let document = serializer::to_xml_string(pareq)?;
        let response = target_as::<PaymentVerifRes>(&mut to, self.name())?;
        response.embed_pa_req(&document)?;
        Ok(to)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PAResToPaymentAuthRes;

impl MessageTransformer for PAResToPaymentAuthRes {
    fn name(&self) -> &str {
        "PAResToPaymentAuthRes"
    }

    fn transform(&self, from: &dyn Message, mut to: Box<dyn Message>) -> MessagingResult<Box<dyn Message>> {
        let pares = source_as::<PARes>(from, self.name())?;
        let response = target_as::<PaymentAuthRes>(&mut to, self.name())?;

        response.set_merchant_id(pares.merchant.mer_id.clone())?;
        copy_present(&pares.purchase.xid, |v| response.set_xid(v))?;
        copy_present(&pares.tx.status, |v| response.set_status(v))?;
        response.set_cavv(pares.tx.cavv.clone())?;
        response.set_eci(pares.tx.eci.clone())?;
        response.set_cavv_algorithm(pares.tx.cavv_algorithm.clone())?;
        response.set_purch_amount(pares.purchase.purch_amount.clone())?;
        response.set_currency(pares.purchase.currency.clone())?;
        Ok(to)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorToMpiError;

impl MessageTransformer for ErrorToMpiError {
    fn name(&self) -> &str {
        "ErrorToMpiError"
    }

    fn transform(&self, from: &dyn Message, mut to: Box<dyn Message>) -> MessagingResult<Box<dyn Message>> {
        let error = source_as::<ErrorMessage>(from, self.name())?;
        let response = target_as::<MpiError>(&mut to, self.name())?;
        copy_present(&error.error_code, |v| response.set_error_code(v))?;
        copy_present(&error.error_message, |v| response.set_error_message(v))?;
        response.set_error_detail(error.error_detail.clone())?;
        response.set_vendor_code(error.vendor_code.clone())?;
        Ok(to)
    }
}

/// Re-issues a message under the destination's version
///
/// The source is copied whole and keeps its id; version-specific fields are
/// dropped afterwards by [`Message::adapt_to_version`].
#[derive(Debug, Default, Clone, Copy)]
pub struct VersionAdapter;

impl MessageTransformer for VersionAdapter {
    fn name(&self) -> &str {
        "VersionAdapter"
    }

    fn transform(&self, from: &dyn Message, to: Box<dyn Message>) -> MessagingResult<Box<dyn Message>> {
        if from.message_type() != to.message_type() {
            return Err(mpi_types::MessagingError::binding(
                from.id(),
                format!(
                    "{} only re-versions a message, got {} to {}",
                    self.name(),
                    from.message_type(),
                    to.message_type()
                ),
            ));
        }
        let mut adapted = from.clone_message();
        adapted.set_version(to.version());
        Ok(adapted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_xid_fits_wire_field() {
        let xid = generate_xid();
        assert_eq!(xid.len(), 28);
        assert_ne!(xid, generate_xid());
    }

    #[test]
    fn test_purchase_timestamp_layout() {
        let stamp = purchase_timestamp();
        assert_eq!(stamp.len(), 17);
        assert_eq!(&stamp[8..9], " ");
    }
}
