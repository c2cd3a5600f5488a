//! Message model: factories, setter tables and cross-field rules
//!
//! Exercises the typed messages the way the codec does, through
//! `MessageFactory` and `FieldSetter`, without any XML.

use mpi_types::{
    builtin_factories, BindableMessage, BoundValue, ErrorCode, Message, PAReq, PARes,
    PaymentVerifRes, ProtocolFamily, ValueType, INTERFACE_MESSAGE_NAMES, WIRE_MESSAGE_NAMES,
};

#[test]
fn test_every_message_name_has_a_factory() {
    let factories = builtin_factories();
    for name in WIRE_MESSAGE_NAMES.iter().chain(INTERFACE_MESSAGE_NAMES) {
        let factory = factories
            .iter()
            .find(|f| f.message_type == *name)
            .unwrap_or_else(|| panic!("no factory for {}", name));
        let message = factory.create();
        assert_eq!(message.message_type(), *name);
        assert!(ProtocolFamily::of_message(name).is_some());
    }
    assert_eq!(factories.len(), WIRE_MESSAGE_NAMES.len() + INTERFACE_MESSAGE_NAMES.len());
}

#[test]
fn test_setter_lookup_is_typed() {
    let factory = builtin_factories()
        .into_iter()
        .find(|f| f.message_type == "PAReq")
        .unwrap();

    assert!(factory.find_setter("acctID", ValueType::Text).is_some());
    assert!(factory.find_setter("acctID", ValueType::TextList).is_none());
    assert!(factory.find_setter("accountId", ValueType::Text).is_none());
}

#[test]
fn test_required_setter_rejects_absent_value() {
    let factory = builtin_factories()
        .into_iter()
        .find(|f| f.message_type == "PAReq")
        .unwrap();
    let setter = factory.find_setter("acctID", ValueType::Text).unwrap();

    let mut message = factory.create();
    message.set_id("pa-1");
    let err = (setter.apply)(message.as_mut(), BoundValue::Text(None)).unwrap_err();
    assert_eq!(err.error_code, ErrorCode::RequiredElementMissing);
    assert_eq!(err.id, "pa-1");

    (setter.apply)(message.as_mut(), BoundValue::Text(Some("YWNjdA==".into()))).unwrap();
    assert_eq!(
        message.downcast_ref::<PAReq>().unwrap().acct_id.as_deref(),
        Some("YWNjdA==")
    );
}

#[test]
fn test_authenticated_pares_needs_cavv_and_eci() {
    let mut pares = PARes::new_message("1.0.2");
    pares.set_id("ps-1");
    pares.set_acq_bin(Some("411111".into())).unwrap();
    pares.set_mer_id(Some("shop-1".into())).unwrap();
    pares.set_xid(Some("MDEyMzQ1Njc4OTAxMjM0NTY3ODk=".into())).unwrap();
    pares.set_date(Some("20261016 10:00:00".into())).unwrap();
    pares.set_purch_amount(Some("1999".into())).unwrap();
    pares.set_currency(Some("840".into())).unwrap();
    pares.set_exponent(Some("2".into())).unwrap();
    pares.set_pan(Some("0000000000001111".into())).unwrap();
    pares.set_time(Some("20261016 10:00:05".into())).unwrap();
    pares.set_status(Some("Y".into())).unwrap();

    let err = pares.validate().unwrap_err();
    assert_eq!(err.error_code, ErrorCode::RequiredElementMissing);

    pares.set_cavv(Some("AAABBBCCCDDDEEEFFFGGGHHHIII=".into())).unwrap();
    pares.set_eci(Some("05".into())).unwrap();
    assert!(pares.validate().is_ok());
    assert!(pares.is_authenticated());
}

#[test]
fn test_enrolled_verification_response_needs_redirect() {
    let mut response = PaymentVerifRes::new_message("1.0");
    response.set_enrolled(Some("Y".into())).unwrap();
    assert!(response.validate().is_err());

    response.set_url(Some("https://acs.example/pa".into())).unwrap();
    response.embed_pa_req("<ThreeDSecure/>").unwrap();
    assert!(response.validate().is_ok());
    assert!(response.is_enrolled());
}

#[test]
fn test_clone_message_is_independent() {
    let mut response = PaymentVerifRes::new_message("1.0");
    response.set_id("c-1");
    response.set_enrolled(Some("N".into())).unwrap();

    let mut copy = response.clone_message();
    copy.set_id("c-2");
    assert_eq!(response.id(), "c-1");
    assert_eq!(copy.downcast_ref::<PaymentVerifRes>().unwrap().enrolled.as_deref(), Some("N"));
}
