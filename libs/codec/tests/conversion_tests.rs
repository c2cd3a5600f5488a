//! Document conversion through the built-in definitions

use mpi_codec::{to_xml_string, Converter, RegistryHandle};
use mpi_codec::MessageMetaInfo;
use mpi_types::{
    BindableMessage, CRRes, CardRangeAction, ErrorCode, Extension, Message, MessageUID, PARes,
    PaymentAuthRes, PaymentVerifReq, Profile, ProfileRequest, SignatureDocument, VEReq, VERes,
};
use std::collections::BTreeSet;

fn converter() -> Converter {
    Converter::new(RegistryHandle::builtin().expect("built-in definitions load"))
}

fn wire(id: &str, body: &str) -> String {
    format!(r#"<ThreeDSecure><Message id="{}">{}</Message></ThreeDSecure>"#, id, body)
}

fn cr_res(ranges: &str) -> String {
    wire(
        "cr-1",
        &format!("<CRRes><version>1.0.2</version>{}<serialNumber>7</serialNumber></CRRes>", ranges),
    )
}

fn card_range(begin: &str, end: &str, action: &str) -> String {
    format!(
        "<CR><begin>{}</begin><end>{}</end><action>{}</action></CR>",
        begin, end, action
    )
}

#[test]
fn test_veres_not_enrolled_with_issuer_request_validates() {
    let message = converter()
        .convert_str(&wire(
            "tx-1",
            concat!(
                "<VERes><version>1.0.2</version>",
                "<CH><enrolled>N</enrolled><acctID></acctID></CH><url></url>",
                "<IReq><iReqCode>50</iReqCode></IReq></VERes>"
            ),
        ))
        .unwrap();

    let veres = message.downcast_ref::<VERes>().unwrap();
    assert_eq!(veres.ireq.code.as_deref(), Some("50"));
    assert!(message.validate().is_ok());
}

#[test]
fn test_veres_enrolled_with_issuer_request_fails_validation() {
    let message = converter()
        .convert_str(&wire(
            "tx-2",
            concat!(
                "<VERes><version>1.0.2</version>",
                "<CH><enrolled>Y</enrolled><acctID>abc</acctID></CH><url>https://acs.example/pa</url>",
                "<IReq><iReqCode>50</iReqCode></IReq></VERes>"
            ),
        ))
        .unwrap();

    let err = message.validate().unwrap_err();
    assert!(err.is_value());
    assert_eq!(err.id, "tx-2");
}

#[test]
fn test_unsupported_version_is_value_error() {
    let err = converter()
        .convert_str(&wire("tx-3", "<VERes><version>1.0.0</version></VERes>"))
        .unwrap_err();
    assert_eq!(err.error_code, ErrorCode::VersionNotSupported);
    assert!(!err.is_structural());
    assert_eq!(err.id, "tx-3");
}

/// Document for `meta` at `version` in its own dialect
fn envelope(meta: &MessageMetaInfo, id: &str, version: &str, fields: &str) -> String {
    let name = meta.name.as_str();
    if meta.family.is_wire() {
        let trailing = if name == "PARes" {
            "<Signature><SignedInfo><Reference URI=\"#pares-1\"/></SignedInfo></Signature>"
        } else {
            ""
        };
        wire(
            id,
            &format!("<{0}><version>{1}</version>{2}</{0}>{3}", name, version, fields, trailing),
        )
    } else {
        format!(
            r#"<MPI_Interface><{0} id="{1}"><version>{2}</version>{3}</{0}></MPI_Interface>"#,
            name, id, version, fields
        )
    }
}

/// Valid field content for each registered message name
fn sample_fields(name: &str) -> &'static str {
    match name {
        "CRReq" => concat!(
            "<Merchant><acqBIN>411111</acqBIN><merID>shop-1</merID><password>secret</password></Merchant>",
            "<serialNumber>42</serialNumber>"
        ),
        "CRRes" => concat!(
            "<CR><begin>4000000000000</begin><end>4000000000999</end><action>A</action></CR>",
            "<CR><begin>5100000000000000</begin><end>5100000000009999</end><action>D</action></CR>",
            "<serialNumber>43</serialNumber>"
        ),
        "VEReq" => concat!(
            "<pan>4111111111111111</pan>",
            "<Merchant><acqBIN>411111</acqBIN><merID>shop-1</merID></Merchant>",
            "<Browser><accept>text/html</accept><userAgent>Mozilla/5.0</userAgent></Browser>"
        ),
        "VERes" => concat!(
            "<CH><enrolled>Y</enrolled><acctID>NDExMTExMTExMTExMTExMQ==</acctID></CH>",
            "<url>https://acs.example/pa</url><protocol>ThreeDSecure</protocol><protocol>SET</protocol>"
        ),
        "PAReq" => concat!(
            "<Merchant><acqBIN>411111</acqBIN><merID>shop-1</merID><name>Example Shop</name>",
            "<country>840</country><url>https://shop.example</url></Merchant>",
            "<Purchase><xid>MDEyMzQ1Njc4OTAxMjM0NTY3ODk=</xid><date>20261016 10:00:00</date>",
            "<amount>$19.99</amount><purchAmount>1999</purchAmount><currency>840</currency>",
            "<exponent>2</exponent><desc>Books</desc></Purchase>",
            "<CH><acctID>NDExMTExMTExMTExMTExMQ==</acctID><expiry>2812</expiry></CH>"
        ),
        "PARes" => concat!(
            "<Merchant><acqBIN>411111</acqBIN><merID>shop-1</merID></Merchant>",
            "<Purchase><xid>MDEyMzQ1Njc4OTAxMjM0NTY3ODk=</xid><date>20261016 10:00:00</date>",
            "<purchAmount>1999</purchAmount><currency>840</currency><exponent>2</exponent></Purchase>",
            "<pan>0000000000001111</pan>",
            "<TX><time>20261016 10:00:05</time><status>N</status></TX>"
        ),
        "Error" => concat!(
            "<errorCode>5</errorCode><errorMessage>Invalid format</errorMessage>",
            "<errorDetail>pan</errorDetail><vendorCode>ds-17</vendorCode>"
        ),
        "PaymentVerifReq" => concat!(
            "<merchantID>shop-1</merchantID><acqBIN>411111</acqBIN><pan>4111111111111111</pan>",
            "<panExpiry>2812</panExpiry><purchAmount>1999</purchAmount><currency>840</currency>",
            "<deviceCategory>0</deviceCategory>",
            r#"<ProfileRequest scopeID="billing"><itemID>zip</itemID><itemID>country</itemID></ProfileRequest>"#
        ),
        "PaymentVerifRes" => concat!(
            "<enrolled>Y</enrolled><url>https://acs.example/pa</url><paReq>PFBBUmVxLz4=</paReq>"
        ),
        "PaymentAuthReq" => "<merchantID>shop-1</merchantID><paRes>PFBBUmVzLz4=</paRes>",
        "PaymentAuthRes" => concat!(
            "<merchantID>shop-1</merchantID><xid>MDEyMzQ1Njc4OTAxMjM0NTY3ODk=</xid><status>Y</status>",
            "<cavv>AAABBBCCCDDDEEEFFFGGGHHHIII=</cavv><eci>05</eci><cavvAlgorithm>2</cavvAlgorithm>",
            r#"<Profile name="cardholder"><Scope id="billing"><Item id="zip">10001</Item></Scope></Profile>"#
        ),
        "MPIError" => concat!(
            "<errorCode>95</errorCode><errorMessage>Binding failure</errorMessage>",
            "<errorDetail>payment-verification</errorDetail>"
        ),
        other => panic!("no sample for {}", other),
    }
}

#[test]
fn test_unsupported_version_rejected_for_every_message() {
    let converter = converter();
    let registry = converter.registry().snapshot();

    for meta in registry.messages() {
        let id = format!("vg-{}", meta.name);
        let err = converter
            .convert_str(&envelope(meta, &id, "9.9", ""))
            .unwrap_err();
        assert_eq!(err.error_code, ErrorCode::VersionNotSupported, "{}", meta.name);
        assert!(err.is_value(), "{}", meta.name);
        assert_eq!(err.id, id);
        assert!(err.error_detail.contains(meta.name.as_str()));
    }
}

#[test]
fn test_every_registered_message_round_trips() {
    let converter = converter();
    let registry = converter.registry().snapshot();
    let mut covered = BTreeSet::new();

    for meta in registry.messages() {
        for version in &meta.supported_versions {
            let uid = MessageUID::new(meta.name.as_str(), version.as_str());
            let id = format!("rt-{}-{}", meta.name, version);
            let xml = envelope(meta, &id, version, sample_fields(&meta.name));

            let first = converter.convert_str(&xml).unwrap();
            assert_eq!(first.uid(), uid);
            assert_eq!(first.id(), id);
            first.validate().unwrap();

            let rendered = to_xml_string(first.as_ref()).unwrap();
            let second = converter.convert_str(&rendered).unwrap();
            assert_eq!(second.uid(), uid);
            assert_eq!(second.id(), id);
            assert_eq!(to_xml_string(second.as_ref()).unwrap(), rendered, "{}", uid);

            covered.insert(uid);
        }
    }

    let registered: BTreeSet<_> = registry.all_message_info(Some("ALL")).unwrap().into_iter().collect();
    assert_eq!(covered, registered);
}

#[test]
fn test_missing_required_node_is_structural_with_context() {
    let err = converter()
        .convert_str(&wire("tx-4", "<VERes><version>1.0.1</version><url>x</url></VERes>"))
        .unwrap_err();
    assert_eq!(err.error_code, ErrorCode::RequiredElementMissing);
    assert_eq!(err.error_detail, "CH/enrolled");
    assert_eq!(err.id, "tx-4");
    assert_eq!(err.vendor_code.as_deref(), Some("type=VERes version=1.0.1"));
}

#[test]
fn test_setter_constraint_is_value_error() {
    let err = converter()
        .convert_str(&wire(
            "tx-5",
            "<VERes><version>1.0.2</version><CH><enrolled>maybe</enrolled></CH></VERes>",
        ))
        .unwrap_err();
    assert_eq!(err.error_code, ErrorCode::InvalidFormat);
    assert!(err.error_detail.contains("maybe"));
}

#[test]
fn test_card_range_bounds() {
    let accepted = converter()
        .convert_str(&cr_res(&card_range("4000000000000", "4000000000999", "A")))
        .unwrap();
    let crres = accepted.downcast_ref::<CRRes>().unwrap();
    assert_eq!(crres.ranges.len(), 1);
    assert_eq!(crres.ranges[0].action, CardRangeAction::Add);

    let lower_case = converter()
        .convert_str(&cr_res(&card_range("4000000000000", "4000000000999", "d")))
        .unwrap();
    assert_eq!(
        lower_case.downcast_ref::<CRRes>().unwrap().ranges[0].action,
        CardRangeAction::Delete
    );

    let short = converter()
        .convert_str(&cr_res(&card_range("400000000000", "400000000999", "A")))
        .unwrap_err();
    assert!(short.is_value());
    assert!(short.error_detail.starts_with("CR/begin"));

    let action = converter()
        .convert_str(&cr_res(&card_range("4000000000000", "4000000000999", "X")))
        .unwrap_err();
    assert!(action.is_value());
    assert!(action.error_detail.starts_with("CR/action"));

    let uneven = converter()
        .convert_str(&cr_res(&card_range("4000000000000", "40000000009999", "A")))
        .unwrap_err();
    assert!(uneven.is_value());
}

#[test]
fn test_undeclared_critical_extension_rejects_message() {
    let body = |critical: &str| {
        format!(
            concat!(
                "<VEReq><version>1.0.2</version><pan>4111111111111111</pan>",
                "<Merchant><acqBIN>411111</acqBIN><merID>shop-1</merID></Merchant>",
                r#"<Extension id="acme:loyalty" critical="{}">gold</Extension></VEReq>"#
            ),
            critical
        )
    };

    let err = converter().convert_str(&wire("tx-6", &body("true"))).unwrap_err();
    assert_eq!(err.error_code, ErrorCode::CriticalElementNotRecognized);
    assert!(err.error_detail.contains("acme:loyalty"));

    let message = converter().convert_str(&wire("tx-7", &body("false"))).unwrap();
    let vereq = message.downcast_ref::<VEReq>().unwrap();
    assert_eq!(
        vereq.extensions,
        vec![Extension::new("acme:loyalty", false, Some("gold".to_string()))]
    );
}

#[test]
fn test_extension_without_id_is_structural() {
    let err = converter()
        .convert_str(&wire(
            "tx-8",
            concat!(
                "<VEReq><version>1.0.2</version><pan>4111111111111111</pan>",
                "<Merchant><acqBIN>411111</acqBIN><merID>shop-1</merID></Merchant>",
                r#"<Extension critical="false"/></VEReq>"#
            ),
        ))
        .unwrap_err();
    assert!(err.is_structural());
    assert!(err.error_detail.ends_with("/@id"));
}

#[test]
fn test_pares_signature_and_attribute() {
    let xml = wire(
        "tx-9",
        concat!(
            r#"<PARes id="pares-1"><version>1.0.2</version>"#,
            "<Merchant><acqBIN>411111</acqBIN><merID>shop-1</merID></Merchant>",
            "<Purchase><xid>MDEyMzQ1Njc4OTAxMjM0NTY3ODk=</xid><date>20261016 10:00:00</date>",
            "<purchAmount>1999</purchAmount><currency>840</currency><exponent>2</exponent></Purchase>",
            "<pan>0000000000001111</pan>",
            "<TX><time>20261016 10:00:05</time><status>N</status></TX></PARes>",
            "<Signature><SignedInfo><Reference URI=\"#pares-1\"/></SignedInfo></Signature>"
        ),
    );
    let message = converter().convert_str(&xml).unwrap();
    let pares = message.downcast_ref::<PARes>().unwrap();
    assert_eq!(pares.pares_id.as_deref(), Some("pares-1"));
    let signature = pares.signature.as_ref().unwrap();
    assert!(signature.as_str().contains("SignedInfo"));
    assert!(signature.as_str().contains("#pares-1"));
    assert!(message.validate().is_ok());
}

#[test]
fn test_wire_round_trip() {
    let mut pares = PARes::new_message("1.0.2");
    pares.set_id("rt-1");
    pares.set_pares_id(Some("p-77".into())).unwrap();
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
    pares.set_cavv(Some("AAABBBCCCDDDEEEFFFGGGHHHIII=".into())).unwrap();
    pares.set_eci(Some("05".into())).unwrap();
    pares.set_cavv_algorithm(Some("2".into())).unwrap();
    pares
        .set_signature(Some(SignatureDocument(
            r#"<?xml version="1.0" encoding="UTF-8"?><Signature><SignatureValue>c2ln</SignatureValue></Signature>"#
                .to_string(),
        )))
        .unwrap();
    pares
        .set_extensions(vec![Extension::new("acme:note", false, Some("n".into()))])
        .unwrap();
    pares.validate().unwrap();

    let xml = to_xml_string(&pares).unwrap();
    let converted = converter().convert_str(&xml).unwrap();
    let back = converted.downcast_ref::<PARes>().unwrap();

    assert_eq!(back.header, pares.header);
    assert_eq!(back.merchant, pares.merchant);
    assert_eq!(back.purchase, pares.purchase);
    assert_eq!(back.tx, pares.tx);
    assert_eq!(back.pares_id, pares.pares_id);
    assert_eq!(back.extensions, pares.extensions);
    assert!(back
        .signature
        .as_ref()
        .unwrap()
        .as_str()
        .contains("<SignatureValue>c2ln</SignatureValue>"));
}

#[test]
fn test_interface_round_trip() {
    let mut request = PaymentVerifReq::new_message("1.0");
    request.set_id("if-1");
    request.set_merchant_id(Some("shop-1".into())).unwrap();
    request.set_pan(Some("4111111111111111".into())).unwrap();
    request.set_pan_expiry(Some("2812".into())).unwrap();
    request.set_purch_amount(Some("1999".into())).unwrap();
    request.set_currency(Some("840".into())).unwrap();
    request.set_device_category(Some("0".into())).unwrap();
    request
        .set_profile_requests(vec![ProfileRequest {
            scope_id: "billing".into(),
            item_ids: vec!["zip".into(), "country".into()],
        }])
        .unwrap();

    let xml = to_xml_string(&request).unwrap();
    let converted = converter().convert_str(&xml).unwrap();
    assert_eq!(converted.downcast_ref::<PaymentVerifReq>(), Some(&request));
}

#[test]
fn test_profile_round_trip() {
    let mut response = PaymentAuthRes::new_message("1.0");
    response.set_id("if-2");
    response.set_xid(Some("MDEyMzQ1Njc4OTAxMjM0NTY3ODk=".into())).unwrap();
    response.set_status(Some("N".into())).unwrap();
    let mut profile = Profile::new("cardholder");
    profile.insert("billing", "zip", "10001");
    response.set_profiles(vec![profile]).unwrap();

    let xml = to_xml_string(&response).unwrap();
    let converted = converter().convert_str(&xml).unwrap();
    let back = converted.downcast_ref::<PaymentAuthRes>().unwrap();
    assert_eq!(back, &response);
    assert_eq!(back.profiles[0].get("billing", "zip"), Some("10001"));
}

#[test]
fn test_interface_message_inside_wrong_root() {
    let err = converter()
        .convert_str(r#"<MPI_Interface><VERes id="x"><version>1.0.2</version></VERes></MPI_Interface>"#)
        .unwrap_err();
    assert_eq!(err.error_code, ErrorCode::MessageNotRecognized);
}

#[test]
fn test_malformed_xml() {
    let err = converter().convert_str("<ThreeDSecure><Message>").unwrap_err();
    assert_eq!(err.error_code, ErrorCode::ConversionFailure);
    assert!(err.error_detail.starts_with("malformed XML"));
}
