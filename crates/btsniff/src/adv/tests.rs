//! Unit tests for advertising report classification and decoding

use super::decoder::{classify_frame, parse_ad_elements};
use super::types::*;
use crate::error::DecodeError;
use crate::hci::constants::EXT_ADV_REPORT_HEADER_SIZE;
use crate::hci::cursor::ByteCursor;

/// Build the 24-byte fixed header plus AD payload for one report
fn report_bytes(event_type: u16, address: [u8; 6], ad: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(EXT_ADV_REPORT_HEADER_SIZE + ad.len());
    out.extend_from_slice(&event_type.to_le_bytes());
    out.push(0x00); // address type: public
    out.extend_from_slice(&address);
    out.push(0x01); // primary PHY: LE 1M
    out.push(0x00); // secondary PHY: none
    out.push(0x05); // advertising SID
    out.push(0x7F); // TX power: not available
    out.push(0xC3); // RSSI: -61 dBm
    out.extend_from_slice(&0x0000u16.to_le_bytes()); // periodic interval
    out.push(0xFF); // direct address type: anonymous
    out.extend_from_slice(&[0u8; 6]); // direct address
    out.push(ad.len() as u8);
    out.extend_from_slice(ad);
    out
}

/// Wrap report payloads into a raw LE Meta extended advertising frame
fn meta_frame(num_reports: u8, reports: &[u8]) -> Vec<u8> {
    let mut frame = vec![0x04, 0x3E];
    frame.push((reports.len() + 2) as u8);
    frame.push(0x0D);
    frame.push(num_reports);
    frame.extend_from_slice(reports);
    frame
}

#[test]
fn test_event_type_decoding() {
    assert_eq!(
        AdvertisingEventType::from_raw(0b0010011),
        AdvertisingEventType::AdvInd
    );
    assert_eq!(
        AdvertisingEventType::from_raw(0b0010101),
        AdvertisingEventType::AdvDirectInd
    );
    assert_eq!(
        AdvertisingEventType::from_raw(0b0010010),
        AdvertisingEventType::AdvScanInd
    );
    assert_eq!(
        AdvertisingEventType::from_raw(0b0010000),
        AdvertisingEventType::AdvNonconnInd
    );
    assert_eq!(
        AdvertisingEventType::from_raw(0b0011011),
        AdvertisingEventType::ScanRspToAdvInd
    );
    assert_eq!(
        AdvertisingEventType::from_raw(0b0011010),
        AdvertisingEventType::ScanRspToAdvScanInd
    );
    assert_eq!(
        AdvertisingEventType::from_raw(0x0040),
        AdvertisingEventType::Unknown(0x0040)
    );
}

#[test]
fn test_address_type_decoding() {
    assert_eq!(AddressType::from(0x00), AddressType::Public);
    assert_eq!(AddressType::from(0x01), AddressType::Random);
    assert_eq!(AddressType::from(0x02), AddressType::PublicIdentity);
    assert_eq!(AddressType::from(0x03), AddressType::RandomStatic);
    assert_eq!(AddressType::from(0xFF), AddressType::Anonymous);
    assert_eq!(AddressType::from(0x42), AddressType::Unknown(0x42));
}

#[test]
fn test_address_display_reverses_byte_order() {
    let addr = BdAddr::new([0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
    assert_eq!(addr.to_string(), "06:05:04:03:02:01");
}

#[test]
fn test_report_fixed_fields() {
    let bytes = report_bytes(0x13, [0x11, 0x22, 0x33, 0x44, 0x55, 0x66], &[]);
    let mut cursor = ByteCursor::new(&bytes);
    let report = ExtendedAdvertisingReport::parse(&mut cursor).unwrap();

    assert_eq!(report.event_type, AdvertisingEventType::AdvInd);
    assert_eq!(report.address_type, AddressType::Public);
    assert_eq!(report.address.to_string(), "66:55:44:33:22:11");
    assert_eq!(report.primary_phy, 0x01);
    assert_eq!(report.secondary_phy, 0x00);
    assert_eq!(report.advertising_sid, 0x05);
    assert_eq!(report.tx_power, 0x7F);
    assert_eq!(report.rssi, -61);
    assert_eq!(report.periodic_advertising_interval, 0);
    assert_eq!(report.direct_address_type, AddressType::Anonymous);
    assert_eq!(report.data_length, 0);
    assert!(report.data.is_empty());
    assert!(cursor.is_empty());
}

#[test]
fn test_truncated_report_header() {
    let bytes = report_bytes(0x13, [0; 6], &[]);
    let mut cursor = ByteCursor::new(&bytes[..10]);
    assert_eq!(
        ExtendedAdvertisingReport::parse(&mut cursor).unwrap_err(),
        DecodeError::TruncatedFrame
    );
}

#[test]
fn test_report_data_length_must_fit() {
    let mut bytes = report_bytes(0x13, [0; 6], &[0x02, 0x01, 0x04]);
    // Inflate the declared AD length past the end of the buffer
    bytes[EXT_ADV_REPORT_HEADER_SIZE - 1] = 0x20;
    let mut cursor = ByteCursor::new(&bytes);
    assert_eq!(
        ExtendedAdvertisingReport::parse(&mut cursor).unwrap_err(),
        DecodeError::TruncatedFrame
    );
}

#[test]
fn test_ad_elements_exact_fit() {
    // Flags + name + an opaque manufacturer element
    let payload = [
        0x02, 0x01, 0x06, // Flags
        0x05, 0x09, b'A', b'B', b'C', b'D', // Complete Local Name
        0x04, 0xFF, 0x4C, 0x00, 0x01, // Manufacturer Specific Data
    ];

    let elements = parse_ad_elements(&payload).unwrap();
    assert_eq!(elements.len(), 3);

    // The elements tile the payload exactly
    let total: usize = elements.iter().map(|e| e.wire_size()).sum();
    assert_eq!(total, payload.len());

    assert_eq!(
        elements[0].flags(),
        Some(AdvFlags::LE_GENERAL_DISCOVERABLE | AdvFlags::BR_EDR_NOT_SUPPORTED)
    );
    assert_eq!(elements[1].local_name().as_deref(), Some("ABCD"));
    assert_eq!(elements[2].ad_type, 0xFF);
    assert_eq!(elements[2].data, vec![0x4C, 0x00, 0x01]);
    // Typed accessors do not apply across element kinds
    assert_eq!(elements[2].flags(), None);
    assert_eq!(elements[2].local_name(), None);
}

#[test]
fn test_ad_element_overrun_is_malformed() {
    // Second element claims 9 bytes but only 3 remain
    let payload = [0x02, 0x01, 0x06, 0x09, 0x09, b'X', b'Y'];
    assert_eq!(
        parse_ad_elements(&payload).unwrap_err(),
        DecodeError::MalformedAdPayload
    );
}

#[test]
fn test_ad_element_zero_length_is_malformed() {
    let payload = [0x00, 0x01, 0x06];
    assert_eq!(
        parse_ad_elements(&payload).unwrap_err(),
        DecodeError::MalformedAdPayload
    );
}

#[test]
fn test_flags_bits() {
    let element = AdvertisingDataElement {
        length: 2,
        ad_type: 0x01,
        data: vec![0x1F],
    };

    let flags = element.flags().unwrap();
    assert!(flags.contains(AdvFlags::LE_LIMITED_DISCOVERABLE));
    assert!(flags.contains(AdvFlags::LE_GENERAL_DISCOVERABLE));
    assert!(flags.contains(AdvFlags::BR_EDR_NOT_SUPPORTED));
    assert!(flags.contains(AdvFlags::SIMULTANEOUS_LE_BREDR_CONTROLLER));
    assert!(flags.contains(AdvFlags::SIMULTANEOUS_LE_BREDR_HOST));

    // Reserved bits are ignored, not an error
    let element = AdvertisingDataElement {
        length: 2,
        ad_type: 0x01,
        data: vec![0x84],
    };
    assert_eq!(element.flags(), Some(AdvFlags::BR_EDR_NOT_SUPPORTED));
}

#[test]
fn test_malformed_ad_keeps_fixed_fields() {
    // AD element overruns the declared payload budget
    let bytes = report_bytes(0x13, [1, 2, 3, 4, 5, 6], &[0x05, 0x09, b'X']);
    let mut cursor = ByteCursor::new(&bytes);
    let report = ExtendedAdvertisingReport::parse(&mut cursor).unwrap();

    let event = ProcessedAdvertisingEvent::from_report(&report, false);
    assert_eq!(event.ad_error, Some(DecodeError::MalformedAdPayload));
    assert_eq!(event.event_type, AdvertisingEventType::AdvInd);
    assert_eq!(event.address.to_string(), "06:05:04:03:02:01");
    assert_eq!(event.name, None);
    assert_eq!(event.flags, None);
}

#[test]
fn test_nonconnectable_reports_skip_ad_processing() {
    let ad = [0x02, 0x01, 0x04, 0x05, 0x09, b'T', b'e', b's', b't'];

    for event_type in [0x10, 0x15] {
        let bytes = report_bytes(event_type, [1, 2, 3, 4, 5, 6], &ad);
        let mut cursor = ByteCursor::new(&bytes);
        let report = ExtendedAdvertisingReport::parse(&mut cursor).unwrap();

        let event = ProcessedAdvertisingEvent::from_report(&report, false);
        assert_eq!(event.name, None);
        assert_eq!(event.flags, None);
        assert_eq!(event.ad_error, None);

        // The caller override decodes the same report in full
        let event = ProcessedAdvertisingEvent::from_report(&report, true);
        assert_eq!(event.name.as_deref(), Some("Test"));
        assert_eq!(event.flags, Some(AdvFlags::BR_EDR_NOT_SUPPORTED));
    }

    // Scannable and connectable kinds are processed by default
    let bytes = report_bytes(0x12, [1, 2, 3, 4, 5, 6], &ad);
    let mut cursor = ByteCursor::new(&bytes);
    let report = ExtendedAdvertisingReport::parse(&mut cursor).unwrap();
    let event = ProcessedAdvertisingEvent::from_report(&report, false);
    assert_eq!(event.name.as_deref(), Some("Test"));
}

#[test]
fn test_classify_discards_routine_traffic() {
    // Command frame
    assert_eq!(classify_frame(&[0x01, 0x03, 0x0C, 0x00]).unwrap(), None);
    // Unknown indicator byte
    assert_eq!(classify_frame(&[0x42, 0x00]).unwrap(), None);
    // Event frame that is not an LE Meta event
    assert_eq!(classify_frame(&[0x04, 0x0E, 0x01, 0x00]).unwrap(), None);
    // LE Meta event with a different subevent
    assert_eq!(classify_frame(&[0x04, 0x3E, 0x02, 0x02, 0x00]).unwrap(), None);
    // Empty frames are truncated, not routine
    assert_eq!(classify_frame(&[]).unwrap_err(), DecodeError::TruncatedFrame);
}

#[test]
fn test_classify_end_to_end() {
    // Flags (BR/EDR Not Supported) then Complete Local Name "TestDev"
    let ad = [
        0x02, 0x01, 0x04, //
        0x08, 0x09, b'T', b'e', b's', b't', b'D', b'e', b'v',
    ];
    let report = report_bytes(0x13, [0x01, 0x02, 0x03, 0x04, 0x05, 0x06], &ad);
    let frame = meta_frame(1, &report);

    let reports = classify_frame(&frame).unwrap().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].data_length, 12);

    let event = ProcessedAdvertisingEvent::from_report(&reports[0], false);
    assert_eq!(event.event_type, AdvertisingEventType::AdvInd);
    assert_eq!(event.address.to_string(), "06:05:04:03:02:01");
    assert_eq!(event.name.as_deref(), Some("TestDev"));
    let flags = event.flags.unwrap();
    assert!(flags.contains(AdvFlags::BR_EDR_NOT_SUPPORTED));
    assert!(!flags.contains(AdvFlags::LE_GENERAL_DISCOVERABLE));
    assert_eq!(event.ad_error, None);
}

#[test]
fn test_classify_multi_report_stride() {
    // Two reports with different AD payload sizes; the second is only
    // reachable if the first decode consumed exactly its own bytes
    let first = report_bytes(0x13, [1, 1, 1, 1, 1, 1], &[0x02, 0x01, 0x06]);
    let second = report_bytes(0x12, [2, 2, 2, 2, 2, 2], &[0x04, 0x09, b'a', b'b', b'c']);

    let mut reports = first.clone();
    reports.extend_from_slice(&second);
    let frame = meta_frame(2, &reports);

    let decoded = classify_frame(&frame).unwrap().unwrap();
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0].event_type, AdvertisingEventType::AdvInd);
    assert_eq!(decoded[0].data_length, 3);
    assert_eq!(decoded[1].event_type, AdvertisingEventType::AdvScanInd);
    assert_eq!(decoded[1].address.to_string(), "02:02:02:02:02:02");
    assert_eq!(decoded[1].data, vec![0x04, 0x09, b'a', b'b', b'c']);
}

#[test]
fn test_classify_report_count_overrun() {
    // Claims two reports but carries one; must stop with an error rather
    // than read past the buffer
    let report = report_bytes(0x13, [1, 2, 3, 4, 5, 6], &[]);
    let frame = meta_frame(2, &report);

    assert_eq!(
        classify_frame(&frame).unwrap_err(),
        DecodeError::TruncatedFrame
    );
}

#[test]
fn test_ad_element_display_renders_hex() {
    let element = AdvertisingDataElement {
        length: 0x04,
        ad_type: 0xFF,
        data: vec![0x4C, 0x00, 0x01],
    };
    assert_eq!(element.to_string(), "AD type 0xFF [4c0001]");
}
