//! Classification of raw HCI frames and decoding of extended advertising
//! reports
//!
//! Each decode is a pure function of its byte range: no state is carried
//! across frames or reports, and a malformed report never aborts the
//! frames that follow it.

use crate::adv::types::*;
use crate::error::DecodeError;
use crate::hci::constants::*;
use crate::hci::cursor::ByteCursor;
use crate::hci::packet::{HciEvent, HciFrameKind, LeMetaEvent};

/// Route one raw frame.
///
/// Only LE Meta events carrying the Extended Advertising Report subevent
/// yield reports; every other frame is discarded as routine traffic
/// (`Ok(None)`). A frame that claims more than its buffer holds fails
/// with [`DecodeError::TruncatedFrame`].
pub fn classify_frame(frame: &[u8]) -> Result<Option<Vec<ExtendedAdvertisingReport>>, DecodeError> {
    let mut cursor = ByteCursor::new(frame);

    match HciFrameKind::from_u8(cursor.read_u8()?) {
        Some(HciFrameKind::Event) => {}
        _ => return Ok(None),
    }

    let event = HciEvent::parse(&mut cursor)?;
    if event.event_code != EVT_LE_META_EVENT {
        return Ok(None);
    }

    let meta = LeMetaEvent::parse(event.parameters)?;
    if meta.subevent_code != SUBEVT_LE_EXTENDED_ADVERTISING_REPORT {
        return Ok(None);
    }

    // Reports are variable-length, so each one must be fully parsed to
    // know where the next begins.
    let mut reports = Vec::with_capacity(meta.num_reports as usize);
    let mut cursor = ByteCursor::new(meta.reports);
    for _ in 0..meta.num_reports {
        reports.push(ExtendedAdvertisingReport::parse(&mut cursor)?);
    }

    Ok(Some(reports))
}

impl ExtendedAdvertisingReport {
    /// Decode one report starting at the cursor's current offset.
    ///
    /// Consumes exactly the fixed header plus the declared AD payload,
    /// which leaves the cursor positioned at the next report of a
    /// multi-report event.
    pub fn parse(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        let event_type = AdvertisingEventType::from_raw(cursor.read_u16_le()?);
        let address_type = AddressType::from(cursor.read_u8()?);
        let address = BdAddr::new(cursor.read_array::<6>()?);
        let primary_phy = cursor.read_u8()?;
        let secondary_phy = cursor.read_u8()?;
        let advertising_sid = cursor.read_u8()?;
        let tx_power = cursor.read_i8()?;
        let rssi = cursor.read_i8()?;
        let periodic_advertising_interval = cursor.read_u16_le()?;
        let direct_address_type = AddressType::from(cursor.read_u8()?);
        let direct_address = BdAddr::new(cursor.read_array::<6>()?);
        let data_length = cursor.read_u8()?;
        let data = cursor.read_bytes(data_length as usize)?.to_vec();

        Ok(ExtendedAdvertisingReport {
            event_type,
            address_type,
            address,
            primary_phy,
            secondary_phy,
            advertising_sid,
            tx_power,
            rssi,
            periodic_advertising_interval,
            direct_address_type,
            direct_address,
            data_length,
            data,
        })
    }
}

/// Split a report's AD payload into TLV elements.
///
/// The sum of each element's wire size must land exactly on the payload
/// end. A zero length octet, or one whose element would overrun the
/// remaining budget, fails with [`DecodeError::MalformedAdPayload`].
pub fn parse_ad_elements(data: &[u8]) -> Result<Vec<AdvertisingDataElement>, DecodeError> {
    let mut elements = Vec::new();
    let mut cursor = ByteCursor::new(data);

    while !cursor.is_empty() {
        let length = cursor.read_u8()?;
        if length == 0 || length as usize > cursor.remaining() {
            return Err(DecodeError::MalformedAdPayload);
        }

        let ad_type = cursor.read_u8()?;
        let payload = cursor.read_bytes(length as usize - 1)?;

        elements.push(AdvertisingDataElement {
            length,
            ad_type,
            data: payload.to_vec(),
        });
    }

    Ok(elements)
}

impl ProcessedAdvertisingEvent {
    /// Assemble the consumer record for one decoded report.
    ///
    /// Non-connectable and directed advertisements keep their fixed
    /// header fields but skip name/flag extraction unless `decode_all`
    /// is set. A malformed AD payload is recorded in `ad_error` and the
    /// fixed fields remain valid.
    pub fn from_report(report: &ExtendedAdvertisingReport, decode_all: bool) -> Self {
        let mut event = ProcessedAdvertisingEvent {
            event_type: report.event_type,
            address_type: report.address_type,
            address: report.address,
            rssi: report.rssi,
            name: None,
            flags: None,
            ad_error: None,
        };

        if !decode_all && report.event_type.skips_ad_processing() {
            return event;
        }

        match parse_ad_elements(&report.data) {
            Ok(elements) => {
                for element in &elements {
                    log::debug!("{}: {}", report.address, element);
                    if let Some(flags) = element.flags() {
                        event.flags = Some(flags);
                    }
                    if let Some(name) = element.local_name() {
                        event.name = Some(name);
                    }
                }
            }
            Err(err) => event.ad_error = Some(err),
        }

        event
    }
}
