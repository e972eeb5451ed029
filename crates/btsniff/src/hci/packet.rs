//! HCI packet structures and parsing
//!
//! This module contains structures and methods for handling HCI packets.

use crate::error::DecodeError;
use crate::hci::constants::*;
use crate::hci::cursor::ByteCursor;

/// HCI packet kind, derived from the first byte of a raw frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HciFrameKind {
    Command,
    AclData,
    ScoData,
    Event,
    IsoData,
    Vendor,
}

impl HciFrameKind {
    /// Map an indicator byte to a frame kind.
    ///
    /// Unknown indicator bytes return `None`; on a raw capture socket that
    /// is routine traffic to discard, not an error.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            HCI_COMMAND_PKT => Some(Self::Command),
            HCI_ACLDATA_PKT => Some(Self::AclData),
            HCI_SCODATA_PKT => Some(Self::ScoData),
            HCI_EVENT_PKT => Some(Self::Event),
            HCI_ISODATA_PKT => Some(Self::IsoData),
            HCI_VENDOR_PKT => Some(Self::Vendor),
            _ => None,
        }
    }
}

/// HCI commands issued by this crate
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum HciCommand {
    // Host Controller Commands (OGF: 0x03)
    Reset,

    // LE Commands (OGF: 0x08)
    LeSetScanParameters {
        scan_type: u8,
        scan_interval: u16,
        scan_window: u16,
        own_address_type: u8,
        filter_policy: u8,
    },
    LeSetScanEnable {
        enable: bool,
        filter_duplicates: bool,
    },
}

impl HciCommand {
    /// Get the OGF and OCF for this command
    pub fn opcode_parts(&self) -> (u8, u16) {
        match self {
            Self::Reset => (OGF_HOST_CTL, OCF_RESET),
            Self::LeSetScanParameters { .. } => (OGF_LE, OCF_LE_SET_SCAN_PARAMETERS),
            Self::LeSetScanEnable { .. } => (OGF_LE, OCF_LE_SET_SCAN_ENABLE),
        }
    }

    /// Convert the command to its raw parameter bytes
    fn parameters(&self) -> Vec<u8> {
        match *self {
            Self::Reset => vec![],

            Self::LeSetScanParameters {
                scan_type,
                scan_interval,
                scan_window,
                own_address_type,
                filter_policy,
            } => {
                let mut params = Vec::with_capacity(7);
                params.push(scan_type);
                params.extend_from_slice(&scan_interval.to_le_bytes());
                params.extend_from_slice(&scan_window.to_le_bytes());
                params.push(own_address_type);
                params.push(filter_policy);
                params
            }

            Self::LeSetScanEnable {
                enable,
                filter_duplicates,
            } => {
                vec![enable as u8, filter_duplicates as u8]
            }
        }
    }

    /// Convert the command to a raw HCI packet
    pub fn to_packet(&self) -> Vec<u8> {
        let (ogf, ocf) = self.opcode_parts();
        let opcode = ((ogf as u16) << 10) | (ocf & 0x3ff);
        let params = self.parameters();

        let mut packet = vec![HCI_COMMAND_PKT];
        packet.extend_from_slice(&opcode.to_le_bytes());
        packet.push(params.len() as u8);
        packet.extend_from_slice(&params);
        packet
    }
}

/// HCI event packet header plus its parameter bytes
///
/// Borrows from the raw frame; valid for one read cycle only.
#[derive(Debug, Clone)]
pub struct HciEvent<'a> {
    pub event_code: u8,
    pub parameter_total_length: u8,
    pub parameters: &'a [u8],
}

impl<'a> HciEvent<'a> {
    /// Parse an HCI event from the bytes following the packet indicator.
    ///
    /// The declared parameter length must fit in the remaining buffer.
    pub fn parse(cursor: &mut ByteCursor<'a>) -> Result<Self, DecodeError> {
        let event_code = cursor.read_u8()?;
        let parameter_total_length = cursor.read_u8()?;
        let parameters = cursor.read_bytes(parameter_total_length as usize)?;

        Ok(HciEvent {
            event_code,
            parameter_total_length,
            parameters,
        })
    }
}

/// LE Meta subevent header and the report bytes that follow it
#[derive(Debug, Clone)]
pub struct LeMetaEvent<'a> {
    pub subevent_code: u8,
    pub num_reports: u8,
    pub reports: &'a [u8],
}

impl<'a> LeMetaEvent<'a> {
    /// Parse the subevent header from an LE Meta event's parameters
    pub fn parse(parameters: &'a [u8]) -> Result<Self, DecodeError> {
        let mut cursor = ByteCursor::new(parameters);
        let subevent_code = cursor.read_u8()?;
        let num_reports = cursor.read_u8()?;
        let reports = cursor.read_bytes(cursor.remaining())?;

        Ok(LeMetaEvent {
            subevent_code,
            num_reports,
            reports,
        })
    }
}
