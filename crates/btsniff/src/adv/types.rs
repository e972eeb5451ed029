//! Data model for decoded LE extended advertising reports

use crate::error::DecodeError;
use crate::hci::constants::*;
use bitflags::bitflags;
use std::fmt;

/// Advertising event kind, decoded from the report's 16-bit event_type field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvertisingEventType {
    AdvInd,
    AdvDirectInd,
    AdvScanInd,
    AdvNonconnInd,
    ScanRspToAdvInd,
    ScanRspToAdvScanInd,
    Unknown(u16),
}

impl AdvertisingEventType {
    pub fn from_raw(value: u16) -> Self {
        match value {
            0b0010011 => Self::AdvInd,
            0b0010101 => Self::AdvDirectInd,
            0b0010010 => Self::AdvScanInd,
            0b0010000 => Self::AdvNonconnInd,
            0b0011011 => Self::ScanRspToAdvInd,
            0b0011010 => Self::ScanRspToAdvScanInd,
            other => Self::Unknown(other),
        }
    }

    /// Reports of these kinds keep their fixed header fields but skip
    /// name/flag extraction unless the caller overrides the filter.
    pub fn skips_ad_processing(&self) -> bool {
        matches!(self, Self::AdvNonconnInd | Self::AdvDirectInd)
    }
}

impl fmt::Display for AdvertisingEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdvInd => write!(f, "ADV_IND"),
            Self::AdvDirectInd => write!(f, "ADV_DIRECT_IND"),
            Self::AdvScanInd => write!(f, "ADV_SCAN_IND"),
            Self::AdvNonconnInd => write!(f, "ADV_NONCONN_IND"),
            Self::ScanRspToAdvInd => write!(f, "SCAN_RSP to an ADV_IND"),
            Self::ScanRspToAdvScanInd => write!(f, "SCAN_RSP to an ADV_SCAN_IND"),
            Self::Unknown(raw) => write!(f, "UNKNOWN EVENT TYPE (0x{:04X})", raw),
        }
    }
}

/// Address type of the advertiser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    Public,
    Random,
    PublicIdentity,
    RandomStatic,
    Anonymous,
    Unknown(u8),
}

impl From<u8> for AddressType {
    fn from(value: u8) -> Self {
        match value {
            ADDR_TYPE_PUBLIC => AddressType::Public,
            ADDR_TYPE_RANDOM => AddressType::Random,
            ADDR_TYPE_PUBLIC_IDENTITY => AddressType::PublicIdentity,
            ADDR_TYPE_RANDOM_STATIC => AddressType::RandomStatic,
            ADDR_TYPE_ANONYMOUS => AddressType::Anonymous,
            other => AddressType::Unknown(other),
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "Public"),
            Self::Random => write!(f, "Random"),
            Self::PublicIdentity => write!(f, "Public Identity"),
            Self::RandomStatic => write!(f, "Random (static)"),
            Self::Anonymous => write!(f, "None (anonymous)"),
            Self::Unknown(raw) => write!(f, "UNKNOWN ADDRESS TYPE (0x{:02X})", raw),
        }
    }
}

/// 6-byte Bluetooth device address, stored in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BdAddr {
    pub bytes: [u8; 6],
}

impl BdAddr {
    pub fn new(bytes: [u8; 6]) -> Self {
        Self { bytes }
    }

    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() >= 6 {
            let mut bytes = [0u8; 6];
            bytes.copy_from_slice(&slice[0..6]);
            Some(Self { bytes })
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.bytes[5],
            self.bytes[4],
            self.bytes[3],
            self.bytes[2],
            self.bytes[1],
            self.bytes[0]
        )
    }
}

bitflags! {
    /// Flags AD element (type 0x01), one octet
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AdvFlags: u8 {
        const LE_LIMITED_DISCOVERABLE = 0x01;
        const LE_GENERAL_DISCOVERABLE = 0x02;
        const BR_EDR_NOT_SUPPORTED = 0x04;
        const SIMULTANEOUS_LE_BREDR_CONTROLLER = 0x08;
        const SIMULTANEOUS_LE_BREDR_HOST = 0x10;
    }
}

/// One TLV unit from an advertising data payload.
///
/// `length` is the on-air length octet and counts the type byte, so the
/// payload holds `length - 1` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisingDataElement {
    pub length: u8,
    pub ad_type: u8,
    pub data: Vec<u8>,
}

impl AdvertisingDataElement {
    /// Total bytes this element occupied on the wire, length octet included
    pub fn wire_size(&self) -> usize {
        self.length as usize + 1
    }

    /// Decode the Flags octet, if this is a Flags element
    pub fn flags(&self) -> Option<AdvFlags> {
        if self.ad_type != AD_TYPE_FLAGS {
            return None;
        }
        self.data.first().map(|&b| AdvFlags::from_bits_truncate(b))
    }

    /// Interpret the payload as a device name, if this is a Complete Local
    /// Name element. Bytes map to characters one-to-one, no encoding
    /// conversion.
    pub fn local_name(&self) -> Option<String> {
        if self.ad_type != AD_TYPE_COMPLETE_LOCAL_NAME {
            return None;
        }
        Some(self.data.iter().map(|&b| b as char).collect())
    }
}

impl fmt::Display for AdvertisingDataElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AD type 0x{:02X} [{}]", self.ad_type, hex::encode(&self.data))
    }
}

/// One decoded LE Extended Advertising Report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedAdvertisingReport {
    pub event_type: AdvertisingEventType,
    pub address_type: AddressType,
    pub address: BdAddr,
    pub primary_phy: u8,
    pub secondary_phy: u8,
    pub advertising_sid: u8,
    pub tx_power: i8,
    pub rssi: i8,
    pub periodic_advertising_interval: u16,
    pub direct_address_type: AddressType,
    pub direct_address: BdAddr,
    pub data_length: u8,
    pub data: Vec<u8>,
}

/// Consumer-facing record assembled from one report.
///
/// Immutable after construction; handed to the queue as an `Arc` so the
/// consumer can hold it past the producing frame's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedAdvertisingEvent {
    pub event_type: AdvertisingEventType,
    pub address_type: AddressType,
    pub address: BdAddr,
    pub rssi: i8,
    pub name: Option<String>,
    pub flags: Option<AdvFlags>,
    /// Set when the AD payload could not be fully decoded. The fields
    /// above still reflect the report's fixed header.
    pub ad_error: Option<DecodeError>,
}

impl fmt::Display for ProcessedAdvertisingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Event type: {}", self.event_type)?;
        writeln!(f, "Address: {}", self.address)?;
        writeln!(f, "Address Type: {}", self.address_type)?;
        write!(f, "RSSI: {} dBm", self.rssi)?;
        if let Some(name) = &self.name {
            write!(f, "\nDevice Name: {}", name)?;
        }
        if let Some(flags) = self.flags {
            write!(f, "\nFlags: {:?}", flags)?;
        }
        if let Some(err) = self.ad_error {
            write!(f, "\nAD payload: {}", err)?;
        }
        Ok(())
    }
}
