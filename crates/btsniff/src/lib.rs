//! btsniff - BLE advertising capture over a raw HCI socket
//!
//! This library captures Bluetooth Low Energy advertising traffic from a
//! controller's raw HCI transport on Unix systems and decodes it into
//! structured records. Raw frames are classified, LE Extended Advertising
//! Report sub-events are parsed with bounds-checked cursor reads, and the
//! decoded events are handed from the capture thread to a consumer
//! through a blocking FIFO queue.

pub mod adv;
pub mod capture;
pub mod error;
pub mod hci;
pub mod queue;

// Re-export common types for convenience
pub use adv::{
    classify_frame, parse_ad_elements, AddressType, AdvFlags, AdvertisingDataElement,
    AdvertisingEventType, BdAddr, ExtendedAdvertisingReport, ProcessedAdvertisingEvent,
};
pub use capture::{
    spawn_capture, start_le_capture, CaptureConfig, CaptureHandle, StopSignal, Transport,
};
pub use error::{DecodeError, TransportError};
pub use hci::{ByteCursor, HciCommand, HciEvent, HciFrameKind, HciSocket, LeMetaEvent, ScanConfig};
pub use queue::{EventQueue, OverflowPolicy};
