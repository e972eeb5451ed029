//! Bluetooth HCI (Host Controller Interface) layer
//!
//! Raw frame structures, the bounds-checked cursor they are parsed with,
//! and the socket transport that produces them.

pub mod constants;
pub mod cursor;
pub mod packet;
pub mod socket;


pub use cursor::ByteCursor;
pub use packet::{HciCommand, HciEvent, HciFrameKind, LeMetaEvent};
pub use socket::{HciSocket, ScanConfig};
