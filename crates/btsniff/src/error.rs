//! Error types for the btsniff library
//!
//! This module defines the error types used throughout the library.

use thiserror::Error;

/// Errors raised while decoding raw HCI frames and advertising payloads
///
/// Both variants are recoverable: the capture loop drops the affected
/// frame or report and moves on to the next one.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("frame truncated before field boundary")]
    TruncatedFrame,

    #[error("advertising data element overruns declared payload")]
    MalformedAdPayload,
}

/// Errors raised by the raw HCI transport
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to open HCI socket: {0}")]
    Socket(std::io::Error),

    #[error("Failed to bind to HCI device: {0}")]
    Bind(std::io::Error),

    #[error("Failed to apply HCI filter: {0}")]
    Filter(std::io::Error),

    #[error("Failed to send HCI command: {0}")]
    Send(std::io::Error),

    #[error("Failed to read from HCI socket: {0}")]
    Receive(std::io::Error),

    #[error("Timed out waiting for HCI frame")]
    TimedOut,
}

impl TransportError {
    /// Timeouts are routine while polling for frames; every other
    /// transport failure terminates the capture loop.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, TransportError::TimedOut)
    }
}
