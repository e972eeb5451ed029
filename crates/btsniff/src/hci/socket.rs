//! HCI Socket implementation for Bluetooth communication
//!
//! This module provides a wrapper around the raw HCI socket interface.
//! The socket is opened in raw channel mode with an accept-all packet
//! filter, which is what lets the capture loop observe every frame the
//! controller delivers.

use crate::error::TransportError;
use crate::hci::constants::*;
use crate::hci::packet::HciCommand;
use std::os::unix::io::{AsRawFd, RawFd};
use std::time::Duration;

// Bluetooth socket constants
const AF_BLUETOOTH: i32 = 31;
const BTPROTO_HCI: i32 = 1;
const HCI_CHANNEL_RAW: i32 = 0;
const SOL_HCI: i32 = 0;
const HCI_FILTER: i32 = 2;

// Define the sockaddr_hci structure
#[repr(C)]
struct SockaddrHci {
    hci_family: libc::sa_family_t,
    hci_dev: u16,
    hci_channel: u16,
}

// Kernel-side HCI socket filter
#[repr(C)]
struct HciFilter {
    type_mask: u32,
    event_mask: [u32; 2],
    opcode: u16,
}

impl HciFilter {
    /// Accept every packet type and every event
    fn accept_all() -> Self {
        Self {
            type_mask: !0,
            event_mask: [!0, !0],
            opcode: 0,
        }
    }
}

/// LE scan parameters sent to the controller before capture starts.
///
/// Immutable once constructed; pass a fresh value to reconfigure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// 0x00 = passive, 0x01 = active
    pub scan_type: u8,
    /// Time between start of consecutive scan windows, in 0.625 ms units
    pub scan_interval: u16,
    /// Length of a single scan window, in 0.625 ms units
    pub scan_window: u16,
    /// 0x00 = public, 0x01 = random
    pub own_address_type: u8,
    /// 0x00 = accept all advertisements, 0x01 = whitelist only
    pub filter_policy: u8,
    /// Ask the controller to suppress duplicate reports
    pub filter_duplicates: bool,
}

impl Default for ScanConfig {
    /// Active scanning, 10 ms interval and window, public address,
    /// no filtering, duplicates delivered
    fn default() -> Self {
        Self {
            scan_type: 0x01,
            scan_interval: 0x0010,
            scan_window: 0x0010,
            own_address_type: 0x00,
            filter_policy: 0x00,
            filter_duplicates: false,
        }
    }
}

/// Represents a raw HCI socket bound to one controller
#[derive(Debug)]
pub struct HciSocket {
    fd: RawFd,
}

impl HciSocket {
    /// Opens a raw HCI socket bound to the given device
    ///
    /// # Arguments
    ///
    /// * `dev_id` - The device ID to open (0 for the first controller)
    pub fn open(dev_id: u16) -> Result<Self, TransportError> {
        let fd = unsafe { libc::socket(AF_BLUETOOTH, libc::SOCK_RAW | libc::SOCK_CLOEXEC, BTPROTO_HCI) };

        if fd < 0 {
            return Err(TransportError::Socket(std::io::Error::last_os_error()));
        }

        let addr = SockaddrHci {
            hci_family: AF_BLUETOOTH as libc::sa_family_t,
            hci_dev: dev_id,
            hci_channel: HCI_CHANNEL_RAW as u16,
        };

        let result = unsafe {
            libc::bind(
                fd,
                &addr as *const _ as *const libc::sockaddr,
                std::mem::size_of::<SockaddrHci>() as libc::socklen_t,
            )
        };

        if result < 0 {
            unsafe { libc::close(fd) };
            return Err(TransportError::Bind(std::io::Error::last_os_error()));
        }

        Ok(HciSocket { fd })
    }

    /// Install an accept-all kernel filter so every packet type and event
    /// reaches this socket
    pub fn apply_capture_filter(&self) -> Result<(), TransportError> {
        let filter = HciFilter::accept_all();

        let result = unsafe {
            libc::setsockopt(
                self.fd,
                SOL_HCI,
                HCI_FILTER,
                &filter as *const _ as *const libc::c_void,
                std::mem::size_of::<HciFilter>() as libc::socklen_t,
            )
        };

        if result < 0 {
            return Err(TransportError::Filter(std::io::Error::last_os_error()));
        }

        Ok(())
    }

    /// Reset the controller to a known state before configuring it
    pub fn reset(&self) -> Result<(), TransportError> {
        self.send_command(&HciCommand::Reset)
    }

    /// Push scan parameters to the controller
    pub fn set_scan_parameters(&self, config: &ScanConfig) -> Result<(), TransportError> {
        self.send_command(&HciCommand::LeSetScanParameters {
            scan_type: config.scan_type,
            scan_interval: config.scan_interval,
            scan_window: config.scan_window,
            own_address_type: config.own_address_type,
            filter_policy: config.filter_policy,
        })
    }

    /// Enable or disable LE scanning
    pub fn set_scan_enable(
        &self,
        enable: bool,
        filter_duplicates: bool,
    ) -> Result<(), TransportError> {
        self.send_command(&HciCommand::LeSetScanEnable {
            enable,
            filter_duplicates,
        })
    }

    /// Configure and start an LE scan in one step
    pub fn enable_scan(&self, config: &ScanConfig) -> Result<(), TransportError> {
        self.set_scan_parameters(config)?;
        self.set_scan_enable(true, config.filter_duplicates)
    }

    /// Read one raw frame from the socket, indicator byte included.
    ///
    /// With a timeout, waits via `select` and returns
    /// [`TransportError::TimedOut`] if no frame arrives in time.
    pub fn read_frame(&self, timeout: Option<Duration>) -> Result<Vec<u8>, TransportError> {
        if let Some(timeout) = timeout {
            // Set up the fd_set for select()
            let mut read_fds: libc::fd_set = unsafe { std::mem::zeroed() };
            unsafe {
                libc::FD_ZERO(&mut read_fds);
                libc::FD_SET(self.fd, &mut read_fds);
            }

            let mut timeout_val = libc::timeval {
                tv_sec: timeout.as_secs() as libc::time_t,
                tv_usec: timeout.subsec_micros() as libc::suseconds_t,
            };

            let result = unsafe {
                libc::select(
                    self.fd + 1,
                    &mut read_fds,
                    std::ptr::null_mut(),
                    std::ptr::null_mut(),
                    &mut timeout_val,
                )
            };

            if result < 0 {
                return Err(TransportError::Receive(std::io::Error::last_os_error()));
            }

            if result == 0 {
                return Err(TransportError::TimedOut);
            }
        }

        let mut buffer = [0u8; HCI_MAX_EVENT_SIZE];

        let bytes_read = unsafe {
            libc::read(
                self.fd,
                buffer.as_mut_ptr() as *mut libc::c_void,
                buffer.len(),
            )
        };

        if bytes_read < 0 {
            return Err(TransportError::Receive(std::io::Error::last_os_error()));
        }

        if bytes_read == 0 {
            return Err(TransportError::Receive(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "HCI socket closed",
            )));
        }

        log::trace!("read {} byte frame", bytes_read);
        Ok(buffer[..bytes_read as usize].to_vec())
    }

    /// Sends an HCI command to the controller
    pub fn send_command(&self, command: &HciCommand) -> Result<(), TransportError> {
        let packet = command.to_packet();
        match unsafe {
            libc::write(
                self.fd,
                packet.as_ptr() as *const libc::c_void,
                packet.len(),
            )
        } {
            -1 => Err(TransportError::Send(std::io::Error::last_os_error())),
            _ => Ok(()),
        }
    }
}

impl AsRawFd for HciSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl Drop for HciSocket {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}
