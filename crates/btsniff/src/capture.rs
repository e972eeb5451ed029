//! Capture loop: reads raw frames, decodes them, feeds the event queue
//!
//! The loop runs on its own thread behind a [`CaptureHandle`]. Decode
//! errors are logged and the loop moves on; only a fatal transport error
//! or an explicit [`CaptureHandle::stop`] ends it. On any exit the queue
//! is closed, so a consumer blocked in `pop` observes shutdown instead of
//! hanging.

use crate::adv::{classify_frame, ProcessedAdvertisingEvent};
use crate::error::TransportError;
use crate::hci::socket::{HciSocket, ScanConfig};
use crate::queue::EventQueue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How long one read waits before the loop re-checks the stop flag
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Source of raw HCI frames for the capture loop.
///
/// Implementations return whole frames, indicator byte first. A
/// [`TransportError::TimedOut`] result is not fatal; the loop re-checks
/// its stop flag and reads again.
pub trait Transport: Send {
    fn read_frame(&self, timeout: Option<Duration>) -> Result<Vec<u8>, TransportError>;
}

impl Transport for HciSocket {
    fn read_frame(&self, timeout: Option<Duration>) -> Result<Vec<u8>, TransportError> {
        HciSocket::read_frame(self, timeout)
    }
}

/// Options for a capture session
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureConfig {
    /// Extract name/flags even from non-connectable and directed reports
    pub decode_all: bool,
}

/// Cloneable signal for stopping a capture loop from another thread
#[derive(Debug, Clone)]
pub struct StopSignal {
    stop: Arc<AtomicBool>,
}

impl StopSignal {
    /// Ask the loop to exit; it notices at the next read timeout
    pub fn signal(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

/// Handle to a running capture thread
pub struct CaptureHandle {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<Result<(), TransportError>>,
}

impl CaptureHandle {
    /// Ask the loop to exit; it notices at the next read timeout
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Signal usable from other threads after the handle is consumed
    pub fn stop_signal(&self) -> StopSignal {
        StopSignal {
            stop: Arc::clone(&self.stop),
        }
    }

    /// Wait for the loop to finish and surface its final transport status
    pub fn join(self) -> Result<(), TransportError> {
        self.thread.join().unwrap_or_else(|_| {
            Err(TransportError::Receive(std::io::Error::new(
                std::io::ErrorKind::Other,
                "capture thread panicked",
            )))
        })
    }
}

/// Spawn the capture loop on a dedicated thread.
///
/// The queue is closed when the loop exits for any reason.
pub fn spawn_capture<T>(
    transport: T,
    queue: Arc<EventQueue<Arc<ProcessedAdvertisingEvent>>>,
    config: CaptureConfig,
) -> CaptureHandle
where
    T: Transport + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop);

    let thread = thread::spawn(move || {
        let result = run_capture(&transport, &queue, &stop_flag, config);
        queue.close();
        if let Err(err) = &result {
            log::error!("capture loop terminated: {err}");
        }
        result
    });

    CaptureHandle { stop, thread }
}

/// Open the radio, install the capture filter, configure and enable
/// scanning, and start capturing.
///
/// The socket moves into the capture thread; the controller keeps
/// scanning after the loop stops until it is reset or reconfigured.
pub fn start_le_capture(
    dev_id: u16,
    scan: &ScanConfig,
    queue: Arc<EventQueue<Arc<ProcessedAdvertisingEvent>>>,
    config: CaptureConfig,
) -> Result<CaptureHandle, TransportError> {
    let socket = HciSocket::open(dev_id)?;
    socket.apply_capture_filter()?;
    socket.reset()?;
    socket.enable_scan(scan)?;
    log::info!("capture started on hci{dev_id}");
    Ok(spawn_capture(socket, queue, config))
}

fn run_capture<T: Transport>(
    transport: &T,
    queue: &EventQueue<Arc<ProcessedAdvertisingEvent>>,
    stop: &AtomicBool,
    config: CaptureConfig,
) -> Result<(), TransportError> {
    while !stop.load(Ordering::Relaxed) {
        let frame = match transport.read_frame(Some(STOP_POLL_INTERVAL)) {
            Ok(frame) => frame,
            Err(err) if !err.is_fatal() => continue,
            Err(err) => return Err(err),
        };

        match classify_frame(&frame) {
            Ok(Some(reports)) => {
                for report in &reports {
                    let event = ProcessedAdvertisingEvent::from_report(report, config.decode_all);
                    if let Some(err) = event.ad_error {
                        log::warn!("partial decode for {}: {err}", event.address);
                    }
                    queue.push(Arc::new(event));
                }
            }
            Ok(None) => log::trace!("discarding {} byte non-advertising frame", frame.len()),
            Err(err) => log::warn!("dropping undecodable frame: {err}"),
        }
    }

    Ok(())
}
