//! Example: Capturing BLE advertising traffic
//!
//! This example demonstrates how to capture and decode LE advertising
//! reports using the btsniff library.
//!
//! Note: This example requires root privileges to run, as opening raw HCI
//! sockets requires elevated permissions.

use btsniff::{start_le_capture, CaptureConfig, EventQueue, ScanConfig};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Starting LE capture on device 0...");

    let queue = Arc::new(EventQueue::unbounded());
    let handle = start_le_capture(
        0,
        &ScanConfig::default(),
        Arc::clone(&queue),
        CaptureConfig::default(),
    )?;

    // Stop the capture after 10 seconds
    let stop = handle.stop_signal();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(10));
        stop.signal();
    });

    println!("Capturing for 10 seconds...");
    while let Some(event) = queue.pop() {
        println!("{event}");
        println!();
    }

    handle.join()?;
    println!("Capture complete!");

    Ok(())
}
