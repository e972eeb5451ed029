//! Command-line BLE advertising sniffer
//!
//! Opens a raw HCI socket, enables LE scanning, and prints every decoded
//! advertising event. Requires root privileges (or CAP_NET_RAW) for the
//! raw socket.

use anyhow::Context;
use btsniff::{start_le_capture, CaptureConfig, EventQueue, ScanConfig};
use clap::Parser;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "btsniff", about = "Capture and decode BLE advertising traffic")]
struct Args {
    /// HCI device id to capture from (0 for hci0)
    #[arg(short, long, default_value_t = 0)]
    device: u16,

    /// Stop after this many seconds; runs until killed when omitted
    #[arg(short = 't', long)]
    duration: Option<u64>,

    /// Use passive scanning instead of active
    #[arg(long)]
    passive: bool,

    /// Decode name/flags for non-connectable and directed reports too
    #[arg(long)]
    all: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let scan = ScanConfig {
        scan_type: if args.passive { 0x00 } else { 0x01 },
        ..ScanConfig::default()
    };
    let capture = CaptureConfig {
        decode_all: args.all,
    };

    let queue = Arc::new(EventQueue::unbounded());
    let handle = start_le_capture(args.device, &scan, Arc::clone(&queue), capture)
        .with_context(|| format!("failed to start capture on hci{}", args.device))?;

    if let Some(secs) = args.duration {
        let stop = handle.stop_signal();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            log::info!("capture duration elapsed, stopping");
            stop.signal();
        });
    }

    while let Some(event) = queue.pop() {
        println!("{event}");
        println!();
    }

    handle.join().context("capture loop failed")?;
    Ok(())
}
