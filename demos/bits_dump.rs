//! Example: Dump a DSL capture as ASCII bits
//!
//! Reads a DSLogic .dsl file and prints every enabled probe as a row of 0/1
//! characters, wrapped at the requested width.
//!
//! Usage:
//!   cargo run --release --example bits_dump -- \
//!       --file scan.dsl \
//!       --channels 6,7,8 \
//!       --width 32 \
//!       --trigger-at 1000 \
//!       --max-samples 4096

use clap::Parser;
use crossbeam_channel::bounded;
use dsl_bits::{BitsOptions, BitsOutput, DslCapture, Packet, TranscodeWorker};
use std::io::{BufWriter, Write};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to DSL file
    #[arg(short, long)]
    file: String,

    /// Samples per output line
    #[arg(short, long, default_value = "64")]
    width: usize,

    /// Probes to print (comma separated, default: all)
    #[arg(short, long, value_delimiter = ',')]
    channels: Vec<usize>,

    /// Mark the trigger at this sample position
    #[arg(long)]
    trigger_at: Option<u64>,

    /// Stop after this many samples
    #[arg(short = 'n', long)]
    max_samples: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    info!("=== Bits Dump Example ===");
    info!("File: {}", args.file);

    let mut capture = DslCapture::open(&args.file)?
        .with_max_samples(args.max_samples)
        .with_trigger_at(args.trigger_at);
    if !args.channels.is_empty() {
        capture = capture.with_enabled_channels(&args.channels);
    }

    let options = BitsOptions::new()
        .with_width(args.width)?
        .with_require_channels(true);
    let output = BitsOutput::with_options(&capture.device_info(), options)?;
    let names: Vec<&str> = output
        .transcoder()
        .channels()
        .map(|c| c.display_name.as_str())
        .collect();
    info!(
        "Printing {} samples per line for [{}]",
        output.transcoder().width(),
        names.join(", ")
    );

    let (packet_tx, packet_rx) = bounded::<Packet>(16);
    let (block_tx, block_rx) = bounded::<String>(16);
    let worker = TranscodeWorker::spawn(output, packet_rx, block_tx)?;

    // Print blocks as they arrive on a separate thread so the worker never
    // stalls on a full output channel
    let printer = std::thread::spawn(move || -> std::io::Result<()> {
        let stdout = std::io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        for block in block_rx {
            out.write_all(block.as_bytes())?;
        }
        out.flush()
    });

    for packet in capture.packets() {
        let packet = packet?;
        if packet_tx.send(packet).is_err() {
            warn!("Transcode worker stopped early");
            break;
        }
    }
    drop(packet_tx);

    let blocks = worker.join()?;
    printer
        .join()
        .map_err(|_| "printer thread panicked")??;

    info!("Wrote {} blocks", blocks);
    Ok(())
}
