//! Dedicated-thread runner for a bits output session
//!
//! A [`TranscodeWorker`] owns one [`BitsOutput`] on its own thread. Packets
//! arrive on a crossbeam channel and finished text blocks leave on another.
//! Each packet is processed to completion before the stop flag is checked
//! again, so a stop never interrupts a block halfway.

use super::errors::{WorkError, WorkResult};
use super::sample::Packet;
use crate::output::BitsOutput;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, info};

/// How long a blocking receive waits before rechecking the stop flag
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Handle to a transcoding thread
pub struct TranscodeWorker {
    name: String,
    stop_signal: Arc<AtomicBool>,
    handle: Option<JoinHandle<WorkResult<usize>>>,
}

impl TranscodeWorker {
    /// Start `output` on a new thread.
    ///
    /// The worker exits after processing [`Packet::End`]. If every packet
    /// sender is dropped first, it finishes the stream as if `End` had been
    /// received.
    pub fn spawn(
        output: BitsOutput,
        packets: Receiver<Packet>,
        blocks: Sender<String>,
    ) -> std::io::Result<Self> {
        let name = output.name().to_string();
        let stop_signal = Arc::new(AtomicBool::new(false));

        let thread_name = name.clone();
        let stop = Arc::clone(&stop_signal);
        let handle = std::thread::Builder::new()
            .name(format!("bits_{}", name))
            .spawn(move || Self::run(&thread_name, output, packets, blocks, stop))?;

        debug!("Started transcode worker: {}", name);

        Ok(Self {
            name,
            stop_signal,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ask the worker to stop before its next packet
    pub fn stop(&self) {
        self.stop_signal.store(true, Ordering::Relaxed);
    }

    /// Wait for the worker and return how many text blocks it produced
    pub fn join(mut self) -> WorkResult<usize> {
        match self.handle.take() {
            Some(handle) => match handle.join() {
                Ok(result) => result,
                Err(e) => {
                    error!("[{}] Thread panicked: {:?}", self.name, e);
                    Err(WorkError::Panicked(self.name.clone()))
                }
            },
            None => Ok(0),
        }
    }

    fn run(
        name: &str,
        mut output: BitsOutput,
        packets: Receiver<Packet>,
        blocks: Sender<String>,
        stop: Arc<AtomicBool>,
    ) -> WorkResult<usize> {
        let mut produced = 0usize;

        loop {
            if stop.load(Ordering::Relaxed) {
                info!("[{}] Stop signal received, abandoning stream", name);
                return Err(WorkError::Shutdown);
            }

            let packet = match packets.recv_timeout(POLL_INTERVAL) {
                Ok(packet) => packet,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("[{}] Input disconnected without End, finishing stream", name);
                    Packet::End
                }
            };

            let is_end = matches!(packet, Packet::End);

            let text = output.receive(&packet).inspect_err(|e| {
                error!("[{}] Work error: {}", name, e);
            })?;
            if let Some(text) = text {
                blocks.send(text)?;
                produced += 1;
            }

            if is_end {
                break;
            }
        }

        info!("[{}] Shutdown. Produced {} blocks.", name, produced);
        Ok(produced)
    }
}

impl Drop for TranscodeWorker {
    fn drop(&mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
