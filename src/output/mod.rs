//! ASCII bits output format
//!
//! Renders logic captures as rows of `0`/`1` characters, one row per enabled
//! logic channel, wrapped every `width` samples:
//!
//! ```text
//! dsl-bits 0.1.0
//! Acquisition with 2/8 channels at 1 MHz
//! CLK:10101010 10101010
//! CS:00000000 00011111
//! T:            ^ 11
//! ```
//!
//! # Building blocks
//!
//! - [`select_logic_channels`] picks the channels to render
//! - [`LineBuffer`] accumulates one channel's line
//! - [`TriggerTracker`] remembers where the trigger fired
//! - [`BitsTranscoder`] drives everything across a stream of [`Packet`]s
//! - [`BitsOutput`] wires the above up from device metadata and options

pub mod channels;
pub mod header;
pub mod line;
pub mod options;
pub mod transcoder;
pub mod trigger;

pub use channels::{Channel, ChannelKind, ChannelSpec, DeviceInfo, select_logic_channels};
pub use header::{build_header, parse_samplerate, program_identity, samplerate_string};
pub use line::LineBuffer;
pub use options::{BitsOptions, ConfigError, DEFAULT_SAMPLES_PER_LINE, OptionSpec};
pub use transcoder::{BitsTranscoder, TranscoderState};
pub use trigger::{TriggerTracker, annotation};

use crate::Result;
use crate::runtime::sample::Packet;
use std::collections::HashMap;
use tracing::{debug, info};

/// A bits output session bound to one device
pub struct BitsOutput {
    name: String,
    transcoder: BitsTranscoder,
    blocks_emitted: usize,
}

impl BitsOutput {
    /// Format identifier
    pub const ID: &'static str = "bits";
    /// Human-readable format name
    pub const DESCRIPTION: &'static str = "Bits";

    /// Set up a session from string parameters (e.g. `{"width": "32"}`)
    pub fn new(device: &DeviceInfo, params: &HashMap<String, String>) -> Result<Self> {
        let options = BitsOptions::from_params(params)?;
        Self::with_options(device, options)
    }

    /// Set up a session from already validated options
    pub fn with_options(device: &DeviceInfo, options: BitsOptions) -> Result<Self> {
        let channels = select_logic_channels(&device.channels, options.require_channels)?;
        let header = build_header(
            &program_identity(),
            channels.len(),
            device.channels.len(),
            device.samplerate,
        );

        info!(
            "Bits output: {}/{} channels, {} samples per line",
            channels.len(),
            device.channels.len(),
            options.width
        );

        let transcoder = BitsTranscoder::new(channels, options.width).with_header(header);

        Ok(Self {
            name: Self::ID.to_string(),
            transcoder,
            blocks_emitted: 0,
        })
    }

    /// Recognised options and their defaults
    pub fn options() -> Vec<OptionSpec> {
        BitsOptions::specs()
    }

    /// With custom name, used as the log prefix
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Process one packet, returning the text block it produced, if any
    pub fn receive(&mut self, packet: &Packet) -> Result<Option<String>> {
        let out = self.transcoder.receive(packet)?;
        if out.is_some() {
            self.blocks_emitted += 1;
        }
        Ok(out)
    }

    pub fn state(&self) -> TranscoderState {
        self.transcoder.state()
    }

    /// Number of text blocks handed out so far
    pub fn blocks_emitted(&self) -> usize {
        self.blocks_emitted
    }

    pub fn transcoder(&self) -> &BitsTranscoder {
        &self.transcoder
    }
}

impl Drop for BitsOutput {
    fn drop(&mut self) {
        debug!(
            "[{}] Released after {} blocks ({:?})",
            self.name,
            self.blocks_emitted,
            self.transcoder.state()
        );
    }
}
