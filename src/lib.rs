//! Fixed-width ASCII bits output for packed logic captures
//!
//! This library renders logic-analyzer sample streams as rows of `0`/`1`
//! characters, one row per channel, wrapped at a configurable width and
//! annotated with the trigger position.
//!
//! # Architecture
//!
//! - **BitsOutput**: Session setup from device metadata and options
//! - **BitsTranscoder**: Streaming state machine turning packets into text blocks
//! - **TranscodeWorker**: Runs a session on its own thread behind crossbeam channels
//! - **DslCapture**: Reads DSLogic .dsl capture files as a packet stream
//!
//! # Example
//!
//! ```no_run
//! use dsl_bits::{BitsOutput, DslCapture};
//! use std::collections::HashMap;
//!
//! let mut capture = DslCapture::open("capture.dsl")?;
//! let params = HashMap::from([("width".to_string(), "32".to_string())]);
//! let mut output = BitsOutput::new(&capture.device_info(), &params)?;
//! for packet in capture.packets() {
//!     if let Some(text) = output.receive(&packet?)? {
//!         print!("{}", text);
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use thiserror::Error;

pub mod nodes;
pub mod output;
pub mod runtime;

// Re-export output building blocks
pub use output::{
    BitsOptions, BitsOutput, BitsTranscoder, Channel, ChannelKind, ChannelSpec, ConfigError,
    DeviceInfo, LineBuffer, TranscoderState, TriggerTracker,
};

// Re-export data types from runtime
pub use runtime::{LogicBlock, Packet};

// Re-export the capture reader
pub use nodes::{DslCapture, DslHeader};

// Re-export the threaded runtime
pub use runtime::{TranscodeWorker, WorkError, WorkResult};

#[derive(Error, Debug)]
pub enum BitsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Header parsing error: {0}")]
    ParseHeader(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid block number: {0}")]
    InvalidBlock(u64),
}

pub type Result<T> = std::result::Result<T, BitsError>;
