//! Runtime support for streaming packets through a bits output

pub mod errors;
pub mod sample;
pub mod worker;

pub use errors::{WorkError, WorkResult};
pub use sample::{LogicBlock, Packet, decode_bit, get_bit};
pub use worker::TranscodeWorker;
