//! Packet sources feeding the bits output
//!
//! The output itself never talks to hardware. Sources here turn stored
//! captures into the same [`Packet`](crate::Packet) stream an acquisition
//! would produce.

mod dsl_file;

pub use dsl_file::{DslCapture, DslHeader, Packets};
