//! Streaming bits transcoder
//!
//! Turns packed logic sample blocks into fixed-width `0`/`1` text lines, one
//! per channel, with an optional `T:` marker under the column where the last
//! trigger fired. State persists across blocks so lines wrap at exactly
//! `width` samples regardless of how the input is chunked.

use super::channels::ChannelSpec;
use super::line::LineBuffer;
use super::trigger::TriggerTracker;
use crate::runtime::sample::{LogicBlock, Packet, decode_bit};
use crate::{BitsError, Result};
use tracing::{debug, trace};

/// Lifecycle of a transcoding session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscoderState {
    /// No logic data seen yet; the header is still pending
    AwaitingFirstData,
    /// Header consumed, lines accumulating
    Streaming,
    /// End of stream processed; no further packets accepted
    Ended,
}

/// Fixed-width ASCII bits transcoder
///
/// All channel lines advance together: one column per sample, a space after
/// every 8th column, and a flush of every line when `width` columns are
/// filled.
pub struct BitsTranscoder {
    lines: Vec<LineBuffer>,
    width: usize,
    column: usize,
    trigger: TriggerTracker,
    header: Option<String>,
    state: TranscoderState,
}

impl BitsTranscoder {
    /// Create a transcoder for `channels`, wrapping every `width` samples
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero. Use [`BitsOptions`](super::BitsOptions) to
    /// validate user input first.
    pub fn new(channels: Vec<ChannelSpec>, width: usize) -> Self {
        assert!(width > 0, "Width must be at least 1");

        Self {
            lines: channels.into_iter().map(LineBuffer::new).collect(),
            width,
            column: 0,
            trigger: TriggerTracker::new(),
            header: None,
            state: TranscoderState::AwaitingFirstData,
        }
    }

    /// Text to emit once, in front of the first logic output (builder pattern)
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn state(&self) -> TranscoderState {
        self.state
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Columns filled in the current, unflushed line
    pub fn column(&self) -> usize {
        self.column
    }

    pub fn pending_trigger(&self) -> Option<usize> {
        self.trigger.pending()
    }

    pub fn channels(&self) -> impl Iterator<Item = &ChannelSpec> {
        self.lines.iter().map(LineBuffer::channel)
    }

    /// Dispatch one packet. Returns the text block it produced, if any.
    pub fn receive(&mut self, packet: &Packet) -> Result<Option<String>> {
        match packet {
            Packet::Trigger => {
                self.trigger()?;
                Ok(None)
            }
            Packet::Logic(block) => self.push_logic(block),
            Packet::End => self.end(),
        }
    }

    /// Mark the current column as the trigger point
    pub fn trigger(&mut self) -> Result<()> {
        self.ensure_open("trigger")?;
        trace!("Trigger at column {}", self.column);
        self.trigger.record(self.column);
        Ok(())
    }

    /// Feed a block of packed samples
    pub fn push_logic(&mut self, block: &LogicBlock) -> Result<Option<String>> {
        self.ensure_open("logic")?;

        if let Some(line) = self
            .lines
            .iter()
            .find(|line| line.channel().bit_index >= block.bits_per_sample())
        {
            return Err(BitsError::ProtocolViolation(format!(
                "channel '{}' at bit {} does not fit a {}-byte sample",
                line.channel().display_name,
                line.channel().bit_index,
                block.unit_size
            )));
        }

        let mut out = match self.header.take() {
            // The header is still here, this must be the first block
            Some(header) => header,
            None => String::with_capacity(512),
        };
        self.state = TranscoderState::Streaming;

        let last = self.lines.len().saturating_sub(1);

        for offset in 0..block.num_samples() {
            self.column += 1;
            let full = self.column == self.width;

            for (j, line) in self.lines.iter_mut().enumerate() {
                let bit = decode_bit(&block.data, block.unit_size, offset, line.channel().bit_index);
                line.append_bit(bit);

                if full {
                    out.push_str(&line.flush_and_reset());
                    out.push('\n');
                    if j == last
                        && let Some(marker) = self.trigger.take_annotation()
                    {
                        out.push_str(&marker);
                    }
                } else if self.column % 8 == 0 {
                    line.append_separator();
                }
            }

            if full {
                trace!("Flushed {} lines of {} samples", self.lines.len(), self.width);
                self.column = 0;
            }
        }

        if out.is_empty() { Ok(None) } else { Ok(Some(out)) }
    }

    /// Finish the stream, flushing any partially filled lines.
    ///
    /// No trigger marker is written here even if one is pending.
    pub fn end(&mut self) -> Result<Option<String>> {
        self.ensure_open("end")?;
        self.state = TranscoderState::Ended;

        if self.column == 0 {
            debug!("End of stream, no partial lines");
            return Ok(None);
        }

        debug!("End of stream, flushing {} partial columns", self.column);
        let mut out = String::with_capacity(512);
        for line in &mut self.lines {
            out.push_str(&line.flush_and_reset());
            out.push('\n');
        }
        self.column = 0;

        Ok(Some(out))
    }

    fn ensure_open(&self, what: &str) -> Result<()> {
        if self.state == TranscoderState::Ended {
            return Err(BitsError::ProtocolViolation(format!(
                "{} packet received after end of stream",
                what
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(bit_index: usize, name: &str) -> ChannelSpec {
        ChannelSpec {
            bit_index,
            display_name: name.to_string(),
        }
    }

    fn block(samples: &[u8]) -> LogicBlock {
        LogicBlock::new(samples.to_vec(), 1).unwrap()
    }

    fn two_channels(width: usize) -> BitsTranscoder {
        BitsTranscoder::new(vec![spec(0, "D0"), spec(1, "D1")], width)
    }

    // D0 = 1,0,1,0,1,0,1,0 and D1 = 0,0,0,0,1,1,1,1
    const EIGHT: [u8; 8] = [0b01, 0b00, 0b01, 0b00, 0b11, 0b10, 0b11, 0b10];

    #[test]
    fn test_full_line_flush() {
        let mut t = two_channels(8);
        let out = t.push_logic(&block(&EIGHT)).unwrap();
        assert_eq!(out.as_deref(), Some("D0:10101010\nD1:00001111\n"));
        assert_eq!(t.column(), 0);
        assert_eq!(t.end().unwrap(), None);
    }

    #[test]
    fn test_trigger_annotation() {
        let mut t = two_channels(8);
        assert_eq!(t.push_logic(&block(&EIGHT[..3])).unwrap(), None);
        t.trigger().unwrap();
        assert_eq!(t.pending_trigger(), Some(3));

        let out = t.push_logic(&block(&EIGHT[3..])).unwrap().unwrap();
        assert_eq!(out, "D0:10101010\nD1:00001111\nT:   ^ 3\n");
        assert_eq!(t.pending_trigger(), None);
    }

    #[test]
    fn test_separators_every_eight_columns() {
        let mut t = BitsTranscoder::new(vec![spec(0, "D0")], 20);
        let out = t.push_logic(&block(&[1u8; 20])).unwrap().unwrap();
        assert_eq!(out, "D0:11111111 11111111 1111\n");
    }

    #[test]
    fn test_trigger_alignment_with_separators() {
        let mut t = BitsTranscoder::new(vec![spec(0, "D0")], 16);
        t.push_logic(&block(&[0u8; 10])).unwrap();
        t.trigger().unwrap();
        let out = t.push_logic(&block(&[1u8; 6])).unwrap().unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "D0:00000000 00111111");
        assert_eq!(lines[1], format!("T:{}^ 10", " ".repeat(11)));
    }

    #[test]
    fn test_last_trigger_wins() {
        let mut t = two_channels(8);
        t.push_logic(&block(&EIGHT[..1])).unwrap();
        t.trigger().unwrap();
        t.push_logic(&block(&EIGHT[1..5])).unwrap();
        t.trigger().unwrap();
        let out = t.push_logic(&block(&EIGHT[5..])).unwrap().unwrap();
        assert!(out.ends_with("T:     ^ 5\n"));
        assert_eq!(out.matches("T:").count(), 1);
    }

    #[test]
    fn test_trigger_after_full_line_goes_to_next_line() {
        let mut t = two_channels(8);
        t.push_logic(&block(&EIGHT)).unwrap();
        t.trigger().unwrap();
        assert_eq!(t.pending_trigger(), Some(0));

        let out = t.push_logic(&block(&EIGHT)).unwrap().unwrap();
        assert!(out.ends_with("T:^ 0\n"));
    }

    #[test]
    fn test_end_flushes_partial_without_trigger() {
        let mut t = two_channels(8);
        t.push_logic(&block(&EIGHT[..2])).unwrap();
        t.trigger().unwrap();
        t.push_logic(&block(&EIGHT[2..5])).unwrap();

        let out = t.end().unwrap();
        assert_eq!(out.as_deref(), Some("D0:10101\nD1:00001\n"));
        assert_eq!(t.state(), TranscoderState::Ended);
    }

    #[test]
    fn test_end_with_empty_line_produces_nothing() {
        let mut t = two_channels(4);
        assert_eq!(t.end().unwrap(), None);
    }

    #[test]
    fn test_line_counts_for_any_chunking() {
        for width in 1..=20 {
            for n in [0usize, 1, 7, 8, 9, 31, 64, 100] {
                let mut t = BitsTranscoder::new(vec![spec(0, "A"), spec(3, "B")], width);
                let data: Vec<u8> = (0..n).map(|i| (i * 7) as u8).collect();

                let mut text = String::new();
                // Feed in uneven chunks to exercise state carried across blocks
                for chunk in data.chunks(3) {
                    if let Some(out) = t.push_logic(&block(chunk)).unwrap() {
                        text.push_str(&out);
                    }
                }
                let full_lines = text.lines().filter(|l| l.starts_with("A:")).count();
                assert_eq!(full_lines, n / width, "width={} n={}", width, n);

                let tail = t.end().unwrap();
                assert_eq!(tail.is_some(), n % width > 0, "width={} n={}", width, n);
                if let Some(tail) = tail {
                    assert_eq!(tail.lines().count(), 2);
                }
            }
        }
    }

    #[test]
    fn test_header_emitted_once() {
        let mut t = two_channels(8).with_header("hdr\n");
        let first = t.push_logic(&block(&EIGHT[..2])).unwrap();
        assert_eq!(first.as_deref(), Some("hdr\n"));
        assert_eq!(t.state(), TranscoderState::Streaming);

        let second = t.push_logic(&block(&EIGHT[2..])).unwrap();
        assert_eq!(second.as_deref(), Some("D0:10101010\nD1:00001111\n"));
    }

    #[test]
    fn test_header_not_emitted_by_trigger_or_end() {
        let mut t = two_channels(8).with_header("hdr\n");
        t.trigger().unwrap();
        assert_eq!(t.state(), TranscoderState::AwaitingFirstData);
        assert_eq!(t.end().unwrap(), None);
    }

    #[test]
    fn test_packets_after_end_rejected() {
        let mut t = two_channels(8);
        t.receive(&Packet::End).unwrap();
        assert!(matches!(
            t.receive(&Packet::Trigger),
            Err(BitsError::ProtocolViolation(_))
        ));
        assert!(matches!(
            t.receive(&Packet::Logic(block(&EIGHT))),
            Err(BitsError::ProtocolViolation(_))
        ));
        assert!(matches!(t.receive(&Packet::End), Err(BitsError::ProtocolViolation(_))));
    }

    #[test]
    fn test_channel_outside_unit_rejected() {
        let mut t = BitsTranscoder::new(vec![spec(9, "D9")], 8);
        let result = t.push_logic(&block(&EIGHT));
        assert!(matches!(result, Err(BitsError::ProtocolViolation(_))));

        // The same channel fits a two-byte word
        let wide = LogicBlock::new(vec![0x00, 0x02, 0x00, 0x00], 2).unwrap();
        t.push_logic(&wide).unwrap();
        assert_eq!(t.end().unwrap().as_deref(), Some("D9:10\n"));
    }

    #[test]
    fn test_zero_channels() {
        let mut t = BitsTranscoder::new(Vec::new(), 4);
        assert_eq!(t.push_logic(&block(&EIGHT)).unwrap(), None);
        assert_eq!(t.column(), 0);
        assert_eq!(t.end().unwrap(), None);
    }

    #[test]
    fn test_trailing_partial_word_ignored() {
        let mut t = BitsTranscoder::new(vec![spec(0, "D0")], 8);
        let odd = LogicBlock::new(vec![0x01, 0x00, 0x01, 0x00, 0x01], 2).unwrap();
        t.push_logic(&odd).unwrap();
        assert_eq!(t.column(), 2);
        assert_eq!(t.end().unwrap().as_deref(), Some("D0:11\n"));
    }
}
