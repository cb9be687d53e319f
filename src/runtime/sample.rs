//! Core data types for packed logic samples

use std::fmt;
use std::sync::Arc;

use crate::{BitsError, Result};

/// A block of packed multi-channel logic samples
///
/// Each sample is one `unit_size`-byte word holding the simultaneous state of
/// every probe. Probe `n` lives at bit `n % 8` of byte `n / 8` within the word
/// (LSB-first), which is the layout logic analyzers hand out for interleaved
/// captures.
///
/// Only whole words are considered samples: trailing bytes that do not fill a
/// complete word are ignored.
#[derive(Clone, Debug)]
pub struct LogicBlock {
    /// Packed sample words. Shared via Arc so a block can be fanned out cheaply.
    pub data: Arc<[u8]>,
    /// Bytes per sample word
    pub unit_size: usize,
}

impl LogicBlock {
    /// Create a new block. A zero `unit_size` is rejected since no sample
    /// boundary could ever be found in the data.
    pub fn new(data: impl Into<Arc<[u8]>>, unit_size: usize) -> Result<Self> {
        if unit_size == 0 {
            return Err(BitsError::ProtocolViolation(
                "logic block with zero unit size".to_string(),
            ));
        }
        Ok(Self {
            data: data.into(),
            unit_size,
        })
    }

    /// Number of whole sample words in this block
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.data.len() / self.unit_size
    }

    /// Number of probe bits each sample word can carry
    #[inline]
    pub fn bits_per_sample(&self) -> usize {
        self.unit_size * 8
    }

    /// Split this block into two at sample `offset`.
    ///
    /// The second half starts with sample `offset`. Either half may be empty.
    pub fn split_at(&self, offset: usize) -> (LogicBlock, LogicBlock) {
        let cut = (offset * self.unit_size).min(self.num_samples() * self.unit_size);
        let head = LogicBlock {
            data: Arc::from(&self.data[..cut]),
            unit_size: self.unit_size,
        };
        let tail = LogicBlock {
            data: Arc::from(&self.data[cut..]),
            unit_size: self.unit_size,
        };
        (head, tail)
    }
}

impl fmt::Display for LogicBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "LogicBlock[samples={}, unit={}, bytes={}]",
            self.num_samples(),
            self.unit_size,
            self.data.len()
        )
    }
}

/// Extract one probe's bit from a packed sample buffer.
///
/// The bit lives at byte `offset * unit_size + bit_index / 8`, position
/// `bit_index % 8`. Positions past the end of `data` read as low.
#[inline]
pub fn get_bit(data: &[u8], unit_size: usize, offset: usize, bit_index: usize) -> bool {
    let byte_pos = offset * unit_size + bit_index / 8;
    let bit_pos = bit_index % 8;

    match data.get(byte_pos) {
        Some(byte) => (byte >> bit_pos) & 1 == 1,
        None => false,
    }
}

/// Same lookup as [`get_bit`], rendered as the `'0'`/`'1'` character used in
/// text output.
#[inline]
pub fn decode_bit(data: &[u8], unit_size: usize, offset: usize, bit_index: usize) -> char {
    if get_bit(data, unit_size, offset, bit_index) {
        '1'
    } else {
        '0'
    }
}

/// One event from an acquisition feed
#[derive(Clone, Debug)]
pub enum Packet {
    /// Marks the position of the next sample as the trigger point
    Trigger,
    /// A block of packed logic samples
    Logic(LogicBlock),
    /// No more packets will follow
    End,
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Packet::Trigger => write!(f, "Trigger"),
            Packet::Logic(block) => write!(f, "Logic({})", block),
            Packet::End => write!(f, "End"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_bit() {
        let data = vec![0b10101010, 0b11001100];
        assert!(!get_bit(&data, 1, 0, 0)); // sample 0, bit 0
        assert!(get_bit(&data, 1, 0, 1)); // sample 0, bit 1
        assert!(!get_bit(&data, 1, 0, 2)); // sample 0, bit 2
        assert!(get_bit(&data, 1, 0, 3)); // sample 0, bit 3
        assert!(get_bit(&data, 1, 0, 7)); // sample 0, bit 7
        assert!(!get_bit(&data, 1, 1, 0)); // sample 1, bit 0
        assert!(get_bit(&data, 1, 1, 2)); // sample 1, bit 2

        // Two-byte words: bit 10 is bit 2 of the second byte
        assert!(get_bit(&data, 2, 0, 10));
        assert!(!get_bit(&data, 2, 0, 9));

        // Out of bounds
        assert!(!get_bit(&data, 1, 2, 0));
        assert!(!get_bit(&data, 2, 5, 3));
    }

    #[test]
    fn test_decode_matches_shift_and_mask() {
        for byte in [0x00u8, 0x01, 0x5A, 0x80, 0xA5, 0xFF] {
            for k in 0..16 {
                let expected = if (byte >> (k % 8)) & 1 == 1 { '1' } else { '0' };
                // Single-byte words: bit k%8 of the same byte
                assert_eq!(decode_bit(&[byte], 1, 0, k % 8), expected);
                // Two-byte words where both bytes are equal
                assert_eq!(decode_bit(&[byte, byte], 2, 0, k), expected);
            }
        }
    }

    #[test]
    fn test_block_sample_count_ignores_partial_word() {
        let block = LogicBlock::new(vec![0u8; 7], 2).unwrap();
        assert_eq!(block.num_samples(), 3);
        assert_eq!(block.bits_per_sample(), 16);
    }

    #[test]
    fn test_block_rejects_zero_unit_size() {
        let result = LogicBlock::new(vec![1u8, 2, 3], 0);
        assert!(matches!(result, Err(BitsError::ProtocolViolation(_))));
    }

    #[test]
    fn test_split_at() {
        let block = LogicBlock::new(vec![1u8, 2, 3, 4, 5, 6], 2).unwrap();
        let (head, tail) = block.split_at(1);
        assert_eq!(&head.data[..], &[1, 2]);
        assert_eq!(&tail.data[..], &[3, 4, 5, 6]);

        let (head, tail) = block.split_at(10);
        assert_eq!(head.num_samples(), 3);
        assert_eq!(tail.num_samples(), 0);
    }
}
