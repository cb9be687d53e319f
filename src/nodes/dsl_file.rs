//! DSL capture reader
//!
//! Provides `DslCapture` - reads DSLogic .dsl capture files and replays them as a
//! packet stream of interleaved logic samples.
//!
//! A .dsl file is a ZIP archive holding a `header` text entry plus one packed bit
//! stream per probe and block, named `L-<probe>/<block>` (LSB-first). The reader
//! loads one block number at a time and packs the enabled probes into sample words
//! of `ceil(total_probes / 8)` bytes, probe `n` at bit `n`.

use crate::output::header::parse_samplerate;
use crate::output::{Channel, DeviceInfo};
use crate::runtime::sample::{LogicBlock, Packet, get_bit};
use crate::{BitsError, Result};
use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::{debug, info, warn};
use zip::ZipArchive;

/// Header information from a DSL file
#[derive(Debug, Clone)]
pub struct DslHeader {
    /// Total number of probes/channels
    pub total_probes: usize,
    /// Sample rate as a string (e.g., "50 MHz")
    pub samplerate: String,
    /// Sample rate in Hz
    pub samplerate_hz: f64,
    /// Total number of samples captured
    pub total_samples: u64,
    /// Total number of data blocks
    pub total_blocks: u64,
    /// Samples per block (calculated)
    pub samples_per_block: u64,
    /// Probe names indexed by probe number (0-based)
    pub probe_names: Vec<String>,
}

/// Reader for a DSLogic .dsl capture
///
/// # Example
/// ```ignore
/// let mut capture = DslCapture::open("capture.dsl")?.with_enabled_channels(&[0, 3]);
/// let device = capture.device_info();
/// for packet in capture.packets() {
///     // feed packet? into an output
/// }
/// ```
pub struct DslCapture<R = File> {
    archive: ZipArchive<R>,
    header: DslHeader,
    enabled: Vec<bool>,
    max_samples: Option<u64>,
    trigger_at: Option<u64>,
}

impl DslCapture<File> {
    /// Open a capture from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }
}

impl<R: Read + Seek> DslCapture<R> {
    /// Open a capture from any seekable reader
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let header = Self::parse_header(&mut archive)?;

        info!(
            "Opened capture: {} probes, {} samples at {}",
            header.total_probes, header.total_samples, header.samplerate
        );

        Ok(Self {
            archive,
            enabled: vec![true; header.total_probes],
            header,
            max_samples: None,
            trigger_at: None,
        })
    }

    fn parse_header(archive: &mut ZipArchive<R>) -> Result<DslHeader> {
        let mut header_file = archive
            .by_name("header")
            .map_err(|e| BitsError::ParseHeader(format!("Cannot find header file: {}", e)))?;

        let mut header_content = String::new();
        header_file.read_to_string(&mut header_content)?;
        drop(header_file);

        let mut total_probes: Option<usize> = None;
        let mut samplerate: Option<String> = None;
        let mut total_samples: Option<u64> = None;
        let mut total_blocks: Option<u64> = None;
        let mut probe_names_map: HashMap<usize, String> = HashMap::new();

        for line in header_content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(value) = line.strip_prefix("total probes = ") {
                total_probes = value.parse().ok();
            } else if let Some(value) = line.strip_prefix("samplerate = ") {
                samplerate = Some(value.to_string());
            } else if let Some(value) = line.strip_prefix("total samples = ") {
                total_samples = value.parse().ok();
            } else if let Some(value) = line.strip_prefix("total blocks = ") {
                total_blocks = value.parse().ok();
            } else if line.starts_with("probe")
                && let Some((probe_part, name)) = line.split_once(" = ")
                && let Some(num_str) = probe_part.strip_prefix("probe")
                && let Ok(probe_num) = num_str.parse::<usize>()
            {
                probe_names_map.insert(probe_num, name.to_string());
            }
        }

        let total_probes =
            total_probes.ok_or_else(|| BitsError::MissingField("total probes".to_string()))?;
        let samplerate =
            samplerate.ok_or_else(|| BitsError::MissingField("samplerate".to_string()))?;
        let total_samples =
            total_samples.ok_or_else(|| BitsError::MissingField("total samples".to_string()))?;
        let total_blocks =
            total_blocks.ok_or_else(|| BitsError::MissingField("total blocks".to_string()))?;

        let samplerate_hz = parse_samplerate(&samplerate)
            .ok_or_else(|| BitsError::ParseHeader(format!("Invalid sample rate: {}", samplerate)))?;

        // Blocks are fixed-size except the last, so the first one gives the block size
        let samples_per_block = {
            let mut file = archive
                .by_name("L-0/0")
                .map_err(|_| BitsError::ParseHeader("Could not read first block".to_string()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf).map_err(|_| {
                BitsError::ParseHeader("Could not read first block data".to_string())
            })?;
            (buf.len() * 8) as u64
        };

        if samples_per_block == 0 {
            return Err(BitsError::ParseHeader("First block is empty".to_string()));
        }

        debug!(
            "File has {} samples across {} blocks ({} samples/block standard size)",
            total_samples, total_blocks, samples_per_block
        );

        let probe_names = (0..total_probes)
            .map(|i| {
                probe_names_map
                    .get(&i)
                    .cloned()
                    .unwrap_or_else(|| format!("Probe{}", i))
            })
            .collect();

        Ok(DslHeader {
            total_probes,
            samplerate,
            samplerate_hz,
            total_samples,
            total_blocks,
            samples_per_block,
            probe_names,
        })
    }

    /// Get the header information
    pub fn header(&self) -> &DslHeader {
        &self.header
    }

    /// Only read the listed probes; all others are reported as disabled
    pub fn with_enabled_channels(mut self, channels: &[usize]) -> Self {
        for &probe in channels.iter().filter(|&&p| p >= self.header.total_probes) {
            warn!(
                "Probe {} does not exist (capture has {} probes), ignoring",
                probe, self.header.total_probes
            );
        }
        for (probe, enabled) in self.enabled.iter_mut().enumerate() {
            *enabled = channels.contains(&probe);
        }
        self
    }

    /// Set maximum number of samples to read from file
    pub fn with_max_samples(mut self, max_samples: Option<u64>) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Emit a trigger packet right before the given sample
    pub fn with_trigger_at(mut self, position: Option<u64>) -> Self {
        self.trigger_at = position;
        self
    }

    /// Bytes per interleaved sample word
    pub fn unit_size(&self) -> usize {
        self.header.total_probes.div_ceil(8).max(1)
    }

    /// Number of samples the packet stream will cover
    pub fn total_samples(&self) -> u64 {
        self.max_samples
            .unwrap_or(self.header.total_samples)
            .min(self.header.total_samples)
    }

    /// Channel metadata for setting up an output
    pub fn device_info(&self) -> DeviceInfo {
        let channels = self
            .header
            .probe_names
            .iter()
            .enumerate()
            .map(|(probe, name)| Channel::logic(probe, name.clone()).with_enabled(self.enabled[probe]))
            .collect();

        DeviceInfo::new(channels).with_samplerate(self.header.samplerate_hz.round() as u64)
    }

    /// Read one block number across all enabled probes as interleaved words.
    ///
    /// Returns `None` past the end of the capture.
    pub fn read_block(&mut self, block_num: u64) -> Result<Option<LogicBlock>> {
        let total_samples = self.total_samples();
        let block_start = block_num * self.header.samples_per_block;
        if block_num >= self.header.total_blocks || block_start >= total_samples {
            return Ok(None);
        }

        let mut num_samples = self
            .header
            .samples_per_block
            .min(total_samples - block_start) as usize;

        let enabled: Vec<usize> = (0..self.header.total_probes)
            .filter(|&p| self.enabled[p])
            .collect();

        let mut probes = Vec::new();
        for probe in enabled {
            let block_name = format!("L-{}/{}", probe, block_num);
            let mut file = self
                .archive
                .by_name(&block_name)
                .map_err(|_| BitsError::InvalidBlock(block_num))?;
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;

            // The last block may be shorter than the standard size
            num_samples = num_samples.min(data.len() * 8);
            probes.push((probe, data));
        }

        if num_samples == 0 {
            return Ok(None);
        }

        let unit_size = self.unit_size();
        let mut words = vec![0u8; num_samples * unit_size];
        for (probe, data) in &probes {
            for sample in 0..num_samples {
                if get_bit(data, 1, sample / 8, sample % 8) {
                    words[sample * unit_size + probe / 8] |= 1 << (probe % 8);
                }
            }
        }

        debug!(
            "Block {}: {} samples from {} probes",
            block_num,
            num_samples,
            probes.len()
        );

        LogicBlock::new(words, unit_size).map(Some)
    }

    /// Replay the capture as packets, finishing with [`Packet::End`]
    pub fn packets(&mut self) -> Packets<'_, R> {
        if let Some(position) = self.trigger_at
            && position >= self.total_samples()
        {
            warn!(
                "Trigger position {} is past the last sample ({}), ignoring",
                position,
                self.total_samples()
            );
        }

        Packets {
            capture: self,
            next_block: 0,
            pending: VecDeque::new(),
            done: false,
        }
    }
}

/// Iterator over the packets of a capture
pub struct Packets<'a, R> {
    capture: &'a mut DslCapture<R>,
    next_block: u64,
    pending: VecDeque<Packet>,
    done: bool,
}

impl<R: Read + Seek> Packets<'_, R> {
    fn queue_block(&mut self, block_start: u64, block: LogicBlock) {
        let block_end = block_start + block.num_samples() as u64;

        match self.capture.trigger_at {
            Some(position) if (block_start..block_end).contains(&position) => {
                let (head, tail) = block.split_at((position - block_start) as usize);
                if head.num_samples() > 0 {
                    self.pending.push_back(Packet::Logic(head));
                }
                self.pending.push_back(Packet::Trigger);
                if tail.num_samples() > 0 {
                    self.pending.push_back(Packet::Logic(tail));
                }
            }
            _ => self.pending.push_back(Packet::Logic(block)),
        }
    }
}

impl<R: Read + Seek> Iterator for Packets<'_, R> {
    type Item = Result<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(packet) = self.pending.pop_front() {
            return Some(Ok(packet));
        }
        if self.done {
            return None;
        }

        let block_num = self.next_block;
        match self.capture.read_block(block_num) {
            Ok(Some(block)) => {
                self.next_block += 1;
                let block_start = block_num * self.capture.header.samples_per_block;
                self.queue_block(block_start, block);
                self.pending.pop_front().map(Ok)
            }
            Ok(None) => {
                self.done = true;
                Some(Ok(Packet::End))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
