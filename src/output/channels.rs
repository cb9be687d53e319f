//! Device channel metadata and logic channel selection

use super::options::ConfigError;

/// Kind of signal a channel carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Logic,
    Analog,
}

/// A channel as reported by the acquisition side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// Bit position within a packed sample word
    pub index: usize,
    pub name: String,
    pub kind: ChannelKind,
    pub enabled: bool,
}

impl Channel {
    /// Create an enabled logic channel
    pub fn logic(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            kind: ChannelKind::Logic,
            enabled: true,
        }
    }

    /// Set the enabled flag (builder pattern)
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// What the output session knows about the device it renders for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    /// All channels in enumeration order
    pub channels: Vec<Channel>,
    /// Sample rate in Hz, if the device reports one
    pub samplerate: Option<u64>,
}

impl DeviceInfo {
    pub fn new(channels: Vec<Channel>) -> Self {
        Self {
            channels,
            samplerate: None,
        }
    }

    pub fn with_samplerate(mut self, samplerate: u64) -> Self {
        self.samplerate = Some(samplerate);
        self
    }
}

/// A channel selected for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSpec {
    pub bit_index: usize,
    pub display_name: String,
}

/// Pick the enabled logic channels, keeping their enumeration order.
///
/// With `require_any` set, an empty selection is a configuration error.
pub fn select_logic_channels(
    channels: &[Channel],
    require_any: bool,
) -> Result<Vec<ChannelSpec>, ConfigError> {
    let selected: Vec<ChannelSpec> = channels
        .iter()
        .filter(|ch| ch.kind == ChannelKind::Logic && ch.enabled)
        .map(|ch| ChannelSpec {
            bit_index: ch.index,
            display_name: ch.name.clone(),
        })
        .collect();

    if require_any && selected.is_empty() {
        return Err(ConfigError::NoChannels);
    }

    Ok(selected)
}
