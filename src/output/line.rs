//! Per-channel line accumulation

use super::channels::ChannelSpec;

/// Initial capacity of a line; enough for the default width plus separators
const LINE_CAPACITY: usize = 80;

/// In-progress text line for one channel, seeded as `"<name>:"`
#[derive(Debug, Clone)]
pub struct LineBuffer {
    channel: ChannelSpec,
    text: String,
}

impl LineBuffer {
    pub fn new(channel: ChannelSpec) -> Self {
        let mut line = Self {
            channel,
            text: String::with_capacity(LINE_CAPACITY),
        };
        line.reseed();
        line
    }

    pub fn channel(&self) -> &ChannelSpec {
        &self.channel
    }

    /// Current contents, including the name prefix
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn append_bit(&mut self, bit: char) {
        self.text.push(bit);
    }

    /// Append the cosmetic byte-group space
    pub fn append_separator(&mut self) {
        self.text.push(' ');
    }

    /// Hand out the finished line and start a new one
    pub fn flush_and_reset(&mut self) -> String {
        let done = std::mem::replace(&mut self.text, String::with_capacity(LINE_CAPACITY));
        self.reseed();
        done
    }

    fn reseed(&mut self) {
        self.text.push_str(&self.channel.display_name);
        self.text.push(':');
    }
}
