//! One-shot output preamble and samplerate formatting

const UNITS: [(u64, &str); 4] = [
    (1_000_000_000, "GHz"),
    (1_000_000, "MHz"),
    (1_000, "kHz"),
    (1, "Hz"),
];

/// Program identity line printed at the top of every capture
pub fn program_identity() -> String {
    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Build the header text.
///
/// The acquisition line is only present when the samplerate is known.
pub fn build_header(
    identity: &str,
    enabled_channels: usize,
    total_channels: usize,
    samplerate: Option<u64>,
) -> String {
    let mut header = String::with_capacity(512);
    header.push_str(identity);
    header.push('\n');

    if let Some(rate) = samplerate {
        header.push_str(&format!(
            "Acquisition with {}/{} channels at {}\n",
            enabled_channels,
            total_channels,
            samplerate_string(rate)
        ));
    }

    header
}

/// Render a sample rate as e.g. `"50 MHz"` or `"2.5 kHz"`.
///
/// Uses the largest unit not exceeding the rate and never rounds.
pub fn samplerate_string(hz: u64) -> String {
    let (divisor, unit) = UNITS
        .iter()
        .copied()
        .find(|(divisor, _)| hz >= *divisor)
        .unwrap_or((1, "Hz"));

    if hz % divisor == 0 {
        return format!("{} {}", hz / divisor, unit);
    }

    // Exact fraction, zero padded to the unit's digit count
    let digits = divisor.ilog10() as usize;
    let fraction = format!("{:0digits$}", hz % divisor, digits = digits);
    format!("{}.{} {}", hz / divisor, fraction.trim_end_matches('0'), unit)
}

/// Parse a sample rate string (e.g., "50 MHz") into Hz
pub fn parse_samplerate(samplerate: &str) -> Option<f64> {
    let parts: Vec<&str> = samplerate.split_whitespace().collect();
    if parts.len() >= 2
        && let Ok(value) = parts[0].parse::<f64>()
    {
        let multiplier = match parts[1] {
            "GHz" => 1_000_000_000.0,
            "MHz" => 1_000_000.0,
            "KHz" | "kHz" => 1_000.0,
            "Hz" => 1.0,
            _ => return None,
        };
        return Some(value * multiplier);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samplerate_string() {
        assert_eq!(samplerate_string(0), "0 Hz");
        assert_eq!(samplerate_string(200), "200 Hz");
        assert_eq!(samplerate_string(1_000), "1 kHz");
        assert_eq!(samplerate_string(2_500), "2.5 kHz");
        assert_eq!(samplerate_string(50_000_000), "50 MHz");
        assert_eq!(samplerate_string(2_500_000), "2.5 MHz");
        assert_eq!(samplerate_string(1_000_000_000), "1 GHz");
        assert_eq!(samplerate_string(1_234_567), "1.234567 MHz");
    }

    #[test]
    fn test_samplerate_string_keeps_full_precision() {
        assert_eq!(samplerate_string(1_000_001), "1.000001 MHz");
        assert_eq!(samplerate_string(999_999_999), "999.999999 MHz");
        assert_eq!(samplerate_string(1_050), "1.05 kHz");
        assert_eq!(samplerate_string(2_000_000_001), "2.000000001 GHz");
    }

    #[test]
    fn test_parse_samplerate_valid() {
        assert_eq!(parse_samplerate("50 MHz"), Some(50_000_000.0));
        assert_eq!(parse_samplerate("1 GHz"), Some(1_000_000_000.0));
        assert_eq!(parse_samplerate("100 kHz"), Some(100_000.0));
        assert_eq!(parse_samplerate("100 KHz"), Some(100_000.0));
        assert_eq!(parse_samplerate("1000 Hz"), Some(1000.0));
        assert_eq!(parse_samplerate("2.5 MHz"), Some(2_500_000.0));
    }

    #[test]
    fn test_parse_samplerate_invalid() {
        assert_eq!(parse_samplerate("invalid"), None);
        assert_eq!(parse_samplerate("50"), None);
        assert_eq!(parse_samplerate("MHz 50"), None);
        assert_eq!(parse_samplerate("50 mhz"), None);
        assert_eq!(parse_samplerate(""), None);
    }

    #[test]
    fn test_build_header() {
        assert_eq!(build_header("dsl-bits 0.1.0", 2, 16, None), "dsl-bits 0.1.0\n");
        assert_eq!(
            build_header("dsl-bits 0.1.0", 2, 16, Some(1_000_000)),
            "dsl-bits 0.1.0\nAcquisition with 2/16 channels at 1 MHz\n"
        );
    }
}
