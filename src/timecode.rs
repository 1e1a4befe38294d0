//! Time-code conversion between floating-point seconds and the textual
//! representations used by each subtitle format.
//!
//! | Format    | Shape          | Precision     |
//! |-----------|----------------|---------------|
//! | `Srt`     | `HH:MM:SS,mmm` | milliseconds  |
//! | `Vtt`     | `HH:MM:SS.mmm` | milliseconds  |
//! | `Ass`     | `H:MM:SS.cc`   | centiseconds  |
//! | `Display` | `MM:SS` or `HH:MM:SS` | seconds |

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimecodeFormat {
    Srt,
    Vtt,
    Ass,
    Display,
}

impl TimecodeFormat {
    /// Separator between whole seconds and the sub-second part.
    pub fn fraction_separator(&self) -> char {
        match self {
            TimecodeFormat::Srt => ',',
            TimecodeFormat::Vtt | TimecodeFormat::Ass | TimecodeFormat::Display => '.',
        }
    }

    /// Smallest time step the format can represent, in seconds.
    pub fn precision(&self) -> f64 {
        match self {
            TimecodeFormat::Srt | TimecodeFormat::Vtt => 0.001,
            TimecodeFormat::Ass => 0.01,
            TimecodeFormat::Display => 1.0,
        }
    }

    pub fn format(&self, seconds: f64) -> String {
        let seconds = sanitize(seconds);

        match self {
            TimecodeFormat::Srt | TimecodeFormat::Vtt => {
                let total_ms = (seconds * 1000.0).round() as u64;
                let (hours, minutes, secs) = split_hms(total_ms / 1000);
                format!(
                    "{:02}:{:02}:{:02}{}{:03}",
                    hours,
                    minutes,
                    secs,
                    self.fraction_separator(),
                    total_ms % 1000
                )
            }
            TimecodeFormat::Ass => {
                let total_cs = (seconds * 100.0).round() as u64;
                let (hours, minutes, secs) = split_hms(total_cs / 100);
                format!("{}:{:02}:{:02}.{:02}", hours, minutes, secs, total_cs % 100)
            }
            TimecodeFormat::Display => {
                let (hours, minutes, secs) = split_hms(seconds.floor() as u64);
                if hours > 0 {
                    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
                } else {
                    format!("{:02}:{:02}", minutes, secs)
                }
            }
        }
    }

    /// Parse a time-code leniently. Either `.` or `,` is accepted as the
    /// sub-second separator, and partial codes (`MM:SS`, `SS.fff`, bare
    /// seconds) are dispatched on their field count. Anything else is read as
    /// a plain float, falling back to zero.
    ///
    /// With three fields the last separator wins: `01:02.50` is always
    /// minutes, seconds and a fraction. Only colon-only codes like `1:02:03`
    /// go through the hours-or-minutes check on field size.
    pub fn parse(&self, code: &str) -> f64 {
        let normalized = code
            .trim()
            .replace(self.fraction_separator(), ".")
            .replace(',', ".");

        let mut fields: Vec<&str> = Vec::new();
        let mut last_separator = None;
        let mut field_start = 0;
        for (i, c) in normalized.char_indices() {
            if c == ':' || c == '.' {
                fields.push(&normalized[field_start..i]);
                last_separator = Some(c);
                field_start = i + c.len_utf8();
            }
        }
        fields.push(&normalized[field_start..]);

        let well_formed = fields
            .iter()
            .all(|f| !f.is_empty() && f.chars().all(|c| c.is_ascii_digit()));
        if !well_formed {
            return parse_bare(&normalized);
        }

        let value = |i: usize| fields[i].parse::<f64>().unwrap_or(0.0);
        let trailing_fraction = last_separator == Some('.');

        let seconds = match fields.len() {
            4 => value(0) * 3600.0 + value(1) * 60.0 + value(2) + fraction(fields[3]),
            3 if trailing_fraction => value(0) * 60.0 + value(1) + fraction(fields[2]),
            3 if value(2) < 60.0 && value(0) < 60.0 => {
                value(0) * 3600.0 + value(1) * 60.0 + value(2)
            }
            3 => value(0) * 60.0 + value(1) + fraction(fields[2]),
            2 if trailing_fraction => value(0) + fraction(fields[1]),
            2 => value(0) * 60.0 + value(1),
            1 => value(0),
            _ => return parse_bare(&normalized),
        };

        sanitize(seconds)
    }
}

/// Render `seconds` as a time-code in the given format. Negative, NaN and
/// infinite input render as zero.
pub fn seconds_to_code(seconds: f64, format: TimecodeFormat) -> String {
    format.format(seconds)
}

pub fn code_to_seconds(code: &str, format: TimecodeFormat) -> f64 {
    format.parse(code)
}

fn sanitize(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

fn split_hms(total_secs: u64) -> (u64, u64, u64) {
    (total_secs / 3600, (total_secs % 3600) / 60, total_secs % 60)
}

/// Digits after the separator read as a decimal fraction, so `500` (ms) and
/// `50` (cs) both mean half a second.
fn fraction(digits: &str) -> f64 {
    format!("0.{}", digits).parse().unwrap_or(0.0)
}

fn parse_bare(text: &str) -> f64 {
    sanitize(text.parse().unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_srt() {
        assert_eq!(seconds_to_code(1.5, TimecodeFormat::Srt), "00:00:01,500");
        assert_eq!(seconds_to_code(3661.123, TimecodeFormat::Srt), "01:01:01,123");
    }

    #[test]
    fn test_format_vtt() {
        assert_eq!(seconds_to_code(1.5, TimecodeFormat::Vtt), "00:00:01.500");
        assert_eq!(seconds_to_code(59.9996, TimecodeFormat::Vtt), "00:01:00.000");
    }

    #[test]
    fn test_format_ass() {
        assert_eq!(seconds_to_code(1.5, TimecodeFormat::Ass), "0:00:01.50");
        assert_eq!(seconds_to_code(3723.456, TimecodeFormat::Ass), "1:02:03.46");
        assert_eq!(seconds_to_code(36000.0, TimecodeFormat::Ass), "10:00:00.00");
    }

    #[test]
    fn test_format_display() {
        assert_eq!(seconds_to_code(65.9, TimecodeFormat::Display), "01:05");
        assert_eq!(seconds_to_code(3725.0, TimecodeFormat::Display), "01:02:05");
    }

    #[test]
    fn test_negative_and_nan_clamp_to_zero() {
        assert_eq!(seconds_to_code(-4.0, TimecodeFormat::Srt), "00:00:00,000");
        assert_eq!(seconds_to_code(f64::NAN, TimecodeFormat::Vtt), "00:00:00.000");
        assert_eq!(seconds_to_code(f64::NAN, TimecodeFormat::Ass), "0:00:00.00");
        assert_eq!(seconds_to_code(-1.0, TimecodeFormat::Display), "00:00");
    }

    #[test]
    fn test_parse_native_codes() {
        assert_eq!(code_to_seconds("00:00:01,500", TimecodeFormat::Srt), 1.5);
        assert_eq!(code_to_seconds("01:01:01.250", TimecodeFormat::Vtt), 3661.25);
        assert_eq!(code_to_seconds("0:00:02.50", TimecodeFormat::Ass), 2.5);
    }

    #[test]
    fn test_parse_accepts_either_separator() {
        assert_eq!(code_to_seconds("00:00:01.500", TimecodeFormat::Srt), 1.5);
        assert_eq!(code_to_seconds("00:00:01,500", TimecodeFormat::Vtt), 1.5);
    }

    #[test]
    fn test_parse_partial_codes() {
        assert_eq!(code_to_seconds("01:05", TimecodeFormat::Display), 65.0);
        assert_eq!(code_to_seconds("01:02.500", TimecodeFormat::Vtt), 62.5);
        assert_eq!(code_to_seconds("00:01:30", TimecodeFormat::Display), 90.0);
        assert_eq!(code_to_seconds("12.25", TimecodeFormat::Vtt), 12.25);
        assert_eq!(code_to_seconds("42", TimecodeFormat::Srt), 42.0);
    }

    #[test]
    fn test_parse_three_colon_fields_with_large_tail() {
        // Third field can't be seconds, so it is read as minutes:seconds:fraction.
        assert_eq!(code_to_seconds("01:30:500", TimecodeFormat::Srt), 90.5);
    }

    #[test]
    fn test_parse_fraction_separator_beats_field_size() {
        assert_eq!(code_to_seconds("01:02.50", TimecodeFormat::Ass), 62.5);
        assert_eq!(code_to_seconds("01:02:03", TimecodeFormat::Ass), 3723.0);
    }

    #[test]
    fn test_parse_malformed_defaults_to_zero() {
        assert_eq!(code_to_seconds("garbage", TimecodeFormat::Srt), 0.0);
        assert_eq!(code_to_seconds("", TimecodeFormat::Vtt), 0.0);
        assert_eq!(code_to_seconds("1:2:3:4:5", TimecodeFormat::Vtt), 0.0);
        assert_eq!(code_to_seconds("-3", TimecodeFormat::Vtt), 0.0);
    }

    #[test]
    fn test_round_trip_within_precision() {
        let formats = [
            TimecodeFormat::Srt,
            TimecodeFormat::Vtt,
            TimecodeFormat::Ass,
            TimecodeFormat::Display,
        ];
        let samples = [0.0, 0.001, 1.5, 59.999, 61.37, 3599.995, 3600.0, 86399.42];

        for format in formats {
            for &x in &samples {
                let back = code_to_seconds(&seconds_to_code(x, format), format);
                assert!(
                    (back - x).abs() <= format.precision() + 1e-9,
                    "{:?}: {} -> {}",
                    format,
                    x,
                    back
                );
            }
        }
    }
}
