// SRT subtitle format
use super::{cue_payload, normalize_input, unescape_html, SubtitleFormatter, SubtitleParser};
use crate::caption::{CaptionCollection, CaptionEntry};
use crate::error::Result;
use crate::timecode::TimecodeFormat;
use regex::Regex;
use tracing::warn;

pub struct SrtFormatter;

impl SubtitleFormatter for SrtFormatter {
    fn format(&self, captions: &CaptionCollection) -> String {
        let mut output = String::new();
        let mut index = 0;

        for entry in captions {
            let text = cue_payload(entry.text());
            if text.is_empty() {
                continue;
            }

            index += 1;
            output.push_str(&format!(
                "{}\n{} --> {}\n{}\n\n",
                index,
                TimecodeFormat::Srt.format(entry.start()),
                TimecodeFormat::Srt.format(entry.end()),
                text
            ));
        }

        output.trim_end_matches('\n').to_string()
    }

    fn extension(&self) -> &'static str {
        "srt"
    }

    fn mime_type(&self) -> &'static str {
        "application/x-subrip"
    }
}

pub struct SrtParser;

impl SubtitleParser for SrtParser {
    fn parse(&self, input: &str) -> Result<Vec<CaptionEntry>> {
        let timing_re = Regex::new(
            r"^\s*(\d+:\d{2}:\d{2}[,.]\d{1,3})\s*-->\s*(\d+:\d{2}:\d{2}[,.]\d{1,3})(?:\s|$)",
        )
        .expect("Invalid regex");

        let input = normalize_input(input);
        let mut entries = Vec::new();

        for block in split_blocks(&input) {
            let Some(caps) = block.get(1).and_then(|line| timing_re.captures(line)) else {
                warn!(
                    "Skipping SRT block without a valid timing line: {:?}",
                    block.first().copied().unwrap_or_default()
                );
                continue;
            };

            let start = TimecodeFormat::Srt.parse(&caps[1]);
            let end = TimecodeFormat::Srt.parse(&caps[2]);
            let text = unescape_html(&block[2..].join("\n"));

            entries.push(CaptionEntry::new(start, end, text));
        }

        Ok(entries)
    }
}

/// Group lines into blocks separated by one or more blank lines.
fn split_blocks(input: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in input.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}
