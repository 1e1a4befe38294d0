pub mod ass;
pub mod json;
pub mod srt;
pub mod style;
pub mod vtt;

pub use style::{CaptionPosition, StyleConfig};

use crate::caption::{CaptionCollection, CaptionEntry};
use crate::config::OutputFormat;
use crate::error::{CaptionError, Result};

/// Serializes a caption collection into one interchange format. Captions are
/// written in start order and numbered from 1 regardless of their ids.
pub trait SubtitleFormatter {
    fn format(&self, captions: &CaptionCollection) -> String;
    fn extension(&self) -> &'static str;
    fn mime_type(&self) -> &'static str;
}

/// Parses one interchange format back into caption entries. Malformed cues
/// are skipped; only a payload missing its required structure is an error.
pub trait SubtitleParser {
    fn parse(&self, input: &str) -> Result<Vec<CaptionEntry>>;
}

/// Without a style, WebVTT gets no `STYLE` block or cue settings and ASS
/// falls back to the default style.
pub fn create_formatter(
    format: OutputFormat,
    style: Option<&StyleConfig>,
) -> Box<dyn SubtitleFormatter> {
    match format {
        OutputFormat::Srt => Box::new(srt::SrtFormatter),
        OutputFormat::Vtt => Box::new(vtt::VttFormatter {
            style: style.cloned(),
        }),
        OutputFormat::Ass => Box::new(ass::AssFormatter::with_style(
            style.cloned().unwrap_or_default(),
        )),
        OutputFormat::Json => Box::new(json::JsonFormatter::default()),
    }
}

/// ASS is export-only, so asking for its parser is an error.
pub fn create_parser(format: OutputFormat) -> Result<Box<dyn SubtitleParser>> {
    match format {
        OutputFormat::Srt => Ok(Box::new(srt::SrtParser)),
        OutputFormat::Vtt => Ok(Box::new(vtt::VttParser)),
        OutputFormat::Json => Ok(Box::new(json::JsonParser)),
        OutputFormat::Ass => Err(CaptionError::UnsupportedFormat(
            "ASS subtitles can be exported but not imported".to_string(),
        )),
    }
}

/// Serialized subtitles plus what a caller needs to save or serve them.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedSubtitles {
    pub content: String,
    pub mime_type: &'static str,
    pub extension: &'static str,
}

pub fn export(
    captions: &CaptionCollection,
    format: OutputFormat,
    style: Option<&StyleConfig>,
) -> ExportedSubtitles {
    let formatter = create_formatter(format, style);
    ExportedSubtitles {
        content: formatter.format(captions),
        mime_type: formatter.mime_type(),
        extension: formatter.extension(),
    }
}

pub fn import(input: &str, format: OutputFormat) -> Result<Vec<CaptionEntry>> {
    create_parser(format)?.parse(input)
}

/// Entity-escape `& < >` for SRT and WebVTT payloads.
pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub(crate) fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Caption text prepared for a blank-line-delimited format: escaped, with
/// line endings normalised and empty lines removed so they cannot end the
/// cue early.
pub(crate) fn cue_payload(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(escape_html)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Normalise line endings and strip a UTF-8 byte-order mark.
pub(crate) fn normalize_input(input: &str) -> String {
    input
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_round_trip() {
        let text = "Tom & Jerry <3 >_<";
        let escaped = escape_html(text);
        assert_eq!(escaped, "Tom &amp; Jerry &lt;3 &gt;_&lt;");
        assert_eq!(unescape_html(&escaped), text);
        assert_eq!(unescape_html("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_cue_payload_drops_blank_lines() {
        assert_eq!(cue_payload("one\n\n  \ntwo  \r\n"), "one\ntwo");
    }

    #[test]
    fn test_normalize_input() {
        assert_eq!(normalize_input("\u{feff}a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_create_formatter_factory() {
        let style = StyleConfig::default();
        for format in [
            OutputFormat::Srt,
            OutputFormat::Vtt,
            OutputFormat::Ass,
            OutputFormat::Json,
        ] {
            let formatter = create_formatter(format, Some(&style));
            assert_eq!(formatter.extension(), format.extension());
            assert_eq!(formatter.mime_type(), format.mime_type());
        }
    }

    #[test]
    fn test_vtt_style_is_optional() {
        let (captions, _) = CaptionCollection::from_entries(
            vec![CaptionEntry::new(0.0, 1.0, "a")],
            &crate::caption::EditPolicy::default(),
        );

        let plain = export(&captions, OutputFormat::Vtt, None);
        assert_eq!(plain.content, "WEBVTT\n\n1\n00:00:00.000 --> 00:00:01.000\na\n\n");

        let styled = export(&captions, OutputFormat::Vtt, Some(&StyleConfig::default()));
        assert!(styled.content.starts_with("WEBVTT\n\nSTYLE\n::cue {\n"));
        assert!(styled
            .content
            .ends_with("}\n\n1\n00:00:00.000 --> 00:00:01.000\na\n\n"));
    }

    #[test]
    fn test_ass_has_no_parser() {
        assert!(matches!(
            create_parser(OutputFormat::Ass),
            Err(CaptionError::UnsupportedFormat(_))
        ));
        assert!(create_parser(OutputFormat::Srt).is_ok());
    }
}
