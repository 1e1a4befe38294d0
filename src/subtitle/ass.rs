// Advanced SubStation Alpha format (export only)
use super::{StyleConfig, SubtitleFormatter};
use crate::caption::CaptionCollection;
use crate::timecode::TimecodeFormat;

const STYLE_NAME: &str = "Default";

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, \
BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

const EVENT_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

pub struct AssFormatter {
    pub style: StyleConfig,
    pub title: String,
    pub play_res: (u32, u32),
}

impl Default for AssFormatter {
    fn default() -> Self {
        Self {
            style: StyleConfig::default(),
            title: "Captions".to_string(),
            play_res: (1920, 1080),
        }
    }
}

impl AssFormatter {
    pub fn with_style(style: StyleConfig) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    fn header(&self) -> String {
        format!(
            "[Script Info]\n\
             Title: {}\n\
             ScriptType: v4.00+\n\
             WrapStyle: 0\n\
             ScaledBorderAndShadow: yes\n\
             PlayResX: {}\n\
             PlayResY: {}\n\
             \n\
             [V4+ Styles]\n\
             {}\n\
             {}\n\
             \n\
             [Events]\n\
             {}\n",
            self.title,
            self.play_res.0,
            self.play_res.1,
            STYLE_FORMAT,
            self.style.ass_style_line(STYLE_NAME),
            EVENT_FORMAT
        )
    }
}

impl SubtitleFormatter for AssFormatter {
    fn format(&self, captions: &CaptionCollection) -> String {
        let mut output = self.header();

        for entry in captions {
            let text = escape_ass(entry.text());
            if text.is_empty() {
                continue;
            }

            output.push_str(&format!(
                "Dialogue: 0,{},{},{},,0,0,0,,{}\n",
                TimecodeFormat::Ass.format(entry.start()),
                TimecodeFormat::Ass.format(entry.end()),
                STYLE_NAME,
                text
            ));
        }

        output
    }

    fn extension(&self) -> &'static str {
        "ass"
    }

    fn mime_type(&self) -> &'static str {
        "text/plain"
    }
}

/// Escape literal braces (which would otherwise open override blocks) and
/// turn line breaks into `\N`.
fn escape_ass(text: &str) -> String {
    text.trim()
        .lines()
        .map(|line| line.trim_end().replace('{', "\\{").replace('}', "\\}"))
        .collect::<Vec<_>>()
        .join("\\N")
}
