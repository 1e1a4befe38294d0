use crate::error::{CaptionError, Result};
use serde::{Deserialize, Serialize};

/// Vertical placement of captions on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionPosition {
    Top,
    Middle,
    #[default]
    Bottom,
}

/// Caption styling handed to the WebVTT and ASS encoders. The engine only
/// translates it into each format's notation; it never renders anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub font_family: String,
    pub font_size: u32,
    /// Text colour as `#RRGGBB`.
    pub primary_color: String,
    pub outline_color: String,
    pub background_color: String,
    /// Opacity percentages, 0 (transparent) to 100 (opaque).
    pub text_opacity: u8,
    pub background_opacity: u8,
    pub outline_width: f32,
    pub bold: bool,
    pub italic: bool,
    pub position: CaptionPosition,
    /// Distance from the top/bottom edge, in script pixels (ASS only).
    pub margin_vertical: u32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size: 48,
            primary_color: "#FFFFFF".to_string(),
            outline_color: "#000000".to_string(),
            background_color: "#000000".to_string(),
            text_opacity: 100,
            background_opacity: 0,
            outline_width: 2.0,
            bold: false,
            italic: false,
            position: CaptionPosition::Bottom,
            margin_vertical: 40,
        }
    }
}

impl StyleConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, color) in [
            ("primary_color", &self.primary_color),
            ("outline_color", &self.outline_color),
            ("background_color", &self.background_color),
        ] {
            if parse_hex_color(color).is_none() {
                return Err(CaptionError::Config(format!(
                    "{} must be a #RRGGBB colour, got '{}'",
                    name, color
                )));
            }
        }

        if self.text_opacity > 100 || self.background_opacity > 100 {
            return Err(CaptionError::Config(
                "Opacity must be between 0 and 100".to_string(),
            ));
        }

        if self.font_size == 0 {
            return Err(CaptionError::Config(
                "Font size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// WebVTT `STYLE` block applying this style to every cue.
    pub fn vtt_style_block(&self) -> String {
        let (r, g, b) = parse_hex_color(&self.primary_color).unwrap_or((255, 255, 255));
        let (br, bg, bb) = parse_hex_color(&self.background_color).unwrap_or((0, 0, 0));

        let mut block = String::from("STYLE\n::cue {\n");
        block.push_str(&format!("  font-family: {}, sans-serif;\n", self.font_family));
        block.push_str(&format!("  font-size: {}px;\n", self.font_size));
        block.push_str(&format!(
            "  color: rgba({}, {}, {}, {:.2});\n",
            r,
            g,
            b,
            f32::from(self.text_opacity.min(100)) / 100.0
        ));
        block.push_str(&format!(
            "  background-color: rgba({}, {}, {}, {:.2});\n",
            br,
            bg,
            bb,
            f32::from(self.background_opacity.min(100)) / 100.0
        ));
        if self.bold {
            block.push_str("  font-weight: bold;\n");
        }
        if self.italic {
            block.push_str("  font-style: italic;\n");
        }
        block.push_str("}\n\n");
        block
    }

    /// Cue settings appended to every WebVTT timing line. Bottom placement
    /// is the WebVTT default and needs none.
    pub fn vtt_cue_settings(&self) -> &'static str {
        match self.position {
            CaptionPosition::Top => " line:10% align:center",
            CaptionPosition::Middle => " line:50% align:center",
            CaptionPosition::Bottom => "",
        }
    }

    /// Numpad-style ASS alignment (bottom centre 2, middle 5, top 8).
    pub fn ass_alignment(&self) -> u8 {
        match self.position {
            CaptionPosition::Top => 8,
            CaptionPosition::Middle => 5,
            CaptionPosition::Bottom => 2,
        }
    }

    /// The `Style:` line for the ASS `[V4+ Styles]` section.
    pub fn ass_style_line(&self, name: &str) -> String {
        let primary = ass_color(&self.primary_color, self.text_opacity);
        let secondary = ass_color(&self.primary_color, self.text_opacity);
        let outline = ass_color(&self.outline_color, self.text_opacity);
        let back = ass_color(&self.background_color, self.background_opacity);
        // BorderStyle 3 draws an opaque box behind the text.
        let border_style = if self.background_opacity > 0 { 3 } else { 1 };

        format!(
            "Style: {},{},{},{},{},{},{},{},{},0,0,100,100,0,0,{},{},0,{},10,10,{},1",
            name,
            self.font_family,
            self.font_size,
            primary,
            secondary,
            outline,
            back,
            ass_bool(self.bold),
            ass_bool(self.italic),
            border_style,
            self.outline_width,
            self.ass_alignment(),
            self.margin_vertical
        )
    }
}

fn ass_bool(flag: bool) -> i8 {
    if flag {
        -1
    } else {
        0
    }
}

/// Parse `#RRGGBB` (leading `#` optional).
pub fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Convert `#RRGGBB` plus an opacity percentage to ASS `&HAABBGGRR`
/// notation, where alpha 00 is opaque and FF fully transparent.
pub fn ass_color(color: &str, opacity_percent: u8) -> String {
    let (r, g, b) = parse_hex_color(color).unwrap_or((255, 255, 255));
    let opacity = f64::from(opacity_percent.min(100));
    let alpha = ((100.0 - opacity) * 2.55).round() as u8;
    format!("&H{:02X}{:02X}{:02X}{:02X}", alpha, b, g, r)
}
