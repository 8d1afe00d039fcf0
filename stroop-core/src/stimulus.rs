use serde::{Deserialize, Serialize};
use std::fmt;

pub type Rgba = [u8; 4];

pub const WHITE: Rgba = [255, 255, 255, 255];
pub const BLACK: Rgba = [0, 0, 0, 255];
pub const GREY: Rgba = [128, 128, 128, 255];

/// Ink colors judged by the participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InkColor {
    Green,
    Red,
}

impl InkColor {
    pub const ALL: [InkColor; 2] = [InkColor::Green, InkColor::Red];

    pub fn other(self) -> Self {
        match self {
            InkColor::Green => InkColor::Red,
            InkColor::Red => InkColor::Green,
        }
    }

    /// Upper-case color word, as shown for primes and Stroop targets
    pub fn word(self) -> &'static str {
        match self {
            InkColor::Green => "GREEN",
            InkColor::Red => "RED",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            InkColor::Green => "green",
            InkColor::Red => "red",
        }
    }

    pub fn rgba(self) -> Rgba {
        match self {
            InkColor::Green => [0, 128, 0, 255],
            InkColor::Red => [255, 0, 0, 255],
        }
    }
}

impl fmt::Display for InkColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything the display can be asked to show
#[derive(Debug, Clone, PartialEq)]
pub enum Stimulus {
    Blank,
    Fixation {
        size: f32,
        color: Rgba,
    },
    /// Single-line centered text: masks, primes, Stroop words
    Text {
        content: String,
        size: f32,
        color: Rgba,
    },
    /// Filled rectangle centered on screen
    ColorBlock {
        width: f32,
        height: f32,
        color: Rgba,
    },
    /// Multi-line instruction or summary screen, wrapped at `wrap_width`
    Message {
        content: String,
        size: f32,
        wrap_width: f32,
        color: Rgba,
    },
}

impl Stimulus {
    pub fn text(content: impl Into<String>, size: f32, color: Rgba) -> Self {
        Stimulus::Text {
            content: content.into(),
            size,
            color,
        }
    }

    pub fn message(content: impl Into<String>, size: f32, wrap_width: f32) -> Self {
        Stimulus::Message {
            content: content.into(),
            size,
            wrap_width,
            color: WHITE,
        }
    }

    /// Text content, if any
    pub fn content(&self) -> Option<&str> {
        match self {
            Stimulus::Text { content, .. } | Stimulus::Message { content, .. } => Some(content),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_color_flips() {
        assert_eq!(InkColor::Green.other(), InkColor::Red);
        assert_eq!(InkColor::Red.other(), InkColor::Green);
    }

    #[test]
    fn words_are_upper_case_names() {
        for color in InkColor::ALL {
            assert_eq!(color.word(), color.name().to_uppercase());
        }
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&InkColor::Green).unwrap();
        assert_eq!(json, "\"green\"");
        let back: InkColor = serde_json::from_str("\"red\"").unwrap();
        assert_eq!(back, InkColor::Red);
    }

    #[test]
    fn content_only_for_text_stimuli() {
        assert_eq!(Stimulus::text("RED", 60.0, WHITE).content(), Some("RED"));
        assert_eq!(Stimulus::message("hello", 30.0, 800.0).content(), Some("hello"));
        assert_eq!(Stimulus::Blank.content(), None);
    }
}
