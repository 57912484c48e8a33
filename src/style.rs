//! Candidate styles: space-separated words such as `"bold bright-blue bg-black"`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StyleError {
    #[error("unknown style word '{0}'")]
    UnknownWord(String),
}

/// The eight basic terminal colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    const ALL: [Color; 8] = [
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
        Color::White,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Color::Black => "black",
            Color::Red => "red",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Blue => "blue",
            Color::Magenta => "magenta",
            Color::Cyan => "cyan",
            Color::White => "white",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// A color, optionally in its bright variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shade {
    pub color: Color,
    pub bright: bool,
}

impl Shade {
    fn parse(word: &str) -> Option<Self> {
        match word.strip_prefix("bright-") {
            Some(name) => Color::from_name(name).map(|color| Shade { color, bright: true }),
            None => Color::from_name(word).map(|color| Shade {
                color,
                bright: false,
            }),
        }
    }
}

/// Parsed style. Later words override earlier ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub foreground: Option<Shade>,
    pub background: Option<Shade>,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underlined: bool,
    pub blink: bool,
    pub inverse: bool,
}

impl Style {
    pub fn is_plain(&self) -> bool {
        *self == Style::default()
    }
}

/// Parse a style string. Empty input is the plain style.
pub fn parse(style: &str) -> Result<Style, StyleError> {
    let mut parsed = Style::default();
    for word in style.split_whitespace() {
        if !apply(&mut parsed, word) {
            return Err(StyleError::UnknownWord(word.to_string()));
        }
    }
    Ok(parsed)
}

/// Like [`parse`], but unknown words are skipped.
pub fn parse_lenient(style: &str) -> Style {
    let mut parsed = Style::default();
    for word in style.split_whitespace() {
        apply(&mut parsed, word);
    }
    parsed
}

fn apply(style: &mut Style, word: &str) -> bool {
    match word {
        "bold" => style.bold = true,
        "dim" => style.dim = true,
        "italic" => style.italic = true,
        "underlined" => style.underlined = true,
        "blink" => style.blink = true,
        "inverse" => style.inverse = true,
        _ => {
            if let Some(shade) = word.strip_prefix("bg-").and_then(Shade::parse) {
                style.background = Some(shade);
            } else if let Some(shade) = Shade::parse(word) {
                style.foreground = Some(shade);
            } else {
                return false;
            }
        }
    }
    true
}
