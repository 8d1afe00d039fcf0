use std::fmt;

/// Keys the experiments listen for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Printable key, stored lower-case
    Char(char),
    Space,
    Escape,
}

impl Key {
    pub fn char(c: char) -> Self {
        Key::Char(c.to_ascii_lowercase())
    }

    pub fn is_escape(self) -> bool {
        self == Key::Escape
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{c}"),
            Key::Space => f.write_str("space"),
            Key::Escape => f.write_str("escape"),
        }
    }
}
