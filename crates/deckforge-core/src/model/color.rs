use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Color {
    #[serde(rename = "W")]
    White = 0,
    #[serde(rename = "U")]
    Blue = 1,
    #[serde(rename = "B")]
    Black = 2,
    #[serde(rename = "R")]
    Red = 3,
    #[serde(rename = "G")]
    Green = 4,
}

impl Color {
    pub const ALL: [Color; 5] = [
        Color::White,
        Color::Blue,
        Color::Black,
        Color::Red,
        Color::Green,
    ];

    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'W' | 'w' => Some(Color::White),
            'U' | 'u' => Some(Color::Blue),
            'B' | 'b' => Some(Color::Black),
            'R' | 'r' => Some(Color::Red),
            'G' | 'g' => Some(Color::Green),
            _ => None,
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            Color::White => 'W',
            Color::Blue => 'U',
            Color::Black => 'B',
            Color::Red => 'R',
            Color::Green => 'G',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Parses a compact identity string such as `"BG"` into colors, ignoring
/// unknown symbols.
pub fn parse_identity(raw: &str) -> Vec<Color> {
    let mut colors: Vec<Color> = raw.chars().filter_map(Color::from_symbol).collect();
    colors.sort();
    colors.dedup();
    colors
}

#[cfg(test)]
mod tests {
    use super::{Color, parse_identity};

    #[test]
    fn display_uses_wubrg_symbols() {
        assert_eq!(Color::Blue.to_string(), "U");
        assert_eq!(Color::Green.to_string(), "G");
    }

    #[test]
    fn identity_parsing_sorts_and_dedups() {
        assert_eq!(parse_identity("gbxG"), vec![Color::Black, Color::Green]);
        assert!(parse_identity("").is_empty());
    }
}
