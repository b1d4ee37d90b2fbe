//! Indicator drawn as a single status line on stderr.

use std::io::Write;

use sitetime_core::{Indicator, Position};

#[derive(Debug, Default)]
pub struct TerminalIndicator {
    position: Position,
}

impl Indicator for TerminalIndicator {
    fn render(&mut self, text: &str, color: &str) {
        let mut err = std::io::stderr().lock();
        let _ = match hex_rgb(color) {
            Some((r, g, b)) => write!(err, "\r\x1b[97;48;2;{r};{g};{b}m {text} \x1b[0m"),
            None => write!(err, "\r {text} "),
        };
        let _ = err.flush();
    }

    fn position(&self) -> Position {
        self.position
    }

    fn move_to(&mut self, position: Position) {
        self.position = position;
    }
}

/// Parse `#rrggbb`.
fn hex_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
