//! On-page indicator interface.
//!
//! The indicator shows elapsed time and a background color for the timer
//! state. Pointer tracking and drawing belong to the host; the controller
//! only renders into it, moves it, and reads back where the user left it.

use crate::storage::{IndicatorConfig, Position};
use crate::timer::TimerState;

pub trait Indicator {
    fn render(&mut self, text: &str, color: &str);
    fn position(&self) -> Position;
    fn move_to(&mut self, position: Position);
}

/// Background colors per state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorPalette {
    pub running: String,
    pub paused: String,
    pub expired: String,
}

impl Default for IndicatorPalette {
    fn default() -> Self {
        Self::from(&IndicatorConfig::default())
    }
}

impl From<&IndicatorConfig> for IndicatorPalette {
    fn from(config: &IndicatorConfig) -> Self {
        Self {
            running: config.running_color.clone(),
            paused: config.paused_color.clone(),
            expired: config.expired_color.clone(),
        }
    }
}

impl IndicatorPalette {
    /// An expired timer keeps the expired color even while paused.
    pub fn color(&self, state: TimerState, expired: bool) -> &str {
        if expired {
            return &self.expired;
        }
        match state {
            TimerState::Running => &self.running,
            TimerState::Paused => &self.paused,
            TimerState::Expired => &self.expired,
        }
    }
}

/// Indicator that only remembers what it was asked to show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadlessIndicator {
    pub text: String,
    pub color: String,
    pub position: Position,
    pub renders: usize,
}

impl HeadlessIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the user dragging the indicator.
    pub fn drag_to(&mut self, position: Position) {
        self.position = position;
    }
}

impl Indicator for HeadlessIndicator {
    fn render(&mut self, text: &str, color: &str) {
        self.text = text.to_string();
        self.color = color.to_string();
        self.renders += 1;
    }

    fn position(&self) -> Position {
        self.position
    }

    fn move_to(&mut self, position: Position) {
        self.position = position;
    }
}

impl<I: Indicator + ?Sized> Indicator for Box<I> {
    fn render(&mut self, text: &str, color: &str) {
        (**self).render(text, color)
    }

    fn position(&self) -> Position {
        (**self).position()
    }

    fn move_to(&mut self, position: Position) {
        (**self).move_to(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_keeps_expired_color_while_paused() {
        let palette = IndicatorPalette::default();
        assert_eq!(palette.color(TimerState::Running, false), "#1a5fb4");
        assert_eq!(palette.color(TimerState::Paused, false), "#e5a50a");
        assert_eq!(palette.color(TimerState::Paused, true), "#a51d2d");
        assert_eq!(palette.color(TimerState::Expired, true), "#a51d2d");
    }
}
