use std::time::Duration;

use crate::signal::DEFAULT_SIGNAL_CAPACITY;
use crate::surface::Color;

/// Per-scene settings.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Maximum delay between two presses of a double click.
    pub double_click: Duration,
    /// Maximum delay between the first and third press of a triple click.
    pub triple_click: Duration,
    /// Compositor ticks per second.
    pub frame_rate: u32,
    /// Background of the root container.
    pub background: Color,
    /// Tab and arrow keys move focus when the focused widget ignores them.
    pub focus_keys: bool,
    /// Signals kept before the oldest are dropped.
    pub signal_capacity: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            double_click: Duration::from_millis(500),
            triple_click: Duration::from_secs(1),
            frame_rate: 60,
            background: Color::WHITE,
            focus_keys: true,
            signal_capacity: DEFAULT_SIGNAL_CAPACITY,
        }
    }
}

impl SceneConfig {
    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate.max(1);
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_click_thresholds(mut self, double_click: Duration, triple_click: Duration) -> Self {
        self.double_click = double_click;
        self.triple_click = triple_click;
        self
    }

    pub fn with_focus_keys(mut self, enabled: bool) -> Self {
        self.focus_keys = enabled;
        self
    }

    pub fn with_signal_capacity(mut self, capacity: usize) -> Self {
        self.signal_capacity = capacity.max(1);
        self
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_interval() {
        let config = SceneConfig::default().with_frame_rate(50);
        assert_eq!(config.frame_interval(), Duration::from_millis(20));
        assert_eq!(SceneConfig::default().with_frame_rate(0).frame_rate, 1);
    }
}
