//! Fixed color adapter.

use crate::ports::palette::ColorSource;

/// Color source that hands out the same color every time.
#[derive(Debug, Clone)]
pub struct FixedColor(pub String);

impl Default for FixedColor {
    fn default() -> Self {
        Self("ededed".to_string())
    }
}

impl ColorSource for FixedColor {
    fn next_color(&self) -> String {
        self.0.clone()
    }
}
