//! Live adapter for the `ColorSource` port.

use uuid::Uuid;

use crate::ports::ColorSource;

/// Picks a random label color from the bytes of a v4 UUID.
pub struct RandomColor;

impl ColorSource for RandomColor {
    fn next_color(&self) -> String {
        let bytes = Uuid::new_v4().into_bytes();
        format!("{:02x}{:02x}{:02x}", bytes[0], bytes[1], bytes[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_six_hex_digits() {
        for _ in 0..32 {
            let color = RandomColor.next_color();
            assert_eq!(color.len(), 6);
            assert!(color.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
        }
    }
}
