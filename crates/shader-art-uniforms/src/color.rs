/// Converts a `#rrggbb` color to an `[r, g, b]` triplet in `[0, 1]`.
///
/// Only exactly `#` plus six lowercase hex digits is accepted; anything else
/// (uppercase digits, shorthand `#rgb`, alpha, missing `#`) yields black.
pub fn hex_to_rgb(hex: &str) -> [f32; 3] {
    let Some(digits) = hex.strip_prefix('#') else {
        return [0.0; 3];
    };
    if digits.len() != 6 || !digits.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return [0.0; 3];
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16).map_or(0.0, |c| c as f32 / 255.0)
    };
    [channel(0), channel(2), channel(4)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_channels() {
        assert_eq!(hex_to_rgb("#ff00ff"), [1.0, 0.0, 1.0]);
        assert_eq!(hex_to_rgb("#000000"), [0.0, 0.0, 0.0]);
        assert_eq!(hex_to_rgb("#ffffff"), [1.0, 1.0, 1.0]);
        assert_eq!(hex_to_rgb("#336699"), [51.0 / 255.0, 102.0 / 255.0, 153.0 / 255.0]);
    }

    #[test]
    fn every_valid_color_is_in_unit_range() {
        for v in (0u32..=0xff_ffff).step_by(0x01_0f_3b) {
            let rgb = hex_to_rgb(&format!("#{v:06x}"));
            assert!(rgb.iter().all(|c| (0.0..=1.0).contains(c)), "{v:06x} -> {rgb:?}");
        }
    }

    #[test]
    fn malformed_is_black() {
        for s in ["", "#", "ff00ff", "#FF00FF", "#ff00f", "#ff00ff0", "#ff00ffaa", "#fff", "#gg0000", " #ff00ff", "#ff00ff "] {
            assert_eq!(hex_to_rgb(s), [0.0; 3], "{s:?}");
        }
    }
}
