/// Fill/stroke style of a layer; `color` is linear RGBA in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayerStyle {
    pub color: [f32; 4],
    pub opacity: f32,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            color: [0.0, 0.0, 1.0, 1.0],
            opacity: 1.0,
        }
    }
}

/// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex_color(s: &str) -> Option<[f32; 4]> {
    let hex = s.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |h: &str| u8::from_str_radix(h, 16).ok().map(|v| v as f32 / 255.0);
    match hex.len() {
        3 => {
            let mut out = [1.0; 4];
            for (i, c) in hex.chars().enumerate() {
                out[i] = channel(&format!("{c}{c}"))?;
            }
            Some(out)
        }
        6 | 8 => {
            let mut out = [1.0; 4];
            for i in 0..hex.len() / 2 {
                out[i] = channel(&hex[2 * i..2 * i + 2])?;
            }
            Some(out)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_hex_color;

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!(parse_hex_color("#fff"), Some([1.0, 1.0, 1.0, 1.0]));
        assert_eq!(parse_hex_color("#ff0000"), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(parse_hex_color(" #00000000 "), Some([0.0, 0.0, 0.0, 0.0]));
        assert_eq!(parse_hex_color("blue"), None);
        assert_eq!(parse_hex_color("#12"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }
}
