//! 8-bit RGBA color with an explicit premultiplied-alpha flag (§3).
//!
//! Invariant: when `premultiplied` is `true`, `r <= a && g <= a && b <= a`.
//! The flag exists purely to prevent double-premultiplication as a color
//! value moves between symbolizer property evaluation (always straight
//! alpha) and the rasterizer/compositor (always premultiplied).

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
    pub premultiplied: bool,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r,
            g,
            b,
            a: 255,
            premultiplied: false,
        }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r,
            g,
            b,
            a,
            premultiplied: false,
        }
    }

    pub const TRANSPARENT: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
        premultiplied: false,
    };

    /// Converts to premultiplied form. Idempotent: calling this on an
    /// already-premultiplied color is a no-op (§8 property 9).
    pub fn premultiply(self) -> Color {
        if self.premultiplied {
            return self;
        }
        let a = self.a as f32 / 255.0;
        Color {
            r: (self.r as f32 * a).round() as u8,
            g: (self.g as f32 * a).round() as u8,
            b: (self.b as f32 * a).round() as u8,
            a: self.a,
            premultiplied: true,
        }
    }

    /// Converts to straight-alpha form. Idempotent (§8 property 9).
    pub fn demultiply(self) -> Color {
        if !self.premultiplied {
            return self;
        }
        if self.a == 0 {
            return Color {
                r: 0,
                g: 0,
                b: 0,
                a: 0,
                premultiplied: false,
            };
        }
        let a = self.a as f32 / 255.0;
        Color {
            r: ((self.r as f32 / a).round().clamp(0.0, 255.0)) as u8,
            g: ((self.g as f32 / a).round().clamp(0.0, 255.0)) as u8,
            b: ((self.b as f32 / a).round().clamp(0.0, 255.0)) as u8,
            a: self.a,
            premultiplied: false,
        }
    }

    pub fn with_opacity(self, opacity: f64) -> Color {
        let o = opacity.clamp(0.0, 1.0);
        let a = (self.a as f64 * o).round().clamp(0.0, 255.0) as u8;
        Color { a, ..self }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("empty color literal")]
    Empty,
    #[error("unknown color literal: {0}")]
    Unrecognized(String),
    #[error("malformed hex color: {0}")]
    BadHex(String),
    #[error("malformed rgb()/rgba() function: {0}")]
    BadFunction(String),
}

/// Parses a CSS-style color literal: `#rgb`, `#rrggbb`, `rgb(r,g,b)`,
/// `rgba(r,g,b,a)`, or one of a small set of named colors. Grounded on
/// `mapnik`'s `css_color_parser`/`color_factory`, reimplemented without the
/// boost::spirit grammar dependency.
pub fn parse_css_color(input: &str) -> Result<Color, ColorParseError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(ColorParseError::Empty);
    }
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(inner) = s.strip_prefix("rgba(").and_then(|s| s.strip_suffix(')')) {
        return parse_rgba_function(inner, true);
    }
    if let Some(inner) = s.strip_prefix("rgb(").and_then(|s| s.strip_suffix(')')) {
        return parse_rgba_function(inner, false);
    }
    named_color(s).ok_or_else(|| ColorParseError::Unrecognized(s.to_string()))
}

fn parse_hex(hex: &str) -> Result<Color, ColorParseError> {
    let expand = |c: u8| -> u8 { c * 16 + c };
    match hex.len() {
        3 => {
            let nibbles = hex_nibbles(hex).ok_or_else(|| ColorParseError::BadHex(hex.to_string()))?;
            Ok(Color::rgb(
                expand(nibbles[0]),
                expand(nibbles[1]),
                expand(nibbles[2]),
            ))
        }
        6 => {
            let bytes = hex_bytes(hex).ok_or_else(|| ColorParseError::BadHex(hex.to_string()))?;
            Ok(Color::rgb(bytes[0], bytes[1], bytes[2]))
        }
        8 => {
            let bytes = hex_bytes8(hex).ok_or_else(|| ColorParseError::BadHex(hex.to_string()))?;
            Ok(Color::rgba(bytes[0], bytes[1], bytes[2], bytes[3]))
        }
        _ => Err(ColorParseError::BadHex(hex.to_string())),
    }
}

fn hex_nibbles(s: &str) -> Option<[u8; 3]> {
    let mut out = [0u8; 3];
    for (i, c) in s.chars().enumerate() {
        out[i] = c.to_digit(16)? as u8;
    }
    Some(out)
}

fn hex_bytes(s: &str) -> Option<[u8; 3]> {
    let mut out = [0u8; 3];
    for i in 0..3 {
        out[i] = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(out)
}

fn hex_bytes8(s: &str) -> Option<[u8; 4]> {
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(out)
}

fn parse_rgba_function(inner: &str, has_alpha: bool) -> Result<Color, ColorParseError> {
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    let expected = if has_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return Err(ColorParseError::BadFunction(inner.to_string()));
    }
    let channel = |s: &str| -> Result<u8, ColorParseError> {
        if let Some(pct) = s.strip_suffix('%') {
            let v: f64 = pct
                .parse()
                .map_err(|_| ColorParseError::BadFunction(inner.to_string()))?;
            Ok((v.clamp(0.0, 100.0) / 100.0 * 255.0).round() as u8)
        } else {
            s.parse::<u16>()
                .map(|v| v.min(255) as u8)
                .map_err(|_| ColorParseError::BadFunction(inner.to_string()))
        }
    };
    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = if has_alpha {
        let v: f64 = parts[3]
            .parse()
            .map_err(|_| ColorParseError::BadFunction(inner.to_string()))?;
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    } else {
        255
    };
    Ok(Color::rgba(r, g, b, a))
}

fn named_color(name: &str) -> Option<Color> {
    Some(match name.to_ascii_lowercase().as_str() {
        "black" => Color::rgb(0, 0, 0),
        "white" => Color::rgb(255, 255, 255),
        "red" => Color::rgb(255, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "blue" => Color::rgb(0, 0, 255),
        "yellow" => Color::rgb(255, 255, 0),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "orange" => Color::rgb(255, 165, 0),
        "purple" => Color::rgb(128, 0, 128),
        "transparent" => Color::TRANSPARENT,
        "none" => Color::TRANSPARENT,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premultiply_then_demultiply_roundtrips() {
        let c = Color::rgba(200, 100, 50, 128);
        let p = c.premultiply();
        assert!(p.r <= p.a && p.g <= p.a && p.b <= p.a);
        let back = p.demultiply();
        // rounding through 8-bit premultiplication loses at most 1 LSB/channel.
        assert!((back.r as i16 - c.r as i16).abs() <= 1);
        assert!((back.g as i16 - c.g as i16).abs() <= 1);
        assert!((back.b as i16 - c.b as i16).abs() <= 1);
    }

    #[test]
    fn premultiply_is_idempotent() {
        let c = Color::rgba(10, 20, 30, 40).premultiply();
        assert_eq!(c.premultiply(), c);
    }

    #[test]
    fn demultiply_is_idempotent() {
        let c = Color::rgba(10, 20, 30, 40);
        assert_eq!(c.demultiply(), c.demultiply().demultiply());
    }

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!(parse_css_color("#f00").unwrap(), Color::rgb(255, 0, 0));
        assert_eq!(parse_css_color("#ff0000").unwrap(), Color::rgb(255, 0, 0));
        assert_eq!(
            parse_css_color("#ff000080").unwrap(),
            Color::rgba(255, 0, 0, 0x80)
        );
    }

    #[test]
    fn parses_rgb_and_rgba_functions() {
        assert_eq!(
            parse_css_color("rgb(255, 0, 0)").unwrap(),
            Color::rgb(255, 0, 0)
        );
        assert_eq!(
            parse_css_color("rgba(255, 0, 0, 0.5)").unwrap(),
            Color::rgba(255, 0, 0, 128)
        );
    }

    #[test]
    fn parses_named_colors_case_insensitively() {
        assert_eq!(parse_css_color("Red").unwrap(), Color::rgb(255, 0, 0));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_css_color("").is_err());
        assert!(parse_css_color("not-a-color").is_err());
        assert!(parse_css_color("#12").is_err());
    }
}
