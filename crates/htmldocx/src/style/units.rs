//! CSS lengths and their WordprocessingML unit conversions.

use once_cell::sync::Lazy;
use regex::Regex;

/// Font size used to resolve `em` and percentages, in points
pub const BASE_FONT_POINTS: f32 = 12.0;

const TWIPS_PER_POINT: f32 = 20.0;
const EMU_PER_POINT: f32 = 12_700.0;
const POINTS_PER_INCH: f32 = 72.0;

static LENGTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+-]?(?:\d+\.?\d*|\.\d+))\s*(px|pt|em|rem|%|cm|mm|in|pc)?$").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Unit {
    Pixel,
    Point,
    Em,
    Percent,
    Centimeter,
    Millimeter,
    Inch,
    Pica,
}

/// A parsed CSS length such as `12pt` or `50%`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f32,
    pub unit: Unit,
}

impl Length {
    /// Parse a CSS length. Unitless numbers are taken as pixels, matching
    /// HTML presentational attributes like `width="200"`.
    pub fn parse(raw: &str) -> Option<Length> {
        let raw = raw.trim().to_ascii_lowercase();
        let caps = LENGTH_RE.captures(&raw)?;
        let value: f32 = caps.get(1)?.as_str().parse().ok()?;
        let unit = match caps.get(2).map(|m| m.as_str()) {
            None | Some("px") => Unit::Pixel,
            Some("pt") => Unit::Point,
            Some("em") | Some("rem") => Unit::Em,
            Some("%") => Unit::Percent,
            Some("cm") => Unit::Centimeter,
            Some("mm") => Unit::Millimeter,
            Some("in") => Unit::Inch,
            Some("pc") => Unit::Pica,
            Some(_) => return None,
        };
        Some(Length { value, unit })
    }

    pub fn is_percent(&self) -> bool {
        self.unit == Unit::Percent
    }

    /// Absolute size in points; relative units resolve against `base` points
    pub fn to_points(&self, base: f32) -> f32 {
        match self.unit {
            Unit::Pixel => self.value * 0.75,
            Unit::Point => self.value,
            Unit::Em => self.value * base,
            Unit::Percent => self.value * base / 100.0,
            Unit::Centimeter => self.value * POINTS_PER_INCH / 2.54,
            Unit::Millimeter => self.value * POINTS_PER_INCH / 25.4,
            Unit::Inch => self.value * POINTS_PER_INCH,
            Unit::Pica => self.value * 12.0,
        }
    }

    pub fn to_twips(&self) -> i32 {
        (self.to_points(BASE_FONT_POINTS) * TWIPS_PER_POINT).round() as i32
    }

    pub fn to_half_points(&self) -> u32 {
        (self.to_points(BASE_FONT_POINTS) * 2.0).round().max(1.0) as u32
    }

    /// English Metric Units; pixels convert at the given DPI
    pub fn to_emu(&self, dpi: u32) -> u64 {
        let points = match self.unit {
            Unit::Pixel => self.value * POINTS_PER_INCH / dpi.max(1) as f32,
            _ => self.to_points(BASE_FONT_POINTS),
        };
        (points * EMU_PER_POINT).round().max(0.0) as u64
    }

    /// Pixel count at the given DPI
    pub fn to_pixels(&self, dpi: u32) -> f32 {
        match self.unit {
            Unit::Pixel => self.value,
            _ => self.to_points(BASE_FONT_POINTS) * dpi as f32 / POINTS_PER_INCH,
        }
    }
}

/// EMUs for a pixel count at the given DPI
pub fn pixels_to_emu(pixels: f32, dpi: u32) -> u64 {
    (pixels * POINTS_PER_INCH / dpi.max(1) as f32 * EMU_PER_POINT).round().max(0.0) as u64
}

/// Font size keyword (`small`, `x-large`, ...) in points
pub fn font_size_keyword(keyword: &str) -> Option<f32> {
    let points = match keyword {
        "xx-small" => 7.0,
        "x-small" => 7.5,
        "small" => 10.0,
        "medium" => 12.0,
        "large" => 13.5,
        "x-large" => 18.0,
        "xx-large" => 24.0,
        "xxx-large" => 36.0,
        _ => return None,
    };
    Some(points)
}

/// Legacy `<font size="1..7">` value in points
pub fn html_font_size(raw: &str) -> Option<f32> {
    let raw = raw.trim();
    let size: i32 = if let Some(rel) = raw.strip_prefix('+') {
        3 + rel.parse::<i32>().ok()?
    } else if raw.starts_with('-') {
        3 + raw.parse::<i32>().ok()?
    } else {
        raw.parse().ok()?
    };
    let points = match size.clamp(1, 7) {
        1 => 8.0,
        2 => 10.0,
        3 => 12.0,
        4 => 14.0,
        5 => 18.0,
        6 => 24.0,
        _ => 36.0,
    };
    Some(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lengths() {
        assert_eq!(
            Length::parse("12pt"),
            Some(Length {
                value: 12.0,
                unit: Unit::Point
            })
        );
        assert_eq!(Length::parse(" 50% ").map(|l| l.unit), Some(Unit::Percent));
        assert_eq!(Length::parse("200").map(|l| l.unit), Some(Unit::Pixel));
        assert_eq!(Length::parse("-1.5em").map(|l| l.value), Some(-1.5));
        assert_eq!(Length::parse("auto"), None);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Length::parse("1in").unwrap().to_twips(), 1440);
        assert_eq!(Length::parse("16px").unwrap().to_half_points(), 24);
        assert_eq!(Length::parse("96px").unwrap().to_emu(96), 914_400);
        assert_eq!(pixels_to_emu(96.0, 96), 914_400);
    }

    #[test]
    fn test_html_font_size() {
        assert_eq!(html_font_size("3"), Some(12.0));
        assert_eq!(html_font_size("+2"), Some(18.0));
        assert_eq!(html_font_size("9"), Some(36.0));
        assert_eq!(html_font_size("big"), None);
    }
}
