//! CSS color values to `RRGGBB` hex.

use once_cell::sync::Lazy;
use regex::Regex;

static RGB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^rgba?\(\s*(\d{1,3}%?)\s*[, ]\s*(\d{1,3}%?)\s*[, ]\s*(\d{1,3}%?)\s*(?:[,/]\s*[\d.]+%?\s*)?\)$")
        .unwrap()
});

const NAMED_COLORS: &[(&str, &str)] = &[
    ("aqua", "00FFFF"),
    ("black", "000000"),
    ("blue", "0000FF"),
    ("brown", "A52A2A"),
    ("cyan", "00FFFF"),
    ("darkblue", "00008B"),
    ("darkgray", "A9A9A9"),
    ("darkgreen", "006400"),
    ("darkred", "8B0000"),
    ("fuchsia", "FF00FF"),
    ("gold", "FFD700"),
    ("gray", "808080"),
    ("green", "008000"),
    ("grey", "808080"),
    ("lightblue", "ADD8E6"),
    ("lightgray", "D3D3D3"),
    ("lightgreen", "90EE90"),
    ("lightyellow", "FFFFE0"),
    ("lime", "00FF00"),
    ("magenta", "FF00FF"),
    ("maroon", "800000"),
    ("navy", "000080"),
    ("olive", "808000"),
    ("orange", "FFA500"),
    ("pink", "FFC0CB"),
    ("purple", "800080"),
    ("red", "FF0000"),
    ("silver", "C0C0C0"),
    ("teal", "008080"),
    ("violet", "EE82EE"),
    ("white", "FFFFFF"),
    ("yellow", "FFFF00"),
];

/// Highlight colors WordprocessingML accepts by name
const HIGHLIGHTS: &[&str] = &[
    "black", "blue", "cyan", "green", "magenta", "red", "yellow", "white", "darkBlue",
    "darkCyan", "darkGreen", "darkMagenta", "darkRed", "darkYellow", "darkGray", "lightGray",
];

/// Parse a CSS color into upper-case `RRGGBB`.
///
/// `transparent`, `inherit` and unknown names yield `None`.
pub fn parse_color(raw: &str) -> Option<String> {
    let raw = raw.trim().to_ascii_lowercase();

    if let Some(hex) = raw.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        return match hex.len() {
            3 | 4 => Some(hex.chars().take(3).flat_map(|c| [c, c]).collect::<String>().to_uppercase()),
            6 | 8 => Some(hex[..6].to_uppercase()),
            _ => None,
        };
    }

    if let Some(caps) = RGB_RE.captures(&raw) {
        let mut out = String::with_capacity(6);
        for i in 1..=3 {
            let part = caps.get(i)?.as_str();
            let channel = match part.strip_suffix('%') {
                Some(pct) => (pct.parse::<f32>().ok()?.min(100.0) * 2.55).round() as u32,
                None => part.parse::<u32>().ok()?.min(255),
            };
            out.push_str(&format!("{:02X}", channel));
        }
        return Some(out);
    }

    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == raw)
        .map(|(_, hex)| hex.to_string())
}

/// Map a CSS color to the closest named highlight, if it is one exactly.
pub fn highlight_name(raw: &str) -> Option<&'static str> {
    let lower = raw.trim().to_ascii_lowercase();
    HIGHLIGHTS
        .iter()
        .find(|h| h.eq_ignore_ascii_case(&lower))
        .copied()
}
