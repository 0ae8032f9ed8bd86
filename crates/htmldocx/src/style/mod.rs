//! Inline `style` attribute support.
//!
//! Declarations are parsed in source order and folded into an
//! [`ElementStyle`]; a later declaration of the same property wins.

mod color;
mod units;

pub use color::{highlight_name, parse_color};
pub use units::{font_size_keyword, html_font_size, pixels_to_emu, Length, Unit, BASE_FONT_POINTS};

use htmldocx_core::{
    Alignment, CellAlignment, LineSpacing, ParagraphProperties, RunProperties, Underline,
    VerticalPosition,
};

/// A single `property: value` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Lower-cased property name
    pub property: String,
    pub value: String,
}

/// Split a `style` attribute into declarations, dropping `!important`
pub fn parse_declarations(style: &str) -> Vec<Declaration> {
    style
        .split(';')
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            let value = value.trim();
            let value = value
                .strip_suffix("!important")
                .map(str::trim_end)
                .unwrap_or(value);
            if property.is_empty() || value.is_empty() {
                return None;
            }
            Some(Declaration {
                property,
                value: value.to_string(),
            })
        })
        .collect()
}

/// `white-space` handling of an element's text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhiteSpace {
    /// Collapse spaces and line breaks
    Normal,
    /// Keep spaces and line breaks
    Pre,
    /// Keep line breaks, collapse spaces
    PreLine,
}

/// Everything an element's inline style contributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementStyle {
    pub run: RunProperties,
    pub paragraph: ParagraphProperties,
    /// Solid background color, applied to runs, paragraphs or cells by the caller
    pub background: Option<String>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub cell_alignment: Option<CellAlignment>,
    pub white_space: Option<WhiteSpace>,
    /// `display: none`
    pub display_none: bool,
}

impl ElementStyle {
    pub fn from_declarations(declarations: &[Declaration]) -> Self {
        let mut style = ElementStyle::default();
        for decl in declarations {
            style.apply_declaration(&decl.property, &decl.value);
        }
        style
    }

    fn apply_declaration(&mut self, property: &str, value: &str) {
        let lower = value.to_ascii_lowercase();
        match property {
            "color" => {
                if let Some(color) = parse_color(value) {
                    self.run.color = Some(color);
                }
            }
            "background-color" => self.background = parse_color(value),
            "background" => {
                if let Some(color) = value.split_whitespace().find_map(parse_color) {
                    self.background = Some(color);
                }
            }
            "font-weight" => {
                self.run.bold = match lower.as_str() {
                    "bold" | "bolder" => Some(true),
                    "normal" | "lighter" => Some(false),
                    n => n.parse::<u32>().ok().map(|w| w >= 600),
                };
            }
            "font-style" => {
                self.run.italic = match lower.as_str() {
                    "italic" | "oblique" => Some(true),
                    "normal" => Some(false),
                    _ => self.run.italic,
                };
            }
            "font-family" => {
                if let Some(family) = first_font_family(value) {
                    self.run.font = Some(family);
                }
            }
            "font-size" => {
                let points = font_size_keyword(&lower)
                    .or_else(|| Length::parse(&lower).map(|l| l.to_points(BASE_FONT_POINTS)));
                if let Some(points) = points.filter(|p| *p > 0.0) {
                    self.run.size = Some((points * 2.0).round() as u32);
                }
            }
            "text-decoration" | "text-decoration-line" => {
                for token in lower.split_whitespace() {
                    match token {
                        "underline" => self.run.underline = Some(Underline::Single),
                        "line-through" => self.run.strike = Some(true),
                        "none" => {
                            self.run.underline = Some(Underline::None);
                            self.run.strike = Some(false);
                        }
                        _ => {}
                    }
                }
            }
            "text-decoration-style" => {
                if self.run.underline.is_some_and(|u| u != Underline::None) {
                    self.run.underline = match lower.as_str() {
                        "double" => Some(Underline::Double),
                        "dotted" => Some(Underline::Dotted),
                        "dashed" => Some(Underline::Dashed),
                        "wavy" => Some(Underline::Wave),
                        _ => Some(Underline::Single),
                    };
                }
            }
            "vertical-align" => match lower.as_str() {
                "sub" => self.run.vertical_position = Some(VerticalPosition::Subscript),
                "super" => self.run.vertical_position = Some(VerticalPosition::Superscript),
                "baseline" => self.run.vertical_position = Some(VerticalPosition::Baseline),
                "top" | "text-top" => self.cell_alignment = Some(CellAlignment::Top),
                "middle" => self.cell_alignment = Some(CellAlignment::Center),
                "bottom" | "text-bottom" => self.cell_alignment = Some(CellAlignment::Bottom),
                _ => {}
            },
            "text-transform" => {
                self.run.caps = match lower.as_str() {
                    "uppercase" => Some(true),
                    "none" => Some(false),
                    _ => self.run.caps,
                };
            }
            "font-variant" | "font-variant-caps" => {
                self.run.small_caps = match lower.as_str() {
                    "small-caps" | "all-small-caps" => Some(true),
                    "normal" => Some(false),
                    _ => self.run.small_caps,
                };
            }
            "visibility" => {
                self.run.hidden = match lower.as_str() {
                    "hidden" | "collapse" => Some(true),
                    "visible" => Some(false),
                    _ => self.run.hidden,
                };
            }
            "display" => self.display_none = lower == "none",
            "white-space" => {
                self.white_space = match lower.as_str() {
                    "pre" | "pre-wrap" | "break-spaces" => Some(WhiteSpace::Pre),
                    "pre-line" => Some(WhiteSpace::PreLine),
                    "normal" | "nowrap" => Some(WhiteSpace::Normal),
                    _ => self.white_space,
                };
            }
            "text-align" => {
                if let Some(alignment) = parse_alignment(&lower) {
                    self.paragraph.alignment = Some(alignment);
                }
            }
            "text-indent" => {
                if let Some(len) = Length::parse(&lower) {
                    self.paragraph.indent_first_line = Some(len.to_twips());
                }
            }
            "margin" => self.apply_margin_shorthand(&lower),
            "margin-left" | "margin-inline-start" => {
                if let Some(len) = Length::parse(&lower) {
                    self.paragraph.indent_left = Some(len.to_twips());
                }
            }
            "margin-right" | "margin-inline-end" => {
                if let Some(len) = Length::parse(&lower) {
                    self.paragraph.indent_right = Some(len.to_twips());
                }
            }
            "margin-top" => {
                if let Some(len) = Length::parse(&lower) {
                    self.paragraph.spacing_before = Some(len.to_twips().max(0) as u32);
                }
            }
            "margin-bottom" => {
                if let Some(len) = Length::parse(&lower) {
                    self.paragraph.spacing_after = Some(len.to_twips().max(0) as u32);
                }
            }
            "line-height" => self.paragraph.line_spacing = parse_line_height(&lower),
            "direction" => {
                let rtl = match lower.as_str() {
                    "rtl" => true,
                    "ltr" => false,
                    _ => return,
                };
                self.paragraph.bidi = Some(rtl);
                self.run.right_to_left = Some(rtl);
            }
            "page-break-before" | "break-before" => {
                if matches!(lower.as_str(), "always" | "page" | "left" | "right") {
                    self.paragraph.page_break_before = Some(true);
                }
            }
            "width" => self.width = Length::parse(&lower),
            "height" => self.height = Length::parse(&lower),
            _ => {}
        }
    }

    fn apply_margin_shorthand(&mut self, value: &str) {
        let parts: Vec<Option<Length>> = value.split_whitespace().map(Length::parse).collect();
        let (top, right, bottom, left) = match parts.as_slice() {
            [all] => (*all, *all, *all, *all),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l, ..] => (*t, *r, *b, *l),
            [] => return,
        };
        if let Some(top) = top {
            self.paragraph.spacing_before = Some(top.to_twips().max(0) as u32);
        }
        if let Some(bottom) = bottom {
            self.paragraph.spacing_after = Some(bottom.to_twips().max(0) as u32);
        }
        if let Some(left) = left {
            self.paragraph.indent_left = Some(left.to_twips());
        }
        if let Some(right) = right {
            self.paragraph.indent_right = Some(right.to_twips());
        }
    }
}

/// `left`, `center`, ... (also used for the legacy `align` attribute)
pub fn parse_alignment(value: &str) -> Option<Alignment> {
    match value.trim().to_ascii_lowercase().as_str() {
        "left" | "start" => Some(Alignment::Left),
        "center" | "middle" => Some(Alignment::Center),
        "right" | "end" => Some(Alignment::Right),
        "justify" => Some(Alignment::Justify),
        _ => None,
    }
}

fn parse_line_height(value: &str) -> Option<LineSpacing> {
    if value == "normal" {
        return Some(LineSpacing::Auto(240));
    }
    if let Ok(factor) = value.parse::<f32>() {
        return Some(LineSpacing::Auto((factor * 240.0).round().max(0.0) as u32));
    }
    let len = Length::parse(value)?;
    if len.is_percent() {
        Some(LineSpacing::Auto((len.value * 2.4).round().max(0.0) as u32))
    } else {
        Some(LineSpacing::Exact(len.to_twips().max(0) as u32))
    }
}

/// First family of a `font-family` list, generic names mapped to office fonts
fn first_font_family(value: &str) -> Option<String> {
    let family = value
        .split(',')
        .next()?
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim();
    let mapped = match family.to_ascii_lowercase().as_str() {
        "" => return None,
        "monospace" => "Courier New",
        "serif" => "Times New Roman",
        "sans-serif" => "Arial",
        "cursive" => "Comic Sans MS",
        _ => family,
    };
    Some(mapped.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn style(raw: &str) -> ElementStyle {
        ElementStyle::from_declarations(&parse_declarations(raw))
    }

    #[test]
    fn test_parse_declarations() {
        let decls = parse_declarations(" Color : red !important;; broken; margin:0 ");
        assert_eq!(
            decls,
            vec![
                Declaration {
                    property: "color".to_string(),
                    value: "red".to_string()
                },
                Declaration {
                    property: "margin".to_string(),
                    value: "0".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_run_declarations() {
        let s = style("font-weight:700; font-style:italic; color:#00f; font-size:14pt; text-decoration:underline line-through");
        assert_eq!(s.run.bold, Some(true));
        assert_eq!(s.run.italic, Some(true));
        assert_eq!(s.run.color.as_deref(), Some("0000FF"));
        assert_eq!(s.run.size, Some(28));
        assert_eq!(s.run.underline, Some(Underline::Single));
        assert_eq!(s.run.strike, Some(true));
    }

    #[test]
    fn test_later_declaration_wins() {
        let s = style("font-weight:bold; font-weight:normal");
        assert_eq!(s.run.bold, Some(false));
    }

    #[test]
    fn test_paragraph_declarations() {
        let s = style("text-align:center; margin: 12pt 1in; text-indent:-0.5in; line-height:1.5");
        assert_eq!(s.paragraph.alignment, Some(Alignment::Center));
        assert_eq!(s.paragraph.spacing_before, Some(240));
        assert_eq!(s.paragraph.spacing_after, Some(240));
        assert_eq!(s.paragraph.indent_left, Some(1440));
        assert_eq!(s.paragraph.indent_first_line, Some(-720));
        assert_eq!(s.paragraph.line_spacing, Some(LineSpacing::Auto(360)));
    }

    #[test]
    fn test_box_declarations() {
        let s = style("display:none; width:50%; background: url(x.png) #eee; vertical-align: middle");
        assert!(s.display_none);
        assert_eq!(s.width.map(|w| w.unit), Some(Unit::Percent));
        assert_eq!(s.background.as_deref(), Some("EEEEEE"));
        assert_eq!(s.cell_alignment, Some(CellAlignment::Center));
    }

    #[test]
    fn test_font_family_mapping() {
        assert_eq!(style("font-family: 'Fira Code', monospace").run.font.as_deref(), Some("Fira Code"));
        assert_eq!(style("font-family: monospace").run.font.as_deref(), Some("Courier New"));
    }

    #[test]
    fn test_white_space() {
        assert_eq!(style("white-space: pre-wrap").white_space, Some(WhiteSpace::Pre));
        assert_eq!(style("white-space: pre-line").white_space, Some(WhiteSpace::PreLine));
        assert_eq!(style("white-space: nowrap").white_space, Some(WhiteSpace::Normal));
        assert_eq!(style("white-space: inherit").white_space, None);
    }
}
