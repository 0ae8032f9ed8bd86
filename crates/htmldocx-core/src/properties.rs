//! Run, paragraph and table property sets
//!
//! Every property is optional: `None` means "not set here". Two merge
//! operations exist on each set:
//!
//! - `inherit_from` fills properties that are still unset from an enclosing
//!   scope. A property set by a nearer scope is never replaced, which makes
//!   the cascade idempotent.
//! - `apply` overwrites properties with every property the other set
//!   explicitly defines (used while composing a scope's own styles).

/// Copies `source.field` into `target.field` for each listed field that is unset.
macro_rules! fill_unset {
    ($target:expr, $source:expr; $($field:ident),+ $(,)?) => {
        $(
            if $target.$field.is_none() {
                $target.$field = $source.$field.clone();
            }
        )+
    };
}

/// Copies each listed field that `source` defines into `target`.
macro_rules! override_set {
    ($target:expr, $source:expr; $($field:ident),+ $(,)?) => {
        $(
            if $source.$field.is_some() {
                $target.$field = $source.$field.clone();
            }
        )+
    };
}

/// Underline kinds supported by the converter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Underline {
    Single,
    Double,
    Dotted,
    Dashed,
    Wave,
    None,
}

impl Underline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Underline::Single => "single",
            Underline::Double => "double",
            Underline::Dotted => "dotted",
            Underline::Dashed => "dash",
            Underline::Wave => "wave",
            Underline::None => "none",
        }
    }
}

/// Superscript / subscript positioning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalPosition {
    Baseline,
    Superscript,
    Subscript,
}

impl VerticalPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerticalPosition::Baseline => "baseline",
            VerticalPosition::Superscript => "superscript",
            VerticalPosition::Subscript => "subscript",
        }
    }
}

/// Character-level properties of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunProperties {
    /// Character style id
    pub style: Option<String>,
    pub font: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub caps: Option<bool>,
    pub small_caps: Option<bool>,
    pub strike: Option<bool>,
    pub hidden: Option<bool>,
    /// Hex color without `#`, e.g. `FF0000`
    pub color: Option<String>,
    /// Font size in half-points
    pub size: Option<u32>,
    /// Highlight color name, e.g. `yellow`
    pub highlight: Option<String>,
    pub underline: Option<Underline>,
    /// Background fill, hex color
    pub shading: Option<String>,
    pub vertical_position: Option<VerticalPosition>,
    pub right_to_left: Option<bool>,
    /// BCP 47 language tag
    pub language: Option<String>,
}

impl RunProperties {
    /// Fill every unset property from an enclosing scope.
    pub fn inherit_from(&mut self, ancestor: &RunProperties) {
        fill_unset!(self, ancestor;
            style, font, bold, italic, caps, small_caps, strike, hidden, color, size,
            highlight, underline, shading, vertical_position, right_to_left, language,
        );
    }

    /// Overwrite with every property `other` explicitly sets.
    pub fn apply(&mut self, other: &RunProperties) {
        override_set!(self, other;
            style, font, bold, italic, caps, small_caps, strike, hidden, color, size,
            highlight, underline, shading, vertical_position, right_to_left, language,
        );
    }

    pub fn is_empty(&self) -> bool {
        *self == RunProperties::default()
    }
}

/// Paragraph alignment (`w:jc`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
        }
    }
}

/// Line spacing of a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSpacing {
    /// Proportional, in 240ths of a line
    Auto(u32),
    /// Exact height in twips
    Exact(u32),
}

/// Binds a paragraph to a numbering instance and zero-based level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingRef {
    pub instance: u32,
    pub level: u32,
}

/// Paragraph-level properties
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParagraphProperties {
    /// Paragraph style id
    pub style: Option<String>,
    pub keep_next: Option<bool>,
    pub keep_lines: Option<bool>,
    pub page_break_before: Option<bool>,
    pub numbering: Option<NumberingRef>,
    pub bottom_border: Option<bool>,
    pub shading: Option<String>,
    pub bidi: Option<bool>,
    /// Twips
    pub spacing_before: Option<u32>,
    /// Twips
    pub spacing_after: Option<u32>,
    pub line_spacing: Option<LineSpacing>,
    /// Twips
    pub indent_left: Option<i32>,
    /// Twips
    pub indent_right: Option<i32>,
    /// Twips; negative values render as a hanging indent
    pub indent_first_line: Option<i32>,
    pub alignment: Option<Alignment>,
}

impl ParagraphProperties {
    /// Fill unset inheritable properties from an enclosing scope.
    ///
    /// Vertical spacing, page breaks, borders, keep-with-next and numbering
    /// belong to the paragraph that declared them and never flow inward.
    pub fn inherit_from(&mut self, ancestor: &ParagraphProperties) {
        fill_unset!(self, ancestor;
            style, keep_lines, shading, bidi, line_spacing, indent_left, indent_right,
            indent_first_line, alignment,
        );
    }

    /// Overwrite with every property `other` explicitly sets.
    pub fn apply(&mut self, other: &ParagraphProperties) {
        override_set!(self, other;
            style, keep_next, keep_lines, page_break_before, numbering, bottom_border, shading,
            bidi, spacing_before, spacing_after, line_spacing, indent_left, indent_right,
            indent_first_line, alignment,
        );
    }

    pub fn is_empty(&self) -> bool {
        *self == ParagraphProperties::default()
    }
}

/// Preferred width of a table or cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableWidth {
    Auto,
    /// Twips (`dxa`)
    Twips(u32),
    /// Fiftieths of a percent (`pct`), 5000 = 100%
    Percent(u32),
}

impl TableWidth {
    pub(crate) fn parts(&self) -> (u32, &'static str) {
        match self {
            TableWidth::Auto => (0, "auto"),
            TableWidth::Twips(w) => (*w, "dxa"),
            TableWidth::Percent(w) => (*w, "pct"),
        }
    }
}

/// Table-level properties
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableProperties {
    /// Table style id
    pub style: Option<String>,
    pub bidi_visual: Option<bool>,
    pub width: Option<TableWidth>,
    pub alignment: Option<Alignment>,
    pub borders: Option<bool>,
}

/// Row-level properties
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRowProperties {
    /// Repeat this row at the top of each page
    pub header: bool,
}

/// Vertical merge state of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalMerge {
    /// First cell of a vertically merged range
    Restart,
    /// Placeholder continuing the range above
    Continue,
}

/// Vertical alignment of cell content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellAlignment {
    Top,
    Center,
    Bottom,
}

impl CellAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellAlignment::Top => "top",
            CellAlignment::Center => "center",
            CellAlignment::Bottom => "bottom",
        }
    }
}

/// Cell-level properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCellProperties {
    pub width: Option<TableWidth>,
    /// Number of grid columns covered, at least 1
    pub grid_span: u32,
    pub vertical_merge: Option<VerticalMerge>,
    pub shading: Option<String>,
    pub no_wrap: Option<bool>,
    pub vertical_alignment: Option<CellAlignment>,
}

impl Default for TableCellProperties {
    fn default() -> Self {
        Self {
            width: None,
            grid_span: 1,
            vertical_merge: None,
            shading: None,
            no_wrap: None,
            vertical_alignment: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_inherit_keeps_nearer_values() {
        let mut inner = RunProperties {
            bold: Some(false),
            ..Default::default()
        };
        let outer = RunProperties {
            bold: Some(true),
            color: Some("FF0000".to_string()),
            ..Default::default()
        };

        inner.inherit_from(&outer);
        assert_eq!(inner.bold, Some(false));
        assert_eq!(inner.color.as_deref(), Some("FF0000"));
    }

    #[test]
    fn test_inherit_is_idempotent() {
        let outer = RunProperties {
            italic: Some(true),
            size: Some(28),
            ..Default::default()
        };
        let mut once = RunProperties {
            size: Some(20),
            ..Default::default()
        };
        once.inherit_from(&outer);
        let mut twice = once.clone();
        twice.inherit_from(&outer);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_apply_overrides_only_defined() {
        let mut base = RunProperties {
            bold: Some(true),
            color: Some("000000".to_string()),
            ..Default::default()
        };
        base.apply(&RunProperties {
            color: Some("00FF00".to_string()),
            ..Default::default()
        });

        assert_eq!(base.bold, Some(true));
        assert_eq!(base.color.as_deref(), Some("00FF00"));
    }

    #[test]
    fn test_paragraph_spacing_does_not_flow_inward() {
        let outer = ParagraphProperties {
            spacing_before: Some(240),
            alignment: Some(Alignment::Center),
            numbering: Some(NumberingRef {
                instance: 1,
                level: 0,
            }),
            ..Default::default()
        };
        let mut inner = ParagraphProperties::default();
        inner.inherit_from(&outer);

        assert_eq!(inner.alignment, Some(Alignment::Center));
        assert_eq!(inner.spacing_before, None);
        assert_eq!(inner.numbering, None);
    }
}
