//! List numbering state machine.
//!
//! Each `ul`/`ol` enters a [`ListScope`] derived from the enclosing scope.
//! Scopes are plain values carried by the parsing context, so leaving a list
//! restores the enclosing scope without any explicit pop.

use tracing::debug;

use crate::document::NumberingStore;
use crate::options::NumberingPolicy;

/// Deepest level a paragraph can be stamped with
pub const MAX_LEVEL: u32 = 9;

/// Marker style of a list, also the key of its numbering template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListStyle {
    Decimal,
    DecimalLeadingZero,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
    Disc,
    Circle,
    Square,
    None,
}

impl ListStyle {
    /// From a CSS `list-style-type` value
    pub fn from_css(value: &str) -> Option<ListStyle> {
        let style = match value.trim().to_ascii_lowercase().as_str() {
            "decimal" => ListStyle::Decimal,
            "decimal-leading-zero" => ListStyle::DecimalLeadingZero,
            "lower-alpha" | "lower-latin" => ListStyle::LowerAlpha,
            "upper-alpha" | "upper-latin" => ListStyle::UpperAlpha,
            "lower-roman" => ListStyle::LowerRoman,
            "upper-roman" => ListStyle::UpperRoman,
            "disc" => ListStyle::Disc,
            "circle" => ListStyle::Circle,
            "square" => ListStyle::Square,
            "none" => ListStyle::None,
            _ => return None,
        };
        Some(style)
    }

    /// From the `type` attribute of `ol`/`ul`; case is significant
    pub fn from_type_attr(value: &str) -> Option<ListStyle> {
        let style = match value.trim() {
            "1" => ListStyle::Decimal,
            "a" => ListStyle::LowerAlpha,
            "A" => ListStyle::UpperAlpha,
            "i" => ListStyle::LowerRoman,
            "I" => ListStyle::UpperRoman,
            other => match other.to_ascii_lowercase().as_str() {
                "disc" => ListStyle::Disc,
                "circle" => ListStyle::Circle,
                "square" => ListStyle::Square,
                _ => return None,
            },
        };
        Some(style)
    }

    pub fn is_ordered(&self) -> bool {
        !matches!(
            self,
            ListStyle::Disc | ListStyle::Circle | ListStyle::Square | ListStyle::None
        )
    }

    /// `w:numFmt` value
    pub fn number_format(&self) -> &'static str {
        match self {
            ListStyle::Decimal => "decimal",
            ListStyle::DecimalLeadingZero => "decimalZero",
            ListStyle::LowerAlpha => "lowerLetter",
            ListStyle::UpperAlpha => "upperLetter",
            ListStyle::LowerRoman => "lowerRoman",
            ListStyle::UpperRoman => "upperRoman",
            ListStyle::Disc | ListStyle::Circle | ListStyle::Square => "bullet",
            ListStyle::None => "none",
        }
    }

    /// `w:lvlText` for a zero-based level
    pub fn level_text(&self, level: u32) -> String {
        match self {
            ListStyle::Disc | ListStyle::Circle | ListStyle::Square => {
                // bullets rotate with depth the way browsers render nested lists
                let base = match self {
                    ListStyle::Disc => 0,
                    ListStyle::Circle => 1,
                    _ => 2,
                };
                ["\u{2022}", "o", "\u{25AA}"][((base + level) % 3) as usize].to_string()
            }
            ListStyle::None => String::new(),
            _ => format!("%{}.", level + 1),
        }
    }
}

/// Active list state: template, instance and one-based level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListScope {
    pub style: ListStyle,
    pub template: u32,
    pub instance: u32,
    pub level: u32,
}

impl ListScope {
    /// Zero-based level to stamp on a paragraph, clamped to [`MAX_LEVEL`]
    pub fn level_index(&self) -> u32 {
        self.level.clamp(1, MAX_LEVEL) - 1
    }
}

/// What a list element declares about itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListDeclaration {
    pub style: ListStyle,
    /// `start` attribute
    pub start: Option<u32>,
    /// The nearest preceding element sibling is a list of the same style
    pub follows_same_style: bool,
}

/// Derives list scopes and keeps the numbering store in step
pub struct NumberingMachine<'a> {
    store: &'a dyn NumberingStore,
    policy: NumberingPolicy,
}

impl<'a> NumberingMachine<'a> {
    pub fn new(store: &'a dyn NumberingStore, policy: NumberingPolicy) -> Self {
        Self { store, policy }
    }

    fn template_for(&self, style: ListStyle) -> u32 {
        self.store
            .find_template(style)
            .unwrap_or_else(|| self.store.create_template(style))
    }

    /// Scope for a list entered under `parent`
    pub fn enter(&self, parent: Option<ListScope>, list: ListDeclaration) -> ListScope {
        match parent {
            None => self.enter_outermost(list),
            Some(_) if list.follows_same_style => {
                let template = self.template_for(list.style);
                let instance = self.store.create_instance(template, list.start);
                debug!(instance, "restarting numbering after a sibling list");
                ListScope {
                    style: list.style,
                    template,
                    instance,
                    level: 1,
                }
            }
            Some(parent) => {
                let level = parent.level + 1;
                if level > MAX_LEVEL {
                    debug!(level, "list nested beyond the deepest numbering level");
                }
                let scope = ListScope {
                    style: list.style,
                    level,
                    ..parent
                };
                self.restyle_level(&scope, list);
                scope
            }
        }
    }

    /// Bring a shared level in line with the list entering it.
    ///
    /// An earlier nested list may have left its own style or start on the
    /// level; matching the template again drops the override.
    fn restyle_level(&self, scope: &ListScope, list: ListDeclaration) {
        let level = scope.level_index();
        let default = self
            .store
            .template_style(scope.template)
            .map(|style| (style, None));
        let current = self.store.level_format(scope.instance, level).or(default);
        let wanted = (list.style, list.start);
        if current == Some(wanted) {
            return;
        }
        if default == Some(wanted) {
            self.store.clear_override(scope.instance, level);
        } else {
            self.store
                .override_level(scope.instance, level, list.style, list.start);
        }
    }

    fn enter_outermost(&self, list: ListDeclaration) -> ListScope {
        let template = self.template_for(list.style);
        let continued = match self.policy {
            NumberingPolicy::Continue if !list.follows_same_style && list.start.is_none() => {
                self.store.last_instance(template)
            }
            _ => None,
        };
        let instance =
            continued.unwrap_or_else(|| self.store.create_instance(template, list.start));
        ListScope {
            style: list.style,
            template,
            instance,
            level: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;

    fn declaration(style: ListStyle) -> ListDeclaration {
        ListDeclaration {
            style,
            start: None,
            follows_same_style: false,
        }
    }

    #[test]
    fn test_parse_styles() {
        assert_eq!(ListStyle::from_type_attr("a"), Some(ListStyle::LowerAlpha));
        assert_eq!(ListStyle::from_type_attr("A"), Some(ListStyle::UpperAlpha));
        assert_eq!(ListStyle::from_css("Upper-Roman"), Some(ListStyle::UpperRoman));
        assert_eq!(ListStyle::from_css("inherit"), None);
        assert!(!ListStyle::Square.is_ordered());
        assert_eq!(ListStyle::Decimal.level_text(1), "%2.");
    }

    #[test]
    fn test_outermost_lists_get_fresh_instances() {
        let doc = MemoryDocument::new();
        let machine = NumberingMachine::new(&doc, NumberingPolicy::Restart);

        let first = machine.enter(None, declaration(ListStyle::Decimal));
        let second = machine.enter(None, declaration(ListStyle::Decimal));
        assert_eq!(first.template, second.template);
        assert_ne!(first.instance, second.instance);
        assert_eq!(first.level, 1);
    }

    #[test]
    fn test_continue_policy_reuses_last_instance() {
        let doc = MemoryDocument::new();
        let machine = NumberingMachine::new(&doc, NumberingPolicy::Continue);

        let first = machine.enter(None, declaration(ListStyle::Decimal));
        let second = machine.enter(None, declaration(ListStyle::Decimal));
        assert_eq!(first.instance, second.instance);

        let restarted = machine.enter(
            None,
            ListDeclaration {
                follows_same_style: true,
                ..declaration(ListStyle::Decimal)
            },
        );
        assert_ne!(restarted.instance, first.instance);
    }

    #[test]
    fn test_nesting_shares_instance_and_overrides_style() {
        let doc = MemoryDocument::new();
        let machine = NumberingMachine::new(&doc, NumberingPolicy::Restart);

        let outer = machine.enter(None, declaration(ListStyle::Decimal));
        let inner = machine.enter(Some(outer), declaration(ListStyle::LowerAlpha));
        assert_eq!(inner.instance, outer.instance);
        assert_eq!(inner.level, 2);
        assert_eq!(inner.level_index(), 1);
        assert_eq!(
            doc.level_override(outer.instance, 1),
            Some(ListStyle::LowerAlpha)
        );

        let same = machine.enter(Some(outer), declaration(ListStyle::Decimal));
        assert_eq!(same.level, 2);
        assert_eq!(doc.level_override(outer.instance, 1), None);
    }

    #[test]
    fn test_nested_start_does_not_leak() {
        let doc = MemoryDocument::new();
        let machine = NumberingMachine::new(&doc, NumberingPolicy::Restart);

        let outer = machine.enter(None, declaration(ListStyle::Decimal));
        machine.enter(
            Some(outer),
            ListDeclaration {
                start: Some(5),
                ..declaration(ListStyle::Decimal)
            },
        );
        assert_eq!(
            doc.level_format(outer.instance, 1),
            Some((ListStyle::Decimal, Some(5)))
        );

        machine.enter(Some(outer), declaration(ListStyle::Decimal));
        assert_eq!(doc.level_format(outer.instance, 1), None);
    }

    #[test]
    fn test_sibling_restart_inside_list() {
        let doc = MemoryDocument::new();
        let machine = NumberingMachine::new(&doc, NumberingPolicy::Restart);

        let outer = machine.enter(None, declaration(ListStyle::Disc));
        let sibling = machine.enter(
            Some(outer),
            ListDeclaration {
                follows_same_style: true,
                ..declaration(ListStyle::Disc)
            },
        );
        assert_ne!(sibling.instance, outer.instance);
        assert_eq!(sibling.level, 1);
    }

    #[test]
    fn test_level_clamped() {
        let scope = ListScope {
            style: ListStyle::Disc,
            template: 1,
            instance: 1,
            level: 14,
        };
        assert_eq!(scope.level_index(), MAX_LEVEL - 1);
    }
}
