//! Collaborator traits through which the converter reaches the target document.
//!
//! All methods take `&self`; implementations use interior mutability so a
//! single document can serve as target, style catalog and numbering store at
//! once.

use htmldocx_core::Paragraph;

use crate::loader::Resource;
use crate::numbering::ListStyle;

/// Kind of style definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKind {
    Paragraph,
    Character,
    Table,
}

/// Footnote or endnote part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteKind {
    Footnote,
    Endnote,
}

/// The document receiving converted content
pub trait TargetDocument {
    /// Highest note id already present, 0 when none
    fn max_note_id(&self, kind: NoteKind) -> u32;

    /// Highest bookmark id already present, 0 when none
    fn max_bookmark_id(&self) -> u32;

    /// Highest drawing object id already present, 0 when none
    fn max_drawing_id(&self) -> u32;

    /// Number of `SEQ <sequence>` caption fields already present
    fn caption_count(&self, sequence: &str) -> u32;

    /// Store a note body under `id`
    fn add_note(&self, kind: NoteKind, id: u32, paragraphs: Vec<Paragraph>);

    /// Register an external hyperlink target, returning its relationship id
    fn add_hyperlink(&self, uri: &str) -> String;

    /// Embed an image part, returning its relationship id.
    ///
    /// `None` means the image could not be stored and the caller falls back
    /// to alternate text.
    fn add_image(&self, resource: &Resource) -> Option<String>;
}

/// Resolves style names to the identifiers used in the document
pub trait StyleCatalog {
    /// Identifier of an existing style matching `name`, by id or display name
    fn resolve(&self, name: &str, kind: StyleKind) -> Option<String>;

    /// Called when a requested style is missing, at most once per
    /// `(name, kind)` pair within a conversion.
    ///
    /// The host may register a definition and return its identifier.
    fn missing(&self, _name: &str, _kind: StyleKind) -> Option<String> {
        None
    }
}

/// Owner of list numbering definitions.
///
/// Templates are abstract definitions keyed by [`ListStyle`]; instances are
/// concrete numberings paragraphs point at.
pub trait NumberingStore {
    fn find_template(&self, style: ListStyle) -> Option<u32>;

    fn create_template(&self, style: ListStyle) -> u32;

    /// New instance of `template`, optionally starting its first level at `start`
    fn create_instance(&self, template: u32, start: Option<u32>) -> u32;

    /// Style of the template's levels
    fn template_style(&self, template: u32) -> Option<ListStyle>;

    /// Re-style one zero-based level of an instance
    fn override_level(&self, instance: u32, level: u32, style: ListStyle, start: Option<u32>);

    /// Current override of one zero-based level, if any
    fn level_format(&self, instance: u32, level: u32) -> Option<(ListStyle, Option<u32>)>;

    /// Drop an override so the level falls back to its template
    fn clear_override(&self, instance: u32, level: u32);

    /// Most recently created instance of `template`
    fn last_instance(&self, template: u32) -> Option<u32>;
}
