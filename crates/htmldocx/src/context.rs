//! Parsing context threaded through expression interpretation.
//!
//! A [`ParsingContext`] is a small `Copy` value. Child contexts share the
//! session and the property bag by reference but carry their own cascade
//! link, list scope and text flags, so nothing a child does leaks back into
//! its parent.

use std::any::Any;
use std::cell::RefCell;

use indexmap::IndexMap;
use tracing::{debug, warn};

use htmldocx_core::{ParagraphProperties, RunProperties};

use crate::document::{NoteKind, NumberingStore, StyleCatalog, StyleKind, TargetDocument};
use crate::loader::ResourceLoader;
use crate::numbering::ListScope;
use crate::options::ConvertOptions;

/// Collaborators and configuration of one conversion call
pub(crate) struct Session<'a> {
    pub options: &'a ConvertOptions,
    pub document: &'a dyn TargetDocument,
    pub styles: &'a dyn StyleCatalog,
    pub numbering: &'a dyn NumberingStore,
    pub loader: &'a dyn ResourceLoader,
    /// Outcome of every missing-style notification, so each pair is reported once
    missing: RefCell<IndexMap<(String, StyleKind), Option<String>>>,
}

impl<'a> Session<'a> {
    pub fn new(
        options: &'a ConvertOptions,
        document: &'a dyn TargetDocument,
        styles: &'a dyn StyleCatalog,
        numbering: &'a dyn NumberingStore,
        loader: &'a dyn ResourceLoader,
    ) -> Self {
        Self {
            options,
            document,
            styles,
            numbering,
            loader,
            missing: RefCell::new(IndexMap::new()),
        }
    }

    fn lookup(&self, name: &str, kind: StyleKind) -> Option<String> {
        if let Some(id) = self.styles.resolve(name, kind) {
            return Some(id);
        }
        let key = (name.to_string(), kind);
        if let Some(known) = self.missing.borrow().get(&key) {
            return known.clone();
        }
        warn!(name, ?kind, "style not found in catalog");
        let substitute = self.styles.missing(name, kind);
        self.missing.borrow_mut().insert(key, substitute.clone());
        substitute
    }

    /// Identifier for a style the converter applies on its own, such as
    /// `Heading1`; falls back to the requested name itself.
    pub fn builtin_style(&self, name: &str, kind: StyleKind) -> String {
        self.lookup(name, kind).unwrap_or_else(|| name.to_string())
    }

    /// Identifier for a `class` attribute entry, or `None` to ignore the class
    pub fn class_style(&self, class: &str, kind: StyleKind) -> Option<String> {
        self.lookup(class, kind)
    }
}

/// Typed values shared by every context of a conversion
#[derive(Default)]
pub(crate) struct PropertyBag {
    values: RefCell<IndexMap<&'static str, Box<dyn Any>>>,
}

impl PropertyBag {
    pub fn get<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        self.values
            .borrow()
            .get(key)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    pub fn set<T: 'static>(&self, key: &'static str, value: T) {
        self.values.borrow_mut().insert(key, Box::new(value));
    }
}

/// Monotonic id sequences seeded from the target document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Counter {
    Note(NoteKind),
    Bookmark,
    Drawing,
    TableCaption,
    FigureCaption,
}

impl Counter {
    fn key(&self) -> &'static str {
        match self {
            Counter::Note(NoteKind::Footnote) => "counter.footnote",
            Counter::Note(NoteKind::Endnote) => "counter.endnote",
            Counter::Bookmark => "counter.bookmark",
            Counter::Drawing => "counter.drawing",
            Counter::TableCaption => "counter.caption.table",
            Counter::FigureCaption => "counter.caption.figure",
        }
    }

    /// Highest value already used in the document
    fn scan(&self, document: &dyn TargetDocument) -> u32 {
        match self {
            Counter::Note(kind) => document.max_note_id(*kind),
            Counter::Bookmark => document.max_bookmark_id(),
            Counter::Drawing => document.max_drawing_id(),
            Counter::TableCaption => document.caption_count("Table"),
            Counter::FigureCaption => document.caption_count("Figure"),
        }
    }
}

/// Text handling flags of a scope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TextFlags {
    /// Keep `\n` as line breaks
    pub preserve_breaks: bool,
    /// Keep runs of spaces and tabs
    pub preserve_spaces: bool,
}

impl TextFlags {
    pub const PREFORMATTED: TextFlags = TextFlags {
        preserve_breaks: true,
        preserve_spaces: true,
    };
}

/// Properties an expression composed for itself, linked to its enclosing frame
pub(crate) struct StyleFrame<'a> {
    pub run: RunProperties,
    pub paragraph: ParagraphProperties,
    parent: Option<&'a StyleFrame<'a>>,
}

impl<'a> StyleFrame<'a> {
    fn ancestors(&self) -> impl Iterator<Item = &StyleFrame<'a>> {
        std::iter::successors(Some(self), |frame| frame.parent)
    }
}

#[derive(Clone, Copy)]
pub(crate) struct ParsingContext<'a> {
    session: &'a Session<'a>,
    bag: &'a PropertyBag,
    frame: Option<&'a StyleFrame<'a>>,
    list: Option<ListScope>,
    text: TextFlags,
}

impl<'a> ParsingContext<'a> {
    pub fn new(session: &'a Session<'a>, bag: &'a PropertyBag) -> Self {
        Self {
            session,
            bag,
            frame: None,
            list: None,
            text: TextFlags::default(),
        }
    }

    pub fn session(&self) -> &'a Session<'a> {
        self.session
    }

    pub fn options(&self) -> &'a ConvertOptions {
        self.session.options
    }

    pub fn list(&self) -> Option<ListScope> {
        self.list
    }

    pub fn text(&self) -> TextFlags {
        self.text
    }

    /// A frame whose parent is this context's innermost frame
    pub fn frame(&self, run: RunProperties, paragraph: ParagraphProperties) -> StyleFrame<'a> {
        StyleFrame {
            run,
            paragraph,
            parent: self.frame,
        }
    }

    /// Child context cascading through `frame`
    pub fn with_frame<'b>(&self, frame: &'b StyleFrame<'b>) -> ParsingContext<'b>
    where
        'a: 'b,
    {
        ParsingContext {
            session: self.session,
            bag: self.bag,
            frame: Some(frame),
            list: self.list,
            text: self.text,
        }
    }

    pub fn with_list(self, list: Option<ListScope>) -> Self {
        Self { list, ..self }
    }

    pub fn with_text(self, text: TextFlags) -> Self {
        Self { text, ..self }
    }

    /// Fill unset run properties from every enclosing frame, nearest first
    pub fn cascade_run(&self, properties: &mut RunProperties) {
        for frame in self.frame.into_iter().flat_map(|frame| frame.ancestors()) {
            properties.inherit_from(&frame.run);
        }
    }

    /// Fill unset inheritable paragraph properties from every enclosing frame
    pub fn cascade_paragraph(&self, properties: &mut ParagraphProperties) {
        for frame in self.frame.into_iter().flat_map(|frame| frame.ancestors()) {
            properties.inherit_from(&frame.paragraph);
        }
    }

    /// Effective run properties for content created in this scope
    pub fn run_properties(&self) -> RunProperties {
        let mut properties = RunProperties::default();
        self.cascade_run(&mut properties);
        properties
    }

    /// Paragraph properties for paragraphs the innermost frame creates: all
    /// of its own properties plus the inheritable ones of its ancestors
    pub fn paragraph_properties(&self) -> ParagraphProperties {
        let Some(frame) = self.frame else {
            return ParagraphProperties::default();
        };
        let mut properties = frame.paragraph.clone();
        for ancestor in frame.ancestors().skip(1) {
            properties.inherit_from(&ancestor.paragraph);
        }
        properties
    }

    /// Next id of a counter; the first call scans the target document
    pub fn next_id(&self, counter: Counter) -> u32 {
        let current = self
            .bag
            .get::<u32>(counter.key())
            .unwrap_or_else(|| counter.scan(self.session.document));
        let next = current + 1;
        self.bag.set(counter.key(), next);
        debug!(?counter, id = next, "allocated id");
        next
    }
}
