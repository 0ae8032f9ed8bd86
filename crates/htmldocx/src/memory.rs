//! In-memory target document.
//!
//! [`MemoryDocument`] keeps the body, notes, relationships, styles and
//! numbering definitions a converter writes, and scans its own body for the
//! id counters a fresh conversion starts from.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt::Write;

use indexmap::IndexMap;

use htmldocx_core::{escape_xml, Block, Inline, Paragraph, RunContent};

use crate::document::{NoteKind, NumberingStore, StyleCatalog, StyleKind, TargetDocument};
use crate::loader::Resource;
use crate::numbering::{ListStyle, MAX_LEVEL};

/// Twips of indentation per list level
const LEVEL_INDENT: u32 = 720;
const HANGING_INDENT: u32 = 360;

/// A package relationship
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relationship {
    Hyperlink(String),
    Image(Resource),
}

#[derive(Debug, Clone)]
struct StyleEntry {
    id: String,
    name: String,
    kind: StyleKind,
}

#[derive(Debug, Clone)]
struct Instance {
    id: u32,
    template: u32,
    start: Option<u32>,
    overrides: BTreeMap<u32, (ListStyle, Option<u32>)>,
}

type MissingHook = Box<dyn Fn(&str, StyleKind) -> Option<String>>;

/// Single-threaded document model backing the collaborator traits
#[derive(Default)]
pub struct MemoryDocument {
    body: RefCell<Vec<Block>>,
    footnotes: RefCell<BTreeMap<u32, Vec<Paragraph>>>,
    endnotes: RefCell<BTreeMap<u32, Vec<Paragraph>>>,
    relationships: RefCell<IndexMap<String, Relationship>>,
    styles: RefCell<Vec<StyleEntry>>,
    missing_requests: RefCell<Vec<(String, StyleKind)>>,
    missing_hook: Option<MissingHook>,
    templates: RefCell<IndexMap<u32, ListStyle>>,
    instances: RefCell<Vec<Instance>>,
    next_numbering_id: Cell<u32>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a style definition
    pub fn with_style(self, id: &str, name: &str, kind: StyleKind) -> Self {
        self.styles.borrow_mut().push(StyleEntry {
            id: id.to_string(),
            name: name.to_string(),
            kind,
        });
        self
    }

    /// Install a callback consulted when a style is missing
    pub fn on_missing_style(
        mut self,
        hook: impl Fn(&str, StyleKind) -> Option<String> + 'static,
    ) -> Self {
        self.missing_hook = Some(Box::new(hook));
        self
    }

    /// Append converted blocks to the body
    pub fn append(&self, blocks: impl IntoIterator<Item = Block>) {
        self.body.borrow_mut().extend(blocks);
    }

    pub fn body(&self) -> Vec<Block> {
        self.body.borrow().clone()
    }

    pub fn note(&self, kind: NoteKind, id: u32) -> Option<Vec<Paragraph>> {
        self.notes(kind).borrow().get(&id).cloned()
    }

    pub fn note_count(&self, kind: NoteKind) -> usize {
        self.notes(kind).borrow().len()
    }

    pub fn relationship(&self, id: &str) -> Option<Relationship> {
        self.relationships.borrow().get(id).cloned()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.borrow().len()
    }

    /// Every `(name, kind)` reported missing, in request order
    pub fn missing_styles(&self) -> Vec<(String, StyleKind)> {
        self.missing_requests.borrow().clone()
    }

    /// Style override on a zero-based level of an instance
    pub fn level_override(&self, instance: u32, level: u32) -> Option<ListStyle> {
        self.instances
            .borrow()
            .iter()
            .find(|i| i.id == instance)
            .and_then(|i| i.overrides.get(&level))
            .map(|(style, _)| *style)
    }

    pub fn template_count(&self) -> usize {
        self.templates.borrow().len()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.borrow().len()
    }

    fn notes(&self, kind: NoteKind) -> &RefCell<BTreeMap<u32, Vec<Paragraph>>> {
        match kind {
            NoteKind::Footnote => &self.footnotes,
            NoteKind::Endnote => &self.endnotes,
        }
    }

    fn next_relationship_id(&self) -> String {
        format!("rId{}", self.relationships.borrow().len() + 1)
    }

    fn allocate_numbering_id(&self) -> u32 {
        let id = self.next_numbering_id.get() + 1;
        self.next_numbering_id.set(id);
        id
    }

    /// Visit every inline of the body, descending into table cells
    fn each_inline(&self, mut visit: impl FnMut(&Inline)) {
        fn walk(blocks: &[Block], visit: &mut dyn FnMut(&Inline)) {
            for block in blocks {
                match block {
                    Block::Paragraph(p) => p.content.iter().for_each(|i| visit(i)),
                    Block::Table(t) => {
                        for row in &t.rows {
                            for cell in &row.cells {
                                walk(&cell.blocks, visit);
                            }
                        }
                    }
                }
            }
        }
        walk(&self.body.borrow(), &mut visit);
    }

    /// Render the `w:numbering` part
    pub fn numbering_xml(&self) -> String {
        let mut out = String::from(
            r#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
        );
        for (id, style) in self.templates.borrow().iter() {
            let _ = write!(out, r#"<w:abstractNum w:abstractNumId="{id}">"#);
            out.push_str(r#"<w:multiLevelType w:val="hybridMultilevel"/>"#);
            for level in 0..MAX_LEVEL {
                write_level(&mut out, level, *style, None);
            }
            out.push_str("</w:abstractNum>");
        }
        for instance in self.instances.borrow().iter() {
            let _ = write!(
                out,
                r#"<w:num w:numId="{}"><w:abstractNumId w:val="{}"/>"#,
                instance.id, instance.template
            );
            if let Some(start) = instance.start {
                let _ = write!(
                    out,
                    r#"<w:lvlOverride w:ilvl="0"><w:startOverride w:val="{start}"/></w:lvlOverride>"#
                );
            }
            for (level, (style, start)) in &instance.overrides {
                let _ = write!(out, r#"<w:lvlOverride w:ilvl="{level}">"#);
                write_level(&mut out, *level, *style, *start);
                out.push_str("</w:lvlOverride>");
            }
            out.push_str("</w:num>");
        }
        out.push_str("</w:numbering>");
        out
    }
}

fn write_level(out: &mut String, level: u32, style: ListStyle, start: Option<u32>) {
    let indent = LEVEL_INDENT * (level + 1);
    let _ = write!(
        out,
        r#"<w:lvl w:ilvl="{level}"><w:start w:val="{}"/><w:numFmt w:val="{}"/><w:lvlText w:val="{}"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="{indent}" w:hanging="{HANGING_INDENT}"/></w:pPr></w:lvl>"#,
        start.unwrap_or(1),
        style.number_format(),
        escape_xml(&style.level_text(level)),
    );
}

impl TargetDocument for MemoryDocument {
    fn max_note_id(&self, kind: NoteKind) -> u32 {
        let stored = self.notes(kind).borrow().keys().next_back().copied().unwrap_or(0);
        let mut referenced = 0;
        self.each_inline(|inline| {
            for run in inline.runs() {
                for piece in &run.content {
                    match (kind, piece) {
                        (NoteKind::Footnote, RunContent::FootnoteReference(id))
                        | (NoteKind::Endnote, RunContent::EndnoteReference(id)) => {
                            referenced = referenced.max(*id)
                        }
                        _ => {}
                    }
                }
            }
        });
        stored.max(referenced)
    }

    fn max_bookmark_id(&self) -> u32 {
        let mut max = 0;
        self.each_inline(|inline| {
            if let Inline::BookmarkStart { id, .. } = inline {
                max = max.max(*id);
            }
        });
        max
    }

    fn max_drawing_id(&self) -> u32 {
        let mut max = 0;
        self.each_inline(|inline| {
            for run in inline.runs() {
                for piece in &run.content {
                    if let RunContent::Drawing(drawing) = piece {
                        max = max.max(drawing.id);
                    }
                }
            }
        });
        max
    }

    fn caption_count(&self, sequence: &str) -> u32 {
        let mut count = 0;
        self.each_inline(|inline| {
            if let Inline::Field(field) = inline {
                let mut words = field.instruction.split_whitespace();
                if words.next().is_some_and(|w| w.eq_ignore_ascii_case("SEQ"))
                    && words.next().is_some_and(|w| w.eq_ignore_ascii_case(sequence))
                {
                    count += 1;
                }
            }
        });
        count
    }

    fn add_note(&self, kind: NoteKind, id: u32, paragraphs: Vec<Paragraph>) {
        self.notes(kind).borrow_mut().insert(id, paragraphs);
    }

    fn add_hyperlink(&self, uri: &str) -> String {
        let existing = self
            .relationships
            .borrow()
            .iter()
            .find(|(_, rel)| matches!(rel, Relationship::Hyperlink(u) if u == uri))
            .map(|(id, _)| id.clone());
        if let Some(id) = existing {
            return id;
        }
        let id = self.next_relationship_id();
        self.relationships
            .borrow_mut()
            .insert(id.clone(), Relationship::Hyperlink(uri.to_string()));
        id
    }

    fn add_image(&self, resource: &Resource) -> Option<String> {
        let id = self.next_relationship_id();
        self.relationships
            .borrow_mut()
            .insert(id.clone(), Relationship::Image(resource.clone()));
        Some(id)
    }
}

impl StyleCatalog for MemoryDocument {
    fn resolve(&self, name: &str, kind: StyleKind) -> Option<String> {
        self.styles
            .borrow()
            .iter()
            .filter(|s| s.kind == kind)
            .find(|s| s.id.eq_ignore_ascii_case(name) || s.name.eq_ignore_ascii_case(name))
            .map(|s| s.id.clone())
    }

    fn missing(&self, name: &str, kind: StyleKind) -> Option<String> {
        self.missing_requests
            .borrow_mut()
            .push((name.to_string(), kind));
        let hook = self.missing_hook.as_ref()?;
        let id = hook(name, kind)?;
        self.styles.borrow_mut().push(StyleEntry {
            id: id.clone(),
            name: name.to_string(),
            kind,
        });
        Some(id)
    }
}

impl NumberingStore for MemoryDocument {
    fn find_template(&self, style: ListStyle) -> Option<u32> {
        self.templates
            .borrow()
            .iter()
            .find(|(_, s)| **s == style)
            .map(|(id, _)| *id)
    }

    fn create_template(&self, style: ListStyle) -> u32 {
        let id = self.allocate_numbering_id();
        self.templates.borrow_mut().insert(id, style);
        id
    }

    fn create_instance(&self, template: u32, start: Option<u32>) -> u32 {
        let id = self.allocate_numbering_id();
        self.instances.borrow_mut().push(Instance {
            id,
            template,
            start,
            overrides: BTreeMap::new(),
        });
        id
    }

    fn override_level(&self, instance: u32, level: u32, style: ListStyle, start: Option<u32>) {
        if let Some(found) = self
            .instances
            .borrow_mut()
            .iter_mut()
            .find(|i| i.id == instance)
        {
            found.overrides.insert(level, (style, start));
        }
    }

    fn template_style(&self, template: u32) -> Option<ListStyle> {
        self.templates.borrow().get(&template).copied()
    }

    fn level_format(&self, instance: u32, level: u32) -> Option<(ListStyle, Option<u32>)> {
        self.instances
            .borrow()
            .iter()
            .find(|i| i.id == instance)
            .and_then(|i| i.overrides.get(&level).copied())
    }

    fn clear_override(&self, instance: u32, level: u32) {
        if let Some(found) = self
            .instances
            .borrow_mut()
            .iter_mut()
            .find(|i| i.id == instance)
        {
            found.overrides.remove(&level);
        }
    }

    fn last_instance(&self, template: u32) -> Option<u32> {
        self.instances
            .borrow()
            .iter()
            .rev()
            .find(|i| i.template == template)
            .map(|i| i.id)
    }
}
