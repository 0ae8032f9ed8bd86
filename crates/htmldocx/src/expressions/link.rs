//! Hyperlinks and bookmarks.

use htmldocx_core::{Hyperlink, Inline, LinkTarget, ParagraphProperties, Run, RunProperties};
use tracing::debug;

use super::{compose, interpret_children, Interpret, Output};
use crate::context::{Counter, ParsingContext};
use crate::document::StyleKind;
use crate::node::NodeRef;
use crate::utilities::{clean_attribute, sanitize_href};

pub(crate) struct LinkExpression<'a> {
    node: NodeRef<'a>,
}

impl<'a> LinkExpression<'a> {
    pub fn new(node: NodeRef<'a>) -> Self {
        Self { node }
    }

    fn target(&self, ctx: &ParsingContext<'_>) -> Option<LinkTarget> {
        let raw = self.node.attr("href")?;
        let Some(href) = sanitize_href(raw) else {
            debug!(href = raw, "link target rejected, keeping text only");
            return None;
        };

        let options = ctx.options();
        if let Some(anchor) = href.strip_prefix('#') {
            if options.exclude_link_anchors {
                return None;
            }
            let anchor = if anchor.is_empty() || anchor.eq_ignore_ascii_case("top") {
                "_top"
            } else {
                anchor
            };
            return Some(LinkTarget::Anchor(anchor.to_string()));
        }

        let uri = match &options.base_uri {
            Some(base) => base.resolve(href),
            None => href.to_string(),
        };
        let id = ctx.session().document.add_hyperlink(&uri);
        Some(LinkTarget::Relationship(id))
    }

    fn bookmark_name(&self) -> Option<String> {
        clean_attribute(self.node.attr("name")).or_else(|| clean_attribute(self.node.attr("id")))
    }
}

impl Interpret for LinkExpression<'_> {
    fn interpret(&self, ctx: &ParsingContext<'_>) -> Vec<Output> {
        let target = self.target(ctx);
        let defaults = RunProperties {
            style: target
                .as_ref()
                .map(|_| ctx.session().builtin_style("Hyperlink", StyleKind::Character)),
            ..Default::default()
        };
        let composed = compose(
            &self.node,
            ctx,
            StyleKind::Character,
            defaults,
            ParagraphProperties::default(),
        );
        let text = composed.text_flags(ctx.text());
        let frame = ctx.frame(composed.run, ParagraphProperties::default());
        let inner = ctx.with_frame(&frame).with_text(text);

        let mut outputs = interpret_children(&self.node, &inner);
        if let Some(target) = target {
            let tooltip = clean_attribute(self.node.attr("title"));
            outputs = wrap_runs(outputs, &target, tooltip.as_deref());
        }
        if let Some(name) = self.bookmark_name() {
            let id = ctx.next_id(Counter::Bookmark);
            outputs.insert(0, Output::Inline(Inline::BookmarkStart { id, name }));
            outputs.push(Output::Inline(Inline::BookmarkEnd { id }));
        }
        outputs
    }
}

/// Wrap each stretch of consecutive runs in a hyperlink; anything else a
/// link contains passes through unlinked
fn wrap_runs(outputs: Vec<Output>, target: &LinkTarget, tooltip: Option<&str>) -> Vec<Output> {
    let mut wrapped = Vec::new();
    let mut runs: Vec<Run> = Vec::new();
    let close = |runs: &mut Vec<Run>, wrapped: &mut Vec<Output>| {
        if !runs.is_empty() {
            wrapped.push(Output::Inline(Inline::Hyperlink(Hyperlink {
                target: target.clone(),
                tooltip: tooltip.map(str::to_string),
                runs: std::mem::take(runs),
            })));
        }
    };
    for output in outputs {
        match output {
            Output::Inline(Inline::Run(run)) => runs.push(run),
            other => {
                close(&mut runs, &mut wrapped);
                wrapped.push(other);
            }
        }
    }
    close(&mut runs, &mut wrapped);
    wrapped
}
