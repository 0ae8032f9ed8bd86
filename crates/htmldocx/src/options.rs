//! Conversion options.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{ConvertError, Result};

static ABSOLUTE_URI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zA-Z][a-zA-Z0-9+.\-]*):").unwrap());

static BASE_URI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:https?|ftp)://[^\s/?#]+|file://[^\s?#]*)(?:[^\s#]*)?$").unwrap()
});

/// Where `abbr`/`acronym` titles are placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotePosition {
    /// Bottom of the page
    #[default]
    Footnote,
    /// End of the document
    Endnote,
}

/// Placement of a table caption relative to its table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptionPosition {
    #[default]
    Above,
    Below,
}

/// How an outermost list picks its numbering instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberingPolicy {
    /// Every outermost list starts a fresh instance
    #[default]
    Restart,
    /// An outermost list continues the last instance of its template,
    /// unless it directly follows a list of the same style or declares `start`
    Continue,
}

/// Part of the document the output is destined for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionTarget {
    #[default]
    Body,
    Header,
    Footer,
}

/// A validated absolute base URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUri(String);

impl BaseUri {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if !BASE_URI_RE.is_match(raw) {
            return Err(ConvertError::InvalidBaseUri(raw.to_string()));
        }
        Ok(BaseUri(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve a reference against this base.
    ///
    /// Absolute references and data URIs are returned unchanged.
    pub fn resolve(&self, reference: &str) -> String {
        let reference = reference.trim();
        if is_absolute_uri(reference) {
            return reference.to_string();
        }

        let base = self.0.as_str();
        let scheme_end = base.find("://").map(|i| i + 3).unwrap_or(0);
        let origin_end = base[scheme_end..]
            .find('/')
            .map(|i| scheme_end + i)
            .unwrap_or(base.len());

        if let Some(rest) = reference.strip_prefix("//") {
            let scheme = &base[..scheme_end.saturating_sub(3)];
            return format!("{}://{}", scheme, rest);
        }
        if reference.starts_with('/') {
            return format!("{}{}", &base[..origin_end], reference);
        }

        let path = &base[..base.find(['?', '#']).unwrap_or(base.len())];
        let dir_end = path
            .rfind('/')
            .filter(|i| *i >= origin_end)
            .map(|i| i + 1);
        match dir_end {
            Some(end) => format!("{}{}", &path[..end], reference),
            None => format!("{}/{}", path, reference),
        }
    }
}

/// `true` when the locator carries its own scheme (`http:`, `data:`, `mailto:`, ...)
pub fn is_absolute_uri(locator: &str) -> bool {
    ABSOLUTE_URI_RE
        .captures(locator)
        .and_then(|c| c.get(1))
        // a single letter is a Windows drive, not a scheme
        .is_some_and(|scheme| scheme.as_str().len() > 1)
}

/// Options for HtmlConverter
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Footnote or endnote for acronym titles
    pub note_position: NotePosition,

    /// Table caption placement
    pub caption_position: CaptionPosition,

    /// Render `<pre>` blocks inside a single-cell table
    pub pre_as_table: bool,

    /// Numbering continuation across independent lists and calls
    pub numbering: NumberingPolicy,

    /// Render in-document `#anchor` links as plain text
    pub exclude_link_anchors: bool,

    /// Base for relative image and link locators
    pub base_uri: Option<BaseUri>,

    /// Body, header or footer
    pub target: ConversionTarget,

    /// Resolution used to convert pixels to document units
    pub image_dpi: u32,

    /// Timeout for remote resource fetches
    pub fetch_timeout: Duration,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            note_position: NotePosition::Footnote,
            caption_position: CaptionPosition::Above,
            pre_as_table: false,
            numbering: NumberingPolicy::Restart,
            exclude_link_anchors: false,
            base_uri: None,
            target: ConversionTarget::Body,
            image_dpi: 96,
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

impl ConvertOptions {
    pub fn builder() -> ConvertOptionsBuilder {
        ConvertOptionsBuilder::default()
    }
}

/// Builder validating raw configuration values up front
#[derive(Debug, Default)]
pub struct ConvertOptionsBuilder {
    options: ConvertOptions,
    base_uri: Option<String>,
}

impl ConvertOptionsBuilder {
    pub fn note_position(mut self, position: NotePosition) -> Self {
        self.options.note_position = position;
        self
    }

    pub fn caption_position(mut self, position: CaptionPosition) -> Self {
        self.options.caption_position = position;
        self
    }

    pub fn pre_as_table(mut self, enabled: bool) -> Self {
        self.options.pre_as_table = enabled;
        self
    }

    pub fn numbering(mut self, policy: NumberingPolicy) -> Self {
        self.options.numbering = policy;
        self
    }

    pub fn exclude_link_anchors(mut self, exclude: bool) -> Self {
        self.options.exclude_link_anchors = exclude;
        self
    }

    pub fn base_uri(mut self, uri: &str) -> Self {
        self.base_uri = Some(uri.to_string());
        self
    }

    pub fn target(mut self, target: ConversionTarget) -> Self {
        self.options.target = target;
        self
    }

    pub fn image_dpi(mut self, dpi: u32) -> Self {
        self.options.image_dpi = dpi;
        self
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.options.fetch_timeout = timeout;
        self
    }

    /// Validate and produce the options.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::InvalidBaseUri`] for a malformed base URI and
    /// [`ConvertError::InvalidConfiguration`] for a zero DPI.
    pub fn build(self) -> Result<ConvertOptions> {
        let mut options = self.options;
        if let Some(raw) = self.base_uri {
            options.base_uri = Some(BaseUri::parse(&raw)?);
        }
        if options.image_dpi == 0 {
            return Err(ConvertError::InvalidConfiguration(
                "image_dpi must be greater than zero".to_string(),
            ));
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let options = ConvertOptions::builder().build().unwrap();
        assert_eq!(options.note_position, NotePosition::Footnote);
        assert_eq!(options.numbering, NumberingPolicy::Restart);
        assert!(options.base_uri.is_none());
    }

    #[test]
    fn test_invalid_base_uri_fails_at_build() {
        let err = ConvertOptions::builder()
            .base_uri("not a uri")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidBaseUri(_)));
    }

    #[test]
    fn test_zero_dpi_rejected() {
        let err = ConvertOptions::builder().image_dpi(0).build().unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_resolve_references() {
        let base = BaseUri::parse("https://example.com/docs/page.html?x=1").unwrap();
        assert_eq!(base.resolve("img/a.png"), "https://example.com/docs/img/a.png");
        assert_eq!(base.resolve("/root.png"), "https://example.com/root.png");
        assert_eq!(base.resolve("//cdn.net/b.png"), "https://cdn.net/b.png");
        assert_eq!(base.resolve("data:image/png;base64,AA"), "data:image/png;base64,AA");

        let host_only = BaseUri::parse("https://example.com").unwrap();
        assert_eq!(host_only.resolve("a.png"), "https://example.com/a.png");
    }

    #[test]
    fn test_absolute_uri_detection() {
        assert!(is_absolute_uri("mailto:someone@example.com"));
        assert!(is_absolute_uri("HTTP://x"));
        assert!(!is_absolute_uri("C:\\images\\a.png"));
        assert!(!is_absolute_uri("images/a.png"));
    }
}
