//! Image resource loading.
//!
//! [`DefaultLoader`] understands `data:` URIs, local paths and, with the
//! `http` feature, remote URLs. [`CachingLoader`] wraps any loader so each
//! distinct locator is fetched at most once, even when requested from
//! several threads at the same time.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use percent_encoding::percent_decode_str;
use tracing::{debug, warn};

use crate::options::{is_absolute_uri, BaseUri};
use crate::{ConvertError, Result};

/// A fetched image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub bytes: Arc<[u8]>,
    /// MIME type, e.g. `image/png`
    pub mime: String,
    /// Intrinsic size in pixels, when the header could be read
    pub dimensions: Option<(u32, u32)>,
}

impl Resource {
    /// Build a resource from raw bytes.
    ///
    /// The format is sniffed from the content; a declared `image/*` type is
    /// only trusted when sniffing fails. Returns `None` for non-image data.
    pub fn from_bytes(bytes: Vec<u8>, declared_mime: Option<&str>) -> Option<Resource> {
        if bytes.is_empty() {
            return None;
        }
        let mime = match image::guess_format(&bytes) {
            Ok(format) => format.to_mime_type().to_string(),
            Err(_) => declared_mime
                .map(|m| m.trim().to_ascii_lowercase())
                .filter(|m| m.starts_with("image/"))?,
        };
        let dimensions = image_dimensions(&bytes);
        Some(Resource {
            bytes: bytes.into(),
            mime,
            dimensions,
        })
    }

    /// File extension for the image part
    pub fn extension(&self) -> &str {
        match self.mime.as_str() {
            "image/jpeg" => "jpeg",
            "image/svg+xml" => "svg",
            mime => mime.strip_prefix("image/").unwrap_or("bin"),
        }
    }
}

/// Read width and height from an image header without decoding pixels
fn image_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let reader = image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?;
    reader.into_dimensions().ok().or_else(|| png_dimensions(data))
}

/// Width and height from the IHDR chunk of a PNG
fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 24 || &data[0..8] != b"\x89PNG\r\n\x1a\n" {
        return None;
    }
    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
    Some((width, height))
}

/// Fetches image resources by locator.
///
/// A failed fetch returns `None`; the converter then falls back to the
/// image's alternate text.
pub trait ResourceLoader: Send + Sync {
    fn fetch(&self, locator: &str) -> Option<Resource>;
}

/// Loader for `data:` URIs, local files and http(s) URLs
pub struct DefaultLoader {
    base_uri: Option<BaseUri>,
    #[cfg(feature = "http")]
    agent: ureq::Agent,
}

impl DefaultLoader {
    pub fn new(base_uri: Option<BaseUri>, timeout: Duration) -> Self {
        #[cfg(not(feature = "http"))]
        let _ = timeout;
        Self {
            base_uri,
            #[cfg(feature = "http")]
            agent: ureq::Agent::config_builder()
                .timeout_global(Some(timeout))
                .http_status_as_error(false)
                .build()
                .into(),
        }
    }

    fn load(&self, locator: &str) -> Result<Resource> {
        let locator = match &self.base_uri {
            Some(base) if !is_absolute_uri(locator) => base.resolve(locator),
            _ => locator.to_string(),
        };
        let lower = locator.to_ascii_lowercase();

        let (bytes, declared) = if lower.starts_with("data:") {
            decode_data_uri(&locator)?
        } else if lower.starts_with("http://") || lower.starts_with("https://") {
            (self.download(&locator)?, None)
        } else {
            let path = locator
                .strip_prefix("file://")
                .map(|p| percent_decode_str(p).decode_utf8_lossy().into_owned())
                .unwrap_or_else(|| locator.clone());
            (read_file(Path::new(&path))?, None)
        };

        Resource::from_bytes(bytes, declared.as_deref())
            .ok_or_else(|| ConvertError::Resource(format!("{locator}: not an image")))
    }

    #[cfg(feature = "http")]
    fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| ConvertError::Resource(format!("{url}: {e}")))?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(ConvertError::Resource(format!("{url}: HTTP {status}")));
        }
        response
            .into_body()
            .read_to_vec()
            .map_err(|e| ConvertError::Resource(format!("{url}: {e}")))
    }

    #[cfg(not(feature = "http"))]
    fn download(&self, url: &str) -> Result<Vec<u8>> {
        Err(ConvertError::Resource(format!(
            "{url}: remote fetching requires the `http` feature"
        )))
    }
}

impl ResourceLoader for DefaultLoader {
    fn fetch(&self, locator: &str) -> Option<Resource> {
        match self.load(locator) {
            Ok(resource) => Some(resource),
            Err(e) => {
                warn!("{e}");
                None
            }
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| ConvertError::Resource(format!("{}: {e}", path.display())))
}

/// Split a `data:` URI into its payload and declared media type
fn decode_data_uri(uri: &str) -> Result<(Vec<u8>, Option<String>)> {
    let rest = &uri["data:".len()..];
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ConvertError::Resource("data URI without payload".to_string()))?;

    let mut params = header.split(';');
    let mime = params
        .next()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string);
    let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        let compact: String = percent_decode_str(payload)
            .decode_utf8_lossy()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        BASE64_STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| ConvertError::Resource(format!("data URI: {e}")))?
    } else {
        percent_decode_str(payload).collect()
    };
    Ok((bytes, mime))
}

/// Cancels outstanding and future fetches of a [`CachingLoader`]
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

type Slot = Arc<OnceCell<Option<Resource>>>;

/// Memoizes another loader per locator.
///
/// Concurrent requests for the same locator wait on one fetch instead of
/// issuing duplicates. Failures are cached too.
pub struct CachingLoader<L> {
    inner: L,
    slots: Mutex<HashMap<String, Slot>>,
    cancel: CancelHandle,
}

impl<L: ResourceLoader> CachingLoader<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            slots: Mutex::new(HashMap::new()),
            cancel: CancelHandle::default(),
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Number of distinct locators requested so far
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<L: ResourceLoader> ResourceLoader for CachingLoader<L> {
    fn fetch(&self, locator: &str) -> Option<Resource> {
        if self.cancel.is_cancelled() {
            debug!(locator, "fetch skipped after cancellation");
            return None;
        }
        let slot = {
            let mut slots = self.slots.lock();
            slots.entry(locator.to_string()).or_default().clone()
        };
        slot.get_or_init(|| {
            if self.cancel.is_cancelled() {
                return None;
            }
            self.inner.fetch(locator)
        })
        .clone()
    }
}
