//! Glyph-rendering resources for the spatial word-cloud strategies.
//!
//! CJK comment data is the norm here, and most default fonts cannot draw
//! it. Resource acquisition is therefore explicit: an uploaded font always
//! wins, otherwise a one-time scan over known CJK font locations is
//! memoized for the session. The resolved resource set is handed to the
//! strategy selector up front so selection stays deterministic.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use ttf_parser::Face;
use url::Url;

use crate::error::FontError;

/// Bounded timeout for remote font acquisition.
pub const FONT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Where a font resource came from. Uploaded fonts outrank discovered ones.
#[derive(Debug, Clone)]
pub enum FontOrigin {
    Uploaded,
    System(PathBuf),
    Remote(Url),
}

/// A validated TTF/OTF face. Bytes are shared, not copied, across the
/// strategies that consult coverage.
#[derive(Clone)]
pub struct FontResource {
    pub name: String,
    pub origin: FontOrigin,
    data: Arc<Vec<u8>>,
}

impl fmt::Debug for FontResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontResource")
            .field("name", &self.name)
            .field("origin", &self.origin)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl FontResource {
    /// Validate and wrap raw font bytes. Rejects anything `ttf-parser`
    /// cannot open as face index 0.
    pub fn from_bytes(name: &str, bytes: Vec<u8>, origin: FontOrigin) -> Result<Self, FontError> {
        Face::parse(&bytes, 0).map_err(FontError::Parse)?;
        Ok(FontResource {
            name: name.to_string(),
            origin,
            data: Arc::new(bytes),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, FontError> {
        let bytes = fs::read(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("font")
            .to_string();
        FontResource::from_bytes(&name, bytes, FontOrigin::System(path.to_path_buf()))
    }

    /// True when the face has a glyph for every non-whitespace char.
    pub fn covers(&self, text: &str) -> bool {
        let Ok(face) = Face::parse(&self.data, 0) else {
            return false;
        };
        text.chars()
            .filter(|c| !c.is_whitespace())
            .all(|c| face.glyph_index(c).is_some())
    }

    pub fn covers_all<'a, I>(&self, tokens: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        tokens.into_iter().all(|t| self.covers(t))
    }
}

/// Everything the strategy selector may consume besides the frequency
/// table. Resolved once per render action; no hidden lookups later.
#[derive(Debug, Clone, Default)]
pub struct ResourceSet {
    pub font: Option<FontResource>,
}

/// Session-scoped font lookup with memoized discovery.
///
/// Discovery is expensive and deterministic per environment, so its result
/// is cached; uploading a font invalidates the cache and takes priority on
/// the next resolve.
#[derive(Debug)]
pub struct FontCatalog {
    uploaded: Option<FontResource>,
    search_paths: Vec<PathBuf>,
    discovered: Option<Option<FontResource>>,
}

impl Default for FontCatalog {
    fn default() -> Self {
        FontCatalog::new()
    }
}

impl FontCatalog {
    pub fn new() -> Self {
        FontCatalog {
            uploaded: None,
            search_paths: default_search_paths(),
            discovered: None,
        }
    }

    /// Catalog restricted to explicit locations; used by tests and by
    /// callers that manage their own font directories.
    pub fn with_search_paths(paths: Vec<PathBuf>) -> Self {
        FontCatalog {
            uploaded: None,
            search_paths: paths,
            discovered: None,
        }
    }

    /// Register an uploaded font. Wins over any discovered font and drops
    /// the memoized scan result.
    pub fn set_uploaded(&mut self, font: FontResource) {
        debug!("uploaded font registered - name={}", font.name);
        self.uploaded = Some(font);
        self.discovered = None;
    }

    pub fn upload_file(&mut self, path: &Path) -> Result<(), FontError> {
        let bytes = fs::read(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("uploaded")
            .to_string();
        let font = FontResource::from_bytes(&name, bytes, FontOrigin::Uploaded)?;
        self.set_uploaded(font);
        Ok(())
    }

    /// Fetch a font over HTTP with a bounded timeout. The result is
    /// returned, not installed; callers decide whether it becomes the
    /// session upload.
    pub fn fetch_remote(&self, url: &Url, timeout: Duration) -> Result<FontResource, FontError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FontError::Fetch(e.to_string()))?;

        let start = std::time::Instant::now();
        let resp = client
            .get(url.clone())
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| FontError::Fetch(e.to_string()))?;
        let bytes = resp
            .bytes()
            .map_err(|e| FontError::Fetch(e.to_string()))?
            .to_vec();

        debug!(
            "remote font fetched - url={}, bytes={}, duration={:.2}s",
            url,
            bytes.len(),
            start.elapsed().as_secs_f32()
        );

        let name = url
            .path_segments()
            .and_then(|mut s| s.next_back())
            .unwrap_or("remote")
            .to_string();
        FontResource::from_bytes(&name, bytes, FontOrigin::Remote(url.clone()))
    }

    /// Resolve the session font: uploaded first, else memoized discovery.
    pub fn resolve(&mut self) -> Option<FontResource> {
        if let Some(uploaded) = &self.uploaded {
            return Some(uploaded.clone());
        }
        if self.discovered.is_none() {
            self.discovered = Some(self.scan());
        }
        self.discovered.clone().flatten()
    }

    /// The resource set handed to one strategy-selector invocation.
    pub fn resources(&mut self) -> ResourceSet {
        ResourceSet { font: self.resolve() }
    }

    fn scan(&self) -> Option<FontResource> {
        for path in &self.search_paths {
            if !path.is_file() {
                continue;
            }
            match FontResource::from_file(path) {
                Ok(font) => {
                    debug!("font discovered - path={}", path.display());
                    return Some(font);
                }
                Err(e) => {
                    debug!("skipping unusable font - path={}, err={}", path.display(), e);
                }
            }
        }
        warn!("no usable font found in {} search paths", self.search_paths.len());
        None
    }
}

/// The CJK-capable fonts the upstream dashboard probed for, per platform.
fn default_search_paths() -> Vec<PathBuf> {
    [
        // Linux
        "/usr/share/fonts/truetype/wqy/wqy-zenhei.ttc",
        "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
        // macOS
        "/System/Library/Fonts/PingFang.ttc",
        "/System/Library/Fonts/STHeiti Light.ttc",
        "/Library/Fonts/Arial Unicode.ttf",
        // Windows
        "C:\\Windows\\Fonts\\simhei.ttf",
        "C:\\Windows\\Fonts\\msyh.ttc",
        "C:\\Windows\\Fonts\\simsun.ttc",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}
