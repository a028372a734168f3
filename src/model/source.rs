//! Where model bytes come from.

use std::io::Read;
use std::path::PathBuf;

use crate::error::GlobeError;

const CHUNK_SIZE: usize = 64 * 1024;

/// Byte-level progress callback: `(loaded, total)`; `total` is `None` when
/// the source cannot tell.
pub type ProgressFn<'a> = dyn FnMut(u64, Option<u64>) + 'a;

/// Fetches asset bytes by path or URL.
///
/// Sources are shared with the loader's background thread, so they must be
/// `Send + Sync`. `fetch` blocks; it is only ever called off the main thread.
pub trait AssetSource: Send + Sync {
    /// Fetch the whole asset, reporting progress as bytes arrive.
    ///
    /// # Errors
    ///
    /// Returns [`GlobeError::AssetFetch`] when the asset cannot be read.
    fn fetch(
        &self,
        path: &str,
        progress: &mut ProgressFn<'_>,
    ) -> Result<Vec<u8>, GlobeError>;

    /// Resolve `relative` against the asset at `base` (for external glTF
    /// buffers). The default replaces the last `/`-separated segment.
    fn resolve(&self, base: &str, relative: &str) -> String {
        match base.rfind('/') {
            Some(slash) => format!("{}/{relative}", &base[..slash]),
            None => relative.to_owned(),
        }
    }
}

fn fetch_error(path: &str, message: impl ToString) -> GlobeError {
    GlobeError::AssetFetch {
        path: path.to_owned(),
        message: message.to_string(),
    }
}

/// Drain `reader` in fixed-size chunks, reporting progress after each.
fn read_chunked(
    path: &str,
    mut reader: impl Read,
    total: Option<u64>,
    progress: &mut ProgressFn<'_>,
) -> Result<Vec<u8>, GlobeError> {
    let capacity = total.map_or(0, |t| t.min(256 * 1024 * 1024) as usize);
    let mut bytes = Vec::with_capacity(capacity);
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(fetch_error(path, e)),
        };
        bytes.extend_from_slice(&chunk[..n]);
        progress(bytes.len() as u64, total);
    }
    Ok(bytes)
}

/// Reads assets from the local filesystem, relative to a root directory.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    /// Source rooted at `root`. Absolute paths bypass the root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for FileSource {
    fn default() -> Self {
        Self::new(".")
    }
}

impl AssetSource for FileSource {
    fn fetch(
        &self,
        path: &str,
        progress: &mut ProgressFn<'_>,
    ) -> Result<Vec<u8>, GlobeError> {
        let full = self.root.join(path);
        let file =
            std::fs::File::open(&full).map_err(|e| fetch_error(path, e))?;
        let total = file.metadata().ok().map(|m| m.len());
        read_chunked(path, file, total, progress)
    }
}

/// Fetches assets over HTTP(S).
#[cfg(feature = "http")]
#[derive(Debug, Clone, Default)]
pub struct HttpSource {
    base_url: Option<String>,
}

#[cfg(feature = "http")]
impl HttpSource {
    /// Source that resolves relative paths against `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
        }
    }

    fn url_for(&self, path: &str) -> String {
        if is_url(path) {
            return path.to_owned();
        }
        match &self.base_url {
            Some(base) => {
                format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
            }
            None => path.to_owned(),
        }
    }
}

#[cfg(feature = "http")]
impl AssetSource for HttpSource {
    fn fetch(
        &self,
        path: &str,
        progress: &mut ProgressFn<'_>,
    ) -> Result<Vec<u8>, GlobeError> {
        let url = self.url_for(path);
        log::debug!("GET {url}");
        let response =
            ureq::get(&url).call().map_err(|e| fetch_error(&url, e))?;
        let total = response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let reader = response.into_body().into_reader();
        read_chunked(&url, reader, total, progress)
    }
}

/// Whether `path` looks like an absolute HTTP(S) URL.
pub fn is_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}
