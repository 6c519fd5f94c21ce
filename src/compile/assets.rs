//! Image assets: per-slide image references, fetching and the resolved set.
//!
//! Fetching is the only asynchronous stage of the pipeline. Every slide's
//! image is fetched on its own task under a bounded wait; a slow, failing or
//! unrecognizable image never fails the deck, it only records a warning and
//! leaves the slide to fall back to a decoration.

use crate::common::error::{Error, ErrorKind, Result, Warning};
use crate::ooxml::pptx::ImageFormat;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Where a slide image comes from: an `http(s)://` URL, a `data:` URL or a
/// local path (optionally `file://`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_data_url(&self) -> bool {
        self.0.starts_with("data:")
    }

    pub fn is_http(&self) -> bool {
        self.0.starts_with("http://") || self.0.starts_with("https://")
    }

    /// Short form for messages; data URLs are not echoed whole.
    fn label(&self) -> &str {
        if self.is_data_url() {
            self.0.split(',').next().unwrap_or("data:")
        } else {
            &self.0
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&str> for ImageRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ImageRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A decoded image ready to be embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub id: String,
    pub bytes: Bytes,
    pub format: ImageFormat,
    /// Pixel size, when the header states it
    pub dims: Option<(u32, u32)>,
}

impl ImageAsset {
    /// Identify the format from the bytes; `None` when it is not a supported
    /// image.
    pub fn from_bytes(id: impl Into<String>, bytes: Bytes) -> Option<Self> {
        let format = ImageFormat::detect_from_bytes(&bytes)?;
        let dims = format.dimensions(&bytes);
        Some(Self {
            id: id.into(),
            bytes,
            format,
            dims,
        })
    }

    /// Width over height, when known and non-degenerate.
    pub fn aspect(&self) -> Option<f64> {
        match self.dims {
            Some((w, h)) if w > 0 && h > 0 => Some(w as f64 / h as f64),
            _ => None,
        }
    }
}

/// Resolved images keyed by zero-based slide index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageAssets {
    by_slide: BTreeMap<usize, ImageAsset>,
}

impl ImageAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, slide: usize, asset: ImageAsset) {
        self.by_slide.insert(slide, asset);
    }

    pub fn for_slide(&self, slide: usize) -> Option<&ImageAsset> {
        self.by_slide.get(&slide)
    }

    pub fn by_id(&self, id: &str) -> Option<&ImageAsset> {
        self.by_slide.values().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.by_slide.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_slide.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &ImageAsset)> {
        self.by_slide.iter().map(|(i, a)| (*i, a))
    }
}

/// Retrieves the raw bytes behind an [`ImageRef`].
pub trait ImageFetcher: Send + Sync + 'static {
    fn fetch(&self, image: &ImageRef) -> impl Future<Output = Result<Bytes>> + Send;
}

/// Fetches `data:` URLs, local files and, with the `http` feature,
/// `http(s)://` URLs.
#[derive(Debug, Clone, Default)]
pub struct DefaultFetcher {
    #[cfg(feature = "http")]
    client: reqwest::Client,
}

impl DefaultFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ImageFetcher for DefaultFetcher {
    async fn fetch(&self, image: &ImageRef) -> Result<Bytes> {
        if image.is_data_url() {
            return decode_data_url(image.as_str());
        }
        if image.is_http() {
            return self.fetch_http(image).await;
        }

        let path = image.as_str().strip_prefix("file://").unwrap_or(image.as_str());
        tokio::fs::read(path)
            .await
            .map(Bytes::from)
            .map_err(|e| Error::ImageFetch(format!("cannot read '{}': {}", path, e)))
    }
}

impl DefaultFetcher {
    #[cfg(feature = "http")]
    async fn fetch_http(&self, image: &ImageRef) -> Result<Bytes> {
        let response = self
            .client
            .get(image.as_str())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::ImageFetch(format!("{}: {}", image, e)))?;
        response
            .bytes()
            .await
            .map_err(|e| Error::ImageFetch(format!("{}: {}", image, e)))
    }

    #[cfg(not(feature = "http"))]
    async fn fetch_http(&self, image: &ImageRef) -> Result<Bytes> {
        Err(Error::ImageFetch(format!(
            "{}: http images need the `http` feature",
            image
        )))
    }
}

/// Decode `data:[<mime>][;base64],<payload>`.
fn decode_data_url(url: &str) -> Result<Bytes> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| Error::ImageFetch("not a data URL".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::ImageFetch("data URL without payload".into()))?;
    if meta.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
        let cleaned: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD
            .decode(cleaned.as_bytes())
            .map(Bytes::from)
            .map_err(|e| Error::ImageFetch(format!("invalid base64 in data URL: {}", e)))
    } else {
        Ok(Bytes::copy_from_slice(payload.as_bytes()))
    }
}

/// Fetches every slide image concurrently under a per-image deadline.
pub struct AssetResolver<F = DefaultFetcher> {
    fetcher: Arc<F>,
    timeout: Duration,
}

impl AssetResolver<DefaultFetcher> {
    pub fn new(timeout: Duration) -> Self {
        Self::with_fetcher(DefaultFetcher::new(), timeout)
    }
}

impl<F: ImageFetcher> AssetResolver<F> {
    pub fn with_fetcher(fetcher: F, timeout: Duration) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            timeout,
        }
    }

    /// Fetch and decode the images in `refs` (keyed by slide index).
    ///
    /// Never fails: each image that times out, cannot be fetched or is not a
    /// supported format yields an `ImageFetch` warning instead of an asset.
    /// Warnings are ordered by slide.
    pub async fn resolve(&self, refs: &BTreeMap<usize, ImageRef>) -> (ImageAssets, Vec<Warning>) {
        let mut tasks = JoinSet::new();
        for (&slide, image) in refs {
            let fetcher = Arc::clone(&self.fetcher);
            let image = image.clone();
            let timeout = self.timeout;
            tasks.spawn(async move {
                let outcome = match tokio::time::timeout(timeout, fetcher.fetch(&image)).await {
                    Ok(fetched) => fetched,
                    Err(_) => Err(Error::ImageFetch(format!(
                        "{}: timed out after {} ms",
                        image,
                        timeout.as_millis()
                    ))),
                };
                (slide, image, outcome)
            });
        }

        let mut assets = ImageAssets::new();
        let mut warnings = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (slide, image, outcome) = match joined {
                Ok(done) => done,
                Err(e) => {
                    warnings.push(Warning::new(
                        ErrorKind::ImageFetch,
                        format!("image task failed: {}", e),
                    ));
                    continue;
                },
            };
            let warning = match outcome {
                Ok(bytes) => {
                    match ImageAsset::from_bytes(format!("slide{}_image", slide + 1), bytes) {
                        Some(asset) => {
                            tracing::debug!(slide, format = ?asset.format, dims = ?asset.dims, "image resolved");
                            assets.insert(slide, asset);
                            continue;
                        },
                        None => format!("{}: unrecognized image data", image),
                    }
                },
                Err(Error::ImageFetch(message)) => message,
                Err(other) => other.to_string(),
            };
            tracing::warn!(slide, %warning, "image fetch failed");
            warnings.push(Warning::on_slide(ErrorKind::ImageFetch, slide, warning));
        }

        warnings.sort_by_key(|w| w.slide);
        (assets, warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1×1 transparent PNG.
    const PNG_1X1: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    struct SlowFetcher;

    impl ImageFetcher for SlowFetcher {
        async fn fetch(&self, image: &ImageRef) -> Result<Bytes> {
            if image.as_str() == "slow" {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            Ok(Bytes::from_static(PNG_1X1))
        }
    }

    #[test]
    fn test_decode_data_url() {
        let url = format!("data:image/png;base64,{}", STANDARD.encode(PNG_1X1));
        assert_eq!(decode_data_url(&url).unwrap().as_ref(), PNG_1X1);
        assert_eq!(decode_data_url("data:text/plain,hi").unwrap().as_ref(), b"hi");
        assert!(decode_data_url("data:image/png;base64").is_err());
        assert!(decode_data_url("data:image/png;base64,!!!").is_err());
    }

    #[test]
    fn test_asset_from_bytes() {
        let asset = ImageAsset::from_bytes("a", Bytes::from_static(PNG_1X1)).unwrap();
        assert_eq!(asset.format, ImageFormat::Png);
        assert_eq!(asset.dims, Some((1, 1)));
        assert_eq!(asset.aspect(), Some(1.0));
        assert!(ImageAsset::from_bytes("b", Bytes::from_static(b"<svg/>")).is_none());
    }

    #[test]
    fn test_label_hides_payload() {
        let image = ImageRef::new("data:image/png;base64,AAAA");
        assert_eq!(image.to_string(), "data:image/png;base64");
    }

    #[tokio::test]
    async fn test_resolve_mixed_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.png");
        std::fs::write(&path, PNG_1X1).unwrap();

        let mut refs = BTreeMap::new();
        refs.insert(0, ImageRef::new(path.to_string_lossy().into_owned()));
        refs.insert(
            2,
            ImageRef::new(format!("data:image/png;base64,{}", STANDARD.encode(PNG_1X1))),
        );
        refs.insert(3, ImageRef::new("data:text/plain,not an image"));
        refs.insert(4, ImageRef::new(dir.path().join("missing.png").to_string_lossy().into_owned()));

        let (assets, warnings) = AssetResolver::new(Duration::from_secs(5)).resolve(&refs).await;
        assert_eq!(assets.len(), 2);
        assert_eq!(assets.for_slide(0).unwrap().id, "slide1_image");
        assert!(assets.by_id("slide3_image").is_some());

        let slides: Vec<_> = warnings.iter().map(|w| w.slide).collect();
        assert_eq!(slides, vec![Some(3), Some(4)]);
        assert!(warnings.iter().all(|w| w.kind == ErrorKind::ImageFetch));
        assert!(warnings[0].message.contains("unrecognized"));
    }

    #[tokio::test]
    async fn test_timeout_degrades_to_warning() {
        let mut refs = BTreeMap::new();
        refs.insert(0, ImageRef::new("fast"));
        refs.insert(1, ImageRef::new("slow"));

        let resolver = AssetResolver::with_fetcher(SlowFetcher, Duration::from_millis(50));
        let (assets, warnings) = resolver.resolve(&refs).await;
        assert!(assets.for_slide(0).is_some());
        assert!(assets.for_slide(1).is_none());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("timed out"));
    }

    #[cfg(not(feature = "http"))]
    #[tokio::test]
    async fn test_http_needs_feature() {
        let err = DefaultFetcher::new()
            .fetch(&ImageRef::new("https://example.com/a.png"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ImageFetch);
    }
}
