//! Generator configuration.
//!
//! [`GeneratorConfig`] collects the tunables of the pipeline. It is built in
//! code with the `with_*` methods or loaded from YAML; every field has a
//! default, so a YAML file only lists what it changes.
//!
//! ```rust
//! use deckgene::config::{AspectRatio, GeneratorConfig};
//! use std::time::Duration;
//!
//! let config = GeneratorConfig::new()
//!     .with_aspect_ratio(AspectRatio::Standard)
//!     .with_image_timeout(Duration::from_secs(2))
//!     .with_fallback_preset(Some("corporate_classic"));
//! assert_eq!(config.min_contrast, 4.5);
//! ```
use crate::common::error::{Error, Result};
use crate::common::unit::inches_to_emu;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Slide proportions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    /// 16:9, 13.333" × 7.5"
    #[default]
    #[serde(alias = "16:9")]
    Widescreen,
    /// 4:3, 10" × 7.5"
    #[serde(alias = "4:3")]
    Standard,
}

impl AspectRatio {
    /// Slide size `(cx, cy)` in EMUs.
    pub fn slide_size(&self) -> (i64, i64) {
        match self {
            Self::Widescreen => (12_192_000, 6_858_000),
            Self::Standard => (inches_to_emu(10.0), inches_to_emu(7.5)),
        }
    }

    /// Width over height.
    pub fn ratio(&self) -> f64 {
        let (cx, cy) = self.slide_size();
        cx as f64 / cy as f64
    }
}

/// Base font sizes in points, before the genome's scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSizes {
    pub title: f64,
    pub subtitle: f64,
    pub body: f64,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            title: 40.0,
            subtitle: 24.0,
            body: 20.0,
        }
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub aspect_ratio: AspectRatio,
    /// Minimum WCAG contrast of text against the background
    pub min_contrast: f64,
    /// Upper bound on the wait for each slide's image
    #[serde(rename = "image_timeout_ms", with = "duration_ms")]
    pub image_timeout: Duration,
    pub font_sizes: FontSizes,
    pub max_slides: usize,
    /// Preset used when a reference deck yields nothing usable
    pub fallback_preset: Option<String>,
    /// Creation time written to the core properties; omitted when unset
    pub created: Option<DateTime<Utc>>,
    /// `dc:creator` of the package
    pub author: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::Widescreen,
            min_contrast: 4.5,
            image_timeout: Duration::from_secs(10),
            font_sizes: FontSizes::default(),
            max_slides: 100,
            fallback_preset: None,
            created: None,
            author: None,
        }
    }
}

impl GeneratorConfig {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    #[inline]
    pub fn with_min_contrast(mut self, ratio: f64) -> Self {
        self.min_contrast = ratio;
        self
    }

    #[inline]
    pub fn with_image_timeout(mut self, timeout: Duration) -> Self {
        self.image_timeout = timeout;
        self
    }

    #[inline]
    pub fn with_font_sizes(mut self, font_sizes: FontSizes) -> Self {
        self.font_sizes = font_sizes;
        self
    }

    #[inline]
    pub fn with_max_slides(mut self, max_slides: usize) -> Self {
        self.max_slides = max_slides;
        self
    }

    #[inline]
    pub fn with_fallback_preset(mut self, preset: Option<&str>) -> Self {
        self.fallback_preset = preset.map(str::to_string);
        self
    }

    /// Stamp the package with a creation time. Without one, identical
    /// inputs produce byte-identical packages.
    #[inline]
    pub fn with_created(mut self, created: Option<DateTime<Utc>>) -> Self {
        self.created = created;
        self
    }

    #[inline]
    pub fn with_author(mut self, author: Option<&str>) -> Self {
        self.author = author.map(str::to_string);
        self
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: GeneratorConfig = serde_saphyr::from_str(yaml)
            .map_err(|e| Error::Validation(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&yaml)
    }

    /// Reject values the pipeline cannot honor.
    pub fn validate(&self) -> Result<()> {
        if !(1.0..=21.0).contains(&self.min_contrast) {
            return Err(Error::Validation(format!(
                "min_contrast must be within 1..=21, got {}",
                self.min_contrast
            )));
        }
        let sizes = [
            ("title", self.font_sizes.title),
            ("subtitle", self.font_sizes.subtitle),
            ("body", self.font_sizes.body),
        ];
        for (name, size) in sizes {
            if !size.is_finite() || size <= 0.0 {
                return Err(Error::Validation(format!(
                    "{} font size must be positive, got {}",
                    name, size
                )));
            }
        }
        if self.max_slides == 0 {
            return Err(Error::Validation("max_slides must be at least 1".into()));
        }
        Ok(())
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.aspect_ratio.slide_size(), (12_192_000, 6_858_000));
        assert_eq!(config.min_contrast, 4.5);
        assert_eq!(config.font_sizes.title, 40.0);
        assert!(config.created.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let config = GeneratorConfig::from_yaml_str(
            "aspect_ratio: \"4:3\"\nimage_timeout_ms: 250\nfont_sizes:\n  body: 18\nfallback_preset: dark_cyber\n",
        )
        .unwrap();
        assert_eq!(config.aspect_ratio, AspectRatio::Standard);
        assert_eq!(config.aspect_ratio.slide_size(), (9_144_000, 6_858_000));
        assert_eq!(config.image_timeout, Duration::from_millis(250));
        assert_eq!(config.font_sizes.body, 18.0);
        assert_eq!(config.font_sizes.title, 40.0);
        assert_eq!(config.fallback_preset.as_deref(), Some("dark_cyber"));
    }

    #[test]
    fn test_created_timestamp() {
        let config = GeneratorConfig::from_yaml_str("created: 2024-05-01T12:00:00Z\n").unwrap();
        assert_eq!(
            config.created.map(|c| c.to_rfc3339()),
            Some("2024-05-01T12:00:00+00:00".to_string())
        );
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(GeneratorConfig::from_yaml_str("min_contrast: 30\n").is_err());
        assert!(GeneratorConfig::from_yaml_str("max_slides: 0\n").is_err());
        assert!(GeneratorConfig::from_yaml_str("font_sizes:\n  title: -1\n").is_err());
        assert!(GeneratorConfig::from_yaml_str("aspect_ratio: [1, 2]\n").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_slides: 12").unwrap();
        let config = GeneratorConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.max_slides, 12);
        assert!(GeneratorConfig::from_yaml_file("/nonexistent/deckgene.yaml").is_err());
    }
}
