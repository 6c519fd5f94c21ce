//! The generation pipeline: style reference + outline + images → `.pptx`.
//!
//! [`Generator`] owns the configuration, the preset registry and the image
//! fetcher. It is `Send + Sync` and meant to be shared across concurrent
//! requests. Each request runs validate → style → images → compile → write.
//! Images are fetched concurrently; compile and write run together on the
//! blocking pool.
//!
//! Cancelling is either dropping the `generate` future or raising a
//! [`CancellationFlag`], which is checked between stages.
//!
//! # Examples
//!
//! ```no_run
//! use deckgene::{ContentShape, Generator, GeneratorConfig, Outline, OutlineSlide, StyleReference};
//! use std::collections::BTreeMap;
//!
//! # async fn run() -> deckgene::Result<()> {
//! let generator = Generator::new(GeneratorConfig::default())?;
//! let outline = Outline::new(vec![
//!     OutlineSlide::new("Quarterly Review", ContentShape::TitleOnly),
//!     OutlineSlide::new("Highlights", ContentShape::Bullets).with_blocks(["Revenue up 12%"]),
//! ]);
//!
//! let deck = generator
//!     .generate(&outline, &StyleReference::preset("corporate_classic"), &BTreeMap::new())
//!     .await?;
//! std::fs::write("review.pptx", &deck.bytes)?;
//! # Ok(())
//! # }
//! ```
use crate::common::error::{Error, ErrorKind, Result, Warning};
use crate::compile::{
    AssetResolver, CompiledDeck, DefaultFetcher, DocumentCompiler, ImageAssets, ImageFetcher,
    ImageRef,
};
use crate::config::GeneratorConfig;
use crate::ooxml::pptx::PackageWriter;
use crate::outline::{ContentShape, Outline};
use crate::style::{Palette, PresetRegistry, ReferenceStyleExtractor, StyleBreeder, StyleGenome};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Where a deck's style comes from.
#[derive(Clone, PartialEq)]
pub enum StyleReference {
    /// A builtin (or registered) preset by id
    Preset { id: String },
    /// A cross of two presets; `ratio` is the share of `parent_b`
    Breed {
        parent_a: String,
        parent_b: String,
        ratio: f64,
    },
    /// An existing `.pptx` whose style is extracted
    Reference { bytes: Bytes },
}

impl StyleReference {
    pub fn preset(id: impl Into<String>) -> Self {
        Self::Preset { id: id.into() }
    }

    pub fn breed(parent_a: impl Into<String>, parent_b: impl Into<String>, ratio: f64) -> Self {
        Self::Breed {
            parent_a: parent_a.into(),
            parent_b: parent_b.into(),
            ratio,
        }
    }

    pub fn reference(bytes: impl Into<Bytes>) -> Self {
        Self::Reference {
            bytes: bytes.into(),
        }
    }
}

impl fmt::Debug for StyleReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preset { id } => f.debug_struct("Preset").field("id", id).finish(),
            Self::Breed {
                parent_a,
                parent_b,
                ratio,
            } => f
                .debug_struct("Breed")
                .field("parent_a", parent_a)
                .field("parent_b", parent_b)
                .field("ratio", ratio)
                .finish(),
            Self::Reference { bytes } => f
                .debug_struct("Reference")
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

/// Shared flag that stops a running request at the next stage boundary.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn check(&self, stage: &str) -> Result<()> {
        if self.is_cancelled() {
            tracing::debug!(stage, "request cancelled");
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

/// What the caller gets back besides the package bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckMetadata {
    pub slide_count: usize,
    /// Id of the genome the deck was rendered with
    pub style_id_used: String,
    /// Recovered problems: style fallbacks first, then per slide in order
    pub warnings: Vec<Warning>,
}

/// A finished deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedDeck {
    pub bytes: Bytes,
    pub metadata: DeckMetadata,
}

/// End-to-end deck generator.
pub struct Generator<F = DefaultFetcher> {
    config: GeneratorConfig,
    registry: Arc<PresetRegistry>,
    assets: AssetResolver<F>,
}

impl Generator<DefaultFetcher> {
    /// Generator over the builtin presets and the default image fetcher.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        Self::with_fetcher(config, DefaultFetcher::new())
    }
}

impl<F: ImageFetcher> Generator<F> {
    /// Generator with a custom image fetcher.
    pub fn with_fetcher(config: GeneratorConfig, fetcher: F) -> Result<Self> {
        Self::build(config, Arc::new(PresetRegistry::builtin().clone()), fetcher)
    }

    /// Replace the preset registry, e.g. with one extended from YAML.
    pub fn with_registry(self, registry: PresetRegistry) -> Result<Self> {
        let Self { config, assets, .. } = self;
        Self::validated(config, Arc::new(registry), assets)
    }

    fn build(config: GeneratorConfig, registry: Arc<PresetRegistry>, fetcher: F) -> Result<Self> {
        let assets = AssetResolver::with_fetcher(fetcher, config.image_timeout);
        Self::validated(config, registry, assets)
    }

    fn validated(
        config: GeneratorConfig,
        registry: Arc<PresetRegistry>,
        assets: AssetResolver<F>,
    ) -> Result<Self> {
        config.validate()?;
        if let Some(fallback) = &config.fallback_preset {
            registry.require(fallback)?;
        }
        Ok(Self {
            config,
            registry,
            assets,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn registry(&self) -> &PresetRegistry {
        &self.registry
    }

    /// Generate a deck.
    ///
    /// Validation errors (bad outline, unknown preset, non-finite ratio) are
    /// returned before any image is fetched. Image problems and style
    /// fallbacks never fail the request; they end up in
    /// [`DeckMetadata::warnings`].
    pub async fn generate(
        &self,
        outline: &Outline,
        style: &StyleReference,
        images: &BTreeMap<usize, ImageRef>,
    ) -> Result<GeneratedDeck> {
        self.generate_with_cancel(outline, style, images, &CancellationFlag::default())
            .await
    }

    /// [`generate`](Self::generate), stopping with [`Error::Cancelled`] once
    /// `cancel` is raised.
    pub async fn generate_with_cancel(
        &self,
        outline: &Outline,
        style: &StyleReference,
        images: &BTreeMap<usize, ImageRef>,
        cancel: &CancellationFlag,
    ) -> Result<GeneratedDeck> {
        cancel.check("validate")?;
        outline.validate(self.config.max_slides)?;

        let (genome, mut warnings) = self.resolve_style(style)?;
        tracing::debug!(style = genome.id(), slides = outline.slides.len(), "style resolved");
        cancel.check("style")?;

        let refs = image_refs(outline, images);
        let (assets, image_warnings) = self.assets.resolve(&refs).await;
        tracing::debug!(requested = refs.len(), resolved = assets.len(), "images resolved");
        cancel.check("images")?;

        let (deck, bytes) = self.render(outline, &genome, assets, cancel).await?;
        tracing::debug!(bytes = bytes.len(), "deck packaged");

        warnings.extend(image_warnings);
        warnings.extend(deck.warnings);
        // Stable: keeps per-slide warnings in the order they were raised
        warnings.sort_by_key(|w| w.slide.map_or((0, 0), |slide| (1, slide)));

        Ok(GeneratedDeck {
            bytes,
            metadata: DeckMetadata {
                slide_count: deck.slides.len(),
                style_id_used: genome.id().to_string(),
                warnings,
            },
        })
    }

    /// Compile and package on the blocking pool so large decks do not stall
    /// the async workers.
    async fn render(
        &self,
        outline: &Outline,
        genome: &StyleGenome,
        assets: ImageAssets,
        cancel: &CancellationFlag,
    ) -> Result<(CompiledDeck, Bytes)> {
        let config = self.config.clone();
        let outline = outline.clone();
        let genome = genome.clone();
        let cancel = cancel.clone();

        tokio::task::spawn_blocking(move || -> Result<(CompiledDeck, Bytes)> {
            let deck = DocumentCompiler::new(&config).compile(&outline, &genome, &assets);
            cancel.check("compile")?;
            let bytes = PackageWriter::write(&deck, &assets, &config)?;
            Ok((deck, bytes))
        })
        .await
        .map_err(|e| Error::Packaging(format!("render task failed: {}", e)))?
    }

    /// Turn a style reference into a genome.
    ///
    /// A reference deck that cannot be read falls back to the preset nearest
    /// to whatever palette was observed, then to the configured fallback
    /// preset; either fallback records an extraction warning.
    pub fn resolve_style(&self, style: &StyleReference) -> Result<(StyleGenome, Vec<Warning>)> {
        match style {
            StyleReference::Preset { id } => Ok((self.registry.require(id)?.clone(), Vec::new())),
            StyleReference::Breed {
                parent_a,
                parent_b,
                ratio,
            } => {
                if !ratio.is_finite() {
                    return Err(Error::Validation(format!(
                        "breeding ratio must be a finite number, got {}",
                        ratio
                    )));
                }
                let a = self.registry.require(parent_a)?;
                let b = self.registry.require(parent_b)?;
                Ok((StyleBreeder::new().breed(a, b, *ratio), Vec::new()))
            },
            StyleReference::Reference { bytes } => {
                match ReferenceStyleExtractor::new(&self.registry).extract(bytes) {
                    Ok(genome) => Ok((genome, Vec::new())),
                    Err(Error::Extraction { message, observed }) => {
                        let (genome, warning) = self.recover_extraction(message, observed.as_deref())?;
                        Ok((genome, vec![warning]))
                    },
                    Err(other) => Err(other),
                }
            },
        }
    }

    fn recover_extraction(
        &self,
        message: String,
        observed: Option<&Palette>,
    ) -> Result<(StyleGenome, Warning)> {
        let fallback = observed
            .and_then(|palette| self.registry.nearest(palette))
            .map(|genome| (genome, "nearest preset"))
            .or_else(|| {
                self.config
                    .fallback_preset
                    .as_deref()
                    .and_then(|id| self.registry.get(id))
                    .map(|genome| (genome, "fallback preset"))
            });

        match fallback {
            Some((genome, source)) => {
                tracing::warn!(%message, preset = genome.id(), "reference extraction failed, using {}", source);
                let warning = Warning::new(
                    ErrorKind::Extraction,
                    format!("{}; using {} '{}'", message, source, genome.id()),
                );
                Ok((genome.clone(), warning))
            },
            None => Err(Error::Extraction {
                message,
                observed: observed.map(|palette| Box::new(*palette)),
            }),
        }
    }
}

impl<F> fmt::Debug for Generator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("config", &self.config)
            .field("presets", &self.registry.len())
            .finish_non_exhaustive()
    }
}

/// Image references that a picture placeholder will consume; images for
/// other slides are dropped.
fn image_refs(outline: &Outline, images: &BTreeMap<usize, ImageRef>) -> BTreeMap<usize, ImageRef> {
    images
        .iter()
        .filter(|(index, _)| {
            let wanted = outline
                .slides
                .get(**index)
                .is_some_and(|slide| slide.content_shape == ContentShape::ImageAndText);
            if !wanted {
                tracing::debug!(slide = **index, "ignoring image for slide without a picture");
            }
            wanted
        })
        .map(|(index, image)| (*index, image.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::PresentationReader;
    use crate::outline::OutlineSlide;
    use crate::style::Provenance;

    const PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x03,
    ];

    struct StaticFetcher;

    impl ImageFetcher for StaticFetcher {
        async fn fetch(&self, image: &ImageRef) -> Result<Bytes> {
            match image.as_str() {
                "chart.png" => Ok(Bytes::from_static(PNG)),
                other => Err(Error::ImageFetch(format!("{}: not found", other))),
            }
        }
    }

    fn generator() -> Generator<StaticFetcher> {
        Generator::with_fetcher(GeneratorConfig::default(), StaticFetcher).unwrap()
    }

    fn outline() -> Outline {
        Outline::new(vec![
            OutlineSlide::new("Seed Round", ContentShape::TitleOnly).with_blocks(["Series A prep"]),
            OutlineSlide::new("Traction", ContentShape::Bullets)
                .with_blocks(["10k weekly users", "3 paid pilots"])
                .with_notes("Lead with the pilots"),
            OutlineSlide::new("Product", ContentShape::ImageAndText).with_blocks(["Live dashboard"]),
            OutlineSlide::new("Plan", ContentShape::TwoColumn).with_blocks(["Hire", "Ship"]),
            OutlineSlide::new("Questions", ContentShape::TitleOnly),
        ])
    }

    #[test]
    fn test_generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Generator>();
        assert_send_sync::<Generator<StaticFetcher>>();
    }

    #[tokio::test]
    async fn test_generate_preset_deck() {
        let mut images = BTreeMap::new();
        images.insert(2, ImageRef::new("chart.png"));

        let deck = generator()
            .generate(&outline(), &StyleReference::preset("tech_startup"), &images)
            .await
            .unwrap();

        assert_eq!(deck.metadata.slide_count, 5);
        assert_eq!(deck.metadata.style_id_used, "tech_startup");
        assert!(
            deck.metadata.warnings.iter().all(|w| w.kind != ErrorKind::ImageFetch),
            "{:?}",
            deck.metadata.warnings
        );

        let mut reader = PresentationReader::open(&deck.bytes).unwrap();
        assert_eq!(reader.slide_count(), 5);
        assert!(reader.slide_text(1).unwrap().iter().any(|t| t == "3 paid pilots"));
        assert_eq!(reader.notes_text(1).unwrap().as_deref(), Some("Lead with the pilots"));
    }

    #[tokio::test]
    async fn test_image_failure_is_a_warning() {
        let mut images = BTreeMap::new();
        images.insert(2, ImageRef::new("missing.png"));
        // Slide 0 has no picture placeholder; its image is never fetched
        images.insert(0, ImageRef::new("also-missing.png"));

        let deck = generator()
            .generate(&outline(), &StyleReference::preset("modern_minimal"), &images)
            .await
            .unwrap();

        let fetch_warnings: Vec<_> = deck
            .metadata
            .warnings
            .iter()
            .filter(|w| w.kind == ErrorKind::ImageFetch)
            .collect();
        assert_eq!(fetch_warnings.len(), 1);
        assert_eq!(fetch_warnings[0].slide, Some(2));
        assert_eq!(PresentationReader::open(&deck.bytes).unwrap().slide_count(), 5);
    }

    #[tokio::test]
    async fn test_output_is_deterministic() {
        let generator = generator();
        let style = StyleReference::breed("corporate_classic", "tech_startup", 0.3);
        let first = generator.generate(&outline(), &style, &BTreeMap::new()).await.unwrap();
        let second = generator.generate(&outline(), &style, &BTreeMap::new()).await.unwrap();
        assert_eq!(first.bytes, second.bytes);
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let generator = generator();
        let images = BTreeMap::new();

        let err = generator
            .generate(&outline(), &StyleReference::preset("nope"), &images)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = generator
            .generate(&outline(), &StyleReference::breed("modern_minimal", "nope", 0.5), &images)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = generator
            .generate(
                &outline(),
                &StyleReference::breed("modern_minimal", "tech_startup", f64::NAN),
                &images,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = generator
            .generate(&Outline::new(Vec::new()), &StyleReference::preset("tech_startup"), &images)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_unknown_fallback_rejected_up_front() {
        let config = GeneratorConfig::default().with_fallback_preset(Some("nope"));
        let err = Generator::with_fetcher(config, StaticFetcher).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_breed_provenance() {
        let (genome, warnings) = generator()
            .resolve_style(&StyleReference::breed("modern_minimal", "corporate_classic", 0.25))
            .unwrap();
        assert!(warnings.is_empty());
        assert!(genome.id().starts_with("modern_minimal_x_corporate_classic"));
        assert!(matches!(
            genome.provenance(),
            Provenance::Bred { parent_a, parent_b, .. }
                if parent_a == "modern_minimal" && parent_b == "corporate_classic"
        ));
    }

    #[tokio::test]
    async fn test_reference_from_generated_deck() {
        let generator = generator();
        let source = generator
            .generate(&outline(), &StyleReference::preset("tech_startup"), &BTreeMap::new())
            .await
            .unwrap();
        let preset = generator.registry().require("tech_startup").unwrap();

        let (genome, warnings) = generator
            .resolve_style(&StyleReference::reference(source.bytes))
            .unwrap();
        assert!(warnings.is_empty(), "{:?}", warnings);
        assert!(genome.id().starts_with("extracted_"));
        assert_eq!(genome.typography().heading_font, preset.typography().heading_font);
        assert_eq!(genome.typography().body_font, preset.typography().body_font);
    }

    #[test]
    fn test_unreadable_reference() {
        let garbage = StyleReference::reference(Bytes::from_static(b"not a zip"));

        let err = generator().resolve_style(&garbage).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Extraction);

        let config = GeneratorConfig::default().with_fallback_preset(Some("modern_minimal"));
        let generator = Generator::with_fetcher(config, StaticFetcher).unwrap();
        let (genome, warnings) = generator.resolve_style(&garbage).unwrap();
        assert_eq!(genome.id(), "modern_minimal");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, ErrorKind::Extraction);
    }

    #[test]
    fn test_partial_palette_uses_nearest_preset() {
        let generator = generator();
        let corporate = *generator.registry().require("corporate_classic").unwrap().palette();
        let (genome, warning) = generator
            .recover_extraction("slide 2: truncated".into(), Some(&corporate))
            .unwrap();
        assert_eq!(genome.id(), "corporate_classic");
        assert!(warning.message.contains("nearest preset"));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let cancel = CancellationFlag::new();
        cancel.cancel();
        let err = generator()
            .generate_with_cancel(
                &outline(),
                &StyleReference::preset("tech_startup"),
                &BTreeMap::new(),
                &cancel,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[tokio::test]
    async fn test_render_on_blocking_pool() {
        let generator = generator();
        let genome = generator.registry().require("modern_minimal").unwrap().clone();

        let (deck, bytes) = generator
            .render(&outline(), &genome, ImageAssets::new(), &CancellationFlag::new())
            .await
            .unwrap();
        assert_eq!(deck.slides.len(), 5);
        assert_eq!(PresentationReader::open(&bytes).unwrap().slide_count(), 5);

        // Raised flag is seen inside the blocking task, before packaging
        let cancel = CancellationFlag::new();
        cancel.cancel();
        let err = generator
            .render(&outline(), &genome, ImageAssets::new(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_requests_share_a_generator() {
        let generator = Arc::new(generator());
        let style = StyleReference::preset("creative_bold");
        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let generator = Arc::clone(&generator);
                let style = style.clone();
                tokio::spawn(async move { generator.generate(&outline(), &style, &BTreeMap::new()).await })
            })
            .collect();

        let mut outputs = Vec::new();
        for task in tasks {
            outputs.push(task.await.unwrap().unwrap().bytes);
        }
        assert!(outputs.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn test_metadata_json() {
        let metadata = DeckMetadata {
            slide_count: 3,
            style_id_used: "tech_startup".into(),
            warnings: vec![Warning::on_slide(ErrorKind::ImageFetch, 1, "timed out")],
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["style_id_used"], "tech_startup");
        assert_eq!(json["warnings"][0]["slide"], 1);
    }
}
