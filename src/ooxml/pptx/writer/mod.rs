//! PresentationML package writer.
//!
//! [`PackageWriter`] turns a [`CompiledDeck`] and its image assets into
//! `.pptx` bytes. Relationships are planned first, then the slide parts are
//! serialized in parallel and the archive is assembled in a fixed part order,
//! so identical input always yields identical bytes.

mod master;
mod notes;
mod pres;
mod props;
pub(crate) mod relmap;
mod shape;
mod slide;
mod theme;

use crate::common::error::{Error, Result};
use crate::compile::{CompiledDeck, ImageAssets};
use crate::config::GeneratorConfig;
use crate::layout::LayoutTemplate;
use crate::ooxml::error::OoxmlError;
use crate::ooxml::opc::constants::{content_type as ct, namespace, relationship_type as rt};
use crate::ooxml::opc::{PackURI, PackageBuilder, Relationships};
use bytes::Bytes;
use pres::PresentationRels;
use rayon::prelude::*;
use relmap::RelationshipMapper;

pub(crate) const NS_A: &str = namespace::DML_MAIN;
pub(crate) const NS_P: &str = namespace::PML_MAIN;
pub(crate) const NS_R: &str = namespace::OFC_RELATIONSHIPS;

/// Partnames of the package.
pub(crate) mod parts {
    pub const PRESENTATION: &str = "/ppt/presentation.xml";
    pub const MASTER: &str = "/ppt/slideMasters/slideMaster1.xml";
    pub const THEME_PREFIX: &str = "/ppt/theme/theme";
    pub const LAYOUT_PREFIX: &str = "/ppt/slideLayouts/slideLayout";
    pub const SLIDE_PREFIX: &str = "/ppt/slides/slide";
    pub const NOTES_MASTER: &str = "/ppt/notesMasters/notesMaster1.xml";
    pub const NOTES_SLIDE_PREFIX: &str = "/ppt/notesSlides/notesSlide";
    pub const MEDIA_PREFIX: &str = "/ppt/media/image";
    pub const PRES_PROPS: &str = "/ppt/presProps.xml";
    pub const VIEW_PROPS: &str = "/ppt/viewProps.xml";
    pub const TABLE_STYLES: &str = "/ppt/tableStyles.xml";
    pub const CORE_PROPS: &str = "/docProps/core.xml";
    pub const APP_PROPS: &str = "/docProps/app.xml";
}

/// Serializes compiled decks into OPC packages.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageWriter;

impl PackageWriter {
    /// Write `deck` as `.pptx` bytes.
    ///
    /// Every picture must reference an asset in `assets`; a missing one
    /// fails the whole write with [`Error::Packaging`] and nothing is
    /// returned.
    pub fn write(deck: &CompiledDeck, assets: &ImageAssets, config: &GeneratorConfig) -> Result<Bytes> {
        Self::write_package(deck, assets, config).map_err(|e| match e {
            OoxmlError::MissingAsset(msg) => Error::Packaging(format!("missing image asset: {}", msg)),
            other => Error::from(other),
        })
    }

    fn write_package(
        deck: &CompiledDeck,
        assets: &ImageAssets,
        config: &GeneratorConfig,
    ) -> std::result::Result<Bytes, OoxmlError> {
        let slide_size = deck.slide_size;
        let mapper = RelationshipMapper::build(deck, assets)?;

        let presentation = PackURI::new(parts::PRESENTATION)?;
        let master_uri = PackURI::new(parts::MASTER)?;
        let theme_uri = PackURI::indexed(parts::THEME_PREFIX, 1, "xml")?;
        let notes_master = PackURI::new(parts::NOTES_MASTER)?;
        let notes_theme = PackURI::indexed(parts::THEME_PREFIX, 2, "xml")?;
        let has_notes = deck.has_notes();

        let mut pkg = PackageBuilder::new();
        let core = PackURI::new(parts::CORE_PROPS)?;
        let app = PackURI::new(parts::APP_PROPS)?;
        pkg.rels_mut().get_or_add(rt::OFFICE_DOCUMENT, &presentation);
        pkg.rels_mut().get_or_add(rt::CORE_PROPERTIES, &core);
        pkg.rels_mut().get_or_add(rt::EXTENDED_PROPERTIES, &app);

        // presentation.xml and its relationships
        let mut pres_rels = Relationships::for_source(&presentation);
        let master_r_id = pres_rels.get_or_add(rt::SLIDE_MASTER, &master_uri);
        let slide_r_ids: Vec<String> = mapper
            .slides
            .iter()
            .map(|s| pres_rels.get_or_add(rt::SLIDE, &s.uri))
            .collect();
        let notes_master_r_id = has_notes.then(|| pres_rels.get_or_add(rt::NOTES_MASTER, &notes_master));
        let pres_props = PackURI::new(parts::PRES_PROPS)?;
        let view_props = PackURI::new(parts::VIEW_PROPS)?;
        let table_styles = PackURI::new(parts::TABLE_STYLES)?;
        pres_rels.get_or_add(rt::PRES_PROPS, &pres_props);
        pres_rels.get_or_add(rt::VIEW_PROPS, &view_props);
        pres_rels.get_or_add(rt::THEME, &theme_uri);
        pres_rels.get_or_add(rt::TABLE_STYLES, &table_styles);

        let pres_xml = pres::presentation_xml(
            &PresentationRels {
                master: &master_r_id,
                notes_master: notes_master_r_id.as_deref(),
                slides: &slide_r_ids,
            },
            slide_size,
        )?;
        pkg.add_xml_part(presentation, ct::PML_PRESENTATION_MAIN, pres_xml, Some(pres_rels))?;

        // Master, layouts and theme
        let mut master_rels = Relationships::for_source(&master_uri);
        let mut layouts = Vec::with_capacity(LayoutTemplate::ALL.len());
        let mut layout_r_ids = Vec::with_capacity(LayoutTemplate::ALL.len());
        for template in LayoutTemplate::ALL {
            let uri = PackURI::indexed(parts::LAYOUT_PREFIX, template.part_index(), "xml")?;
            layout_r_ids.push(master_rels.get_or_add(rt::SLIDE_LAYOUT, &uri));
            layouts.push((template, uri));
        }
        master_rels.get_or_add(rt::THEME, &theme_uri);
        let master_xml = master::master_xml(&deck.master, &layout_r_ids, slide_size)?;
        pkg.add_xml_part(master_uri.clone(), ct::PML_SLIDE_MASTER, master_xml, Some(master_rels))?;

        for (template, uri) in layouts {
            let mut rels = Relationships::for_source(&uri);
            rels.get_or_add(rt::SLIDE_MASTER, &master_uri);
            let xml = master::layout_xml(template, slide_size)?;
            pkg.add_xml_part(uri, ct::PML_SLIDE_LAYOUT, xml, Some(rels))?;
        }
        pkg.add_xml_part(
            theme_uri,
            ct::OFC_THEME,
            theme::theme_xml(&deck.master, &deck.master.name)?,
            None,
        )?;

        // Slides and notes slides serialize independently
        let slide_parts: Vec<(String, Option<String>)> = deck
            .slides
            .par_iter()
            .zip(mapper.slides.par_iter())
            .map(|(slide, rels)| -> std::result::Result<_, OoxmlError> {
                let xml = slide::slide_xml(slide, rels, slide_size)?;
                let notes = slide.notes.as_deref().map(notes::notes_slide_xml).transpose()?;
                Ok((xml, notes))
            })
            .collect::<std::result::Result<_, _>>()?;

        let mut notes_parts = Vec::new();
        for (slide_rels, (xml, notes_xml)) in mapper.slides.into_iter().zip(slide_parts) {
            if let (Some(notes_uri), Some(notes_xml)) = (slide_rels.notes.clone(), notes_xml) {
                let mut rels = Relationships::for_source(&notes_uri);
                rels.get_or_add(rt::NOTES_MASTER, &notes_master);
                rels.get_or_add(rt::SLIDE, &slide_rels.uri);
                notes_parts.push((notes_uri, notes_xml, rels));
            }
            pkg.add_xml_part(slide_rels.uri, ct::PML_SLIDE, xml, Some(slide_rels.rels))?;
        }

        if has_notes {
            let mut rels = Relationships::for_source(&notes_master);
            rels.get_or_add(rt::THEME, &notes_theme);
            pkg.add_xml_part(
                notes_master.clone(),
                ct::PML_NOTES_MASTER,
                notes::notes_master_xml()?,
                Some(rels),
            )?;
            pkg.add_xml_part(
                notes_theme,
                ct::OFC_THEME,
                theme::theme_xml(&deck.master, &format!("{} Notes", deck.master.name))?,
                None,
            )?;
            for (uri, xml, rels) in notes_parts {
                pkg.add_xml_part(uri, ct::PML_NOTES_SLIDE, xml, Some(rels))?;
            }
        }

        for media in &mapper.media {
            pkg.add_media_part(
                media.uri.clone(),
                media.asset.format.mime_type(),
                media.asset.bytes.to_vec(),
            )?;
        }

        pkg.add_xml_part(pres_props, ct::PML_PRES_PROPS, props::pres_props_xml()?, None)?;
        pkg.add_xml_part(view_props, ct::PML_VIEW_PROPS, props::view_props_xml()?, None)?;
        pkg.add_xml_part(table_styles, ct::PML_TABLE_STYLES, props::table_styles_xml()?, None)?;
        pkg.add_xml_part(
            core,
            ct::OPC_CORE_PROPERTIES,
            props::core_xml(deck.title.as_deref(), config)?,
            None,
        )?;
        let notes_count = deck.slides.iter().filter(|s| s.notes.is_some()).count();
        pkg.add_xml_part(
            app,
            ct::OFC_EXTENDED_PROPERTIES,
            props::app_xml(deck.slide_count(), notes_count, config.aspect_ratio)?,
            None,
        )?;

        let bytes = pkg.to_bytes()?;
        tracing::debug!(
            slides = deck.slide_count(),
            media = mapper.media.len(),
            notes = notes_count,
            bytes = bytes.len(),
            "packaged deck"
        );
        Ok(Bytes::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::{CompiledShape, DocumentCompiler, ImageAsset};
    use crate::ooxml::opc::PhysPkgReader;
    use crate::ooxml::pptx::reader::PresentationReader;
    use crate::outline::{ContentShape, Outline, OutlineSlide};
    use crate::style::{PresetRegistry, StyleGenome};

    const PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x03,
    ];

    fn genome(id: &str) -> StyleGenome {
        PresetRegistry::builtin().require(id).unwrap().clone()
    }

    fn outline() -> Outline {
        Outline::new(vec![
            OutlineSlide::new("Launch Plan", ContentShape::TitleOnly).with_blocks(["Q3 kickoff"]),
            OutlineSlide::new("Goals", ContentShape::Bullets)
                .with_blocks(["Ship the beta", "Grow signups"])
                .with_notes("Keep this short\nThen hand over"),
            OutlineSlide::new("Product", ContentShape::ImageAndText).with_blocks(["Onboarding"]),
            OutlineSlide::new("Split", ContentShape::TwoColumn).with_blocks(["Left", "Right"]),
            OutlineSlide::new("Thank You", ContentShape::TitleOnly),
        ])
        .with_title("Launch & Learn")
    }

    fn assets() -> ImageAssets {
        let mut assets = ImageAssets::new();
        assets.insert(
            2,
            ImageAsset::from_bytes("slide3_image", Bytes::from_static(PNG)).unwrap(),
        );
        assets
    }

    fn compile(config: &GeneratorConfig, assets: &ImageAssets) -> CompiledDeck {
        DocumentCompiler::new(config).compile(&outline(), &genome("tech_startup"), assets)
    }

    #[test]
    fn test_round_trip_through_reader() {
        let config = GeneratorConfig::default();
        let assets = assets();
        let deck = compile(&config, &assets);
        let bytes = PackageWriter::write(&deck, &assets, &config).unwrap();

        let mut reader = PresentationReader::open(&bytes).unwrap();
        assert_eq!(reader.slide_count(), 5);
        assert_eq!(reader.slide_size(), (12_192_000, 6_858_000));
        assert_eq!(reader.slide_text(0).unwrap()[0], "Launch Plan");
        assert!(reader.slide_text(1).unwrap().contains(&"Ship the beta".to_string()));
        assert_eq!(
            reader.notes_text(1).unwrap().as_deref(),
            Some("Keep this short\nThen hand over")
        );
        assert_eq!(reader.notes_text(0).unwrap(), None);

        let theme = reader.theme().unwrap().unwrap();
        assert_eq!(theme.resolve_scheme_color("bg1"), Some(deck.master.background()));

        let master = reader.master_content().unwrap().unwrap();
        assert!(master.background.is_some());
    }

    #[test]
    fn test_package_parts() {
        let config = GeneratorConfig::default();
        let assets = assets();
        let deck = compile(&config, &assets);
        let bytes = PackageWriter::write(&deck, &assets, &config).unwrap();

        let mut pkg = PhysPkgReader::new(&bytes).unwrap();
        for name in [
            "/docProps/core.xml",
            "/docProps/app.xml",
            "/ppt/presentation.xml",
            "/ppt/slideMasters/slideMaster1.xml",
            "/ppt/slideLayouts/slideLayout5.xml",
            "/ppt/theme/theme1.xml",
            "/ppt/theme/theme2.xml",
            "/ppt/notesMasters/notesMaster1.xml",
            "/ppt/notesSlides/notesSlide2.xml",
            "/ppt/slides/slide5.xml",
            "/ppt/media/image1.png",
            "/ppt/presProps.xml",
            "/ppt/viewProps.xml",
            "/ppt/tableStyles.xml",
        ] {
            assert!(pkg.contains(&PackURI::new(name).unwrap()), "{} missing", name);
        }
        assert!(!pkg.contains(&PackURI::new("/ppt/notesSlides/notesSlide1.xml").unwrap()));

        let content_types = String::from_utf8(pkg.content_types_xml().unwrap()).unwrap();
        assert!(content_types.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));
        assert!(content_types.contains(r#"<Override PartName="/ppt/slides/slide3.xml""#));

        let media = pkg.blob_for(&PackURI::new("/ppt/media/image1.png").unwrap()).unwrap();
        assert_eq!(media, PNG);

        let slide3 = pkg.blob_for(&PackURI::new("/ppt/slides/slide3.xml").unwrap()).unwrap();
        let slide3 = String::from_utf8(slide3).unwrap();
        assert!(slide3.contains(r#"<a:blip r:embed="rId2"/>"#));
    }

    #[test]
    fn test_output_is_byte_identical() {
        let config = GeneratorConfig::default();
        let assets = assets();
        let deck = compile(&config, &assets);
        let a = PackageWriter::write(&deck, &assets, &config).unwrap();
        let b = PackageWriter::write(&compile(&config, &assets), &assets, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_notes_parts_without_notes() {
        let config = GeneratorConfig::default().with_aspect_ratio(crate::config::AspectRatio::Standard);
        let deck = DocumentCompiler::new(&config).compile(
            &Outline::new(vec![OutlineSlide::new("Only", ContentShape::Bullets).with_blocks(["a"])]),
            &genome("modern_minimal"),
            &ImageAssets::new(),
        );
        let bytes = PackageWriter::write(&deck, &ImageAssets::new(), &config).unwrap();

        let pkg = PhysPkgReader::new(&bytes).unwrap();
        assert!(!pkg.contains(&PackURI::new(parts::NOTES_MASTER).unwrap()));
        assert!(!pkg.contains(&PackURI::new("/ppt/theme/theme2.xml").unwrap()));
        let reader = PresentationReader::open(&bytes).unwrap();
        assert_eq!(reader.slide_size(), (9_144_000, 6_858_000));
    }

    #[test]
    fn test_missing_asset_fails_packaging() {
        let config = GeneratorConfig::default();
        let assets = assets();
        let mut deck = compile(&config, &assets);
        for shape in &mut deck.slides[2].shapes {
            if let CompiledShape::Picture { asset_id, .. } = shape {
                *asset_id = "slide9_image".to_string();
            }
        }

        let err = PackageWriter::write(&deck, &assets, &config).unwrap_err();
        assert!(matches!(err, Error::Packaging(_)));
        assert!(err.to_string().contains("slide9_image"));
    }
}
