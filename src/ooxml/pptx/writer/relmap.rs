/// Relationship planning for slide parts.
///
/// Relationships are created before any slide XML is generated, so the
/// serializers can run in parallel and look up the ids they need. Media parts
/// are numbered in first-use order across the deck; an asset referenced by
/// several pictures is stored once.
use super::parts;
use crate::compile::{CompiledDeck, ImageAsset, ImageAssets};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::PackURI;
use crate::ooxml::opc::Relationships;
use crate::ooxml::opc::constants::relationship_type as rt;
use std::collections::HashMap;

/// Relationship ids owned by one slide part.
#[derive(Debug)]
pub(crate) struct SlideRels {
    pub uri: PackURI,
    pub rels: Relationships,
    /// asset id -> relationship id
    images: HashMap<String, String>,
    /// The slide's notes slide, if it has notes
    pub notes: Option<PackURI>,
}

impl SlideRels {
    /// Relationship id of the image embedded for `asset_id`.
    pub fn image_id(&self, asset_id: &str) -> Result<&str> {
        self.images
            .get(asset_id)
            .map(String::as_str)
            .ok_or_else(|| OoxmlError::MissingAsset(asset_id.to_string()))
    }
}

/// A media part to embed.
#[derive(Debug)]
pub(crate) struct MediaPart<'a> {
    pub uri: PackURI,
    pub asset: &'a ImageAsset,
}

/// Maps every slide to its relationships and collects the media parts.
#[derive(Debug)]
pub(crate) struct RelationshipMapper<'a> {
    pub slides: Vec<SlideRels>,
    pub media: Vec<MediaPart<'a>>,
}

impl<'a> RelationshipMapper<'a> {
    /// Plan relationships for `deck`.
    ///
    /// Fails with [`OoxmlError::MissingAsset`] when a picture references an
    /// asset id that `assets` does not hold.
    pub fn build(deck: &CompiledDeck, assets: &'a ImageAssets) -> Result<Self> {
        let mut media: Vec<MediaPart<'a>> = Vec::new();
        let mut media_by_asset: HashMap<&str, usize> = HashMap::new();
        let mut slides = Vec::with_capacity(deck.slides.len());

        for slide in &deck.slides {
            let number = slide.index + 1;
            let uri = PackURI::indexed(parts::SLIDE_PREFIX, number, "xml")?;
            let mut rels = Relationships::for_source(&uri);

            // The layout is always rId1
            let layout = PackURI::indexed(parts::LAYOUT_PREFIX, slide.layout.part_index(), "xml")?;
            rels.get_or_add(rt::SLIDE_LAYOUT, &layout);

            let mut images = HashMap::new();
            for asset_id in slide.asset_ids() {
                let asset = assets.by_id(asset_id).ok_or_else(|| {
                    OoxmlError::MissingAsset(format!(
                        "slide {} references '{}' which was never supplied",
                        number, asset_id
                    ))
                })?;
                let slot = match media_by_asset.get(asset.id.as_str()) {
                    Some(&slot) => slot,
                    None => {
                        let uri = PackURI::indexed(
                            parts::MEDIA_PREFIX,
                            media.len() + 1,
                            asset.format.extension(),
                        )?;
                        media.push(MediaPart { uri, asset });
                        media_by_asset.insert(asset.id.as_str(), media.len() - 1);
                        media.len() - 1
                    },
                };
                let r_id = rels.get_or_add(rt::IMAGE, &media[slot].uri);
                images.insert(asset_id.to_string(), r_id);
            }

            let notes = match slide.notes {
                Some(_) => {
                    let notes_uri = PackURI::indexed(parts::NOTES_SLIDE_PREFIX, number, "xml")?;
                    rels.get_or_add(rt::NOTES_SLIDE, &notes_uri);
                    Some(notes_uri)
                },
                None => None,
            };

            slides.push(SlideRels {
                uri,
                rels,
                images,
                notes,
            });
        }

        Ok(Self { slides, media })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::{CompiledShape, CompiledSlide, MasterTheme};
    use crate::layout::{BBox, LayoutTemplate, PlaceholderRole};
    use crate::style::PresetRegistry;
    use bytes::Bytes;

    const PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
    ];

    fn picture(asset_id: &str) -> CompiledShape {
        CompiledShape::Picture {
            role: PlaceholderRole::Image,
            bbox: BBox::new(0.5, 0.3, 0.4, 0.4),
            asset_id: asset_id.to_string(),
        }
    }

    fn deck(slides: Vec<CompiledSlide>) -> CompiledDeck {
        let genome = PresetRegistry::builtin().require("modern_minimal").unwrap();
        CompiledDeck {
            title: None,
            style_id: genome.id().to_string(),
            slide_size: (12_192_000, 6_858_000),
            master: MasterTheme {
                name: genome.name().to_string(),
                palette: *genome.palette(),
                heading_font: "Inter".into(),
                body_font: "Inter".into(),
                title_size: 4000,
                body_size: 2000,
            },
            slides,
            warnings: Vec::new(),
        }
    }

    fn slide(index: usize, shapes: Vec<CompiledShape>, notes: Option<&str>) -> CompiledSlide {
        CompiledSlide {
            index,
            layout: LayoutTemplate::ImageAndText,
            shapes,
            notes: notes.map(str::to_string),
        }
    }

    #[test]
    fn test_layout_images_and_notes() {
        let mut assets = ImageAssets::new();
        assets.insert(
            0,
            ImageAsset::from_bytes("slide1_image", Bytes::from_static(PNG)).unwrap(),
        );
        let deck = deck(vec![
            slide(0, vec![picture("slide1_image")], Some("say hi")),
            slide(1, vec![picture("slide1_image")], None),
        ]);

        let map = RelationshipMapper::build(&deck, &assets).unwrap();
        assert_eq!(map.media.len(), 1);
        assert_eq!(map.media[0].uri.as_str(), "/ppt/media/image1.png");

        let first = &map.slides[0];
        assert_eq!(first.uri.as_str(), "/ppt/slides/slide1.xml");
        assert_eq!(
            first.rels.get("rId1").unwrap().target_ref(),
            "../slideLayouts/slideLayout3.xml"
        );
        assert_eq!(first.image_id("slide1_image").unwrap(), "rId2");
        assert_eq!(
            first.notes.as_ref().map(PackURI::as_str),
            Some("/ppt/notesSlides/notesSlide1.xml")
        );
        assert!(map.slides[1].notes.is_none());
        assert!(matches!(
            first.image_id("nope"),
            Err(OoxmlError::MissingAsset(_))
        ));
    }

    #[test]
    fn test_missing_asset_is_an_error() {
        let deck = deck(vec![slide(0, vec![picture("slide1_image")], None)]);
        let err = RelationshipMapper::build(&deck, &ImageAssets::new()).unwrap_err();
        assert!(err.to_string().contains("slide1_image"));
    }
}
