//! Builtin style genomes.
//!
//! The presets are embedded as YAML and parsed once on first use. A
//! [`PresetRegistry`] keeps genomes in declaration order, which is also the
//! tie-break order for nearest-preset lookups.

use super::genome::{Palette, StyleGenome};
use crate::common::error::{Error, Result};
use once_cell::sync::Lazy;

const BUILTIN_YAML: &str = include_str!("presets.yaml");

static BUILTIN: Lazy<PresetRegistry> = Lazy::new(|| {
    PresetRegistry::from_yaml_str(BUILTIN_YAML).expect("embedded presets.yaml is valid")
});

/// Ordered collection of named genomes.
#[derive(Debug, Clone, Default)]
pub struct PresetRegistry {
    genomes: Vec<StyleGenome>,
}

impl PresetRegistry {
    /// The registry of builtin presets.
    pub fn builtin() -> &'static PresetRegistry {
        &BUILTIN
    }

    /// Parse a YAML list of genomes.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let genomes: Vec<StyleGenome> = serde_saphyr::from_str(yaml)
            .map_err(|e| Error::Validation(format!("malformed preset YAML: {}", e)))?;
        let mut registry = PresetRegistry::default();
        for genome in genomes {
            registry.insert(genome)?;
        }
        Ok(registry)
    }

    /// Add a genome; ids must be unique.
    pub fn insert(&mut self, genome: StyleGenome) -> Result<()> {
        if self.get(genome.id()).is_some() {
            return Err(Error::Validation(format!(
                "duplicate preset id '{}'",
                genome.id()
            )));
        }
        self.genomes.push(genome);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&StyleGenome> {
        self.genomes.iter().find(|g| g.id() == id)
    }

    /// Like [`get`](Self::get), but an unknown id is a validation error.
    pub fn require(&self, id: &str) -> Result<&StyleGenome> {
        self.get(id).ok_or_else(|| {
            Error::Validation(format!(
                "unknown preset '{}' (available: {})",
                id,
                self.ids().collect::<Vec<_>>().join(", ")
            ))
        })
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.genomes.iter().map(|g| g.id())
    }

    pub fn iter(&self) -> impl Iterator<Item = &StyleGenome> {
        self.genomes.iter()
    }

    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    /// The genome whose palette is closest to `palette` (sum of per-role
    /// CIE76 ΔE). Ties go to the earlier preset.
    pub fn nearest(&self, palette: &Palette) -> Option<&StyleGenome> {
        let mut best: Option<(&StyleGenome, f64)> = None;
        for genome in &self.genomes {
            let distance = genome.palette().distance(palette);
            match best {
                Some((_, d)) if d <= distance => {},
                _ => best = Some((genome, distance)),
            }
        }
        best.map(|(genome, _)| genome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::style::RGBColor;
    use crate::style::genome::{Category, ColorRole, CornerRadius, Motif, Provenance};

    #[test]
    fn test_builtin_presets_load() {
        let registry = PresetRegistry::builtin();
        let ids: Vec<_> = registry.ids().collect();
        assert_eq!(
            ids,
            [
                "corporate_classic",
                "modern_minimal",
                "tech_startup",
                "dark_cyber",
                "creative_bold",
                "nature_organic"
            ]
        );
        for genome in registry.iter() {
            assert_eq!(genome.provenance(), &Provenance::Builtin);
        }
    }

    #[test]
    fn test_preset_values() {
        let registry = PresetRegistry::builtin();
        let modern = registry.require("modern_minimal").unwrap();
        assert_eq!(
            modern.color(ColorRole::Primary),
            RGBColor::new(0x1A, 0x1A, 0x2E)
        );
        assert_eq!(modern.category(), Category::Minimal);

        let corporate = registry.require("corporate_classic").unwrap();
        assert_eq!(corporate.typography().heading_font, "Georgia");
        assert_eq!(corporate.layout_prefs().motif, Motif::AccentBar);

        let creative = registry.require("creative_bold").unwrap();
        assert_eq!(creative.layout_prefs().corner_radius, CornerRadius::Square);
    }

    #[test]
    fn test_unknown_preset() {
        let err = PresetRegistry::builtin().require("vaporwave").unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m.contains("vaporwave")));
    }

    #[test]
    fn test_nearest() {
        let registry = PresetRegistry::builtin();
        let dark = registry.require("dark_cyber").unwrap();
        assert_eq!(registry.nearest(dark.palette()).unwrap().id(), "dark_cyber");

        let mut almost = *registry.require("nature_organic").unwrap().palette();
        almost.accent = RGBColor::new(0x80, 0xC0, 0x20);
        assert_eq!(registry.nearest(&almost).unwrap().id(), "nature_organic");

        assert!(PresetRegistry::default().nearest(dark.palette()).is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let yaml = format!("{}\n{}", BUILTIN_YAML, BUILTIN_YAML);
        assert!(PresetRegistry::from_yaml_str(&yaml).is_err());
    }

    #[test]
    fn test_missing_role_rejected() {
        let yaml = r##"
- id: broken
  category: business
  palette:
    primary: "#000000"
    secondary: "#111111"
    accent: "#222222"
    background: "#FFFFFF"
  typography: { heading_font: A, body_font: B, scale: 1.0 }
  layout_prefs: { spacing_unit: 1.0, corner_radius: soft, motif: none }
"##;
        assert!(PresetRegistry::from_yaml_str(yaml).is_err());
    }
}
