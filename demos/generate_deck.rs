//! Command-line deck generator.
//!
//! Reads an outline as JSON and writes a `.pptx` plus its metadata as JSON.
//!
//! # Usage
//!
//! From a preset:
//! ```sh
//! cargo run --example generate_deck -- demos/sample_outline.json -o deck.pptx --preset tech_startup
//! ```
//!
//! Breeding two presets, 30% of the second:
//! ```sh
//! cargo run --example generate_deck -- demos/sample_outline.json -o deck.pptx \
//!     --preset modern_minimal --breed-with corporate_classic --ratio 0.3
//! ```
//!
//! Matching an existing deck, with an image on slide 3:
//! ```sh
//! cargo run --example generate_deck -- demos/sample_outline.json -o deck.pptx \
//!     --reference brand.pptx --image 2=chart.png
//! ```
//!
//! Set `RUST_LOG=deckgene=debug` to trace the pipeline stages.

use clap::Parser;
use deckgene::{Generator, GeneratorConfig, ImageRef, Outline, StyleReference};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Generate a styled presentation from an outline
#[derive(Parser, Debug)]
#[command(name = "generate_deck", version)]
struct Args {
    /// Outline JSON file
    #[arg(value_name = "OUTLINE")]
    outline: PathBuf,

    /// Output .pptx file
    #[arg(short, long, value_name = "OUTPUT")]
    output: PathBuf,

    /// Preset id (the first parent when breeding)
    #[arg(long, default_value = "modern_minimal", conflicts_with = "reference")]
    preset: String,

    /// Second parent to breed the preset with
    #[arg(long, requires = "ratio")]
    breed_with: Option<String>,

    /// Share of the second parent in the child, 0..=1
    #[arg(long)]
    ratio: Option<f64>,

    /// Reference .pptx to extract the style from
    #[arg(long, value_name = "PPTX")]
    reference: Option<PathBuf>,

    /// Slide image as SLIDE=SOURCE (zero-based slide index; path, data: or http(s) URL)
    #[arg(long = "image", value_name = "SLIDE=SOURCE", value_parser = parse_image)]
    images: Vec<(usize, String)>,

    /// Generator configuration YAML
    #[arg(long, value_name = "YAML")]
    config: Option<PathBuf>,

    /// Write the metadata JSON here instead of stdout
    #[arg(long, value_name = "JSON")]
    metadata: Option<PathBuf>,
}

fn parse_image(arg: &str) -> Result<(usize, String), String> {
    let (slide, source) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected SLIDE=SOURCE, got '{}'", arg))?;
    let slide = slide
        .trim()
        .parse()
        .map_err(|e| format!("invalid slide index '{}': {}", slide, e))?;
    Ok((slide, source.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GeneratorConfig::from_yaml_file(path)?,
        None => GeneratorConfig::default(),
    };
    let outline = Outline::from_json_slice(&fs::read(&args.outline)?)?;

    let style = match (&args.reference, &args.breed_with) {
        (Some(path), _) => StyleReference::reference(fs::read(path)?),
        (None, Some(other)) => StyleReference::breed(&args.preset, other, args.ratio.unwrap_or(0.5)),
        (None, None) => StyleReference::preset(&args.preset),
    };
    let images: BTreeMap<usize, ImageRef> = args
        .images
        .iter()
        .map(|(slide, source)| (*slide, ImageRef::new(source.as_str())))
        .collect();

    let generator = Generator::new(config)?;
    let deck = match generator.generate(&outline, &style, &images).await {
        Ok(deck) => deck,
        Err(e) => {
            eprintln!("{}", serde_json::to_string_pretty(&e.report())?);
            std::process::exit(1);
        },
    };

    fs::write(&args.output, &deck.bytes)?;
    let metadata = serde_json::to_string_pretty(&deck.metadata)?;
    match &args.metadata {
        Some(path) => fs::write(path, metadata)?,
        None => println!("{}", metadata),
    }

    eprintln!(
        "✓ Wrote {} slides to {} ({} bytes, style {})",
        deck.metadata.slide_count,
        args.output.display(),
        deck.bytes.len(),
        deck.metadata.style_id_used
    );
    Ok(())
}
