//! Analyze a planar phantom radiograph and print the results.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use imaging::image_proc::PlanarImage;
use planar::{
    AnalysisConfig, FamilyDefinition, LightRadAnalyzer, LightRadConfig, PhantomFamily,
    PlanarAnalyzer,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Planar phantom image QA", long_about = None)]
struct Args {
    /// Radiograph to analyze (PNG or TIFF, 8- or 16-bit grayscale)
    image: PathBuf,

    /// Phantom family, by id (e.g. leeds, qc3, las-vegas, fc2) or common name
    #[arg(short, long)]
    phantom: PhantomFamily,

    /// Pixels per millimetre at the detector
    #[arg(long, default_value_t = 1.0)]
    dpmm: f64,

    /// JSON analysis options; defaults are used for missing fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Analyze the unit-scaled counts without grounding and normalizing first
    #[arg(long, default_value_t = false)]
    no_normalize: bool,

    /// Also print the flat result as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn load_image(args: &Args) -> Result<PlanarImage> {
    let decoded = image::open(&args.image)
        .with_context(|| format!("failed to read {}", args.image.display()))?;
    let image = PlanarImage::from_gray16(&decoded.into_luma16(), args.dpmm)?;
    Ok(image.with_path(&args.image))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let image = load_image(&args)?;
    log::info!(
        "loaded {} as {} at {} px/mm",
        args.image.display(),
        args.phantom,
        args.dpmm
    );

    match args.phantom.definition() {
        FamilyDefinition::Outline(definition) => {
            let config = match &args.config {
                Some(path) => AnalysisConfig::load(path)?,
                None => AnalysisConfig::default(),
            };
            let analysis = PlanarAnalyzer::new(image, definition, !args.no_normalize).analyze(&config)?;
            println!("{}", analysis.results(None));
            if args.json {
                let map = analysis.results_data(None).to_map()?;
                println!("{}", serde_json::to_string_pretty(&map)?);
            }
        }
        FamilyDefinition::Marker(definition) => {
            let config = match &args.config {
                Some(path) => LightRadConfig::load(path)?,
                None => LightRadConfig::default(),
            };
            let analysis = LightRadAnalyzer::new(image, definition).analyze(&config)?;
            println!("{}", analysis.results());
            if args.json {
                let map = analysis.results_data().to_map()?;
                println!("{}", serde_json::to_string_pretty(&map)?);
            }
        }
    }
    Ok(())
}
