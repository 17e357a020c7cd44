use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use structopt::StructOpt;

use abstutil::Timer;
use road_network::raster::{analyze_image, synthesize_image, ImageAnalysisOptions};
use road_network::{
    AnalysisError, AnalysisOptions, AnalysisResult, Analyzer, IntersectionMode, OverpassClient,
};

#[derive(StructOpt)]
pub struct VectorArgs {
    /// The path to a GeoJSON file with the region. Polygons, multipolygons, and points are used.
    #[structopt()]
    region: String,
    /// Where to write the GeoJSON result. Prints to STDOUT if omitted.
    #[structopt(long)]
    output: Option<String>,
    /// A JSON file with analysis options. Flags override it.
    #[structopt(long)]
    options: Option<String>,
    /// Keep roads exactly as Overpass returns them, without finding intersections
    #[structopt(long)]
    raw_only: bool,
    /// Keep roads outside the region's polygons
    #[structopt(long)]
    no_clip: bool,
    /// An Overpass endpoint to use. Repeat to try several in order. Defaults to a few public
    /// servers.
    #[structopt(long = "endpoint")]
    endpoints: Vec<String>,
    /// Give up on an endpoint after this many seconds
    #[structopt(long, default_value = "30")]
    timeout_secs: u64,
    /// Wait this many seconds after a failed endpoint before trying the next
    #[structopt(long, default_value = "2")]
    backoff_secs: u64,
    /// A base map tile URL. Only used by interactive viewers; analysis ignores it.
    #[structopt(long)]
    tile_url: Option<String>,
}

#[derive(StructOpt)]
pub struct ImageArgs {
    /// The path to a GeoJSON file with the region
    #[structopt()]
    region: String,
    /// A PNG covering exactly the region's bounding box. If omitted, a synthetic street grid is
    /// used.
    #[structopt(long)]
    image: Option<String>,
    /// Width of the synthetic image
    #[structopt(long, default_value = "512")]
    width: u32,
    /// Height of the synthetic image
    #[structopt(long, default_value = "512")]
    height: u32,
    /// A seed for generating the synthetic image
    #[structopt(long, default_value = "42")]
    rng_seed: u64,
    /// A JSON file with image analysis options
    #[structopt(long)]
    options: Option<String>,
    /// Keep roads outside the region's polygons
    #[structopt(long)]
    no_clip: bool,
    /// Where to write the GeoJSON result. Prints to STDOUT if omitted.
    #[structopt(long)]
    output: Option<String>,
}

pub async fn vector(args: VectorArgs) -> Result<()> {
    let region = crate::load_region(&args.region)?;
    let mut opts: AnalysisOptions = match args.options {
        Some(path) => abstio::maybe_read_json(path)?,
        None => AnalysisOptions::default(),
    };
    if args.raw_only {
        opts.intersections = IntersectionMode::RawOnly;
    }
    if args.no_clip {
        opts.clip_to_boundary = false;
    }
    if let Some(url) = args.tile_url {
        debug!("Ignoring tile URL {}", url);
    }

    let mut client = OverpassClient {
        timeout: Duration::from_secs(args.timeout_secs),
        backoff: Duration::from_secs(args.backoff_secs),
        ..Default::default()
    };
    if !args.endpoints.is_empty() {
        client.endpoints = args.endpoints;
    }

    let mut timer = Timer::new(&format!("analyze {}", args.region));
    let analyzer = Analyzer::new(client, opts);
    let result = analyzer.analyze(&region, &mut timer).await;
    finish(result, args.output)
}

pub fn image(args: ImageArgs) -> Result<()> {
    let region = crate::load_region(&args.region)?;
    let opts: ImageAnalysisOptions = match args.options {
        Some(path) => abstio::maybe_read_json(path)?,
        None => ImageAnalysisOptions::default(),
    };

    let mut timer = Timer::new(&format!("analyze an image of {}", args.region));
    timer.start("load image");
    let img = match args.image {
        Some(path) => match image::open(&path) {
            Ok(img) => img.to_rgba8(),
            Err(err) => {
                timer.stop("load image");
                return finish(
                    Err(AnalysisError::Image(format!("can't read {}: {}", path, err))),
                    args.output,
                );
            }
        },
        None => synthesize_image(args.width, args.height, args.rng_seed),
    };
    timer.stop("load image");

    let result = analyze_image(&img, &region, &opts, !args.no_clip, &mut timer);
    finish(result, args.output)
}

/// Logs warnings or a suggested remedy, then writes the result.
fn finish(result: Result<AnalysisResult, AnalysisError>, output: Option<String>) -> Result<()> {
    finish_to(result, output, &mut std::io::stdout())
}

fn finish_to<W: Write>(
    result: Result<AnalysisResult, AnalysisError>,
    output: Option<String>,
    stdout: &mut W,
) -> Result<()> {
    let result = match result {
        Ok(result) => result,
        Err(err) => {
            error!("{}", err);
            error!("{}", err.suggestion());
            return Err(err.into());
        }
    };
    for warning in &result.warnings {
        warn!("{}", warning);
    }
    info!(
        "Found {} roads and {} intersections",
        result.roads.len(),
        result.intersections.len()
    );
    crate::write_result_to(&result, output, stdout)
}
