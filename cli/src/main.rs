//! Runs road network analysis from the command line. Regions and results are GeoJSON files.

#[macro_use]
extern crate log;

mod analyze;

use std::io::Write;

use anyhow::Result;
use structopt::StructOpt;

use abstutil::Timer;
use road_network::{clip_to_region, find_intersections, AnalysisResult, Region};

#[derive(StructOpt)]
#[structopt(name = "roadnet", about = "Finds roads and their intersections inside a region")]
enum Command {
    /// Fetches roads for a region from Overpass, splits them where they cross, and clips them to
    /// the region.
    Analyze {
        #[structopt(flatten)]
        args: analyze::VectorArgs,
    },
    /// Extracts roads for a region from an image, either a PNG file covering exactly the region's
    /// bounding box or a synthetic street grid.
    AnalyzeImage {
        #[structopt(flatten)]
        args: analyze::ImageArgs,
    },
    /// Prints the bounding box of a region.
    #[structopt(name = "bbox")]
    BBox {
        /// The path to a GeoJSON file with the region
        #[structopt()]
        region: String,
    },
    /// Splits roads from a previous analysis where they cross, and finds their intersections
    /// again. Existing intersection points in the input are replaced.
    FindIntersections {
        /// The path to a GeoJSON file of roads
        #[structopt()]
        input: String,
        /// Where to write the GeoJSON result. Prints to STDOUT if omitted.
        #[structopt(long)]
        output: Option<String>,
    },
    /// Drops roads and intersections from a previous analysis that don't touch a region.
    Clip {
        /// The path to a GeoJSON file of roads
        #[structopt()]
        input: String,
        /// The path to a GeoJSON file with the region
        #[structopt(long)]
        region: String,
        /// Where to write the GeoJSON result. Prints to STDOUT if omitted.
        #[structopt(long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Command::from_args();

    // Printing a bounding box should stay quiet
    if !matches!(cmd, Command::BBox { .. }) {
        abstutil::logger::setup();
    }

    match cmd {
        Command::Analyze { args } => analyze::vector(args).await?,
        Command::AnalyzeImage { args } => analyze::image(args)?,
        Command::BBox { region } => {
            let bounds = load_region(&region)?.bounding_box()?;
            println!("{}", serde_json::to_string_pretty(&bounds)?);
        }
        Command::FindIntersections { input, output } => {
            let mut timer = Timer::new(&format!("find intersections in {}", input));
            let result = load_result(&input)?;
            let (roads, intersections) = find_intersections(result.roads, &mut timer);
            let result = AnalysisResult {
                roads,
                intersections,
                ..result
            };
            write_result(&result, output)?;
        }
        Command::Clip {
            input,
            region,
            output,
        } => {
            let mut result = load_result(&input)?;
            let region = load_region(&region)?;
            let removed = clip_to_region(&mut result, &region);
            info!("Removed {} features outside {}", removed, input);
            write_result(&result, output)?;
        }
    }
    Ok(())
}

fn load_region(path: &str) -> Result<Region> {
    let raw = String::from_utf8(abstio::slurp_file(path)?)?;
    Ok(Region::from_geojson_str(&raw)?)
}

fn load_result(path: &str) -> Result<AnalysisResult> {
    let raw = String::from_utf8(abstio::slurp_file(path)?)?;
    Ok(AnalysisResult::from_geojson_str(&raw)?)
}

/// Writes GeoJSON to a file, or STDOUT
fn write_result(result: &AnalysisResult, output: Option<String>) -> Result<()> {
    write_result_to(result, output, &mut std::io::stdout())
}

/// Nothing but the GeoJSON goes to `stdout`, so it can be piped into other tools.
fn write_result_to<W: Write>(
    result: &AnalysisResult,
    output: Option<String>,
    stdout: &mut W,
) -> Result<()> {
    let contents = result.to_geojson_string()?;
    match output {
        Some(path) => abstio::write_string(path, &contents)?,
        None => writeln!(stdout, "{}", contents)?,
    }
    Ok(())
}
