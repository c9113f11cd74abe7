//! Command line arguments backing the `citymap` binary.
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use citymap_rs::Point;

#[derive(Parser, Debug)]
#[command(
  name = "citymap",
  about = "A CLI for fetching city map fragments from the city map SOAP service",
  version
)]
pub struct Args {
  /// Service endpoint (overrides CITYMAP_ENDPOINT)
  #[arg(long, global = true)]
  pub endpoint: Option<String>,

  /// Request timeout in seconds (overrides CITYMAP_TIMEOUT_SECS)
  #[arg(long, global = true)]
  pub timeout: Option<u64>,

  /// Number locale used to read decimals, e.g. en_US or pl_PL
  #[arg(long, global = true)]
  pub locale: Option<String>,

  /// Only log warnings and errors
  #[arg(long, short = 'q', global = true)]
  pub quiet: bool,

  /// Print a JSON report on stdout
  #[arg(long, global = true)]
  pub json: bool,

  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Print version information
  Version,
  /// Fetch the full initial map
  Initial {
    /// Where to write the image
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
  },
  /// Fetch a fragment between two pixel corners (0-1000)
  Pixels {
    x1: String,
    y1: String,
    x2: String,
    y2: String,

    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
  },
  /// Fetch a fragment between two geographic corners
  #[command(allow_negative_numbers = true)]
  Coords {
    lat1: String,
    lon1: String,
    lat2: String,
    lon2: String,

    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
  },
  /// Load the initial map, replay two taps in display coordinates and fetch the selection
  Crop {
    /// Tap position as X,Y in display pixels; give it at least twice, later taps move the end corner
    #[arg(long = "tap", value_parser = parse_point, required = true)]
    taps: Vec<Point>,

    /// Display area as WIDTHxHEIGHT (overrides CITYMAP_VIEW_SIZE)
    #[arg(long)]
    view: Option<String>,

    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
  },
  /// Print the SOAP request body for a method without sending it
  #[command(allow_negative_numbers = true)]
  Envelope {
    #[arg(value_enum)]
    method: EnvelopeMethod,

    /// Four parameters for `pixels` and `coords`
    params: Vec<String>,
  },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvelopeMethod {
  Initial,
  Pixels,
  Coords,
}

fn parse_point(raw: &str) -> Result<Point, String> {
  let (x, y) = raw
    .split_once(',')
    .ok_or_else(|| format!("expected X,Y, got {:?}", raw))?;
  let x: f32 = x.trim().parse().map_err(|e| format!("bad x in {:?}: {}", raw, e))?;
  let y: f32 = y.trim().parse().map_err(|e| format!("bad y in {:?}: {}", raw, e))?;
  Ok(Point::new(x, y))
}
