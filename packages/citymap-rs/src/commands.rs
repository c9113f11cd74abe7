//! Runs parsed CLI commands against the controllers.
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use tracing::info;

use citymap_rs::config::parse_view_size;
use citymap_rs::logging;
use citymap_rs::prelude::*;
use citymap_rs::{CoordinatePair, MapRequest, PixelPoint};

use crate::cli::{Args, Commands, EnvelopeMethod};

/// What a command did, printed as JSON with `--json`.
#[derive(Debug, Default, Serialize)]
struct Report {
  status: Option<SubmitStatus>,
  width: Option<u32>,
  height: Option<u32>,
  corners: Option<[i32; 4]>,
  output: Option<PathBuf>,
  field_errors: BTreeMap<String, String>,
  messages: Vec<String>,
}

/// Presenter that writes images to disk and messages to stderr.
struct CliPresenter {
  output: Option<PathBuf>,
  report: Report,
  save_error: Option<String>,
}

impl CliPresenter {
  fn new(output: Option<PathBuf>) -> Self {
    Self {
      output,
      report: Report::default(),
      save_error: None,
    }
  }

  fn store(&mut self, image: &MapImage) {
    self.report.width = Some(image.width());
    self.report.height = Some(image.height());
    if let Some(path) = &self.output {
      match image.save(path) {
        Ok(()) => {
          info!("image written to {}", path.display());
          self.report.output = Some(path.clone());
        }
        Err(e) => self.save_error = Some(format!("failed to write {}: {}", path.display(), e)),
      }
    }
  }

  fn record(&mut self, message: &str) {
    eprintln!("{}", message);
    self.report.messages.push(message.to_string());
  }
}

impl Presenter for CliPresenter {
  fn show_image(&mut self, image: &MapImage) {
    self.store(image);
  }

  fn show_preview(&mut self, image: &MapImage, corners: (i32, i32, i32, i32)) {
    let (x1, y1, x2, y2) = corners;
    self.report.corners = Some([x1, y1, x2, y2]);
    self.store(image);
  }

  fn show_error_dialog(&mut self, message: &str) {
    self.record(&format!("Error: {}", message));
  }

  fn notice(&mut self, message: &str) {
    self.record(message);
  }

  fn prompt(&mut self, message: &str) {
    info!("{}", message);
  }
}

fn load_config(args: &Args) -> Result<AppConfig> {
  let mut config = AppConfig::from_env()?;
  if let Some(endpoint) = &args.endpoint {
    config.endpoint = endpoint.clone();
  }
  if let Some(secs) = args.timeout {
    config.timeout = std::time::Duration::from_secs(secs);
  }
  if let Some(tag) = &args.locale {
    config.locale = NumberLocale::from_tag(tag);
  }
  config.verbose = !args.quiet;
  Ok(config)
}

fn client(config: &AppConfig) -> Result<Arc<SoapMapClient>> {
  let client = SoapMapClient::new(config.client_config()).context("Failed to build HTTP client")?;
  Ok(Arc::new(client))
}

fn collect_field_errors(fields: &[Field], report: &mut Report) {
  for field in fields {
    if let Some(err) = field.error() {
      eprintln!("{}: {}", field.name, err);
      report.field_errors.insert(field.name.to_string(), err.to_string());
    }
  }
}

/// Executes the command and returns the process exit code.
pub async fn run(args: Args) -> Result<i32> {
  let config = load_config(&args)?;
  logging::init(config.verbose);
  let json = args.json;

  let (status, mut presenter) = match args.command {
    Commands::Version => {
      println!("citymap {}", env!("CARGO_PKG_VERSION"));
      return Ok(0);
    }
    Commands::Envelope { method, params } => {
      let request = envelope_request(method, &params, &config.locale)?;
      println!("{}", client(&config)?.envelope_for(&request));
      return Ok(0);
    }
    Commands::Initial { output } => {
      let mut presenter = CliPresenter::new(output);
      let mut controller = MapCropController::new(client(&config)?, config.view_size);
      let status = controller.load_initial_map(&mut presenter).await;
      (status, presenter)
    }
    Commands::Pixels { x1, y1, x2, y2, output } => {
      let mut presenter = CliPresenter::new(output);
      let mut controller = PixelsController::new(client(&config)?, config.locale);
      controller.set_all(&x1, &y1, &x2, &y2);
      let status = controller.submit(&mut presenter).await;
      collect_field_errors(controller.fields(), &mut presenter.report);
      (status, presenter)
    }
    Commands::Coords { lat1, lon1, lat2, lon2, output } => {
      let mut presenter = CliPresenter::new(output);
      let mut controller = CoordinatesController::new(client(&config)?, config.locale);
      controller.set_all(&lat1, &lon1, &lat2, &lon2);
      let status = controller.submit(&mut presenter).await;
      collect_field_errors(controller.fields(), &mut presenter.report);
      (status, presenter)
    }
    Commands::Crop { taps, view, output } => {
      if taps.len() < 2 {
        bail!("crop needs at least two --tap values, got {}", taps.len());
      }
      let view_size = match view {
        Some(raw) => parse_view_size(&raw)?,
        None => config.view_size,
      };
      let mut presenter = CliPresenter::new(output);
      let mut controller = MapCropController::new(client(&config)?, view_size);

      let mut status = controller.load_initial_map(&mut presenter).await;
      if status.is_shown() {
        for tap in taps {
          controller.tap(tap, &mut presenter);
        }
        status = controller.confirm(&mut presenter).await;
      }
      (status, presenter)
    }
  };

  presenter.report.status = Some(status);
  if let Some(err) = presenter.save_error.take() {
    return Err(anyhow!(err));
  }

  if json {
    println!("{}", serde_json::to_string_pretty(&presenter.report)?);
  } else if let (Some(w), Some(h)) = (presenter.report.width, presenter.report.height) {
    println!("{}x{}", w, h);
  }

  Ok(exit_code(status))
}

fn exit_code(status: SubmitStatus) -> i32 {
  match status {
    SubmitStatus::Shown => 0,
    SubmitStatus::ServiceFailed | SubmitStatus::DecodeFailed => 1,
    SubmitStatus::Disabled | SubmitStatus::Invalid => 2,
  }
}

fn envelope_request(method: EnvelopeMethod, params: &[String], locale: &NumberLocale) -> Result<MapRequest> {
  let expected = if method == EnvelopeMethod::Initial { 0 } else { 4 };
  if params.len() != expected {
    bail!("{:?} takes {} parameters, got {}", method, expected, params.len());
  }

  let kinds = match method {
    EnvelopeMethod::Initial => return Ok(MapRequest::InitialMap),
    EnvelopeMethod::Pixels => [FieldKind::Pixel; 4],
    EnvelopeMethod::Coords => [
      FieldKind::Latitude,
      FieldKind::Longitude,
      FieldKind::Latitude,
      FieldKind::Longitude,
    ],
  };

  let mut values = [0.0; 4];
  for (i, (kind, raw)) in kinds.iter().zip(params).enumerate() {
    let name = format!("param{}", i + 1);
    values[i] = validate_field(*kind, &name, raw, locale).map_err(|e| anyhow!("{}: {}", name, e))?;
  }

  Ok(match method {
    EnvelopeMethod::Pixels => MapRequest::FragmentByPixels {
      first: PixelPoint::new(values[0] as i32, values[1] as i32),
      second: PixelPoint::new(values[2] as i32, values[3] as i32),
    },
    _ => MapRequest::FragmentByCoordinates {
      first: CoordinatePair::new(values[0], values[1]),
      second: CoordinatePair::new(values[2], values[3]),
    },
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::Parser;

  fn parse(argv: &[&str]) -> Args {
    Args::try_parse_from(argv).unwrap()
  }

  fn params(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
  }

  #[test]
  fn test_quiet_flag_drives_verbosity() {
    let config = load_config(&parse(&["citymap", "--quiet", "version"])).unwrap();
    assert!(!config.verbose);
    let config = load_config(&parse(&["citymap", "version"])).unwrap();
    assert!(config.verbose);
  }

  #[test]
  fn test_cli_overrides_config() {
    let args = parse(&["citymap", "--endpoint", "http://localhost:1/S", "--timeout", "3", "--locale", "pl_PL", "version"]);
    let config = load_config(&args).unwrap();
    assert_eq!(config.endpoint, "http://localhost:1/S");
    assert_eq!(config.timeout, std::time::Duration::from_secs(3));
    assert_eq!(config.locale, NumberLocale::pl_pl());
  }

  #[test]
  fn test_envelope_request_validates_params() {
    let request = envelope_request(EnvelopeMethod::Pixels, &params(&["1", "2", "3", "4"]), &NumberLocale::en_us()).unwrap();
    assert_eq!(
      request,
      MapRequest::FragmentByPixels {
        first: PixelPoint::new(1, 2),
        second: PixelPoint::new(3, 4),
      }
    );

    let err = envelope_request(EnvelopeMethod::Coords, &params(&["52.1", "", "1.0", "2.0"]), &NumberLocale::en_us()).unwrap_err();
    assert_eq!(err.to_string(), "param2: Required field");

    assert!(envelope_request(EnvelopeMethod::Initial, &params(&["1"]), &NumberLocale::en_us()).is_err());
  }
}
