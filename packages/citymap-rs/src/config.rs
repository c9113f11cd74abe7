//! Runtime settings, with `CITYMAP_*` environment overrides.
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use citymap_soap::{ClientConfig, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, NAMESPACE};

use crate::field_validator::NumberLocale;

pub const ENV_ENDPOINT: &str = "CITYMAP_ENDPOINT";
pub const ENV_TIMEOUT_SECS: &str = "CITYMAP_TIMEOUT_SECS";
pub const ENV_SOAP_ACTION: &str = "CITYMAP_SOAP_ACTION";
pub const ENV_VIEW_SIZE: &str = "CITYMAP_VIEW_SIZE";

/// Display area the map is fitted into, in pixels.
pub const DEFAULT_VIEW_SIZE: (u32, u32) = (1080, 1920);

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub endpoint: String,
  pub timeout: Duration,
  pub soap_action: Option<String>,
  pub locale: NumberLocale,
  pub view_size: (u32, u32),
  pub verbose: bool,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      endpoint: DEFAULT_ENDPOINT.to_string(),
      timeout: DEFAULT_TIMEOUT,
      soap_action: None,
      locale: NumberLocale::default(),
      view_size: DEFAULT_VIEW_SIZE,
      verbose: true,
    }
  }
}

impl AppConfig {
  /// Defaults overridden by the process environment.
  pub fn from_env() -> Result<Self> {
    let mut config = Self::from_lookup(|key| std::env::var(key).ok())?;
    config.locale = NumberLocale::from_env();
    Ok(config)
  }

  /// Defaults overridden by whatever `lookup` returns for each `CITYMAP_*` key.
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let mut config = Self::default();
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(endpoint) = get(ENV_ENDPOINT) {
      config.endpoint = endpoint.trim().to_string();
    }
    if let Some(secs) = get(ENV_TIMEOUT_SECS) {
      let secs: u64 = secs
        .trim()
        .parse()
        .with_context(|| format!("{} must be a whole number of seconds", ENV_TIMEOUT_SECS))?;
      config.timeout = Duration::from_secs(secs);
    }
    if let Some(action) = get(ENV_SOAP_ACTION) {
      config.soap_action = Some(action);
    }
    if let Some(size) = get(ENV_VIEW_SIZE) {
      config.view_size = parse_view_size(&size).with_context(|| format!("invalid {}", ENV_VIEW_SIZE))?;
    }

    Ok(config)
  }

  pub fn client_config(&self) -> ClientConfig {
    ClientConfig {
      endpoint: self.endpoint.clone(),
      namespace: NAMESPACE.to_string(),
      timeout: self.timeout,
      soap_action: self.soap_action.clone(),
    }
  }
}

/// Parses `WIDTHxHEIGHT`, e.g. `1080x1920`.
pub fn parse_view_size(raw: &str) -> Result<(u32, u32)> {
  let (w, h) = raw
    .trim()
    .split_once(['x', 'X'])
    .ok_or_else(|| anyhow!("expected WIDTHxHEIGHT, got {:?}", raw))?;
  let w: u32 = w.trim().parse().context("view width")?;
  let h: u32 = h.trim().parse().context("view height")?;
  if w == 0 || h == 0 {
    return Err(anyhow!("view size must be non-zero, got {}x{}", w, h));
  }
  Ok((w, h))
}
