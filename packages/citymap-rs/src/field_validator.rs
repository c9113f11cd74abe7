//! Checks raw form text before any request is sent.
//!
//! Every field goes through a format check, then a locale-aware parse, then
//! a range check. Text that fails the format check is never parsed.
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Maximum digits accepted after the decimal separator of a coordinate.
pub const FRACTION_DIGITS: usize = 6;

pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);
pub const PIXEL_RANGE: (f64, f64) = (0.0, 1000.0);

static COORDINATE_PATTERN: OnceLock<Regex> = OnceLock::new();
static PIXEL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn coordinate_pattern() -> &'static Regex {
  COORDINATE_PATTERN.get_or_init(|| {
    let pattern = format!(r"^-?[0-9]{{1,2}}[.,][0-9]{{1,{}}}$", FRACTION_DIGITS);
    Regex::new(&pattern).expect("coordinate pattern compiles")
  })
}

fn pixel_pattern() -> &'static Regex {
  PIXEL_PATTERN.get_or_init(|| Regex::new(r"^[0-9]{1,4}$").expect("pixel pattern compiles"))
}

/// Decimal and grouping conventions used when turning text into numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLocale {
  pub decimal: char,
  pub grouping: Option<char>,
}

impl Default for NumberLocale {
  fn default() -> Self {
    Self::en_us()
  }
}

impl NumberLocale {
  pub const fn en_us() -> Self {
    Self { decimal: '.', grouping: Some(',') }
  }

  pub const fn de_de() -> Self {
    Self { decimal: ',', grouping: Some('.') }
  }

  pub const fn pl_pl() -> Self {
    Self { decimal: ',', grouping: Some('\u{a0}') }
  }

  /// Picks a preset from a POSIX or BCP 47 tag such as `pl_PL.UTF-8` or `de-DE`.
  pub fn from_tag(tag: &str) -> Self {
    let language = tag
      .split(['_', '-', '.', '@'])
      .next()
      .unwrap_or_default()
      .to_ascii_lowercase();

    match language.as_str() {
      "de" | "nl" | "it" | "es" | "pt" | "id" | "tr" | "da" => Self::de_de(),
      "pl" | "fr" | "ru" | "uk" | "cs" | "sk" | "sv" | "fi" | "nb" | "no" => Self::pl_pl(),
      _ => Self::en_us(),
    }
  }

  /// Reads `LC_ALL`, `LC_NUMERIC` and `LANG`, in that order.
  pub fn from_env() -> Self {
    ["LC_ALL", "LC_NUMERIC", "LANG"]
      .iter()
      .filter_map(|key| std::env::var(key).ok())
      .find(|value| !value.trim().is_empty())
      .map(|tag| Self::from_tag(&tag))
      .unwrap_or_default()
  }

  /// Parses the longest numeric prefix of `raw`.
  ///
  /// Grouping characters before the decimal separator are skipped, parsing
  /// stops at the first character that is neither a digit nor a separator of
  /// this locale, and `None` is returned when no digit was read.
  pub fn parse(&self, raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars().peekable();
    let mut normalized = String::with_capacity(trimmed.len());

    if chars.peek() == Some(&'-') {
      normalized.push('-');
      chars.next();
    }

    let mut digits = 0;
    let mut seen_decimal = false;
    for c in chars {
      if c.is_ascii_digit() {
        normalized.push(c);
        digits += 1;
      } else if c == self.decimal && !seen_decimal {
        normalized.push('.');
        seen_decimal = true;
      } else if Some(c) == self.grouping && !seen_decimal && digits > 0 {
        continue;
      } else {
        break;
      }
    }

    if digits == 0 {
      return None;
    }
    normalized.parse::<f64>().ok()
  }
}

/// What a form field holds; decides its format and valid interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  Latitude,
  Longitude,
  Pixel,
}

impl FieldKind {
  pub fn range(self) -> (f64, f64) {
    match self {
      FieldKind::Latitude => LATITUDE_RANGE,
      FieldKind::Longitude => LONGITUDE_RANGE,
      FieldKind::Pixel => PIXEL_RANGE,
    }
  }

  fn pattern(self) -> &'static Regex {
    match self {
      FieldKind::Latitude | FieldKind::Longitude => coordinate_pattern(),
      FieldKind::Pixel => pixel_pattern(),
    }
  }

  fn format_hint(self) -> &'static str {
    match self {
      FieldKind::Latitude | FieldKind::Longitude => "Format: 6 digits after comma",
      FieldKind::Pixel => "Format: whole number",
    }
  }

  fn range_label(self, field_name: &str) -> String {
    match self {
      FieldKind::Latitude => "Latitude".to_string(),
      FieldKind::Longitude => "Longitude".to_string(),
      FieldKind::Pixel => field_name.to_string(),
    }
  }
}

/// Per-field validation failure. `Display` is the message shown on the field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
  #[error("Required field")]
  Required,
  #[error("{hint}")]
  Format { hint: &'static str },
  #[error("{label} range {min}..{max}")]
  Range { label: String, min: f64, max: f64 },
}

/// True iff `text` has the shape required for `kind`.
pub fn matches_format(kind: FieldKind, text: &str) -> bool {
  kind.pattern().is_match(text.trim())
}

/// Inclusive range check; a missing value never passes.
pub fn in_range(value: Option<f64>, min: f64, max: f64) -> bool {
  matches!(value, Some(v) if v >= min && v <= max)
}

/// Runs the format, parse and range checks for a single value.
///
/// Blank text is `Required` rather than a format failure.
pub fn validate_field(
  kind: FieldKind,
  name: &str,
  raw: &str,
  locale: &NumberLocale,
) -> Result<f64, FieldError> {
  if raw.trim().is_empty() {
    return Err(FieldError::Required);
  }
  if !matches_format(kind, raw) {
    return Err(FieldError::Format { hint: kind.format_hint() });
  }

  let value = locale.parse(raw);
  let (min, max) = kind.range();
  match value {
    Some(v) if in_range(value, min, max) => Ok(v),
    _ => Err(FieldError::Range {
      label: kind.range_label(name),
      min,
      max,
    }),
  }
}

/// A text input together with its error indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
  pub name: &'static str,
  pub kind: FieldKind,
  text: String,
  error: Option<FieldError>,
}

impl Field {
  pub fn new(name: &'static str, kind: FieldKind) -> Self {
    Self {
      name,
      kind,
      text: String::new(),
      error: None,
    }
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  pub fn set_text(&mut self, text: impl Into<String>) {
    self.text = text.into();
  }

  pub fn error(&self) -> Option<&FieldError> {
    self.error.as_ref()
  }

  pub fn is_filled(&self) -> bool {
    !self.text.trim().is_empty()
  }

  pub fn flag(&mut self, error: FieldError) {
    self.error = Some(error);
  }

  pub fn clear_error(&mut self) {
    self.error = None;
  }

  /// Empties the text and drops any error.
  pub fn reset(&mut self) {
    self.text.clear();
    self.error = None;
  }
}

/// Cheap check behind the submit control: every field has non-blank text.
pub fn all_filled(fields: &[Field]) -> bool {
  fields.iter().all(Field::is_filled)
}

/// Validates every field independently, flagging failures and clearing passes.
///
/// Returns the parsed values in field order only when all fields pass.
pub fn validate_form(fields: &mut [Field], locale: &NumberLocale) -> Option<Vec<f64>> {
  let mut values = Vec::with_capacity(fields.len());
  let mut all_ok = true;

  for field in fields.iter_mut() {
    match validate_field(field.kind, field.name, &field.text, locale) {
      Ok(value) => {
        field.clear_error();
        values.push(value);
      }
      Err(err) => {
        field.flag(err);
        all_ok = false;
      }
    }
  }

  all_ok.then_some(values)
}

/// Flags blank fields as required and clears the error on the others.
pub fn flag_empty_fields(fields: &mut [Field]) {
  for field in fields.iter_mut() {
    if field.is_filled() {
      field.clear_error();
    } else {
      field.flag(FieldError::Required);
    }
  }
}
