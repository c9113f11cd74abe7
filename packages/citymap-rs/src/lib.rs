//! # citymap-rs
//!
//! Validated requests against the city map fragment service, plus the
//! geometry behind interactive map cropping.
//!
//! ## Features
//!
//! - **Field Validation**: Format, locale-aware parsing and range checks for coordinate and pixel input
//! - **Payload Decoding**: Data URI stripping, lenient base64 and image decoding
//! - **Selection Geometry**: Display-to-image rectangle mapping with clamping and a two-tap selector
//! - **Controllers**: Headless coordinate, pixel and map-crop flows driving any [`MapService`]
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use citymap_rs::prelude::*;
//!
//! let client = Arc::new(SoapMapClient::new(AppConfig::from_env()?.client_config())?);
//! let mut form = CoordinatesController::new(client, NumberLocale::from_env());
//! form.set_all("52.2297", "21.0122", "52.1000", "21.5000");
//! let status = form.submit(&mut my_presenter).await;
//! ```

pub mod config;
pub mod controllers;
pub mod field_validator;
pub mod logging;
pub mod payload;
pub mod selection_geometry;

pub use citymap_soap::{
  ClientConfig, CoordinatePair, MapRequest, MapService, PixelPoint, ServiceOutcome, SoapMapClient,
};
pub use config::AppConfig;
pub use controllers::{CoordinatesController, MapCropController, PixelsController, Presenter, SubmitStatus};
pub use field_validator::{
  all_filled, in_range, matches_format, validate_field, validate_form, Field, FieldError, FieldKind, NumberLocale,
};
pub use payload::{decode_base64, decode_image, encode_base64, strip_data_uri_prefix, DecodeError, MapImage};
pub use selection_geometry::{
  map_display_rect_to_image_rect, DisplayTransform, ImageFrame, Point, SelectionRect, TwoTapSelection,
};

/// Prelude module for convenient imports
///
/// Import everything you need with:
/// ```ignore
/// use citymap_rs::prelude::*;
/// ```
pub mod prelude {
  pub use crate::{
    all_filled, decode_image, in_range, map_display_rect_to_image_rect, matches_format, strip_data_uri_prefix,
    validate_field, validate_form, AppConfig, CoordinatesController, DecodeError, DisplayTransform, Field,
    FieldError, FieldKind, ImageFrame, MapCropController, MapImage, MapService, NumberLocale, PixelsController,
    Point, Presenter, SelectionRect, ServiceOutcome, SoapMapClient, SubmitStatus, TwoTapSelection,
  };
}
