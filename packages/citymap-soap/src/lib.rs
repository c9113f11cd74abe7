//! Client for the city map fragment SOAP service.
//!
//! [`SoapMapClient`] is the HTTP implementation of [`MapService`]. Every call
//! resolves to a [`ServiceOutcome`]: transport faults and malformed responses
//! come back as [`ServiceOutcome::Failure`] instead of errors.

pub mod client;
pub mod envelope;
pub mod region;
pub mod service;

pub use client::{ClientConfig, SoapMapClient, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, NAMESPACE};
pub use envelope::{build_envelope, extract_tag, format_coordinate, SoapParam, SoapValue, IMAGE_TAG};
pub use region::{CoordinatePair, PixelPoint};
pub use service::{MapRequest, MapService, ServiceOutcome, SoapError, ERROR_MARKER};
