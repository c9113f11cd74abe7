use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::envelope::{format_coordinate, SoapParam, SoapValue};
use crate::region::{CoordinatePair, PixelPoint};

/// Prefix that marks a failed call in the service's string contract.
pub const ERROR_MARKER: &str = "ERROR";

/// Result of one remote call: a base64 payload or a diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceOutcome {
    Success(String),
    Failure(String),
}

impl ServiceOutcome {
    /// Classifies a raw service string. Anything starting with `ERROR` is a failure.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.starts_with(ERROR_MARKER) {
            ServiceOutcome::Failure(raw)
        } else {
            ServiceOutcome::Success(raw)
        }
    }

    /// Builds a failure carrying the `ERROR: ` prefix followed by `cause`.
    pub fn failure(cause: impl fmt::Display) -> Self {
        ServiceOutcome::Failure(format!("{}: {}", ERROR_MARKER, cause))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ServiceOutcome::Success(_))
    }

    pub fn payload(&self) -> Option<&str> {
        match self {
            ServiceOutcome::Success(payload) => Some(payload),
            ServiceOutcome::Failure(_) => None,
        }
    }
}

/// One of the three remote operations the map service exposes.
#[derive(Debug, Clone, PartialEq)]
pub enum MapRequest {
    InitialMap,
    FragmentByPixels {
        first: PixelPoint,
        second: PixelPoint,
    },
    FragmentByCoordinates {
        first: CoordinatePair,
        second: CoordinatePair,
    },
}

impl MapRequest {
    /// Remote method name used as the SOAP body root element.
    pub fn method(&self) -> &'static str {
        match self {
            MapRequest::InitialMap => "GetInitialMap",
            MapRequest::FragmentByPixels { .. } => "GetFragmentOfMap",
            MapRequest::FragmentByCoordinates { .. } => "GetFragmentOfMapUsingGeoCoordinates",
        }
    }

    /// Named parameters in wire order. Pixels travel as integers, coordinates as strings.
    pub fn params(&self) -> Vec<SoapParam> {
        match self {
            MapRequest::InitialMap => Vec::new(),
            MapRequest::FragmentByPixels { first, second } => vec![
                SoapParam::new("X1", SoapValue::Int(first.x)),
                SoapParam::new("Y1", SoapValue::Int(first.y)),
                SoapParam::new("X2", SoapValue::Int(second.x)),
                SoapParam::new("Y2", SoapValue::Int(second.y)),
            ],
            MapRequest::FragmentByCoordinates { first, second } => vec![
                SoapParam::new("Lat1", SoapValue::Text(format_coordinate(first.latitude))),
                SoapParam::new("Lon1", SoapValue::Text(format_coordinate(first.longitude))),
                SoapParam::new("Lat2", SoapValue::Text(format_coordinate(second.latitude))),
                SoapParam::new("Lon2", SoapValue::Text(format_coordinate(second.longitude))),
            ],
        }
    }
}

/// Failures inside the client. They are folded into [`ServiceOutcome::Failure`]
/// before leaving a [`MapService`].
#[derive(Debug, Error)]
pub enum SoapError {
    #[error("tag ImageInBase64 not found")]
    MissingTag,
    #[error("HTTP status {status}")]
    Status { status: u16, body: String },
    #[error("{0}")]
    Http(#[from] reqwest::Error),
}

/// Access to the map fragment service.
///
/// Implementors only provide [`MapService::call`]; the typed helpers build the
/// matching [`MapRequest`].
#[async_trait]
pub trait MapService: Send + Sync {
    async fn call(&self, request: MapRequest) -> ServiceOutcome;

    async fn fetch_initial_map(&self) -> ServiceOutcome {
        self.call(MapRequest::InitialMap).await
    }

    async fn fetch_fragment_by_pixels(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> ServiceOutcome {
        self.call(MapRequest::FragmentByPixels {
            first: PixelPoint::new(x1, y1),
            second: PixelPoint::new(x2, y2),
        })
        .await
    }

    async fn fetch_fragment_by_coordinates(
        &self,
        lat1: f64,
        lon1: f64,
        lat2: f64,
        lon2: f64,
    ) -> ServiceOutcome {
        self.call(MapRequest::FragmentByCoordinates {
            first: CoordinatePair::new(lat1, lon1),
            second: CoordinatePair::new(lat2, lon2),
        })
        .await
    }
}
