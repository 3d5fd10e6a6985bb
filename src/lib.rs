#![doc = include_str!("../readme.md")]

pub mod filter;
pub mod geo;
pub mod predict;
pub mod route;
pub mod station;
pub mod track;

mod util;

#[doc(inline)]
pub use predict::{PredictionResult, StationPrediction};
#[doc(inline)]
pub use route::{RouteGraph, RouteSegment};
#[doc(inline)]
pub use station::{Station, StationArea, StationIndex, StationLookup};
#[doc(inline)]
pub use track::{Fix, SessionConfig, TrackingSession};

use crate::route::ConstructionError;

/// Aggregated crate error.
///
/// Only session construction fails fast; every runtime path inside
/// [`TrackingSession::on_fix`] degrades to best-effort output instead
/// of surfacing an error.
#[derive(Debug)]
pub enum Error {
    Construction(ConstructionError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Construction(err) => write!(f, "construction failed: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Construction(err) => Some(err),
        }
    }
}

impl_err!(ConstructionError, Construction);

pub type Result<T> = std::result::Result<T, Error>;
