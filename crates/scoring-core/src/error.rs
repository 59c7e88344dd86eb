//! Errors raised when constructing data model values.
//!
//! The evaluation engine itself never fails: degenerate inputs produce empty
//! or zero results. These errors only guard the invariants of the input types.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("altitude {0} is not a finite number")]
    InvalidAltitude(f64),
    #[error("time period starts at {start} but ends earlier at {end}")]
    InvertedTimePeriod {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}
