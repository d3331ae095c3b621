#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Control point CSV reader.
pub mod csv;

/// PDAL pipeline construction.
pub mod pipeline;

/// Text and CSV reports of transformation results.
pub mod report;

mod error;
pub use error::GeorefIoError;
