//! LeafLog - A fast, strict decoder for LeafSpy EV telemetry logs
//!
//! This library turns the CSV logs written by LeafSpy into typed,
//! unit-normalized records ready for analysis or export.
//!
//! ## Module Structure
//!
//! - [`parsers`] - Row decoder and whole-file LeafSpy parser
//! - [`location`] - GPS position parsing for the Lat/Long/Elv columns
//! - [`state`] - Column layout constants and vehicle state codes
//! - [`units`] - Temperature conversion utilities
//! - [`files`] - Log file discovery
//! - [`settings`] - Decoder and loader settings
//! - [`error`] - Error types

pub mod error;
pub mod files;
pub mod location;
pub mod parsers;
pub mod settings;
pub mod state;
pub mod units;

pub use error::{DecodeError, Error, Result, ValueKind};
pub use location::{parse_location, Location, LocationError};
pub use parsers::{decode_row, LeafLog, LeafSpy, Parseable, Record, RowDecoder};
pub use settings::{RowErrorPolicy, Settings};
