pub mod leafspy;
pub mod types;

pub use leafspy::{decode_row, LeafSpy, LoadedLog, RowDecoder};
pub use types::{CellPairs, LeafLog, ParseStats, Parseable, Record, RowError};
