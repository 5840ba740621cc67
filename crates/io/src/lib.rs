// Document parsing: geo-markup network exports and field measurement tables.
// Callers hand in already-loaded content; nothing here touches the filesystem.

pub mod error;
pub mod fields;
pub mod kml;
pub mod measurements;
pub mod text;

pub use error::{ParseError, RowDecodeError};
pub use kml::parse as parse_kml;
pub use measurements::{parse_atp, parse_opm, AtpTable, OpmTable};
