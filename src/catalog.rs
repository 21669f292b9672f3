//! Track catalog: the ordered list of `TrackDescriptor`s the player walks.
//!
//! Tracks come from a TOML catalog file, a scanned music directory or the
//! built-in demo shelf.

mod builtin;
mod load;
mod model;
mod scan;

pub use builtin::demo_tracks;
pub use load::{CatalogError, load_catalog, load_catalog_file, parse_catalog};
pub use model::*;
pub use scan::scan;
