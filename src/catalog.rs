//! Catalog module: the ordered track list built from a directory scan.
//!
//! `catalog::build` walks a directory and produces a `Catalog` of tracks
//! with their raw bytes loaded; durations are filled in later, the first
//! time each track is decoded.

mod model;
mod scan;

pub use model::{Catalog, Track};
pub use scan::{CatalogError, build};
