//! Geospatial module: regions, resolutions and hexagonal tiling
//!
//! - `SearchResolution`: the fixed table of cell sizes and search radii
//! - `Region`: named polygon/multipolygon areas loaded from GeoJSON
//! - `Cell`: an H3 cell with its resolution, centroid and children
//! - `HexagonTiler`: region → cell set with coverage validation

mod cell;
mod region;
mod resolution;
mod tiler;

pub use cell::Cell;
pub use region::{load_regions, parse_regions, Region, RegionGeometry};
pub use resolution::{
    SearchResolution, DEFAULT_RESOLUTION, DEGREES_PER_KM, MAX_RESOLUTION, MIN_RESOLUTION,
};
pub use tiler::{
    choose_tiling, validate_coverage, CoverageStats, HexagonTiler, Tiling, TilingStrategy, MIN_COVERAGE_RATIO,
};
