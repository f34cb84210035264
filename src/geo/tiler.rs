//! Polygon-to-hexagon tiling with coverage validation
//!
//! The primary strategy seeds a dense point grid over the (buffered) bounding
//! box, maps every seed to its cell plus that cell's 1-ring, and keeps cells
//! whose outline touches the region. When that covers less than
//! [`MIN_COVERAGE_RATIO`] of the region, a honeycomb layout is tried as well and
//! the better of the two wins.

use crate::geo::{Cell, Region, SearchResolution};
use geo::{Area, BooleanOps, BoundingRect, Intersects, MultiPolygon, Polygon, Rect};
use std::collections::BTreeSet;

/// Coverage below this ratio triggers the honeycomb fallback
pub const MIN_COVERAGE_RATIO: f64 = 0.95;

/// Which layout produced a cell set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TilingStrategy {
    SeedGrid,
    Honeycomb,
}

/// How well a cell set covers its region
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CoverageStats {
    /// `area(region ∩ cells) / area(region)`
    pub coverage_ratio: f64,
    /// `area(cells) / area(region)`
    pub overlap_ratio: f64,
    pub cell_count: usize,
}

/// Result of tiling one region
#[derive(Debug, Clone)]
pub struct Tiling {
    pub cells: Vec<Cell>,
    pub coverage: CoverageStats,
    pub strategy: TilingStrategy,
}

impl Tiling {
    fn empty() -> Self {
        Self {
            cells: Vec::new(),
            coverage: CoverageStats::default(),
            strategy: TilingStrategy::SeedGrid,
        }
    }
}

/// Converts regions into hexagonal cells at a fixed resolution
#[derive(Debug, Clone, Copy)]
pub struct HexagonTiler {
    resolution: SearchResolution,
}

impl HexagonTiler {
    pub fn new(resolution: SearchResolution) -> Self {
        Self { resolution }
    }

    pub fn resolution(&self) -> SearchResolution {
        self.resolution
    }

    /// Tiles a region, returning its cells in a deterministic order
    ///
    /// Degenerate or unsupported geometry yields an empty vector; callers skip
    /// the region.
    pub fn tile(&self, region: &Region) -> Vec<Cell> {
        self.tile_with_report(region).cells
    }

    /// Tiles a region and reports coverage and the strategy that was kept
    pub fn tile_with_report(&self, region: &Region) -> Tiling {
        let Some(shape) = region.prepared_geometry() else {
            return Tiling::empty();
        };
        let Some(bounds) = shape.bounding_rect() else {
            return Tiling::empty();
        };

        let primary_cells = self.seed_grid_cells(&shape, bounds);
        let primary = Tiling {
            coverage: validate_coverage(&shape, &primary_cells),
            cells: primary_cells,
            strategy: TilingStrategy::SeedGrid,
        };

        if primary.coverage.coverage_ratio >= MIN_COVERAGE_RATIO || primary.cells.is_empty() {
            return primary;
        }

        let honeycomb_cells = self.honeycomb_cells(&shape, bounds);
        let honeycomb = Tiling {
            coverage: validate_coverage(&shape, &honeycomb_cells),
            cells: honeycomb_cells,
            strategy: TilingStrategy::Honeycomb,
        };

        tracing::debug!(
            region = %region.name,
            primary = primary.coverage.coverage_ratio,
            honeycomb = honeycomb.coverage.coverage_ratio,
            "Primary tiling below coverage target"
        );

        choose_tiling(primary, honeycomb)
    }

    fn seed_grid_cells(&self, shape: &MultiPolygon<f64>, bounds: Rect<f64>) -> Vec<Cell> {
        let edge = self.resolution.edge_length_degrees();
        let bounds = expand(bounds, edge * 2.0);
        let step = edge * 0.5;

        let mut candidates = BTreeSet::new();
        for lat in steps(bounds.min().y, bounds.max().y, step) {
            for lng in steps(bounds.min().x, bounds.max().x, step) {
                if let Some(cell) = Cell::containing(lat, lng, self.resolution) {
                    candidates.extend(cell.with_neighbors());
                }
            }
        }

        candidates
            .into_iter()
            .filter(|cell| shape.intersects(&cell.boundary_polygon()))
            .collect()
    }

    /// Offset rows spaced at 0.75 × cell height, odd rows shifted by half a width
    fn honeycomb_cells(&self, shape: &MultiPolygon<f64>, bounds: Rect<f64>) -> Vec<Cell> {
        let edge = self.resolution.edge_length_degrees();
        let hex_height = edge * 2.0;
        let hex_width = edge * 3f64.sqrt();
        let bounds = expand(bounds, hex_width.max(hex_height));

        let mut cells = BTreeSet::new();
        for (row, lat) in steps(bounds.min().y, bounds.max().y, hex_height * 0.75).enumerate() {
            let offset = if row % 2 == 1 { hex_width / 2.0 } else { 0.0 };
            for lng in steps(bounds.min().x + offset, bounds.max().x, hex_width) {
                if let Some(cell) = Cell::containing(lat, lng, self.resolution) {
                    if shape.intersects(&cell.boundary_polygon()) {
                        cells.insert(cell);
                    }
                }
            }
        }

        cells.into_iter().collect()
    }
}

/// Keeps `fallback` only when it covers strictly more than `primary`
pub fn choose_tiling(primary: Tiling, fallback: Tiling) -> Tiling {
    if fallback.coverage.coverage_ratio > primary.coverage.coverage_ratio {
        fallback
    } else {
        primary
    }
}

/// Measures how much of `shape` the union of `cells` covers
pub fn validate_coverage(shape: &MultiPolygon<f64>, cells: &[Cell]) -> CoverageStats {
    let region_area = shape.unsigned_area();
    if cells.is_empty() || region_area <= 0.0 {
        return CoverageStats {
            cell_count: cells.len(),
            ..CoverageStats::default()
        };
    }

    let cell_union = union_all(cells.iter().map(Cell::boundary_polygon).collect());
    let covered_area = shape.intersection(&cell_union).unsigned_area();

    CoverageStats {
        coverage_ratio: covered_area / region_area,
        overlap_ratio: cell_union.unsigned_area() / region_area,
        cell_count: cells.len(),
    }
}

/// Unions polygons pairwise so each round halves the input
fn union_all(polygons: Vec<Polygon<f64>>) -> MultiPolygon<f64> {
    let mut layer: Vec<MultiPolygon<f64>> = polygons.into_iter().map(MultiPolygon::from).collect();

    while layer.len() > 1 {
        layer = layer
            .chunks(2)
            .map(|pair| {
                pair[1..]
                    .iter()
                    .fold(pair[0].clone(), |acc, next| acc.union(next))
            })
            .collect();
    }

    layer.pop().unwrap_or_else(|| MultiPolygon::new(vec![]))
}

fn expand(bounds: Rect<f64>, by: f64) -> Rect<f64> {
    Rect::new(
        (bounds.min().x - by, bounds.min().y - by),
        (bounds.max().x + by, bounds.max().y + by),
    )
}

/// `start, start + step, ...` up to and including `end`
fn steps(start: f64, end: f64, step: f64) -> impl Iterator<Item = f64> {
    let count = if end < start || step <= 0.0 {
        0
    } else {
        ((end - start) / step).floor() as usize + 1
    };
    (0..count).map(move |i| start + step * i as f64)
}
