use crate::geo::SearchResolution;
use geo::{Coord, LineString, Polygon};
use h3o::{CellIndex, LatLng};
use std::fmt;

/// A hexagonal search cell at a known resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    index: CellIndex,
    resolution: SearchResolution,
}

impl Cell {
    pub(crate) fn new(index: CellIndex, resolution: SearchResolution) -> Self {
        Self { index, resolution }
    }

    /// Looks up the cell at `resolution` containing the given point
    pub fn containing(lat: f64, lng: f64, resolution: SearchResolution) -> Option<Self> {
        let point = LatLng::new(lat, lng).ok()?;
        Some(Self::new(point.to_cell(resolution.h3()), resolution))
    }

    /// Stable hexadecimal identifier of this cell
    pub fn id(&self) -> String {
        self.index.to_string()
    }

    pub fn index(&self) -> CellIndex {
        self.index
    }

    pub fn resolution(&self) -> SearchResolution {
        self.resolution
    }

    /// Cell centre as `(lat, lng)`
    pub fn centroid(&self) -> (f64, f64) {
        let center = LatLng::from(self.index);
        (center.lat(), center.lng())
    }

    /// The cell plus its six immediate neighbours
    pub fn with_neighbors(&self) -> Vec<Cell> {
        self.index
            .grid_disk::<Vec<_>>(1)
            .into_iter()
            .map(|index| Self::new(index, self.resolution))
            .collect()
    }

    /// Cells one level finer covering this one, or `None` at the finest resolution
    pub fn children(&self) -> Option<Vec<Cell>> {
        let next = self.resolution.next()?;
        Some(
            self.index
                .children(next.h3())
                .map(|index| Self::new(index, next))
                .collect(),
        )
    }

    /// Cell outline as a planar polygon (`x` = longitude, `y` = latitude)
    pub fn boundary_polygon(&self) -> Polygon<f64> {
        let ring: Vec<Coord<f64>> = self
            .index
            .boundary()
            .iter()
            .map(|vertex| Coord {
                x: vertex.lng(),
                y: vertex.lat(),
            })
            .collect();
        Polygon::new(LineString::from(ring), vec![])
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index)
    }
}
