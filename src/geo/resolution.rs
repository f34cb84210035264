//! Fixed table of supported search resolutions
//!
//! Each resolution maps to the average H3 edge length at that level and the
//! search radius used when querying the provider around a cell centroid.

use crate::GeoError;
use std::fmt;

/// Coarsest supported resolution
pub const MIN_RESOLUTION: u8 = 5;

/// Finest supported resolution
pub const MAX_RESOLUTION: u8 = 11;

/// Resolution used when the config does not name one
pub const DEFAULT_RESOLUTION: u8 = 7;

/// Planar degrees per kilometre used for grid spacing
pub const DEGREES_PER_KM: f64 = 1.0 / 111.32;

struct ResolutionProfile {
    name: &'static str,
    edge_length_km: f64,
    search_radius_m: u32,
}

const TABLE: [ResolutionProfile; 7] = [
    ResolutionProfile { name: "Vast", edge_length_km: 9.854090990, search_radius_m: 9855 },
    ResolutionProfile { name: "Large", edge_length_km: 3.724532667, search_radius_m: 3725 },
    ResolutionProfile { name: "Medium", edge_length_km: 1.406475763, search_radius_m: 1407 },
    ResolutionProfile { name: "Small", edge_length_km: 0.531414010, search_radius_m: 532 },
    ResolutionProfile { name: "Very Small", edge_length_km: 0.200786148, search_radius_m: 201 },
    ResolutionProfile { name: "Tiny", edge_length_km: 0.075863783, search_radius_m: 76 },
    ResolutionProfile { name: "Micro", edge_length_km: 0.028663897, search_radius_m: 29 },
];

/// A tiling granularity between [`MIN_RESOLUTION`] and [`MAX_RESOLUTION`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchResolution(u8);

impl SearchResolution {
    /// Creates a resolution, rejecting levels outside the supported table
    pub fn new(level: u8) -> Result<Self, GeoError> {
        if (MIN_RESOLUTION..=MAX_RESOLUTION).contains(&level) {
            Ok(Self(level))
        } else {
            Err(GeoError::UnsupportedResolution(level))
        }
    }

    /// The finest supported resolution
    pub fn finest() -> Self {
        Self(MAX_RESOLUTION)
    }

    pub fn level(&self) -> u8 {
        self.0
    }

    fn profile(&self) -> &'static ResolutionProfile {
        &TABLE[(self.0 - MIN_RESOLUTION) as usize]
    }

    /// Human-readable size label, e.g. "Medium (Res 7)"
    pub fn name(&self) -> String {
        format!("{} (Res {})", self.profile().name, self.0)
    }

    pub fn edge_length_km(&self) -> f64 {
        self.profile().edge_length_km
    }

    pub fn edge_length_degrees(&self) -> f64 {
        self.edge_length_km() * DEGREES_PER_KM
    }

    /// Radius in metres for a nearby search centred on a cell of this size
    pub fn search_radius_m(&self) -> u32 {
        self.profile().search_radius_m
    }

    /// The next finer resolution, if still inside the table
    pub fn next(&self) -> Option<Self> {
        Self::new(self.0 + 1).ok()
    }

    /// The matching H3 resolution
    pub fn h3(&self) -> h3o::Resolution {
        match self.0 {
            5 => h3o::Resolution::Five,
            6 => h3o::Resolution::Six,
            7 => h3o::Resolution::Seven,
            8 => h3o::Resolution::Eight,
            9 => h3o::Resolution::Nine,
            10 => h3o::Resolution::Ten,
            _ => h3o::Resolution::Eleven,
        }
    }
}

impl Default for SearchResolution {
    fn default() -> Self {
        Self(DEFAULT_RESOLUTION)
    }
}

impl fmt::Display for SearchResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
