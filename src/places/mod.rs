//! Place-search provider access
//!
//! - `PlaceSearchProvider`: the paginated search + details capability
//! - `GooglePlacesClient`: the HTTP implementation used by the binary
//! - `RateLimiter`: the sliding-window throttle shared by every provider call
//! - `DETAIL_FIELDS`: the fixed detail schema requested for each place

mod fields;
mod google;
mod provider;
mod rate_limit;

pub use fields::{detail_fields_param, DETAIL_FIELDS};
pub use google::{GooglePlacesClient, ProviderError};
pub use provider::{NearbyPage, NearbyQuery, PlaceCandidate, PlaceSearchProvider, SearchStatus};
pub use rate_limit::RateLimiter;
