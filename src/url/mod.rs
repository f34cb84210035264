//! URL handling module for Hive-Leads
//!
//! This module provides website normalization, root URL derivation and domain
//! extraction for the contact crawler.

mod domain;
mod normalize;

pub use domain::{extract_domain, split_registrable};
pub use normalize::{normalize_website, root_url};
