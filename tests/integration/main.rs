//! Integration tests for Hive-Leads

mod common;
mod crawler_tests;
mod pipeline_tests;
mod places_tests;
