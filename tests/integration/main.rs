//! Integration tests for Shelf-Scout
//!
//! These tests use wiremock to create mock shops and exercise full catalog
//! runs end-to-end.

mod catalog_tests;
mod common;
mod fetch_tests;
mod resume_tests;
