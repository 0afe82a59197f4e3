//! URL handling module for Shelf-Scout
//!
//! This module resolves hrefs found in pages into absolute URLs and builds
//! listing page URLs from the configured pagination pattern.

mod pagination;
mod resolve;

pub use pagination::{build_page_url, is_paginated, PAGE_PLACEHOLDER};
pub use resolve::{resolve_href, resolve_link};
