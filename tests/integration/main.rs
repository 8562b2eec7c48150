//! Integration tests for the feed pipeline
//!
//! These tests use wiremock to serve article pages and a scripted browser
//! session in place of Chromium, and run the full pipeline end-to-end.

mod common;
mod fetch_tests;
mod pipeline_tests;
