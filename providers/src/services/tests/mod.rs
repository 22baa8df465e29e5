//! Tests for provider services

pub mod api_keys;
