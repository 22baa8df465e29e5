//! Endpoint handlers

pub mod api;
pub mod health;
