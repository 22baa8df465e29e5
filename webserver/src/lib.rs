//! HTTP front end for the prompt optimization engine
//!
//! Exposes optimize, rating, history and strategy endpoints over a shared
//! `Orchestrator`.

pub mod error;
pub mod state;
pub mod web;
pub mod webserver_impl;

pub use error::{ApiError, WebServerError, WebServerResult};
pub use state::AppState;
pub use web::router;
pub use webserver_impl::WebServer;
