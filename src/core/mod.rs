//! Core engine modules for fujinav
//!
//! Request flow: `fallback` drives `provider`, whose output `assemble` turns
//! into a `RouteResult` with help from `polyline` and `classify`; `wire`
//! encodes the result for the client.

pub mod assemble;
pub mod classify;
pub mod config;
pub mod error;
pub mod fallback;
pub mod geocode;
pub mod model;
pub mod polyline;
pub mod provider;
pub mod service;
pub mod wire;

// Re-export main types for internal use
pub use config::{Config, NavConfig};
pub use service::NavService;
