//! Skycast Library
//!
//! Weather lookups through a short-lived in-memory response cache. The
//! binary in `main.rs` is a thin layer over these modules.

pub mod cache;
pub mod cli;
pub mod data;
pub mod logging;
pub mod render;
pub mod service;
pub mod status;
pub mod units;
