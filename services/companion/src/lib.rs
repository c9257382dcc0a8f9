//! services/companion/src/lib.rs
//!
//! The companion service: configuration, adapters and the REST API.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
