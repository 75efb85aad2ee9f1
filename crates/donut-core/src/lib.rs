//! Core abstractions for donut fragment caching.
//!
//! This crate provides the host-facing data model consumed by the key
//! generation pipeline:
//! - `RequestContext` trait - Read-only view of handler identity and parameters
//! - `RequestSnapshot` - Owned, in-memory `RequestContext`
//! - `RouteValue` - Route entries, with host-injected entries marked synthetic
//! - `CacheSettings` / `VaryByParam` - Per-fragment vary configuration

mod context;
mod settings;

pub use context::*;
pub use settings::*;
