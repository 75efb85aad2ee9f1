//! Cache key generation for donut fragment caching.
//!
//! This crate provides:
//! - `KeyGenerator` - Derives a fragment's cache key from its request context
//! - `ParameterSet` - Case-normalized parameters that vary a fragment
//! - `KeyBuilder` - Key rendering (`DefaultKeyBuilder`, `HashedKeyBuilder`)
//! - `VaryByCustomProvider` - Host hook for application-defined variance
//! - `KeyBuilderConfig` - TOML/JSON configuration for key rendering
//!
//! # Example
//!
//! ```ignore
//! use donut_cache::{DefaultKeyBuilder, KeyGenerator};
//! use donut_core::{CacheSettings, RequestSnapshot};
//!
//! let generator = KeyGenerator::new(DefaultKeyBuilder::new());
//!
//! let request = RequestSnapshot::new("Products", "List")
//!     .with_query_value("category", "Shoes")
//!     .with_query_value("sort", "price");
//! let settings = CacheSettings::new().vary_by_param("category");
//!
//! // "_d0nutc@che.products.list#category=shoes#"
//! let key = generator.generate_key(&request, &settings)?;
//! ```

mod config;
mod custom;
mod error;
mod generator;
mod identity;
mod key;
mod merge;
mod params;
mod vary;

pub use config::*;
pub use custom::*;
pub use error::*;
pub use generator::*;
pub use identity::*;
pub use key::*;
pub use merge::*;
pub use params::*;
pub use vary::*;
