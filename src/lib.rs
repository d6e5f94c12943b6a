//! fitxp - Experience & achievement progression
//!
//! Turns reported fitness activity into cumulative XP, a stepped level and a
//! catalog of achievements whose rewards feed back into the same XP total.
//!
//! ## Layers
//!
//! 1. **progression**: the engine. An append-only activity ledger, the level
//!    calculator, the achievement registry and the `ProgressionManager`
//!    facade that keeps them consistent.
//!
//! 2. **config**: TOML configuration for default XP per activity kind and
//!    custom achievement catalogs.

pub mod config;
pub mod error;
pub mod progression;

pub use error::{ProgressionError, Result};
pub use progression::{ActivityKind, Catalog, ProgressionManager};
