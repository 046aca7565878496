//! # Drive Common
//!
//! Shared types for the Grand Drive shot engine.
//!
//! This crate holds the definitions every other crate agrees on:
//! - The shot archetype enum (`ShotType`)
//! - Character and club stats, and the provider trait that supplies them
//! - Aggregated stat modifiers consumed by the swing timer and resolver
//! - Common error types

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod shot;
pub mod stats;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::shot::*;
    pub use crate::stats::*;
}

pub use prelude::*;
