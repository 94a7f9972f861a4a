//! Core types for Threadline.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod quantity;
pub mod score;

pub use id::*;
pub use quantity::{Quantity, QuantityError};
pub use score::{ReviewScore, ScoreError};
