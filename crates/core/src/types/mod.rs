//! Core types for Leipomo.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod clock;
pub mod id;
pub mod price;
pub mod step;

pub use clock::{ClockError, SlotTime, YearMonth};
pub use id::*;
pub use price::Price;
pub use step::{CheckoutStep, Language, LanguageError};
