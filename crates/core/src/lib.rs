//! Leipomo Core - Shared types library.
//!
//! This crate provides the value types used across the Leipomo components:
//! - `ordering` - Cart, pickup scheduling, checkout and order submission engine
//! - `cli` - Terminal front end for browsing, cart editing and checkout
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! Everything here is serializable and cheap to clone so it can be stored in
//! the persisted order session as-is.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, prices, wall-clock values and checkout steps

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
