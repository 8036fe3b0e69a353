//! Leipomo ordering engine.
//!
//! Holds a customer's cart, walks them through the guided pickup checkout,
//! computes which pickup dates and times can be offered, persists the
//! session between visits and places the final order.
//!
//! # Modules
//!
//! - [`cart`] - Cart store keyed by product identity
//! - [`schedule`] - Weekly hours, order constraints and the availability calculator
//! - [`checkout`] - Checkout state machine driven by [`checkout::Command`]s
//! - [`session`] / [`persistence`] - The session aggregate and its durable storage
//! - [`submission`] - Order payload construction and response handling
//! - [`api`] - The [`api::OrderBackend`] seam and its HTTP client
//! - [`flow`] - [`flow::OrderFlow`], which ties everything together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod clock;
pub mod config;
pub mod error;
pub mod flow;
pub mod persistence;
pub mod schedule;
pub mod session;
pub mod submission;

pub use config::{ConfigError, FlowSettings, OfflinePolicy, OrderingConfig};
pub use error::FlowError;
pub use flow::{OrderFlow, Prompt, View};
