//! SuperStore Core - Shared types library.
//!
//! This crate provides common types used across SuperStore components.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no session
//! access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices, plus the cart
//!   line and provenance types shared by the cart reconciliation logic.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
