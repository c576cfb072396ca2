//! Storelink Core - Shared types library.
//!
//! This crate provides common types used across the Storelink connector
//! components:
//! - `connector` - HTTP service exposing price-rule and scope operations
//! - `integration-tests` - End-to-end tests against the connector router
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs plus the scope and price-rule enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
