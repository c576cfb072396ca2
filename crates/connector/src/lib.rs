//! Storelink connector library.
//!
//! Exposes the connector's services, platform adapters, and HTTP router as
//! a library so they can be exercised from integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod models;
pub mod platform;
pub mod routes;
pub mod services;
pub mod state;
