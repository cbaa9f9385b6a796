//! authwho Library
//!
//! This module exposes the session cache, persisted store, auth client, and
//! CLI modules for use by the binary and in integration tests.

pub mod auth;
pub mod cache;
pub mod cli;
pub mod store;
