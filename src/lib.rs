//! Pharmacy Inventory Library
//!
//! This library provides the core functionality for a pharmacy inventory and
//! billing service backed by a document store.

// Domain modules
pub mod auth;
pub mod diagnostics;
pub mod medicine;

// Infrastructure
pub mod config;
pub mod error;
pub mod extract;
pub mod router;
pub mod startup;
pub mod state;
pub mod store;
