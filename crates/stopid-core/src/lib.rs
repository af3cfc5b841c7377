//! Core types and trait definitions for the StopIDCheck catalogue.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod admin;
pub mod country;
pub mod error;
pub mod filter;
pub mod settings;
pub mod severity;
pub mod site;
pub mod source;
pub mod store;
pub mod suggestion;
pub mod sync;

pub use error::{Error, Result, ValidationError};
