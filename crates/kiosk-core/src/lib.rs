//! Core types and trait definitions for the kiosk subscription form.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! server, the SQLite store and the kiosk client all depend on it, so the
//! validation rules they share live here exactly once.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod api;
pub mod branch;
pub mod draft;
pub mod error;
pub mod mailing;
pub mod message;
pub mod store;
pub mod subscription;
pub mod validate;

pub use error::{Error, Result};
