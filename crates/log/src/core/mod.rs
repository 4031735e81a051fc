//! Core components for the lab logging system.
//!
//! ### [`error`] - Error handling
//! The [`LogError`] enum and the [`LogResult`] alias used by every fallible
//! operation. Only configuration paths return errors; the write path degrades
//! to console diagnostics instead.

pub mod error;

pub use error::{LogError, LogResult};
