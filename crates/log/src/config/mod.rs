//! Configuration types
//!
//! This module is organized into:
//! - `base`: the [`LogConfiguration`] snapshot and the file [`Format`]
//! - `env`: defaults read from the `LAB_*` environment variables
//! - `update`: partial updates and initialization options

mod base;
mod env;
mod update;

pub use base::{Format, LogConfiguration};
pub use env::ENV_VARS;
pub use update::{ConfigUpdate, InitOptions};
