// src/error.rs
//! Error handling - just use anyhow everywhere.

pub use anyhow::{anyhow, bail, Context, Error, Result};
