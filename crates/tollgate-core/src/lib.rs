#![allow(clippy::must_use_candidate)]

//! Shared contracts used across the Tollgate feature crates

mod context;
mod error;

pub use context::Identity;
pub use error::HttpError;
