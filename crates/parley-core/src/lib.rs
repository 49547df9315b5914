//! Shared primitives for Parley crates

#![allow(clippy::must_use_candidate)]

mod error;

pub use error::{HttpError, error_response};
