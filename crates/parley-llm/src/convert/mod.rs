//! Conversions between [`crate::types`] and wire formats

pub mod openai;
