//! Serde mirrors of backend wire formats
//!
//! Only used at the HTTP boundary; everything else works with [`crate::types`].

pub mod openai;
