//! Core business logic for token issuance and validation.
//!
//! This module contains the domain logic separated from CLI concerns.
//! All types and functions here are testable without the CLI layer.

pub mod claims;
pub mod codec;
pub mod engine;
pub mod keys;
pub mod time_travel;
