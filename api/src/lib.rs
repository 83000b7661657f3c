//! Typed client for the Statlab numeric service.
//!
//! The service does the actual statistics (topic inference, Markov chains,
//! Metropolis-Hastings sampling). This crate only knows the wire contract:
//! request shapes, response shapes and the `{ "error": "..." }` convention the
//! service uses for semantic failures.

mod client;
mod error;
mod types;

pub use client::{NumericClient, Upload};
pub use error::ApiError;
pub use types::*;
