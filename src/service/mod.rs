//! REST service for the variant workflow
//!
//! Exposes classification, validation, recoding and cached annotation under
//! `/api/v1/variants/*`, cache management under `/api/v1/cache` and a
//! `/health` endpoint.

pub mod handlers;
pub mod server;
pub mod types;

pub use server::{create_app, router, serve, AppState};
pub use types::*;
