//! Shared types and logic for the Route Billing Platform
//!
//! This crate contains the models, bill calculations, daily summaries and
//! report layouts shared between the backend, the browser client (via WASM),
//! and other components of the system.

pub mod cache;
pub mod calculator;
pub mod models;
pub mod report;
pub mod session;
pub mod summary;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
