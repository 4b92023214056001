//! # campusbell-core
//!
//! Core crate for the CampusBell notification pipeline. Contains
//! configuration schemas, typed identifiers, the domain events that
//! trigger notifications, and the unified error system.
//!
//! This crate has **no** internal dependencies on other CampusBell crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
