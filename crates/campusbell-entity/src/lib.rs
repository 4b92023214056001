//! # campusbell-entity
//!
//! Entity models for the CampusBell notification pipeline. Every struct
//! in this crate represents a database table row or a value object
//! carried by one. Row types derive `sqlx::FromRow`.

pub mod device;
pub mod job;
pub mod settings;
