//! # campusbell
//!
//! Asynchronous push notification pipeline for a multi-tenant school
//! platform: domain events fan out into per-recipient queue jobs, and a
//! polling dispatcher claims and delivers them through a push provider.
//!
//! [`Pipeline`] wires the services and the dispatcher around one set of
//! stores, for embedding in the process that emits domain events.

pub mod pipeline;

pub use pipeline::{Pipeline, Stores};
