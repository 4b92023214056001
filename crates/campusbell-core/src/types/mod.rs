//! Core type definitions used across the CampusBell workspace.

pub mod id;
pub mod text;

pub use id::*;
pub use text::truncate_chars;
