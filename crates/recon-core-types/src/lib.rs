//! Core types shared across recon facilities
//!
//! This crate provides the foundational types used by the diff pipeline,
//! the error facility and the logging facility:
//!
//! - **Paths**: `Path` and `Segment`, with the canonical dotted string form
//! - **Slots**: `Slot`, the explicit "value or absent" sentinel
//! - **Schema constants**: Canonical field keys and event names

pub mod path;
pub mod schema;
pub mod slot;

pub use path::{Path, Segment};
pub use slot::{canonical_json, same_value, Slot};
