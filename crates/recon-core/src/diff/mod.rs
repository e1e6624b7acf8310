//! Difference pipeline
//!
//! - `model`: `Difference` and `DiffEntry`
//! - `adapter`: structural diff to a sorted entry sequence
//! - `consolidate`: merging of repeated differences
//! - `display`: display path rewriting
//! - `report`: plain-text and row rendering
//! - `result`: the `DiffResult` facade tying them together

pub mod adapter;
pub mod consolidate;
pub mod display;
pub mod model;
pub mod report;
pub mod result;

pub use adapter::diff;
pub use display::{DisplayReplacer, KeyExtractor};
pub use model::{DiffEntry, Difference};
pub use report::{render_report, ReportRow};
pub use result::DiffResult;
