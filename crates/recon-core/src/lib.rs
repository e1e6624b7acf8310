//! Structured record reconciliation
//!
//! Compares two versions of a JSON document after normalization and reports
//! field-level differences.
//!
//! ```
//! use recon_core::{reconcile, Rules};
//! use serde_json::json;
//!
//! let before = json!({"characters": [{"name": "Homer", "age": 39}, {"name": "Marge", "age": 36}]});
//! let after = json!({"characters": [{"name": "Homer", "age": 40}, {"name": "Marge", "age": 36}]});
//!
//! let result = reconcile(&Rules::default(), &before, &after)
//!     .unwrap()
//!     .display_key("characters", |slot| {
//!         slot.as_value()
//!             .and_then(|v| v.get("name"))
//!             .and_then(|v| v.as_str())
//!             .unwrap_or("?")
//!             .to_string()
//!     })
//!     .unwrap();
//!
//! assert_eq!(result.print_diff(), "characters.Homer.age -> 39 40");
//! ```

pub mod config;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod pattern;
pub mod reconcile;
pub mod rules;
pub mod structural;
pub mod transform;

pub use recon_core_types as core_types;
#[doc(hidden)]
pub use tracing;

pub use recon_core_types::{Path, Segment, Slot};
pub use diff::{DiffEntry, DiffResult, Difference};
pub use errors::{RcError, RcErrorKind, ReconcileError, Result};
pub use pattern::CompiledPattern;
pub use reconcile::{reconcile, reconciler};
pub use rules::Rules;
pub use transform::{MapperError, Normalized, ValueMapper};
