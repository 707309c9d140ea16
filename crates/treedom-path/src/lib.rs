//! Dotted-path utilities over JSON values.
//!
//! A dotted path addresses a nested location inside a JSON document:
//! `a.b` is the `b` member of the `a` member, numeric segments index into
//! arrays, and at most one `*` wildcard segment fans out over the keys at
//! its position (`preferences.*.value`).
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use treedom_path::{expand, resolve, Path};
//!
//! let doc = json!({
//!     "preferences": {
//!         "foo": {"value": 1},
//!         "bar": {"value": 2}
//!     }
//! });
//!
//! // Parse a dotted path and resolve it against a document
//! let path = Path::parse("preferences.foo.value").unwrap();
//! assert_eq!(resolve(&doc, &path), Some(&json!(1)));
//!
//! // Expand a wildcard path into the concrete paths present
//! let pattern = Path::parse("preferences.*.value").unwrap();
//! let concrete = expand(&doc, &pattern);
//! assert_eq!(concrete.len(), 2);
//! assert_eq!(concrete[0].to_string(), "preferences.foo.value");
//! ```

mod path;
mod resolve;

pub use path::{Path, PathError, Segment};
pub use resolve::{
    expand, expand_in, remove_in, resolve, resolve_in, resolve_in_mut, resolve_mut, set_in,
};
