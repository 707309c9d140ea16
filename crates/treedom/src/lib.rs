//! An observable tree object model over JSON records.
//!
//! A [`Model`] wraps a list of JSON records in a parent/children tree,
//! assigns every record a stable identity, and intercepts field writes so
//! applications can validate and observe changes, including on nested
//! locations addressed by dotted paths (`config.volume`,
//! `preferences.*.value`).
//!
//! The model is the reactive substrate underneath a UI or a service:
//! code mutates records through [`Model::set`] and the structural
//! operations ([`Model::append_child`], [`Model::remove_child`], ...),
//! and the model decides whether each mutation is accepted, keeps parent
//! links and positions consistent, and reports changes to the registered
//! callbacks.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use treedom::{Model, ModelOptions};
//!
//! let options = ModelOptions {
//!     enhance_map: vec!["done".to_string()],
//!     setter_callback: Some(Box::new(|property, node, new, old| {
//!         println!("{}: {property} {old} -> {new}", node.id());
//!         false // accept the write
//!     })),
//!     ..ModelOptions::default()
//! };
//!
//! let mut model = Model::with_options(
//!     vec![json!({"text": "write docs", "done": false})],
//!     options,
//! )
//! .unwrap();
//!
//! let id = model.children_of(None)[0].clone();
//! model.set(&id, "done", json!(true)).unwrap();
//! assert_eq!(model.get(&id, "done"), Some(&json!(true)));
//! ```
//!
//! # Structure
//!
//! | Module    | Contents                                            |
//! |-----------|-----------------------------------------------------|
//! | `model`   | [`Model`]: construction, enrichment, writes, views  |
//! | `mutate`  | Structural operations and the move compensation     |
//! | `query`   | Id lookup and property scans                        |
//! | `node`    | [`Node`]: fields, links, observed and system props  |
//! | `enhance` | Observed path computation from enhance patterns     |
//! | `config`  | [`ModelOptions`] and the callback types             |

mod config;
mod enhance;
mod error;
mod id;
mod model;
mod mutate;
mod node;
mod query;

pub use config::{ModelOptions, NodeCallback, SetterCallback};
pub use error::ModelError;
pub use id::NodeId;
pub use model::Model;
pub use mutate::Item;
pub use node::Node;

/// Property name reported to the setter callback when a node is attached
/// or repositioned.
pub const PARENT_PROPERTY: &str = "parentNode";
/// Property name reported to the setter callback when a node is removed.
pub const REMOVE_PROPERTY: &str = "removeChild";
/// Reserved name of the derived position; read it through
/// [`Model::index_of`].
pub const INDEX_PROPERTY: &str = "index";
