//! Model errors and the reporting policy.

use thiserror::Error;
use treedom_path::PathError;

use crate::NodeId;

/// Errors surfaced by model operations.
///
/// Two kinds follow the model's reporting policy (rejected writes and
/// structural violations): with `strict` off they are logged as warnings
/// and the operation returns without effect, with `strict` on they are
/// returned as errors. Everything else (unknown ids, malformed records,
/// unusable paths) is always returned as an error.
#[derive(Debug, Error)]
pub enum ModelError {
    /// No node registered under the given id.
    #[error("no node with id '{0}'")]
    NotFound(NodeId),
    /// A record submitted for enrichment was not a JSON object.
    #[error("record is not a JSON object")]
    InvalidRecord,
    /// A record carried an id that is already registered.
    #[error("duplicate id '{0}'")]
    DuplicateId(NodeId),
    /// A write addressed the id field, the derived index, a structural
    /// field, or another reserved name.
    #[error("cannot write reserved property '{0}'")]
    ReservedProperty(String),
    /// A write addressed a reinforced system property.
    #[error("cannot write reinforced property '{0}'")]
    ReinforcedProperty(String),
    /// The setter callback refused a write; the previous value has been
    /// restored.
    #[error("write to '{property}' rejected on node '{id}'")]
    Rejected { id: NodeId, property: String },
    /// A node was about to become its own parent.
    #[error("cannot attach node '{0}' to itself")]
    SelfParent(NodeId),
    /// A node was about to be attached inside its own subtree.
    #[error("cannot attach node '{node}' under its descendant '{parent}'")]
    Cycle { node: NodeId, parent: NodeId },
    /// A node was about to replace itself.
    #[error("cannot replace node '{0}' with itself")]
    ReplaceSelf(NodeId),
    /// A node was about to be replaced by one of its own descendants,
    /// which the removal of its subtree would destroy.
    #[error("cannot replace node '{node}' with its descendant '{item}'")]
    ReplaceDescendant { node: NodeId, item: NodeId },
    /// A path failed to parse or did not reach a writable location.
    #[error(transparent)]
    Path(#[from] PathError),
}
