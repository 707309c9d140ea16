//! The managed record type.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use treedom_path::{resolve_in, Path};

use crate::{NodeId, INDEX_PROPERTY, PARENT_PROPERTY};

/// A managed record: the caller's fields plus the system-owned identity
/// and structural links.
///
/// Nodes reference each other by id only; the [`Model`](crate::Model)
/// owns every node and resolves the links through its registry. The id
/// field is mirrored into [`Node::fields`] so record views and queries
/// see it like any other field.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    fields: Map<String, Value>,
    observed: BTreeSet<String>,
    reinforced: BTreeSet<String>,
}

impl Node {
    pub(crate) fn new(id: NodeId, parent: Option<NodeId>, fields: Map<String, Value>) -> Node {
        Node {
            id,
            parent,
            children: Vec::new(),
            fields,
            observed: BTreeSet::new(),
            reinforced: BTreeSet::new(),
        }
    }

    /// The node's identity.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Id of the structural parent, or `None` at the top level.
    pub fn parent(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }

    /// Ordered ids of the children.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The record fields. Child records are not stored here; they live as
    /// nodes of their own, linked through [`Node::children`].
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Resolve a dotted path against the fields.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let path = Path::parse(path).ok()?;
        resolve_in(&self.fields, &path)
    }

    /// Whether writes to the exact path go through the setter callback.
    pub fn is_observed(&self, path: &str) -> bool {
        self.observed.contains(path)
    }

    /// The observed paths, in lexical order.
    pub fn observed(&self) -> impl Iterator<Item = &str> {
        self.observed.iter().map(String::as_str)
    }

    /// Whether `name` is a reinforced system property.
    pub fn is_reinforced(&self, name: &str) -> bool {
        self.reinforced.contains(name)
    }

    /// Store `value` under `name` as a system property: readable and
    /// queryable like any field, refused by [`Model::set`](crate::Model::set),
    /// and excluded from record views.
    ///
    /// Names are not validated here; [`Model::reinforce_property`](crate::Model::reinforce_property)
    /// is the checked entry point.
    pub fn reinforce(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        self.fields.insert(name.clone(), value);
        self.reinforced.insert(name);
    }

    /// Write a field directly, without observation or reservation checks.
    /// Enrichment hooks use this to fill in defaults; everything else
    /// goes through [`Model::set`](crate::Model::set). The model repairs
    /// the system-owned names after every hook, so writes under the id
    /// property or the structural names do not stick.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(name.into(), value)
    }

    /// Repair the system-owned names after a hook ran. Whatever the hook
    /// wrote, the id field holds the registry key and is not a reinforced
    /// name, and the structural names carry no stale copies; a non-array
    /// value under the children field is plain data and stays.
    pub(crate) fn repair_system_fields(&mut self, id_property: &str, children_property: &str) {
        let mirror = self.id.to_value();
        if self.fields.get(id_property) != Some(&mirror) {
            self.fields.insert(id_property.to_string(), mirror);
        }
        self.reinforced.remove(id_property);
        for name in [INDEX_PROPERTY, PARENT_PROPERTY] {
            if name != id_property {
                self.fields.remove(name);
                self.reinforced.remove(name);
            }
        }
        if children_property != id_property
            && matches!(self.fields.get(children_property), Some(Value::Array(_)))
        {
            self.fields.remove(children_property);
            self.reinforced.remove(children_property);
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn set_children(&mut self, children: Vec<NodeId>) {
        self.children = children;
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }

    pub(crate) fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.fields
    }

    pub(crate) fn set_observed(&mut self, observed: BTreeSet<String>) {
        self.observed = observed;
    }
}
