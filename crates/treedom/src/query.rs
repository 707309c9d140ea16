//! The query engine: id lookup and property scans.

use serde_json::Value;
use treedom_path::{resolve_in, Path};

use crate::id::NodeId;
use crate::model::Model;
use crate::node::Node;
use crate::PARENT_PROPERTY;

impl Model {
    /// Look up a node by id.
    pub fn get_element_by_id(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// All nodes matching a property filter, in registration order.
    ///
    /// With both arguments `None` every node matches. A path alone is a
    /// presence test; a path with a value matches on equality. Leading
    /// `parentNode` segments hop to ancestors, so
    /// `("parentNode.type", "folder")` selects the nodes whose parent
    /// carries `type == "folder"`. A malformed path, or a value without a
    /// path, matches nothing.
    pub fn get_elements_by_property(
        &self,
        path: Option<&str>,
        value: Option<&Value>,
    ) -> Vec<&Node> {
        let Some(path) = path else {
            return if value.is_none() {
                self.nodes.values().collect()
            } else {
                Vec::new()
            };
        };
        let parsed = match Path::parse(path) {
            Ok(parsed) => parsed,
            Err(error) => {
                log::debug!("query path '{path}' ignored: {error}");
                return Vec::new();
            }
        };
        self.nodes
            .values()
            .filter(|node| self.query_match(node, &parsed, value))
            .collect()
    }

    /// Count the nodes [`Model::get_elements_by_property`] would return,
    /// without materializing them.
    pub fn count_elements_by_property(&self, path: Option<&str>, value: Option<&Value>) -> usize {
        let Some(path) = path else {
            return if value.is_none() { self.nodes.len() } else { 0 };
        };
        let parsed = match Path::parse(path) {
            Ok(parsed) => parsed,
            Err(error) => {
                log::debug!("query path '{path}' ignored: {error}");
                return 0;
            }
        };
        self.nodes
            .values()
            .filter(|node| self.query_match(node, &parsed, value))
            .count()
    }

    fn query_match(&self, node: &Node, path: &Path, value: Option<&Value>) -> bool {
        match (self.resolve_on(node, path), value) {
            (Some(found), Some(want)) => found == want,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Resolve a path against a node, hopping to the parent for each
    /// leading `parentNode` segment. Hopping above the top level resolves
    /// to nothing, as does a path consisting only of hops.
    pub(crate) fn resolve_on<'a>(&'a self, node: &'a Node, path: &Path) -> Option<&'a Value> {
        let mut hops = 0;
        let mut current = node;
        for segment in path.segments() {
            if segment.as_key() == Some(PARENT_PROPERTY) {
                current = self.nodes.get(current.parent()?)?;
                hops += 1;
            } else {
                break;
            }
        }
        let segments = &path.segments()[hops..];
        if segments.is_empty() {
            return None;
        }
        if hops == 0 {
            return resolve_in(current.fields(), path);
        }
        let rest = Path::from_segments(segments.to_vec());
        resolve_in(current.fields(), &rest)
    }
}
