//! Model construction, enrichment, field access, and views.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use treedom_path::{remove_in, resolve_in, set_in, Path};

use crate::config::{Hooks, ModelOptions, Settings};
use crate::enhance;
use crate::error::ModelError;
use crate::id::NodeId;
use crate::node::Node;
use crate::{INDEX_PROPERTY, PARENT_PROPERTY};

pub(crate) static NULL: Value = Value::Null;

/// The observable tree model.
///
/// A `Model` owns a registry of [`Node`]s keyed by id, the list of
/// top-level node ids, and the configured callbacks. Records passed in at
/// construction, and later through the structural operations, are
/// enriched: nested child records are split out into nodes of their own,
/// ids are assigned and registered, and each node's observed path set is
/// computed from the enhance patterns.
pub struct Model {
    pub(crate) nodes: IndexMap<NodeId, Node>,
    pub(crate) root: Vec<NodeId>,
    pub(crate) settings: Settings,
    pub(crate) hooks: Hooks,
    next_id: u64,
}

enum HookKind {
    PreRecursion,
    PreChildren,
    Enrich,
}

// ── Construction ──────────────────────────────────────────────────────────

impl Model {
    /// Build a model from top-level records with default options.
    pub fn new(records: Vec<Value>) -> Result<Model, ModelError> {
        Self::with_options(records, ModelOptions::default())
    }

    /// Build a model from top-level records.
    ///
    /// Construction fails on malformed enhance patterns, on records that
    /// are not JSON objects, and in strict mode on duplicate ids.
    pub fn with_options(records: Vec<Value>, options: ModelOptions) -> Result<Model, ModelError> {
        let ModelOptions {
            id_property,
            children_property,
            parent_check,
            enhance_all,
            enhance_map,
            strict,
            setter_callback,
            enrich_model_callback,
            pre_recursion_callback,
            pre_children_callback,
        } = options;

        let mut patterns = Vec::with_capacity(enhance_map.len());
        for pattern in &enhance_map {
            patterns.push(Path::parse(pattern)?);
        }

        let mut model = Model {
            nodes: IndexMap::new(),
            root: Vec::new(),
            settings: Settings {
                id_property,
                children_property,
                parent_check,
                enhance_all,
                enhance_map: patterns,
                strict,
            },
            hooks: Hooks {
                setter: setter_callback,
                enrich: enrich_model_callback,
                pre_recursion: pre_recursion_callback,
                pre_children: pre_children_callback,
            },
            next_id: 1,
        };

        // the whole input is checked before any hook can fire
        let mut claimed = Vec::new();
        for record in &records {
            let claimed = model.settings.strict.then_some(&mut claimed);
            model.validate_record(record, claimed, &[])?;
        }
        for record in records {
            let id = model.enrich(record, None)?;
            model.root.push(id);
        }
        Ok(model)
    }
}

// ── Enrichment ────────────────────────────────────────────────────────────

impl Model {
    /// Enrich one record into a registered node under `parent` and return
    /// its id. Child records under the children field become nodes of
    /// their own, depth first, so by the time a node's enrichment
    /// callback runs its children are already enriched. The caller places
    /// the returned id into a child list.
    pub(crate) fn enrich(
        &mut self,
        record: Value,
        parent: Option<&NodeId>,
    ) -> Result<NodeId, ModelError> {
        let Value::Object(record) = record else {
            return Err(ModelError::InvalidRecord);
        };

        // split child records out of the plain fields
        let mut child_records = Vec::new();
        let mut fields = Map::new();
        for (key, value) in record {
            if key == self.settings.children_property {
                match value {
                    Value::Array(records) => child_records = records,
                    other => {
                        // a non-array children field is plain data
                        fields.insert(key, other);
                    }
                }
            } else if (key == INDEX_PROPERTY || key == PARENT_PROPERTY)
                && key != self.settings.id_property
            {
                // the position and the parent link are live structure;
                // a stale copy under their names would shadow them in
                // reads and views
            } else {
                fields.insert(key, value);
            }
        }

        let id = self.claim_id(&fields)?;
        fields.insert(self.settings.id_property.clone(), id.to_value());
        self.nodes
            .insert(id.clone(), Node::new(id.clone(), parent.cloned(), fields));

        if !child_records.is_empty() {
            self.run_hook(HookKind::PreRecursion, &id);
            self.run_hook(HookKind::PreChildren, &id);
        }

        let mut children = Vec::with_capacity(child_records.len());
        for child in child_records {
            children.push(self.enrich(child, Some(&id))?);
        }

        let observed = self.nodes.get(&id).map(|node| {
            enhance::observed_paths(
                &self.settings.enhance_map,
                self.settings.enhance_all,
                node.fields(),
            )
        });
        if let (Some(observed), Some(node)) = (observed, self.nodes.get_mut(&id)) {
            node.set_children(children);
            node.set_observed(observed);
        }

        self.run_hook(HookKind::Enrich, &id);
        Ok(id)
    }

    /// Walk a record tree before enrichment touches the registry: every
    /// node must be a JSON object. With `claimed`, usable ids must also
    /// be free, meaning neither registered nor repeated within the
    /// record; ids listed in `exempt` count as free even while still
    /// registered (replacement uses this for the subtree it is about to
    /// remove). Attaches run this first so a failure deep inside a
    /// subtree never leaves the shallower part behind.
    pub(crate) fn validate_record(
        &self,
        record: &Value,
        mut claimed: Option<&mut Vec<NodeId>>,
        exempt: &[NodeId],
    ) -> Result<(), ModelError> {
        let Value::Object(fields) = record else {
            return Err(ModelError::InvalidRecord);
        };
        if let Some(claimed) = claimed.as_deref_mut() {
            if let Some(id) = fields
                .get(&self.settings.id_property)
                .and_then(NodeId::from_field)
            {
                let taken = self.nodes.contains_key(&id) && !exempt.contains(&id);
                if taken || claimed.contains(&id) {
                    return Err(ModelError::DuplicateId(id));
                }
                claimed.push(id);
            }
        }
        if let Some(Value::Array(children)) = fields.get(&self.settings.children_property) {
            for child in children {
                self.validate_record(child, claimed.as_deref_mut(), exempt)?;
            }
        }
        Ok(())
    }

    /// Take the record's own id when it is usable, otherwise synthesize
    /// one. Numeric record ids bump the counter past themselves so later
    /// synthesized ids never collide.
    fn claim_id(&mut self, fields: &Map<String, Value>) -> Result<NodeId, ModelError> {
        match fields
            .get(&self.settings.id_property)
            .and_then(NodeId::from_field)
        {
            Some(id) => {
                if self.nodes.contains_key(&id) {
                    self.report(ModelError::DuplicateId(id))?;
                    Ok(self.fresh_id())
                } else {
                    if let NodeId::Num(n) = id {
                        self.next_id = self.next_id.max(n.saturating_add(1));
                    }
                    Ok(id)
                }
            }
            None => Ok(self.fresh_id()),
        }
    }

    /// Mint the next synthesized id. The counter wraps at the top of the
    /// numeric range and registered ids are skipped, so a minted id never
    /// collides with a live node.
    fn fresh_id(&mut self) -> NodeId {
        loop {
            let id = NodeId::Num(self.next_id);
            self.next_id = self.next_id.wrapping_add(1);
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    fn run_hook(&mut self, kind: HookKind, id: &NodeId) {
        let hook = match kind {
            HookKind::PreRecursion => &mut self.hooks.pre_recursion,
            HookKind::PreChildren => &mut self.hooks.pre_children,
            HookKind::Enrich => &mut self.hooks.enrich,
        };
        if let (Some(hook), Some(node)) = (hook.as_mut(), self.nodes.get_mut(id)) {
            hook(node);
            // hooks hold `&mut Node`; the id field still has to match
            // the registry key and the structural names stay derived
            node.repair_system_fields(
                &self.settings.id_property,
                &self.settings.children_property,
            );
        }
    }
}

// ── Field access ──────────────────────────────────────────────────────────

impl Model {
    /// Write `value` at a dotted path on a node.
    ///
    /// Reserved names (the id field, the derived index, the structural
    /// fields) and reinforced system properties are refused through the
    /// reporting policy, without consulting the setter callback. Writes
    /// to an observed path are staged, reported to the setter callback,
    /// and rolled back when the callback rejects them; writing a value
    /// equal to the current one is reported like any other write. Writes
    /// to unobserved paths apply silently. Intermediate containers are
    /// never created: a write whose parent chain does not resolve fails.
    pub fn set(&mut self, id: &NodeId, path: &str, value: Value) -> Result<(), ModelError> {
        let Some(node) = self.nodes.get(id) else {
            return Err(ModelError::NotFound(id.clone()));
        };
        let observed = node.is_observed(path);
        let first = path.split('.').next().unwrap_or(path);
        let reinforced = node.is_reinforced(first);

        if self.is_reserved(path) {
            self.report(ModelError::ReservedProperty(path.to_string()))?;
            return Ok(());
        }
        if reinforced {
            self.report(ModelError::ReinforcedProperty(first.to_string()))?;
            return Ok(());
        }

        let parsed = Path::parse(path)?;
        let old = match self.nodes.get_mut(id) {
            Some(node) => set_in(node.fields_mut(), &parsed, value)?,
            None => None,
        };

        if !observed {
            return Ok(());
        }

        let rejected = {
            let Model { hooks, nodes, .. } = self;
            match (hooks.setter.as_mut(), nodes.get(id)) {
                (Some(hook), Some(node)) => {
                    let new = resolve_in(node.fields(), &parsed).unwrap_or(&NULL);
                    hook(path, node, new, old.as_ref().unwrap_or(&NULL))
                }
                _ => false,
            }
        };

        if rejected {
            if let Some(node) = self.nodes.get_mut(id) {
                match old {
                    Some(previous) => {
                        set_in(node.fields_mut(), &parsed, previous)?;
                    }
                    None => {
                        remove_in(node.fields_mut(), &parsed)?;
                    }
                }
            }
            self.report(ModelError::Rejected {
                id: id.clone(),
                property: path.to_string(),
            })?;
        }
        Ok(())
    }

    /// Resolve a dotted path against a node's fields. Leading
    /// `parentNode` segments hop to ancestors first, so
    /// `parentNode.type` reads `type` off the node's parent.
    pub fn get(&self, id: &NodeId, path: &str) -> Option<&Value> {
        let node = self.nodes.get(id)?;
        let parsed = Path::parse(path).ok()?;
        self.resolve_on(node, &parsed)
    }

    /// Attach a read-only system property to a node: readable and
    /// queryable like any field, refused by [`Model::set`], excluded from
    /// record views. Reserved and already reinforced names are refused
    /// through the reporting policy.
    pub fn reinforce_property(
        &mut self,
        id: &NodeId,
        name: &str,
        value: Value,
    ) -> Result<(), ModelError> {
        if !self.nodes.contains_key(id) {
            return Err(ModelError::NotFound(id.clone()));
        }
        if self.is_reserved(name) {
            self.report(ModelError::ReservedProperty(name.to_string()))?;
            return Ok(());
        }
        let taken = self
            .nodes
            .get(id)
            .is_some_and(|node| node.is_reinforced(name));
        if taken {
            self.report(ModelError::ReinforcedProperty(name.to_string()))?;
            return Ok(());
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.reinforce(name, value);
        }
        Ok(())
    }

    fn is_reserved(&self, path: &str) -> bool {
        path == self.settings.id_property
            || path == INDEX_PROPERTY
            || path == PARENT_PROPERTY
            || path == self.settings.children_property
    }
}

// ── Structure reads ───────────────────────────────────────────────────────

impl Model {
    /// Current position of a node among its siblings.
    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        let node = self.nodes.get(id)?;
        let siblings = match node.parent() {
            Some(parent) => self.nodes.get(parent)?.children(),
            None => self.root.as_slice(),
        };
        siblings.iter().position(|sibling| sibling == id)
    }

    /// Ordered child ids of `parent`, or the top-level ids for `None`.
    /// An unknown parent has no children.
    pub fn children_of(&self, parent: Option<&NodeId>) -> &[NodeId] {
        match parent {
            None => &self.root,
            Some(id) => self.nodes.get(id).map(Node::children).unwrap_or(&[]),
        }
    }

    /// Number of registered nodes, descendants included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no nodes are registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether an id is registered.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// All registered nodes, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }
}

// ── Views and teardown ────────────────────────────────────────────────────

impl Model {
    /// The whole model as plain data: an array of records with children
    /// nested back under the children field and reinforced properties
    /// left out.
    pub fn view(&self) -> Value {
        Value::Array(self.root.iter().filter_map(|id| self.view_node(id)).collect())
    }

    /// One node as a plain record, its subtree nested back under the
    /// children field.
    pub fn view_node(&self, id: &NodeId) -> Option<Value> {
        let node = self.nodes.get(id)?;
        let mut record = Map::new();
        for (key, value) in node.fields() {
            if !node.is_reinforced(key) {
                record.insert(key.clone(), value.clone());
            }
        }
        let children: Vec<Value> = node
            .children()
            .iter()
            .filter_map(|child| self.view_node(child))
            .collect();
        if !children.is_empty() {
            record.insert(
                self.settings.children_property.clone(),
                Value::Array(children),
            );
        }
        Some(record.into())
    }

    /// Tear the model down: return the final plain-data view and clear
    /// the registry. The model stays usable, empty.
    pub fn destroy(&mut self) -> Value {
        let view = self.view();
        self.nodes.clear();
        self.root.clear();
        view
    }
}

// ── Reporting policy ──────────────────────────────────────────────────────

impl Model {
    /// Apply the reporting policy to a violation: an error in strict
    /// mode, a logged warning otherwise.
    pub(crate) fn report(&self, error: ModelError) -> Result<(), ModelError> {
        if self.settings.strict {
            Err(error)
        } else {
            log::warn!("{error}");
            Ok(())
        }
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("nodes", &self.nodes)
            .field("root", &self.root)
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assigns_ids_and_mirrors_them_into_fields() {
        let model = Model::new(vec![json!({"a": 1}), json!({"a": 2})]).unwrap();
        let ids: Vec<&NodeId> = model.children_of(None).iter().collect();
        assert_eq!(ids, [&NodeId::Num(1), &NodeId::Num(2)]);
        assert_eq!(model.get(&NodeId::Num(2), "id"), Some(&json!(2)));
    }

    #[test]
    fn keeps_caller_ids_and_counts_past_them() {
        let mut model = Model::new(vec![json!({"id": "note"}), json!({"id": 40})]).unwrap();
        let appended = model.append_child(json!({"x": 1}), None).unwrap();
        assert_eq!(appended, NodeId::Num(41));
        assert!(model.contains(&NodeId::Str("note".to_string())));
    }

    #[test]
    fn synthesized_ids_skip_taken_ones_at_the_counter_edge() {
        let mut model = Model::new(vec![json!({"id": u64::MAX, "tag": "edge"})]).unwrap();

        // the counter wraps and skips the registered top id
        let a = model.append_child(json!({}), None).unwrap();
        let b = model.append_child(json!({}), None).unwrap();

        assert_eq!(a, NodeId::Num(0));
        assert_eq!(b, NodeId::Num(1));
        assert_eq!(model.len(), 3);
        assert_eq!(
            model.get(&NodeId::Num(u64::MAX), "tag"),
            Some(&json!("edge"))
        );
    }

    #[test]
    fn splits_children_into_nodes_of_their_own() {
        let model = Model::new(vec![json!({
            "name": "root",
            "childNodes": [
                {"name": "a"},
                {"name": "b", "childNodes": [{"name": "b1"}]}
            ]
        })])
        .unwrap();

        assert_eq!(model.len(), 4);
        let root = &model.children_of(None)[0];
        assert_eq!(model.children_of(Some(root)).len(), 2);
        // the children field is gone from the parent's plain fields
        let root_node = model.get_element_by_id(root).unwrap();
        assert!(!root_node.fields().contains_key("childNodes"));
    }

    #[test]
    fn stale_structure_fields_are_stripped_at_enrichment() {
        let model = Model::new(vec![json!({
            "id": "n",
            "index": 9,
            "parentNode": "ghost",
            "tag": "keep",
            "childNodes": [{"id": "kid", "index": 0}]
        })])
        .unwrap();
        let n = NodeId::from("n");

        // the derived position wins over the record's stale copy
        assert_eq!(model.get(&n, "index"), None);
        assert_eq!(model.index_of(&n), Some(0));
        assert_eq!(model.get_element_by_id(&n).unwrap().get("parentNode"), None);
        assert_eq!(
            model.view(),
            json!([{"id": "n", "tag": "keep", "childNodes": [{"id": "kid"}]}])
        );
    }

    #[test]
    fn registers_parents_before_their_children() {
        let model = Model::new(vec![json!({
            "name": "root",
            "childNodes": [{"name": "kid"}]
        })])
        .unwrap();
        let names: Vec<&Value> = model.iter().filter_map(|n| n.get("name")).collect();
        assert_eq!(names, [&json!("root"), &json!("kid")]);
    }

    #[test]
    fn duplicate_ids_get_fresh_ones_by_default() {
        let model = Model::new(vec![json!({"id": 1, "tag": "a"}), json!({"id": 1, "tag": "b"})])
            .unwrap();
        assert_eq!(model.len(), 2);
        let top = model.children_of(None);
        assert_ne!(top[0], top[1]);
        assert_eq!(model.get(&top[1], "tag"), Some(&json!("b")));
    }

    #[test]
    fn duplicate_ids_fail_in_strict_mode() {
        let options = ModelOptions {
            strict: true,
            ..ModelOptions::default()
        };
        let err = Model::with_options(
            vec![json!({"id": 1}), json!({"id": 1})],
            options,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateId(NodeId::Num(1))));
    }

    #[test]
    fn non_object_records_are_refused() {
        assert!(matches!(
            Model::new(vec![json!([1, 2])]),
            Err(ModelError::InvalidRecord)
        ));
    }

    #[test]
    fn custom_id_and_children_properties() {
        let options = ModelOptions {
            id_property: "uuid".to_string(),
            children_property: "items".to_string(),
            ..ModelOptions::default()
        };
        let model = Model::with_options(
            vec![json!({"uuid": "top", "items": [{"uuid": "sub"}]})],
            options,
        )
        .unwrap();
        let top = NodeId::from("top");
        assert_eq!(model.children_of(Some(&top)).to_vec(), vec![NodeId::from("sub")]);
        assert_eq!(model.get(&top, "uuid"), Some(&json!("top")));
    }

    #[test]
    fn view_round_trips_records_with_children() {
        let records = vec![json!({
            "name": "root",
            "childNodes": [{"name": "kid"}]
        })];
        let model = Model::new(records).unwrap();
        assert_eq!(
            model.view(),
            json!([{
                "name": "root",
                "id": 1,
                "childNodes": [{"name": "kid", "id": 2}]
            }])
        );
    }

    #[test]
    fn destroy_returns_the_view_and_empties_the_model() {
        let mut model = Model::new(vec![json!({"a": 1})]).unwrap();
        let view = model.destroy();
        assert_eq!(view, json!([{"a": 1, "id": 1}]));
        assert!(model.is_empty());
        assert!(model.children_of(None).is_empty());
    }

    #[test]
    fn malformed_enhance_patterns_fail_construction() {
        let options = ModelOptions {
            enhance_map: vec!["a..b".to_string()],
            ..ModelOptions::default()
        };
        assert!(matches!(
            Model::with_options(vec![], options),
            Err(ModelError::Path(_))
        ));
    }
}
