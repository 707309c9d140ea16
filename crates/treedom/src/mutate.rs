//! Structural operations: attach, move, replace, remove.

use serde_json::Value;

use crate::error::ModelError;
use crate::id::NodeId;
use crate::model::{Model, NULL};
use crate::node::Node;
use crate::{PARENT_PROPERTY, REMOVE_PROPERTY};

/// Argument of the structural operations: either a fresh record to
/// enrich on attach, or the id of a node already in the model, which is
/// moved out of its current position.
#[derive(Debug)]
pub enum Item {
    Record(Value),
    Existing(NodeId),
}

impl From<Value> for Item {
    fn from(record: Value) -> Self {
        Item::Record(record)
    }
}

impl From<NodeId> for Item {
    fn from(id: NodeId) -> Self {
        Item::Existing(id)
    }
}

impl From<&NodeId> for Item {
    fn from(id: &NodeId) -> Self {
        Item::Existing(id.clone())
    }
}

// ── Attach and move ───────────────────────────────────────────────────────

impl Model {
    /// Attach `item` as the last child of `parent`, or at the end of the
    /// top level for `None`. Returns the id of the attached node.
    pub fn append_child(
        &mut self,
        item: impl Into<Item>,
        parent: Option<&NodeId>,
    ) -> Result<NodeId, ModelError> {
        let index = self.children_of(parent).len();
        self.move_item(item.into(), parent.cloned(), index)
    }

    /// Attach `item` as the first child of `parent`.
    pub fn prepend_child(
        &mut self,
        item: impl Into<Item>,
        parent: Option<&NodeId>,
    ) -> Result<NodeId, ModelError> {
        self.move_item(item.into(), parent.cloned(), 0)
    }

    /// Attach `item` directly before `sibling`, under the same parent.
    pub fn insert_before(
        &mut self,
        item: impl Into<Item>,
        sibling: &NodeId,
    ) -> Result<NodeId, ModelError> {
        let (parent, index) = self.slot_of(sibling)?;
        self.move_item(item.into(), parent, index)
    }

    /// Attach `item` directly after `sibling`, under the same parent.
    pub fn insert_after(
        &mut self,
        item: impl Into<Item>,
        sibling: &NodeId,
    ) -> Result<NodeId, ModelError> {
        let (parent, index) = self.slot_of(sibling)?;
        self.move_item(item.into(), parent, index + 1)
    }

    /// Attach or move `item` to `index` under `parent`.
    ///
    /// When a node moves forward under its own parent the requested index
    /// counts positions as they were before the node left its slot, so it
    /// is reduced by one on the way back in; a move that lands on the
    /// current position is a no-op and does not notify.
    fn move_item(
        &mut self,
        item: Item,
        parent: Option<NodeId>,
        index: usize,
    ) -> Result<NodeId, ModelError> {
        if let Some(parent) = &parent {
            if !self.nodes.contains_key(parent) {
                return Err(ModelError::NotFound(parent.clone()));
            }
        }
        match item {
            Item::Record(record) => {
                if self.settings.strict {
                    self.validate_record(&record, Some(&mut Vec::new()), &[])?;
                } else {
                    self.validate_record(&record, None, &[])?;
                }
                let id = self.enrich(record, parent.as_ref())?;
                self.splice(parent.as_ref(), index, id.clone());
                let new = parent_value(parent.as_ref());
                self.notify_structural(PARENT_PROPERTY, &id, &new, &NULL);
                Ok(id)
            }
            Item::Existing(id) => {
                let Some(node) = self.nodes.get(&id) else {
                    return Err(ModelError::NotFound(id));
                };
                let old_parent = node.parent().cloned();
                if self.settings.parent_check {
                    if let Some(error) = self.structural_violation(&id, parent.as_ref()) {
                        self.report(error)?;
                        return Ok(id);
                    }
                }
                let mut target = index;
                if old_parent == parent {
                    if let Some(current) = self.index_of(&id) {
                        if target > current {
                            target -= 1;
                        }
                        if target == current {
                            return Ok(id);
                        }
                    }
                }
                self.detach(&id);
                self.splice(parent.as_ref(), target, id.clone());
                if let Some(node) = self.nodes.get_mut(&id) {
                    node.set_parent(parent.clone());
                }
                let new = parent_value(parent.as_ref());
                let old = parent_value(old_parent.as_ref());
                self.notify_structural(PARENT_PROPERTY, &id, &new, &old);
                Ok(id)
            }
        }
    }
}

// ── Remove and replace ────────────────────────────────────────────────────

impl Model {
    /// Remove a node: detach it from its parent, report it through the
    /// notification channel under the removal key, and unregister it
    /// together with its whole subtree. Returns the removed subtree as a
    /// plain record.
    pub fn remove_child(&mut self, id: &NodeId) -> Result<Value, ModelError> {
        let Some(record) = self.view_node(id) else {
            return Err(ModelError::NotFound(id.clone()));
        };
        let old_parent = self.nodes.get(id).and_then(|node| node.parent().cloned());
        self.detach(id);
        let old = parent_value(old_parent.as_ref());
        self.notify_structural(REMOVE_PROPERTY, id, &NULL, &old);
        self.unregister(id);
        Ok(record)
    }

    /// Replace `old` with `item`: the old node is removed, subtree and
    /// all, and the new one attached at its position. Returns the removed
    /// record; when a violation is refused leniently nothing changes and
    /// the returned record reflects the node still in place.
    ///
    /// Every refusal happens before the removal, so an error never leaves
    /// the tree partially torn down. A replacement node sitting inside
    /// the removed subtree is refused as a violation, and in strict mode
    /// incoming ids are checked against the registry with the subtree's
    /// own ids exempted, so a record may reuse the ids the removal frees.
    pub fn replace_child(
        &mut self,
        item: impl Into<Item>,
        old: &NodeId,
    ) -> Result<Value, ModelError> {
        let item = item.into();
        if !self.contains(old) {
            return Err(ModelError::NotFound(old.clone()));
        }
        match &item {
            Item::Record(record) => {
                // the removed subtree's ids come free for the
                // replacement, so the id check exempts them instead of
                // waiting for the removal
                if self.settings.strict {
                    let mut freed = Vec::new();
                    self.collect_subtree_ids(old, &mut freed);
                    self.validate_record(record, Some(&mut Vec::new()), &freed)?;
                } else {
                    self.validate_record(record, None, &[])?;
                }
            }
            Item::Existing(id) => {
                if !self.contains(id) {
                    return Err(ModelError::NotFound(id.clone()));
                }
                if id == old {
                    self.report(ModelError::ReplaceSelf(id.clone()))?;
                    return self
                        .view_node(old)
                        .ok_or_else(|| ModelError::NotFound(old.clone()));
                }
                if self.is_ancestor(old, id) {
                    self.report(ModelError::ReplaceDescendant {
                        node: old.clone(),
                        item: id.clone(),
                    })?;
                    return self
                        .view_node(old)
                        .ok_or_else(|| ModelError::NotFound(old.clone()));
                }
            }
        }
        let (parent, index) = self.slot_of(old)?;
        // refuse up front so nothing is removed when the attach would be
        if let Item::Existing(id) = &item {
            if self.settings.parent_check {
                if let Some(error) = self.structural_violation(id, parent.as_ref()) {
                    self.report(error)?;
                    return self
                        .view_node(old)
                        .ok_or_else(|| ModelError::NotFound(old.clone()));
                }
            }
        }
        let removed = self.remove_child(old)?;
        self.move_item(item, parent, index)?;
        Ok(removed)
    }
}

// ── Internals ─────────────────────────────────────────────────────────────

impl Model {
    /// A sibling's slot: its parent and its current position under it.
    fn slot_of(&self, sibling: &NodeId) -> Result<(Option<NodeId>, usize), ModelError> {
        let node = self
            .nodes
            .get(sibling)
            .ok_or_else(|| ModelError::NotFound(sibling.clone()))?;
        let parent = node.parent().cloned();
        let index = self
            .index_of(sibling)
            .ok_or_else(|| ModelError::NotFound(sibling.clone()))?;
        Ok((parent, index))
    }

    fn splice(&mut self, parent: Option<&NodeId>, index: usize, id: NodeId) {
        let list = match parent {
            None => &mut self.root,
            Some(parent) => match self.nodes.get_mut(parent) {
                Some(node) => node.children_mut(),
                None => return,
            },
        };
        let index = index.min(list.len());
        list.insert(index, id);
    }

    fn detach(&mut self, id: &NodeId) {
        let parent = self.nodes.get(id).and_then(|node| node.parent().cloned());
        let list = match &parent {
            None => &mut self.root,
            Some(parent) => match self.nodes.get_mut(parent) {
                Some(node) => node.children_mut(),
                None => return,
            },
        };
        if let Some(position) = list.iter().position(|child| child == id) {
            list.remove(position);
        }
    }

    fn unregister(&mut self, id: &NodeId) {
        if let Some(node) = self.nodes.shift_remove(id) {
            for child in node.children() {
                self.unregister(child);
            }
        }
    }

    /// The ids of `id` and of every node below it.
    fn collect_subtree_ids(&self, id: &NodeId, ids: &mut Vec<NodeId>) {
        ids.push(id.clone());
        if let Some(node) = self.nodes.get(id) {
            for child in node.children() {
                self.collect_subtree_ids(child, ids);
            }
        }
    }

    fn structural_violation(&self, id: &NodeId, parent: Option<&NodeId>) -> Option<ModelError> {
        let parent = parent?;
        if parent == id {
            return Some(ModelError::SelfParent(id.clone()));
        }
        if self.is_ancestor(id, parent) {
            return Some(ModelError::Cycle {
                node: id.clone(),
                parent: parent.clone(),
            });
        }
        None
    }

    /// Whether `ancestor` sits on `node`'s parent chain.
    fn is_ancestor(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let mut current = self.nodes.get(node).and_then(Node::parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(Node::parent);
        }
        false
    }

    fn notify_structural(&mut self, property: &str, id: &NodeId, new: &Value, old: &Value) {
        let Model { hooks, nodes, .. } = self;
        if let (Some(hook), Some(node)) = (hooks.setter.as_mut(), nodes.get(id)) {
            // the return value is ignored for structural notifications
            let _ = hook(property, node, new, old);
        }
    }
}

fn parent_value(parent: Option<&NodeId>) -> Value {
    parent.map(NodeId::to_value).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn abc() -> Model {
        Model::new(vec![
            json!({"id": "a"}),
            json!({"id": "b"}),
            json!({"id": "c"}),
        ])
        .unwrap()
    }

    fn top(model: &Model) -> Vec<String> {
        model
            .children_of(None)
            .iter()
            .map(NodeId::to_string)
            .collect()
    }

    #[test]
    fn forward_moves_compensate_for_the_vacated_slot() {
        let mut model = abc();
        // "to index 2" counts slots as they are before "a" leaves
        model
            .move_item(Item::Existing(NodeId::from("a")), None, 2)
            .unwrap();
        assert_eq!(top(&model), ["b", "c", "a"]);
    }

    #[test]
    fn backward_moves_use_the_requested_index_as_is() {
        let mut model = abc();
        model
            .move_item(Item::Existing(NodeId::from("c")), None, 0)
            .unwrap();
        assert_eq!(top(&model), ["c", "a", "b"]);
    }

    #[test]
    fn moving_to_the_current_position_is_a_no_op() {
        let mut model = abc();
        model
            .move_item(Item::Existing(NodeId::from("b")), None, 1)
            .unwrap();
        assert_eq!(top(&model), ["a", "b", "c"]);
        // one past the current slot compensates back onto it
        model
            .move_item(Item::Existing(NodeId::from("b")), None, 2)
            .unwrap();
        assert_eq!(top(&model), ["a", "b", "c"]);
    }

    #[test]
    fn append_of_the_last_child_stays_put() {
        let mut model = abc();
        model.append_child(&NodeId::from("c"), None).unwrap();
        assert_eq!(top(&model), ["a", "b", "c"]);
    }
}
