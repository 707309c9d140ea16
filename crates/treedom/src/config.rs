//! Model construction options.

use serde_json::Value;
use treedom_path::Path;

use crate::Node;

/// Validation and notification callback, invoked as
/// `(property, node, new, old)`.
///
/// For field writes, returning `true` rejects the write and the previous
/// value is rolled back. For structural notifications (attach, remove)
/// the return value is ignored.
pub type SetterCallback = Box<dyn FnMut(&str, &Node, &Value, &Value) -> bool>;

/// Per-node enrichment callback.
pub type NodeCallback = Box<dyn FnMut(&mut Node)>;

/// Options accepted by [`Model::with_options`](crate::Model::with_options).
///
/// | Field                    | Default        | Meaning                                      |
/// |--------------------------|----------------|----------------------------------------------|
/// | `id_property`            | `"id"`         | Record field holding the identity            |
/// | `children_property`      | `"childNodes"` | Record field holding nested child records    |
/// | `parent_check`           | `false`        | Refuse moves that would create a cycle       |
/// | `enhance_all`            | `false`        | Observe every top-level field; map ignored   |
/// | `enhance_map`            | empty          | Dotted paths to observe, one `*` allowed     |
/// | `strict`                 | `false`        | Escalate reported violations into errors     |
/// | `setter_callback`        | `None`         | Write validation and change notification     |
/// | `enrich_model_callback`  | `None`         | Runs once per node at the end of enrichment  |
/// | `pre_recursion_callback` | `None`         | Runs before descending into child records    |
/// | `pre_children_callback`  | `None`         | Runs after it, still before the descent      |
pub struct ModelOptions {
    pub id_property: String,
    pub children_property: String,
    pub parent_check: bool,
    pub enhance_all: bool,
    pub enhance_map: Vec<String>,
    pub strict: bool,
    pub setter_callback: Option<SetterCallback>,
    pub enrich_model_callback: Option<NodeCallback>,
    pub pre_recursion_callback: Option<NodeCallback>,
    pub pre_children_callback: Option<NodeCallback>,
}

impl Default for ModelOptions {
    fn default() -> Self {
        ModelOptions {
            id_property: "id".to_string(),
            children_property: "childNodes".to_string(),
            parent_check: false,
            enhance_all: false,
            enhance_map: Vec::new(),
            strict: false,
            setter_callback: None,
            enrich_model_callback: None,
            pre_recursion_callback: None,
            pre_children_callback: None,
        }
    }
}

impl std::fmt::Debug for ModelOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelOptions")
            .field("id_property", &self.id_property)
            .field("children_property", &self.children_property)
            .field("parent_check", &self.parent_check)
            .field("enhance_all", &self.enhance_all)
            .field("enhance_map", &self.enhance_map)
            .field("strict", &self.strict)
            .field("setter_callback", &self.setter_callback.is_some())
            .field("enrich_model_callback", &self.enrich_model_callback.is_some())
            .field("pre_recursion_callback", &self.pre_recursion_callback.is_some())
            .field("pre_children_callback", &self.pre_children_callback.is_some())
            .finish()
    }
}

/// The plain-data half of the options, kept by the model after the
/// callbacks are split off into [`Hooks`].
#[derive(Debug)]
pub(crate) struct Settings {
    pub id_property: String,
    pub children_property: String,
    pub parent_check: bool,
    pub enhance_all: bool,
    pub enhance_map: Vec<Path>,
    pub strict: bool,
}

/// The callbacks, held on their own field so invoking one can borrow the
/// registry at the same time.
#[derive(Default)]
pub(crate) struct Hooks {
    pub setter: Option<SetterCallback>,
    pub enrich: Option<NodeCallback>,
    pub pre_recursion: Option<NodeCallback>,
    pub pre_children: Option<NodeCallback>,
}
