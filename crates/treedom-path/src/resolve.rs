//! Resolution of dotted paths against JSON values.
//!
//! Objects resolve by member name. Arrays resolve when the segment parses
//! as a decimal index. Scalars end the walk. Wildcard segments never
//! resolve directly; [`expand`] turns a wildcard path into the concrete
//! paths present in a document.

use serde_json::{Map, Value};

use crate::{Path, PathError, Segment};

/// Resolve `path` against `root` by recursive descent.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use treedom_path::{resolve, Path};
///
/// let doc = json!({"a": {"b": [10, 20]}});
/// assert_eq!(resolve(&doc, &Path::parse("a.b.1").unwrap()), Some(&json!(20)));
/// assert_eq!(resolve(&doc, &Path::parse("a.c").unwrap()), None);
/// ```
pub fn resolve<'a>(root: &'a Value, path: &Path) -> Option<&'a Value> {
    walk(root, path.segments())
}

/// Mutable variant of [`resolve`].
pub fn resolve_mut<'a>(root: &'a mut Value, path: &Path) -> Option<&'a mut Value> {
    walk_mut(root, path.segments())
}

/// Resolve `path` against an object's entries directly, for callers that
/// hold a `serde_json::Map` rather than a `Value`.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use treedom_path::{resolve_in, Path};
///
/// let doc = json!({"user": {"name": "ada"}});
/// let map = doc.as_object().unwrap();
/// let path = Path::parse("user.name").unwrap();
/// assert_eq!(resolve_in(map, &path), Some(&json!("ada")));
/// ```
pub fn resolve_in<'a>(map: &'a Map<String, Value>, path: &Path) -> Option<&'a Value> {
    walk_in(map, path.segments())
}

/// Mutable variant of [`resolve_in`].
pub fn resolve_in_mut<'a>(map: &'a mut Map<String, Value>, path: &Path) -> Option<&'a mut Value> {
    walk_in_mut(map, path.segments())
}

/// Expand the path's wildcard over the keys present at its position in
/// `root`, in key order. A path without a wildcard expands to itself; a
/// wildcard whose prefix does not resolve to a container expands to
/// nothing. Segments after the wildcard are carried over unchecked.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use treedom_path::{expand, Path};
///
/// let doc = json!({"preferences": {"foo": {"value": 1}, "bar": {"value": 2}}});
/// let concrete = expand(&doc, &Path::parse("preferences.*.value").unwrap());
/// let rendered: Vec<String> = concrete.iter().map(|p| p.to_string()).collect();
/// assert_eq!(rendered, ["preferences.foo.value", "preferences.bar.value"]);
/// ```
pub fn expand(root: &Value, path: &Path) -> Vec<Path> {
    let Some(position) = wildcard_position(path) else {
        return vec![path.clone()];
    };
    let prefix = &path.segments()[..position];
    let container = if prefix.is_empty() {
        Some(root)
    } else {
        walk(root, prefix)
    };
    match container {
        Some(container) => substitute(path, position, container_keys(container)),
        None => Vec::new(),
    }
}

/// [`expand`] against an object's entries directly.
pub fn expand_in(map: &Map<String, Value>, path: &Path) -> Vec<Path> {
    let Some(position) = wildcard_position(path) else {
        return vec![path.clone()];
    };
    let prefix = &path.segments()[..position];
    if prefix.is_empty() {
        return substitute(path, position, map.keys().cloned().collect());
    }
    match walk_in(map, prefix) {
        Some(container) => substitute(path, position, container_keys(container)),
        None => Vec::new(),
    }
}

/// Write `value` at `path` inside `map` without creating intermediate
/// containers, and return the previous value (`None` when the leaf was
/// absent). Object leaves may be inserted; array leaves must already be
/// in bounds.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use treedom_path::{set_in, Path, PathError};
///
/// let mut doc = json!({"user": {"name": "ada"}});
/// let map = doc.as_object_mut().unwrap();
///
/// let old = set_in(map, &Path::parse("user.name").unwrap(), json!("grace")).unwrap();
/// assert_eq!(old, Some(json!("ada")));
///
/// let missing = Path::parse("user.address.city").unwrap();
/// assert!(matches!(set_in(map, &missing, json!("x")), Err(PathError::Dangling(_))));
/// ```
pub fn set_in(
    map: &mut Map<String, Value>,
    path: &Path,
    value: Value,
) -> Result<Option<Value>, PathError> {
    if path.has_wildcard() {
        return Err(PathError::Wildcard(path.to_string()));
    }
    let Some((leaf, parents)) = path.segments().split_last() else {
        return Err(PathError::Dangling(path.to_string()));
    };
    let leaf = match leaf.as_key() {
        Some(key) => key,
        None => return Err(PathError::Wildcard(path.to_string())),
    };
    if parents.is_empty() {
        return Ok(map.insert(leaf.to_string(), value));
    }
    let container = match walk_in_mut(map, parents) {
        Some(container) => container,
        None => return Err(PathError::Dangling(path.to_string())),
    };
    match container {
        Value::Object(object) => Ok(object.insert(leaf.to_string(), value)),
        Value::Array(items) => {
            let index: usize = leaf
                .parse()
                .map_err(|_| PathError::Dangling(path.to_string()))?;
            match items.get_mut(index) {
                Some(slot) => Ok(Some(std::mem::replace(slot, value))),
                None => Err(PathError::Dangling(path.to_string())),
            }
        }
        _ => Err(PathError::Dangling(path.to_string())),
    }
}

/// Remove the object member addressed by `path` from `map` and return it
/// (`None` when it was already absent). Only object members can be
/// removed; array elements cannot.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use treedom_path::{remove_in, Path};
///
/// let mut doc = json!({"user": {"name": "ada", "age": 36}});
/// let map = doc.as_object_mut().unwrap();
///
/// let old = remove_in(map, &Path::parse("user.age").unwrap()).unwrap();
/// assert_eq!(old, Some(json!(36)));
/// assert_eq!(remove_in(map, &Path::parse("user.age").unwrap()).unwrap(), None);
/// ```
pub fn remove_in(map: &mut Map<String, Value>, path: &Path) -> Result<Option<Value>, PathError> {
    if path.has_wildcard() {
        return Err(PathError::Wildcard(path.to_string()));
    }
    let Some((leaf, parents)) = path.segments().split_last() else {
        return Err(PathError::Dangling(path.to_string()));
    };
    let leaf = match leaf.as_key() {
        Some(key) => key,
        None => return Err(PathError::Wildcard(path.to_string())),
    };
    if parents.is_empty() {
        return Ok(map.remove(leaf));
    }
    match walk_in_mut(map, parents) {
        Some(Value::Object(object)) => Ok(object.remove(leaf)),
        _ => Err(PathError::Dangling(path.to_string())),
    }
}

fn wildcard_position(path: &Path) -> Option<usize> {
    path.segments().iter().position(Segment::is_wildcard)
}

fn container_keys(value: &Value) -> Vec<String> {
    match value {
        Value::Object(map) => map.keys().cloned().collect(),
        Value::Array(items) => (0..items.len()).map(|i| i.to_string()).collect(),
        _ => Vec::new(),
    }
}

fn substitute(path: &Path, position: usize, keys: Vec<String>) -> Vec<Path> {
    keys.into_iter()
        .map(|key| {
            let mut segments = path.segments().to_vec();
            segments[position] = Segment::Key(key);
            Path::from_segments(segments)
        })
        .collect()
}

fn walk<'a>(root: &'a Value, segments: &[Segment]) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments {
        current = step(current, segment.as_key()?)?;
    }
    Some(current)
}

fn walk_mut<'a>(root: &'a mut Value, segments: &[Segment]) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in segments {
        current = step_mut(current, segment.as_key()?)?;
    }
    Some(current)
}

fn walk_in<'a>(map: &'a Map<String, Value>, segments: &[Segment]) -> Option<&'a Value> {
    let (first, rest) = segments.split_first()?;
    let value = map.get(first.as_key()?)?;
    walk(value, rest)
}

fn walk_in_mut<'a>(map: &'a mut Map<String, Value>, segments: &[Segment]) -> Option<&'a mut Value> {
    let (first, rest) = segments.split_first()?;
    let value = map.get_mut(first.as_key()?)?;
    walk_mut(value, rest)
}

fn step<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => items.get(key.parse::<usize>().ok()?),
        _ => None,
    }
}

fn step_mut<'a>(value: &'a mut Value, key: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(key),
        Value::Array(items) => items.get_mut(key.parse::<usize>().ok()?),
        _ => None,
    }
}
