//! Node identity.

use std::fmt;

use serde_json::Value;

/// Identity of a managed node, unique within one [`Model`](crate::Model).
///
/// Ids are read from a record's id field when present (non-empty strings
/// and unsigned integers qualify) and synthesized from the model's
/// monotonic counter otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    /// Numeric id, either synthesized or taken from a numeric id field.
    Num(u64),
    /// String id taken from the record.
    Str(String),
}

impl NodeId {
    /// Read an identity out of a record's id field. Anything other than a
    /// non-empty string or an unsigned integer counts as absent.
    pub fn from_field(value: &Value) -> Option<NodeId> {
        match value {
            Value::Number(n) => n.as_u64().map(NodeId::Num),
            Value::String(s) if !s.is_empty() => Some(NodeId::Str(s.clone())),
            _ => None,
        }
    }

    /// The identity as it appears in record form.
    pub fn to_value(&self) -> Value {
        match self {
            NodeId::Num(n) => Value::from(*n),
            NodeId::Str(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Num(n) => write!(f, "{n}"),
            NodeId::Str(s) => f.write_str(s),
        }
    }
}

impl From<u64> for NodeId {
    fn from(n: u64) -> Self {
        NodeId::Num(n)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId::Str(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId::Str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_numeric_and_string_ids() {
        assert_eq!(NodeId::from_field(&json!(7)), Some(NodeId::Num(7)));
        assert_eq!(NodeId::from_field(&json!(0)), Some(NodeId::Num(0)));
        assert_eq!(
            NodeId::from_field(&json!("a1")),
            Some(NodeId::Str("a1".to_string()))
        );
    }

    #[test]
    fn everything_else_counts_as_absent() {
        for value in [json!(null), json!(""), json!(-3), json!(1.5), json!(true), json!([1])] {
            assert_eq!(NodeId::from_field(&value), None, "{value}");
        }
    }

    #[test]
    fn round_trips_through_record_form() {
        for id in [NodeId::Num(42), NodeId::Str("note-1".to_string())] {
            assert_eq!(NodeId::from_field(&id.to_value()), Some(id));
        }
    }

    #[test]
    fn displays_without_decoration() {
        assert_eq!(NodeId::Num(3).to_string(), "3");
        assert_eq!(NodeId::from("x").to_string(), "x");
    }
}
