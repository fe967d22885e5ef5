//! Typed domain filters for record-store queries
//!
//! The ERP's search endpoints take a small tuple-based predicate language:
//! `(field, operator, value)` triples, optionally prefixed with a `"|"`
//! marker that ORs the two following predicates. Building those tuples from
//! ad-hoc JSON invites silent typos, so the pipeline goes through this typed
//! builder and serializes once, at the call boundary.

use serde_json::{Value, json};

/// Comparison operators supported by the record store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DomainOp {
    /// Exact equality
    Eq,
    /// Case-insensitive partial match ("contains")
    ILike,
    /// Case-insensitive exact match
    EqILike,
}

impl DomainOp {
    fn wire(self) -> &'static str {
        match self {
            DomainOp::Eq => "=",
            DomainOp::ILike => "ilike",
            DomainOp::EqILike => "=ilike",
        }
    }
}

#[derive(Clone, Debug)]
enum DomainNode {
    /// Prefix OR combinator: applies to the next two predicates
    Or,
    Condition {
        field: String,
        op: DomainOp,
        value: Value,
    },
}

/// A search filter over one collection, in first-written order.
///
/// An empty domain matches every record in the collection.
#[derive(Clone, Debug, Default)]
pub struct Domain {
    nodes: Vec<DomainNode>,
}

impl Domain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `(field, operator, value)` predicate.
    pub fn filter(mut self, field: &str, op: DomainOp, value: Value) -> Self {
        self.nodes.push(DomainNode::Condition {
            field: field.to_string(),
            op,
            value,
        });
        self
    }

    /// Append the prefix OR marker. The server ORs the next two predicates.
    pub fn or(mut self) -> Self {
        self.nodes.push(DomainNode::Or);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Serialize to the wire's list-of-tuples form.
    pub fn to_value(&self) -> Value {
        let items: Vec<Value> = self
            .nodes
            .iter()
            .map(|node| match node {
                DomainNode::Or => json!("|"),
                DomainNode::Condition { field, op, value } => {
                    json!([field, op.wire(), value])
                }
            })
            .collect();
        Value::Array(items)
    }
}

/// Optional keyword arguments for search/read calls.
#[derive(Clone, Debug, Default)]
pub struct SearchOptions {
    /// Return no more than this many records
    pub limit: Option<u32>,
    /// Skip this many records (pagination, with `limit`)
    pub offset: Option<u32>,
    /// Restrict read results to these fields; empty reads all fields
    pub fields: Vec<String>,
}

impl SearchOptions {
    /// Restrict results to the named fields.
    pub fn fields(names: &[&str]) -> Self {
        Self {
            fields: names.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Serialize to the kwargs map, omitting unset options.
    pub fn to_kwargs(&self) -> Value {
        let mut kwargs = serde_json::Map::new();
        if let Some(limit) = self.limit {
            kwargs.insert("limit".to_string(), json!(limit));
        }
        if let Some(offset) = self.offset {
            kwargs.insert("offset".to_string(), json!(offset));
        }
        if !self.fields.is_empty() {
            kwargs.insert("fields".to_string(), json!(self.fields));
        }
        Value::Object(kwargs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_serializes_to_tuple() {
        let domain = Domain::new().filter("model", DomainOp::ILike, json!("Latitude"));
        assert_eq!(domain.to_value(), json!([["model", "ilike", "Latitude"]]));
    }

    #[test]
    fn test_or_marker_prefixes_predicates() {
        let domain = Domain::new()
            .or()
            .filter("serial", DomainOp::Eq, json!("S1"))
            .filter("serial", DomainOp::Eq, json!("S2"));
        assert_eq!(
            domain.to_value(),
            json!(["|", ["serial", "=", "S1"], ["serial", "=", "S2"]])
        );
    }

    #[test]
    fn test_case_insensitive_exact_operator() {
        let domain = Domain::new().filter("serial", DomainOp::EqILike, json!("h6fnd42"));
        assert_eq!(domain.to_value(), json!([["serial", "=ilike", "h6fnd42"]]));
    }

    #[test]
    fn test_empty_domain_serializes_to_empty_list() {
        assert_eq!(Domain::new().to_value(), json!([]));
        assert!(Domain::new().is_empty());
    }

    #[test]
    fn test_kwargs_omit_unset_options() {
        assert_eq!(SearchOptions::default().to_kwargs(), json!({}));

        let options = SearchOptions {
            limit: Some(10),
            ..SearchOptions::default()
        };
        assert_eq!(options.to_kwargs(), json!({"limit": 10}));

        let options = SearchOptions::fields(&["id", "model"]);
        assert_eq!(options.to_kwargs(), json!({"fields": ["id", "model"]}));
    }
}
