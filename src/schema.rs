//! Generation schema: the tagged tree a constrained decoder consumes.

use serde::Serialize;

/// Primitive kinds a leaf can constrain output to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Bool,
    Int,
    Float,
    String,
}

/// A literal scalar carried by a leaf constraint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    /// The primitive kind this literal belongs to.
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Scalar::Bool(_) => PrimitiveKind::Bool,
            Scalar::Int(_) => PrimitiveKind::Int,
            Scalar::Float(_) => PrimitiveKind::Float,
            Scalar::String(_) => PrimitiveKind::String,
        }
    }
}

/// Restriction on the values a primitive leaf admits.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "constraint", rename_all = "snake_case")]
pub enum Constraint {
    #[default]
    None,
    FixedValue { value: Scalar },
    Range { low: Scalar, high: Scalar },
}

/// A node of the generation schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "schema", rename_all = "snake_case")]
pub enum OutputSchema {
    Primitive {
        kind: PrimitiveKind,
        #[serde(flatten)]
        constraint: Constraint,
    },
    Object {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        fields: Vec<Property>,
    },
    Array {
        element: Box<OutputSchema>,
        #[serde(skip_serializing_if = "Option::is_none")]
        min_elements: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_elements: Option<u64>,
    },
    Union {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        branches: Vec<OutputSchema>,
    },
}

impl OutputSchema {
    /// Unconstrained leaf of the given kind.
    pub fn primitive(kind: PrimitiveKind) -> Self {
        OutputSchema::Primitive {
            kind,
            constraint: Constraint::None,
        }
    }

    /// Leaf pinned to exactly one literal.
    pub fn fixed(value: Scalar) -> Self {
        OutputSchema::Primitive {
            kind: value.kind(),
            constraint: Constraint::FixedValue { value },
        }
    }

    /// Leaf whose range collapses onto one literal.
    pub fn pinned_range(value: Scalar) -> Self {
        OutputSchema::Primitive {
            kind: value.kind(),
            constraint: Constraint::Range {
                low: value.clone(),
                high: value,
            },
        }
    }

    /// Object with no fields, used where nothing better can be built.
    pub fn empty_object(name: impl Into<String>) -> Self {
        OutputSchema::Object {
            name: name.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    /// Short variant label for logs and diagnostics.
    pub fn variant_name(&self) -> &'static str {
        match self {
            OutputSchema::Primitive { .. } => "primitive",
            OutputSchema::Object { .. } => "object",
            OutputSchema::Array { .. } => "array",
            OutputSchema::Union { .. } => "union",
        }
    }

    /// Fields of an object schema; empty for every other variant.
    pub fn fields(&self) -> &[Property] {
        match self {
            OutputSchema::Object { fields, .. } => fields,
            _ => &[],
        }
    }

    /// Look up an object field by name.
    pub fn field(&self, name: &str) -> Option<&Property> {
        self.fields().iter().find(|p| p.name == name)
    }

    /// Branches of a union schema; empty for every other variant.
    pub fn branches(&self) -> &[OutputSchema] {
        match self {
            OutputSchema::Union { branches, .. } => branches,
            _ => &[],
        }
    }
}

/// A named field inside an object schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: OutputSchema,
    pub is_optional: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_kinds() {
        assert_eq!(Scalar::Bool(true).kind(), PrimitiveKind::Bool);
        assert_eq!(Scalar::Int(1).kind(), PrimitiveKind::Int);
        assert_eq!(Scalar::Float(1.5).kind(), PrimitiveKind::Float);
        assert_eq!(Scalar::String("x".into()).kind(), PrimitiveKind::String);
    }

    #[test]
    fn pinned_range_uses_same_bound_twice() {
        let leaf = OutputSchema::pinned_range(Scalar::Int(5));
        assert_eq!(
            leaf,
            OutputSchema::Primitive {
                kind: PrimitiveKind::Int,
                constraint: Constraint::Range {
                    low: Scalar::Int(5),
                    high: Scalar::Int(5),
                },
            }
        );
    }

    #[test]
    fn serializes_primitive_with_flattened_constraint() {
        let leaf = OutputSchema::fixed(Scalar::String("red".into()));
        assert_eq!(
            serde_json::to_value(&leaf).unwrap(),
            json!({
                "schema": "primitive",
                "kind": "string",
                "constraint": "fixed_value",
                "value": "red"
            })
        );
    }

    #[test]
    fn serializes_object_without_empty_description() {
        let obj = OutputSchema::Object {
            name: "args".into(),
            description: None,
            fields: vec![Property {
                name: "count".into(),
                description: Some("how many".into()),
                schema: OutputSchema::primitive(PrimitiveKind::Int),
                is_optional: true,
            }],
        };
        assert_eq!(
            serde_json::to_value(&obj).unwrap(),
            json!({
                "schema": "object",
                "name": "args",
                "fields": [{
                    "name": "count",
                    "description": "how many",
                    "schema": { "schema": "primitive", "kind": "int", "constraint": "none" },
                    "is_optional": true
                }]
            })
        );
    }

    #[test]
    fn accessors_on_non_matching_variants_are_empty() {
        let leaf = OutputSchema::primitive(PrimitiveKind::Bool);
        assert!(leaf.fields().is_empty());
        assert!(leaf.branches().is_empty());
        assert!(leaf.field("x").is_none());
        assert_eq!(leaf.variant_name(), "primitive");
    }
}
