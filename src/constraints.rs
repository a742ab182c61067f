//! `enum` / `const` extraction.
//!
//! Both keywords override whatever primitive type a node declares: the
//! literal values decide the leaf kinds.

use crate::diagnostics::{WarningCode, Warnings};
use crate::schema::{OutputSchema, PrimitiveKind, Scalar};
use crate::value::Value;

/// Name and description given to unions built from `enum`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Label<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
}

/// Apply `enum` or `const` found on `node` to an already-built base schema.
///
/// Returns the schema to use (possibly `None` when neither the base nor the
/// constraint yields one) and the possibly downgraded required flag.
pub(crate) fn apply_constraints(
    node: &Value,
    base: Option<OutputSchema>,
    is_required: bool,
    label: Label<'_>,
    path: &str,
    warnings: &mut Warnings,
) -> (Option<OutputSchema>, bool) {
    if let Some(members) = node.get("enum") {
        let enum_path = format!("{}/enum", path);
        let (schema, has_null) = enum_schema(members, label, &enum_path, warnings);
        return (Some(schema), is_required && !has_null);
    }

    if let Some(value) = node.get("const") {
        let const_path = format!("{}/const", path);
        let base_kind = match &base {
            Some(OutputSchema::Primitive { kind, .. }) => Some(*kind),
            _ => None,
        };
        return match const_schema(value, base_kind, &const_path, warnings) {
            Some(schema) => (Some(schema), is_required),
            None => (base, is_required),
        };
    }

    (base, is_required)
}

/// Build the union for an `enum` keyword.
///
/// All-string members become a flat union of string constants. Mixed members
/// become one nested union for the strings (if any) followed by a fixed leaf
/// per non-string scalar. A `null` member adds no branch; it is reported back
/// so the caller can make the field optional.
pub(crate) fn enum_schema(
    members: &Value,
    label: Label<'_>,
    path: &str,
    warnings: &mut Warnings,
) -> (OutputSchema, bool) {
    let members = members.as_array().unwrap_or_default();
    let mut strings = Vec::new();
    let mut others = Vec::new();
    let mut has_null = false;

    for (i, member) in members.iter().enumerate() {
        match member {
            Value::Null => has_null = true,
            Value::String(s) => strings.push(OutputSchema::fixed(Scalar::String(s.clone()))),
            Value::Bool(b) => others.push(OutputSchema::fixed(Scalar::Bool(*b))),
            Value::Int(n) => others.push(OutputSchema::fixed(Scalar::Int(*n))),
            Value::Float(f) => others.push(OutputSchema::fixed(Scalar::Float(*f))),
            other => warnings.push(
                WarningCode::UnsupportedEnumMember,
                &format!("{}/{}", path, i),
                format!("enum member of type {} dropped", other.type_name()),
            ),
        }
    }

    let branches = if others.is_empty() {
        strings
    } else {
        let mut branches = Vec::with_capacity(others.len() + 1);
        if !strings.is_empty() {
            branches.push(OutputSchema::Union {
                name: label.name.to_string(),
                description: None,
                branches: strings,
            });
        }
        branches.extend(others);
        branches
    };

    if branches.is_empty() {
        warnings.push(
            WarningCode::EmptyUnion,
            path,
            "enum has no usable members; union is empty",
        );
    }

    let schema = OutputSchema::Union {
        name: label.name.to_string(),
        description: label.description.map(str::to_string),
        branches,
    };
    (schema, has_null)
}

/// Build the leaf for a `const` keyword, or `None` if the shape is unsupported.
pub(crate) fn const_schema(
    value: &Value,
    base_kind: Option<PrimitiveKind>,
    path: &str,
    warnings: &mut Warnings,
) -> Option<OutputSchema> {
    match value {
        Value::Int(n) if base_kind == Some(PrimitiveKind::Float) => {
            Some(OutputSchema::pinned_range(Scalar::Float(*n as f64)))
        }
        Value::Int(n) => Some(OutputSchema::pinned_range(Scalar::Int(*n))),
        Value::Float(f) => Some(OutputSchema::pinned_range(Scalar::Float(*f))),
        Value::String(s) => Some(OutputSchema::pinned_range(Scalar::String(s.clone()))),
        Value::Bool(b) => Some(OutputSchema::fixed(Scalar::Bool(*b))),
        other => {
            warnings.push(
                WarningCode::UnsupportedConst,
                path,
                format!("const of type {} is not supported; dropped", other.type_name()),
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Constraint;
    use serde_json::json;

    const LABEL: Label<'static> = Label {
        name: "color",
        description: None,
    };

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    fn string_const(s: &str) -> OutputSchema {
        OutputSchema::fixed(Scalar::String(s.to_string()))
    }

    #[test]
    fn string_enum_is_flat_union_in_order() {
        let mut warnings = Warnings::default();
        let (schema, has_null) =
            enum_schema(&v(json!(["red", "amber", "green", "red"])), LABEL, "/enum", &mut warnings);
        assert!(!has_null);
        assert_eq!(
            schema.branches(),
            &[
                string_const("red"),
                string_const("amber"),
                string_const("green"),
                string_const("red"),
            ]
        );
        assert!(warnings.into_vec().is_empty());
    }

    #[test]
    fn null_member_adds_no_branch() {
        let mut warnings = Warnings::default();
        let (schema, has_null) =
            enum_schema(&v(json!(["red", "amber", null])), LABEL, "/enum", &mut warnings);
        assert!(has_null);
        assert_eq!(schema.branches().len(), 2);
    }

    #[test]
    fn mixed_enum_nests_strings_then_fixed_leaves() {
        let mut warnings = Warnings::default();
        let (schema, _) = enum_schema(&v(json!(["a", 1, "b", true, 2.5])), LABEL, "/enum", &mut warnings);
        let branches = schema.branches();
        assert_eq!(branches.len(), 4);
        assert_eq!(branches[0].branches(), &[string_const("a"), string_const("b")]);
        assert_eq!(branches[1], OutputSchema::fixed(Scalar::Int(1)));
        assert_eq!(branches[2], OutputSchema::fixed(Scalar::Bool(true)));
        assert_eq!(branches[3], OutputSchema::fixed(Scalar::Float(2.5)));
    }

    #[test]
    fn mixed_enum_without_strings_has_no_nested_union() {
        let mut warnings = Warnings::default();
        let (schema, _) = enum_schema(&v(json!([1, 2])), LABEL, "/enum", &mut warnings);
        assert_eq!(
            schema.branches(),
            &[OutputSchema::fixed(Scalar::Int(1)), OutputSchema::fixed(Scalar::Int(2))]
        );
    }

    #[test]
    fn empty_enum_is_empty_union_with_warning() {
        let mut warnings = Warnings::default();
        let (schema, _) = enum_schema(&v(json!([])), LABEL, "/enum", &mut warnings);
        assert!(matches!(schema, OutputSchema::Union { ref branches, .. } if branches.is_empty()));
        assert_eq!(warnings.into_vec()[0].code, WarningCode::EmptyUnion);
    }

    #[test]
    fn non_array_enum_is_treated_as_empty() {
        let mut warnings = Warnings::default();
        let (schema, _) = enum_schema(&v(json!("red")), LABEL, "/enum", &mut warnings);
        assert!(schema.branches().is_empty());
    }

    #[test]
    fn object_enum_member_dropped_with_warning() {
        let mut warnings = Warnings::default();
        let (schema, _) = enum_schema(&v(json!(["a", {"x": 1}])), LABEL, "/enum", &mut warnings);
        assert_eq!(schema.branches(), &[string_const("a")]);
        let items = warnings.into_vec();
        assert_eq!(items[0].code, WarningCode::UnsupportedEnumMember);
        assert_eq!(items[0].path, "/enum/1");
    }

    #[test]
    fn const_integer_is_pinned_range() {
        let mut warnings = Warnings::default();
        let schema = const_schema(&Value::Int(5), Some(PrimitiveKind::Int), "/const", &mut warnings);
        assert_eq!(
            schema,
            Some(OutputSchema::Primitive {
                kind: PrimitiveKind::Int,
                constraint: Constraint::Range {
                    low: Scalar::Int(5),
                    high: Scalar::Int(5),
                },
            })
        );
    }

    #[test]
    fn const_integer_widens_for_number() {
        let mut warnings = Warnings::default();
        let schema = const_schema(&Value::Int(2), Some(PrimitiveKind::Float), "/const", &mut warnings);
        assert_eq!(schema, Some(OutputSchema::pinned_range(Scalar::Float(2.0))));
    }

    #[test]
    fn const_string_and_bool() {
        let mut warnings = Warnings::default();
        assert_eq!(
            const_schema(&Value::from("v1"), None, "/const", &mut warnings),
            Some(OutputSchema::pinned_range(Scalar::String("v1".into())))
        );
        assert_eq!(
            const_schema(&Value::Bool(true), None, "/const", &mut warnings),
            Some(OutputSchema::fixed(Scalar::Bool(true)))
        );
    }

    #[test]
    fn const_array_dropped_falls_back_to_base() {
        let mut warnings = Warnings::default();
        let node = v(json!({ "type": "string", "const": ["a"] }));
        let base = OutputSchema::primitive(PrimitiveKind::String);
        let (schema, required) =
            apply_constraints(&node, Some(base.clone()), true, LABEL, "", &mut warnings);
        assert_eq!(schema, Some(base));
        assert!(required);
        assert_eq!(warnings.into_vec()[0].code, WarningCode::UnsupportedConst);
    }

    #[test]
    fn const_object_without_base_yields_nothing() {
        let mut warnings = Warnings::default();
        let node = v(json!({ "const": { "a": 1 } }));
        let (schema, _) = apply_constraints(&node, None, true, LABEL, "", &mut warnings);
        assert_eq!(schema, None);
    }

    #[test]
    fn enum_takes_precedence_over_const() {
        let mut warnings = Warnings::default();
        let node = v(json!({ "enum": ["x"], "const": "y" }));
        let (schema, _) = apply_constraints(&node, None, true, LABEL, "", &mut warnings);
        assert_eq!(schema.unwrap().branches(), &[string_const("x")]);
    }

    #[test]
    fn nullable_enum_downgrades_required() {
        let mut warnings = Warnings::default();
        let node = v(json!({ "type": "string", "enum": ["a", null] }));
        let base = OutputSchema::primitive(PrimitiveKind::String);
        let (_, required) = apply_constraints(&node, Some(base), true, LABEL, "", &mut warnings);
        assert!(!required);
    }

    #[test]
    fn no_constraint_passes_base_through() {
        let mut warnings = Warnings::default();
        let node = v(json!({ "type": "integer" }));
        let base = OutputSchema::primitive(PrimitiveKind::Int);
        let (schema, required) =
            apply_constraints(&node, Some(base.clone()), false, LABEL, "", &mut warnings);
        assert_eq!(schema, Some(base));
        assert!(!required);
    }
}
