//! Warnings raised while converting a schema.
//!
//! Conversion never fails; anything it has to drop or degrade is reported
//! here so callers can surface it instead of losing it silently.

use std::fmt;

use serde::Serialize;

/// Kind of degradation that happened during conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WarningCode {
    /// `$ref` pointed back into a reference that was still being expanded.
    #[serde(rename = "W001")]
    CyclicRef,
    /// `$ref` path segment does not exist in the document.
    #[serde(rename = "W002")]
    DanglingRef,
    /// `$ref` is not a local `#...` pointer.
    #[serde(rename = "W003")]
    NonLocalRef,
    /// `const` value has no generation-schema equivalent.
    #[serde(rename = "W004")]
    UnsupportedConst,
    /// `enum` or `anyOf` produced a union with no branches.
    #[serde(rename = "W005")]
    EmptyUnion,
    /// Property-level `anyOf` kept only its first non-null branch.
    #[serde(rename = "W006")]
    CollapsedAnyOf,
    /// `enum` member has no generation-schema equivalent.
    #[serde(rename = "W007")]
    UnsupportedEnumMember,
    /// `minItems` was greater than `maxItems`; the bounds were swapped.
    #[serde(rename = "W008")]
    InvertedBounds,
    /// `$ref` object carries sibling keys and was not followed.
    #[serde(rename = "W009")]
    RefWithSiblings,
}

impl WarningCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningCode::CyclicRef => "W001",
            WarningCode::DanglingRef => "W002",
            WarningCode::NonLocalRef => "W003",
            WarningCode::UnsupportedConst => "W004",
            WarningCode::EmptyUnion => "W005",
            WarningCode::CollapsedAnyOf => "W006",
            WarningCode::UnsupportedEnumMember => "W007",
            WarningCode::InvertedBounds => "W008",
            WarningCode::RefWithSiblings => "W009",
        }
    }
}

/// A single warning with its location in the input schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub code: WarningCode,
    /// JSON path to the offending node (e.g., "/properties/parent/$ref")
    pub path: String,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "[{}] {}: {}", self.code.as_str(), path, self.message)
    }
}

/// Collects warnings for one conversion call and mirrors them to `tracing`.
#[derive(Debug, Default)]
pub(crate) struct Warnings {
    items: Vec<Warning>,
}

impl Warnings {
    pub(crate) fn push(&mut self, code: WarningCode, path: &str, message: impl Into<String>) {
        let warning = Warning {
            code,
            path: path.to_string(),
            message: message.into(),
        };
        tracing::warn!(code = code.as_str(), path = %warning.path, "{}", warning.message);
        self.items.push(warning);
    }

    pub(crate) fn into_vec(self) -> Vec<Warning> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_path() {
        let w = Warning {
            code: WarningCode::DanglingRef,
            path: "/properties/owner".into(),
            message: "reference #/$defs/user not found".into(),
        };
        assert_eq!(
            w.to_string(),
            "[W002] /properties/owner: reference #/$defs/user not found"
        );
    }

    #[test]
    fn display_root_path() {
        let w = Warning {
            code: WarningCode::EmptyUnion,
            path: String::new(),
            message: "enum has no members".into(),
        };
        assert_eq!(w.to_string(), "[W005] /: enum has no members");
    }

    #[test]
    fn codes_serialize_as_short_ids() {
        assert_eq!(
            serde_json::to_value(WarningCode::CyclicRef).unwrap(),
            serde_json::json!("W001")
        );
    }

    #[test]
    fn collector_keeps_order() {
        let mut warnings = Warnings::default();
        warnings.push(WarningCode::CyclicRef, "/a", "first");
        warnings.push(WarningCode::NonLocalRef, "/b", "second");
        let items = warnings.into_vec();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].code, WarningCode::CyclicRef);
        assert_eq!(items[1].path, "/b");
    }
}
