//! Core types for schema conversion.

use crate::schema::PrimitiveKind;

/// Prefix for generated object names when none is configured.
pub const DEFAULT_NAME_PREFIX: &str = "object";

/// JSON Schema `type` tags the converter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl TypeTag {
    /// Parse a `type` string.
    ///
    /// Returns `None` for unknown values (caller falls back).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "null" => Some(TypeTag::Null),
            "boolean" => Some(TypeTag::Boolean),
            "integer" => Some(TypeTag::Integer),
            "number" => Some(TypeTag::Number),
            "string" => Some(TypeTag::String),
            "array" => Some(TypeTag::Array),
            "object" => Some(TypeTag::Object),
            _ => None,
        }
    }

    /// Primitive kind for scalar tags.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            TypeTag::Boolean => Some(PrimitiveKind::Bool),
            TypeTag::Integer => Some(PrimitiveKind::Int),
            TypeTag::Number => Some(PrimitiveKind::Float),
            TypeTag::String => Some(PrimitiveKind::String),
            TypeTag::Null | TypeTag::Array | TypeTag::Object => None,
        }
    }
}

/// Options for schema conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Name for the root object when it has no `title`.
    pub root_name: Option<String>,
    /// Prefix for generated object names (`<prefix>_<n>`).
    pub name_prefix: String,
    /// Follow `$ref` objects that carry other keys, merging those keys over
    /// the target. Off by default: only `{"$ref": ...}` alone is followed.
    pub merge_ref_siblings: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            root_name: None,
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            merge_ref_siblings: false,
        }
    }
}

impl ConvertOptions {
    /// Create options with generated names only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name the root object (used only when the root has no `title`).
    pub fn root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = Some(name.into());
        self
    }

    /// Set the prefix for generated object names.
    ///
    /// An empty prefix keeps the default.
    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if !prefix.is_empty() {
            self.name_prefix = prefix;
        }
        self
    }

    /// Follow `$ref` objects with sibling keys (siblings win on merge).
    pub fn merge_ref_siblings(mut self, merge: bool) -> Self {
        self.merge_ref_siblings = merge;
        self
    }
}
