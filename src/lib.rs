//! Generation Schema Converter
//!
//! Converts the JSON-Schema-shaped `inputSchema` of a remote tool into a
//! generation schema: a closed tree of primitive leaves, objects, arrays and
//! unions that a constrained decoder uses to keep a model's output valid.
//!
//! # Example
//!
//! ```
//! use gen_schema::{convert, OutputSchema, PrimitiveKind, Value};
//! use serde_json::json;
//!
//! let schema = Value::from(json!({
//!     "type": "object",
//!     "required": ["city"],
//!     "properties": {
//!         "city": { "type": "string" },
//!         "units": { "enum": ["metric", "imperial", null] }
//!     }
//! }));
//!
//! let converted = convert(&schema);
//!
//! let city = converted.field("city").unwrap();
//! assert_eq!(city.schema, OutputSchema::primitive(PrimitiveKind::String));
//! assert!(!city.is_optional);
//!
//! // A null enum member makes the field optional and adds no branch
//! let units = converted.field("units").unwrap();
//! assert!(units.is_optional);
//! assert_eq!(units.schema.branches().len(), 2);
//! ```
//!
//! # Keyword mapping
//!
//! | Keyword | Result |
//! |---------|--------|
//! | `type: boolean/integer/number/string` | Primitive leaf |
//! | `type: object` | Object with one field per property |
//! | `type: array` | Array with `minItems`/`maxItems` bounds |
//! | `anyOf` on a schema | Union of every branch |
//! | `anyOf` on a property | First non-null branch; a `null` branch makes it optional |
//! | `enum` | Union of fixed-value leaves |
//! | `const` | Leaf with a single-value range |
//! | `$ref` (`#/...` only, no sibling keys) | Target substituted in place |
//!
//! Conversion never fails. Anything dropped or degraded on the way (cyclic
//! or dangling references, unsupported `const` values, collapsed unions) is
//! reported as a [`Warning`] by [`convert_with_options`].

mod builder;
mod constraints;
mod diagnostics;
mod error;
mod loader;
mod resolver;
mod schema;
mod tool;
mod types;
mod value;

pub use builder::{convert, convert_with_options, Conversion};
pub use diagnostics::{Warning, WarningCode};
pub use error::LoadError;
pub use loader::{
    is_url, load_schema, load_schema_auto, load_schema_str, load_tools, parse_tool_listing,
    ListingSource,
};
pub use resolver::{navigate_pointer, resolve_refs, resolve_refs_with_warnings};
pub use schema::{Constraint, OutputSchema, PrimitiveKind, Property, Scalar};
pub use tool::{convert_tools, find_tool, GenerationTool, ToolDescriptor, ToolSource};
pub use types::{ConvertOptions, TypeTag, DEFAULT_NAME_PREFIX};
pub use value::Value;

#[cfg(feature = "remote")]
pub use loader::load_schema_url;
