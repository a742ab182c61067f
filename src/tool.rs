//! Tool descriptors in, generation tools out.
//!
//! A remote tool listing supplies `{name, description, inputSchema}` per tool;
//! the input schema is converted into the parameter schema a constrained
//! decoder uses when generating that tool's arguments.

use serde::{Deserialize, Serialize};

use crate::builder::convert_with_options;
use crate::diagnostics::Warning;
use crate::error::LoadError;
use crate::schema::OutputSchema;
use crate::types::ConvertOptions;
use crate::value::Value;

/// One entry of a `tools/list` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "empty_schema")]
    pub input_schema: Value,
}

fn empty_schema() -> Value {
    Value::Object(Default::default())
}

/// Anything that can list remote tools (a server connection, a saved listing).
pub trait ToolSource {
    fn list_tools(&self) -> Result<Vec<ToolDescriptor>, LoadError>;
}

/// A tool ready to be offered to the generation engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationTool {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: OutputSchema,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl GenerationTool {
    /// Convert a descriptor's input schema.
    ///
    /// The tool name names the root object unless the schema has a `title`
    /// or `options` already sets a root name.
    pub fn from_descriptor(descriptor: &ToolDescriptor, options: &ConvertOptions) -> Self {
        let options = match options.root_name {
            Some(_) => options.clone(),
            None => options.clone().root_name(descriptor.name.clone()),
        };
        let conversion = convert_with_options(&descriptor.input_schema, &options);
        tracing::debug!(
            tool = %descriptor.name,
            fields = conversion.schema.fields().len(),
            warnings = conversion.warnings.len(),
            "converted tool input schema"
        );
        Self {
            name: descriptor.name.clone(),
            description: descriptor.description.clone(),
            parameters: conversion.schema,
            warnings: conversion.warnings,
        }
    }
}

/// Convert every tool a source lists, keeping listing order.
pub fn convert_tools(
    source: &dyn ToolSource,
    options: &ConvertOptions,
) -> Result<Vec<GenerationTool>, LoadError> {
    let descriptors = source.list_tools()?;
    Ok(descriptors
        .iter()
        .map(|d| GenerationTool::from_descriptor(d, options))
        .collect())
}

/// Pick one descriptor by name.
pub fn find_tool<'t>(
    descriptors: &'t [ToolDescriptor],
    name: &str,
) -> Result<&'t ToolDescriptor, LoadError> {
    descriptors
        .iter()
        .find(|d| d.name == name)
        .ok_or_else(|| LoadError::UnknownTool {
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PrimitiveKind;
    use serde_json::json;

    struct Fixed(Vec<ToolDescriptor>);

    impl ToolSource for Fixed {
        fn list_tools(&self) -> Result<Vec<ToolDescriptor>, LoadError> {
            Ok(self.0.clone())
        }
    }

    fn descriptor(json: serde_json::Value) -> ToolDescriptor {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn descriptor_deserializes_camel_case() {
        let d = descriptor(json!({
            "name": "search",
            "description": "Search the web",
            "inputSchema": { "type": "object", "properties": { "q": { "type": "string" } } }
        }));
        assert_eq!(d.name, "search");
        assert_eq!(d.description.as_deref(), Some("Search the web"));
        assert!(d.input_schema.get("properties").is_some());
    }

    #[test]
    fn descriptor_defaults() {
        let d = descriptor(json!({ "name": "ping" }));
        assert_eq!(d.description, None);
        assert_eq!(d.input_schema, empty_schema());
    }

    #[test]
    fn tool_name_names_untitled_root() {
        let d = descriptor(json!({
            "name": "get_weather",
            "inputSchema": {
                "type": "object",
                "required": ["city"],
                "properties": { "city": { "type": "string" } }
            }
        }));
        let tool = GenerationTool::from_descriptor(&d, &ConvertOptions::default());
        assert!(matches!(&tool.parameters, OutputSchema::Object { name, .. } if name == "get_weather"));
        let city = tool.parameters.field("city").unwrap();
        assert_eq!(city.schema, OutputSchema::primitive(PrimitiveKind::String));
        assert!(!city.is_optional);
        assert!(tool.warnings.is_empty());
    }

    #[test]
    fn explicit_root_name_wins_over_tool_name() {
        let d = descriptor(json!({ "name": "get_weather", "inputSchema": { "type": "object" } }));
        let tool = GenerationTool::from_descriptor(&d, &ConvertOptions::new().root_name("Args"));
        assert!(matches!(&tool.parameters, OutputSchema::Object { name, .. } if name == "Args"));
    }

    #[test]
    fn convert_tools_keeps_order_and_warnings() {
        let source = Fixed(vec![
            descriptor(json!({ "name": "a", "inputSchema": { "type": "object" } })),
            descriptor(json!({
                "name": "b",
                "inputSchema": { "type": "object", "properties": { "x": { "$ref": "#/nope" } } }
            })),
        ]);
        let tools = convert_tools(&source, &ConvertOptions::default()).unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "a");
        assert!(tools[0].warnings.is_empty());
        assert_eq!(tools[1].warnings.len(), 1);
    }

    #[test]
    fn find_tool_by_name() {
        let tools = vec![descriptor(json!({ "name": "a" })), descriptor(json!({ "name": "b" }))];
        assert_eq!(find_tool(&tools, "b").unwrap().name, "b");
        assert!(matches!(
            find_tool(&tools, "c"),
            Err(LoadError::UnknownTool { name }) if name == "c"
        ));
    }
}
