//! Loading schemas and tool listings from files, strings, and HTTP URLs.

use std::path::Path;

use crate::error::LoadError;
use crate::tool::{ToolDescriptor, ToolSource};
use crate::value::Value;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load a schema from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::InvalidJson` if the file isn't valid JSON.
pub fn load_schema(path: &Path) -> Result<Value, LoadError> {
    load_json(path).map(Value::from)
}

/// Load a schema from a JSON string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` if the string isn't valid JSON.
pub fn load_schema_str(content: &str) -> Result<Value, LoadError> {
    parse_json(content).map(Value::from)
}

/// Load a schema from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
#[cfg(feature = "remote")]
pub fn load_schema_url(url: &str) -> Result<Value, LoadError> {
    fetch_json(url).map(Value::from)
}

/// Load a schema from a file path or URL.
///
/// URL loading requires the `remote` feature.
pub fn load_schema_auto(source: &str) -> Result<Value, LoadError> {
    load_json_auto(source).map(Value::from)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Parse a tool listing.
///
/// Accepts a bare array of descriptors, a `{"tools": [...]}` object, or a
/// JSON-RPC response whose `result` holds the `tools` array.
pub fn parse_tool_listing(listing: serde_json::Value) -> Result<Vec<ToolDescriptor>, LoadError> {
    let tools = match listing {
        serde_json::Value::Array(tools) => serde_json::Value::Array(tools),
        serde_json::Value::Object(mut map) => {
            let tools = match map.remove("result") {
                Some(serde_json::Value::Object(mut result)) => result.remove("tools"),
                _ => map.remove("tools"),
            };
            tools.ok_or_else(|| LoadError::InvalidToolListing {
                message: "missing \"tools\" array".to_string(),
            })?
        }
        other => {
            return Err(LoadError::InvalidToolListing {
                message: format!("expected array or object, got {}", json_type_name(&other)),
            })
        }
    };

    serde_json::from_value(tools).map_err(|e| LoadError::InvalidToolListing {
        message: e.to_string(),
    })
}

/// Load a tool listing from a file path or URL.
pub fn load_tools(source: &str) -> Result<Vec<ToolDescriptor>, LoadError> {
    parse_tool_listing(load_json_auto(source)?)
}

/// A saved `tools/list` response (file or URL) used as a tool source.
#[derive(Debug, Clone)]
pub struct ListingSource {
    source: String,
}

impl ListingSource {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl ToolSource for ListingSource {
    fn list_tools(&self) -> Result<Vec<ToolDescriptor>, LoadError> {
        load_tools(&self.source)
    }
}

// --- Internal implementation ---

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn parse_json(content: &str) -> Result<serde_json::Value, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
}

fn load_json(path: &Path) -> Result<serde_json::Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "loaded file");
    parse_json(&content)
}

#[cfg(feature = "remote")]
fn fetch_json(url: &str) -> Result<serde_json::Value, LoadError> {
    let network_error = |source: reqwest::Error| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network_error)?;

    // Check for HTTP errors before parsing
    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(network_error)?;

    tracing::debug!(url, status = %response.status(), "fetched");
    response.json().map_err(network_error)
}

fn load_json_auto(source: &str) -> Result<serde_json::Value, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            fetch_json(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_json(Path::new(source))
    }
}
