//! Schema building - translates a JSON-Schema-shaped value into a generation schema.
//!
//! Every call to [`convert_with_options`] gets its own [`Builder`]; the set of
//! references being expanded, the generated-name counter and the warnings
//! all live there and die with the call.

use std::collections::HashSet;

use crate::constraints::{apply_constraints, Label};
use crate::diagnostics::{Warning, WarningCode, Warnings};
use crate::resolver::{escape_segment, lookup_ref, navigate_pointer, ref_pointer};
use crate::schema::{OutputSchema, PrimitiveKind, Property};
use crate::types::{ConvertOptions, TypeTag};
use crate::value::Value;

/// Result of converting one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub schema: OutputSchema,
    /// Everything that was dropped or degraded on the way.
    pub warnings: Vec<Warning>,
}

impl Conversion {
    /// True when nothing was dropped or degraded.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Convert a schema with default options.
///
/// Always yields a schema; unusable input degrades to an object with no fields.
pub fn convert(schema: &Value) -> OutputSchema {
    convert_with_options(schema, &ConvertOptions::default()).schema
}

/// Convert a schema, collecting warnings for everything that was degraded.
pub fn convert_with_options(schema: &Value, options: &ConvertOptions) -> Conversion {
    let mut builder = Builder::new(schema, options);
    let root = builder.build_schema(schema, options.root_name.as_deref(), "");
    let schema = match root {
        Some(schema) => schema,
        None => {
            let name = builder.object_name(schema, "");
            OutputSchema::empty_object(name)
        }
    };
    Conversion {
        schema,
        warnings: builder.warnings.into_vec(),
    }
}

/// Where a node is being built; `anyOf` means different things at each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    /// Full union preserved.
    Schema,
    /// Collapsed to the first non-null branch.
    Property,
}

/// How a node declares its type.
enum Shape<'n> {
    Typed(TypeTag),
    TypeList(&'n [Value]),
    AnyOf(&'n [Value]),
    Untyped,
}

fn classify(node: &Value) -> Shape<'_> {
    match node.get("type") {
        Some(Value::String(t)) => {
            if let Some(tag) = TypeTag::parse(t) {
                return Shape::Typed(tag);
            }
        }
        Some(Value::Array(types)) => return Shape::TypeList(types),
        _ => {}
    }
    match node.get("anyOf").and_then(Value::as_array) {
        Some(branches) => Shape::AnyOf(branches),
        None => Shape::Untyped,
    }
}

fn description_of(node: &Value) -> Option<String> {
    node.get("description")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn title_of(node: &Value) -> Option<String> {
    node.get("title").and_then(Value::as_str).map(str::to_string)
}

/// Non-negative integer keyword (`minItems`, `maxItems`).
fn bound_of(node: &Value, key: &str) -> Option<u64> {
    node.get(key)
        .and_then(Value::as_i64)
        .and_then(|n| u64::try_from(n).ok())
}

struct Builder<'a> {
    root: &'a Value,
    options: &'a ConvertOptions,
    in_flight: HashSet<String>,
    warnings: Warnings,
    next_id: usize,
}

impl<'a> Builder<'a> {
    fn new(root: &'a Value, options: &'a ConvertOptions) -> Self {
        Self {
            root,
            options,
            in_flight: HashSet::new(),
            warnings: Warnings::default(),
            next_id: 0,
        }
    }

    fn build_schema(&mut self, node: &Value, name: Option<&str>, path: &str) -> Option<OutputSchema> {
        self.build_node(node, name, true, Level::Schema, path).0
    }

    fn build_property(
        &mut self,
        node: &Value,
        name: &str,
        required: bool,
        path: &str,
    ) -> Option<Property> {
        self.with_resolved(node, path, |b, node| {
            let (schema, required) = b.dispatch(node, Some(name), required, Level::Property, path);
            schema.map(|schema| Property {
                name: name.to_string(),
                description: description_of(node),
                schema,
                is_optional: !required,
            })
        })
    }

    fn build_node(
        &mut self,
        node: &Value,
        name: Option<&str>,
        required: bool,
        level: Level,
        path: &str,
    ) -> (Option<OutputSchema>, bool) {
        self.with_resolved(node, path, |b, node| b.dispatch(node, name, required, level, path))
    }

    /// Follow `$ref` on `node` (if any) and run `f` on the target.
    ///
    /// The pointer stays in flight while `f` runs, so a reference back to it
    /// anywhere below is left unresolved. A `$ref` with sibling keys is only
    /// followed when `merge_ref_siblings` is set.
    fn with_resolved<R>(
        &mut self,
        node: &Value,
        path: &str,
        f: impl FnOnce(&mut Self, &Value) -> R,
    ) -> R {
        let Value::Object(map) = node else {
            return f(self, node);
        };
        let Some(pointer) = ref_pointer(node, self.options.merge_ref_siblings) else {
            if let Some(pointer) = ref_pointer(node, true) {
                self.warnings.push(
                    WarningCode::RefWithSiblings,
                    &format!("{}/$ref", path),
                    format!("reference {} has sibling keys; not followed", pointer),
                );
            }
            return f(self, node);
        };
        match lookup_ref(map, pointer, self.root, path, &self.in_flight, &mut self.warnings) {
            Some(target) => {
                let pointer = pointer.to_string();
                self.in_flight.insert(pointer.clone());
                let out = self.with_resolved(&target, path, f);
                self.in_flight.remove(&pointer);
                out
            }
            None => f(self, node),
        }
    }

    fn dispatch(
        &mut self,
        node: &Value,
        name: Option<&str>,
        required: bool,
        level: Level,
        path: &str,
    ) -> (Option<OutputSchema>, bool) {
        match classify(node) {
            Shape::Typed(tag) => self.build_typed(tag, node, name, required, path),
            Shape::TypeList(types) => self.build_type_list(types, node, name, required, path),
            Shape::AnyOf(branches) => match level {
                Level::Schema => (Some(self.build_union(node, branches, name, path)), required),
                Level::Property => self.collapse_any_of(branches, name, required, path),
            },
            Shape::Untyped => self.build_fallback(node, name, required, path),
        }
    }

    fn build_typed(
        &mut self,
        tag: TypeTag,
        node: &Value,
        name: Option<&str>,
        required: bool,
        path: &str,
    ) -> (Option<OutputSchema>, bool) {
        match tag {
            // A null-only slot constrains nothing
            TypeTag::Null => (None, required),
            TypeTag::Object => (Some(self.build_object(node, path)), required),
            TypeTag::Array => (Some(self.build_array(node, path)), required),
            TypeTag::Boolean | TypeTag::Integer | TypeTag::Number | TypeTag::String => {
                let base = tag.primitive_kind().map(OutputSchema::primitive);
                self.constrain(node, base, name, required, path)
            }
        }
    }

    /// `type: ["string", "null"]` - reduced like a property-level `anyOf`.
    fn build_type_list(
        &mut self,
        types: &[Value],
        node: &Value,
        name: Option<&str>,
        required: bool,
        path: &str,
    ) -> (Option<OutputSchema>, bool) {
        let mut required = required;
        let mut chosen = None;
        for t in types.iter().filter_map(Value::as_str) {
            if t == "null" {
                required = false;
            } else if chosen.is_none() {
                chosen = Some(t);
            }
        }

        match chosen {
            None => (None, required),
            Some(t) => match TypeTag::parse(t) {
                Some(tag) => self.build_typed(tag, node, name, required, path),
                None => self.build_fallback(node, name, required, path),
            },
        }
    }

    fn build_object(&mut self, node: &Value, path: &str) -> OutputSchema {
        let name = self.object_name(node, path);
        let required: Vec<&str> = node
            .get("required")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut fields = Vec::new();
        if let Some(props) = node.get("properties").and_then(Value::as_object) {
            for (prop_name, prop_node) in props {
                let prop_path = format!("{}/properties/{}", path, escape_segment(prop_name));
                let is_required = required.contains(&prop_name.as_str());
                if let Some(property) = self.build_property(prop_node, prop_name, is_required, &prop_path) {
                    fields.push(property);
                }
            }
        }

        OutputSchema::Object {
            name,
            description: description_of(node),
            fields,
        }
    }

    fn build_array(&mut self, node: &Value, path: &str) -> OutputSchema {
        let items_path = format!("{}/items", path);
        let empty = Value::Object(Default::default());
        let items = node.get("items").unwrap_or(&empty);
        let element = match self.build_schema(items, None, &items_path) {
            Some(element) => element,
            None => OutputSchema::empty_object(self.fresh_name()),
        };

        let mut min_elements = bound_of(node, "minItems");
        let mut max_elements = bound_of(node, "maxItems");
        if let (Some(min), Some(max)) = (min_elements, max_elements) {
            if min > max {
                self.warnings.push(
                    WarningCode::InvertedBounds,
                    path,
                    format!("minItems {} exceeds maxItems {}; bounds swapped", min, max),
                );
                min_elements = Some(max);
                max_elements = Some(min);
            }
        }

        OutputSchema::Array {
            element: Box::new(element),
            min_elements,
            max_elements,
        }
    }

    fn build_union(
        &mut self,
        node: &Value,
        branches: &[Value],
        name: Option<&str>,
        path: &str,
    ) -> OutputSchema {
        let name = self.union_name(node, name);
        let mut built = Vec::with_capacity(branches.len());
        for (i, branch) in branches.iter().enumerate() {
            let branch_path = format!("{}/anyOf/{}", path, i);
            if let Some(schema) = self.build_schema(branch, None, &branch_path) {
                built.push(schema);
            }
        }

        if built.is_empty() {
            self.warnings.push(
                WarningCode::EmptyUnion,
                &format!("{}/anyOf", path),
                "anyOf has no usable branches; union is empty",
            );
        }

        OutputSchema::Union {
            name,
            description: description_of(node),
            branches: built,
        }
    }

    /// Property-level `anyOf`: a `null` branch makes the field optional, and
    /// the first non-null branch stands in for the whole union.
    fn collapse_any_of(
        &mut self,
        branches: &[Value],
        name: Option<&str>,
        required: bool,
        path: &str,
    ) -> (Option<OutputSchema>, bool) {
        let mut required = required;
        let mut chosen = None;
        let mut discarded = 0;
        for (i, branch) in branches.iter().enumerate() {
            if self.peek_type(branch) == Some("null") {
                required = false;
            } else if chosen.is_none() {
                chosen = Some(i);
            } else {
                discarded += 1;
            }
        }

        let Some(i) = chosen else {
            return (None, required);
        };
        if discarded > 0 {
            self.warnings.push(
                WarningCode::CollapsedAnyOf,
                &format!("{}/anyOf", path),
                format!("kept branch {}, discarded {} other non-null branch(es)", i, discarded),
            );
        }

        let branch_path = format!("{}/anyOf/{}", path, i);
        self.build_node(&branches[i], name, required, Level::Property, &branch_path)
    }

    /// No usable `type`: try `enum`, then `const`, else an object.
    fn build_fallback(
        &mut self,
        node: &Value,
        name: Option<&str>,
        required: bool,
        path: &str,
    ) -> (Option<OutputSchema>, bool) {
        if node.get("enum").is_some() || node.get("const").is_some() {
            return self.constrain(node, None, name, required, path);
        }
        (Some(self.build_object(node, path)), required)
    }

    fn constrain(
        &mut self,
        node: &Value,
        base: Option<OutputSchema>,
        name: Option<&str>,
        required: bool,
        path: &str,
    ) -> (Option<OutputSchema>, bool) {
        // Only an enum needs a union name; don't burn a generated id otherwise
        let union_name = if node.get("enum").is_some() {
            self.union_name(node, name)
        } else {
            String::new()
        };
        let description = description_of(node);
        let label = Label {
            name: &union_name,
            description: description.as_deref(),
        };
        apply_constraints(node, base, required, label, path, &mut self.warnings)
    }

    /// Declared `type` of a node, looking through `$ref` without expanding it.
    fn peek_type<'v>(&self, node: &'v Value) -> Option<&'v str>
    where
        'a: 'v,
    {
        let mut current = node;
        let mut seen = HashSet::new();
        loop {
            if let Some(t) = current.get("type").and_then(Value::as_str) {
                return Some(t);
            }
            let pointer = ref_pointer(current, self.options.merge_ref_siblings)?;
            if self.in_flight.contains(pointer) || !seen.insert(pointer) {
                return None;
            }
            current = navigate_pointer(self.root, pointer)?;
        }
    }

    fn object_name(&mut self, node: &Value, path: &str) -> String {
        if let Some(title) = title_of(node) {
            return title;
        }
        if path.is_empty() {
            if let Some(root_name) = &self.options.root_name {
                return root_name.clone();
            }
        }
        self.fresh_name()
    }

    fn union_name(&mut self, node: &Value, name: Option<&str>) -> String {
        match name.map(str::to_string).or_else(|| title_of(node)) {
            Some(name) => name,
            None => self.fresh_name(),
        }
    }

    fn fresh_name(&mut self) -> String {
        self.next_id += 1;
        format!("{}_{}", self.options.name_prefix, self.next_id)
    }
}
