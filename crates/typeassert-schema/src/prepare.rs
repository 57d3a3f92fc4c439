//! # Data Preparation
//!
//! Walks a schema and a data value side by side and rewrites the data in
//! place before it is matched:
//!
//! - `useDefaults` fills declared properties and trailing tuple items from
//!   their `default` keyword.
//! - `coerceTypes` converts values toward their `type` keyword (see
//!   [`crate::coerce`]).
//! - `removeAdditional` strips properties not covered by `properties` or
//!   `patternProperties`.
//!
//! The walk follows local `$ref`s (`#` and `#/json/pointer`), `allOf`,
//! `properties`, `patternProperties`, `additionalProperties`,
//! `prefixItems`/`items` and `additionalItems`. Branching keywords
//! (`anyOf`, `oneOf`, `if`/`then`/`else`) are not entered: which branch
//! applies is only known after matching.

use std::collections::HashMap;

use jsonschema::Validator;
use serde_json::{Map, Value};
use typeassert_core::{CoerceTypes, RemoveAdditional, UseDefaults};

use crate::coerce;

/// Ref hops plus nesting levels after which the walk stops. Reached only by
/// `$ref` cycles that never descend into the data.
const MAX_DEPTH: usize = 512;

/// Keywords whose values are data, not subschemas.
const DATA_KEYWORDS: &[&str] = &["default", "const", "enum", "examples"];

/// Keywords whose values map names to subschemas. Their keys are names, so
/// a property called `default` is still a schema.
const SCHEMA_MAP_KEYWORDS: &[&str] = &[
    "properties",
    "patternProperties",
    "definitions",
    "$defs",
    "dependentSchemas",
    "dependencies",
];

/// Borrowed view over everything one preparation pass needs.
pub struct Preparer<'a> {
    pub(crate) root: &'a Value,
    pub(crate) remove_additional: RemoveAdditional,
    pub(crate) use_defaults: UseDefaults,
    pub(crate) coerce_types: CoerceTypes,
    /// `patternProperties` keys, each compiled as a `{"pattern": key}`
    /// validator so keys match exactly as the engine matches them.
    pub(crate) patterns: &'a HashMap<String, Validator>,
    /// Validators for `additionalProperties` subschemas, keyed by the JSON
    /// Pointer of the schema object that declares them.
    pub(crate) additional_checks: &'a HashMap<String, Validator>,
}

impl Preparer<'_> {
    /// Rewrite `data` according to the root schema.
    pub fn prepare(&self, data: &mut Value) {
        self.visit(self.root, "", data, 0);
    }

    fn visit(&self, schema: &Value, ptr: &str, data: &mut Value, depth: usize) {
        if depth > MAX_DEPTH {
            tracing::warn!(schema_path = %ptr, "schema nesting too deep; preparation stopped");
            return;
        }
        let Some(node) = schema.as_object() else {
            return;
        };

        if let Some(Value::String(reference)) = node.get("$ref") {
            if let Some((target, target_ptr)) = self.resolve(reference) {
                self.visit(target, &target_ptr, data, depth + 1);
            }
        }
        if let Some(Value::Array(parts)) = node.get("allOf") {
            for (i, part) in parts.iter().enumerate() {
                self.visit(part, &format!("{ptr}/allOf/{i}"), data, depth + 1);
            }
        }
        if let Some(types) = node.get("type") {
            coerce::coerce(data, types, self.coerce_types);
        }

        match data {
            Value::Object(map) => self.visit_object(node, ptr, map, depth),
            Value::Array(items) => self.visit_array(node, ptr, items, depth),
            _ => {}
        }
    }

    fn visit_object(
        &self,
        node: &Map<String, Value>,
        ptr: &str,
        map: &mut Map<String, Value>,
        depth: usize,
    ) {
        let properties = node.get("properties").and_then(Value::as_object);
        let pattern_properties = node.get("patternProperties").and_then(Value::as_object);
        let additional = node.get("additionalProperties");

        if let Some(properties) = properties {
            if self.use_defaults.is_enabled() {
                for (name, sub) in properties {
                    if let Some(default) = sub.get("default") {
                        if self.use_defaults.should_fill(map.get(name)) {
                            map.insert(name.clone(), default.clone());
                        }
                    }
                }
            }
            for (name, sub) in properties {
                if let Some(child) = map.get_mut(name) {
                    let child_ptr = format!("{ptr}/properties/{}", escape_token(name));
                    self.visit(sub, &child_ptr, child, depth + 1);
                }
            }
        }

        let mut strip = Vec::new();
        for (key, child) in map.iter_mut() {
            if properties.is_some_and(|p| p.contains_key(key)) {
                continue;
            }
            let mut matched = false;
            if let Some(pattern_properties) = pattern_properties {
                let name = Value::String(key.clone());
                for (pattern, sub) in pattern_properties {
                    let Some(check) = self.patterns.get(pattern) else {
                        // Without a compiled pattern the key cannot be
                        // classified; leave it untouched.
                        tracing::warn!(schema_path = %ptr, %pattern, "pattern not compiled; keeping property");
                        matched = true;
                        continue;
                    };
                    if check.is_valid(&name) {
                        matched = true;
                        let child_ptr =
                            format!("{ptr}/patternProperties/{}", escape_token(pattern));
                        self.visit(sub, &child_ptr, child, depth + 1);
                    }
                }
            }
            if matched {
                continue;
            }

            if self.remove_additional == RemoveAdditional::All
                && (properties.is_some() || pattern_properties.is_some() || additional.is_some())
            {
                strip.push(key.clone());
                continue;
            }
            match additional {
                Some(Value::Bool(false)) if self.remove_additional.is_enabled() => {
                    strip.push(key.clone());
                }
                Some(sub @ Value::Object(_)) => {
                    self.visit(sub, &format!("{ptr}/additionalProperties"), child, depth + 1);
                    if self.remove_additional == RemoveAdditional::Failing
                        && self
                            .additional_checks
                            .get(ptr)
                            .is_some_and(|check| !check.is_valid(child))
                    {
                        strip.push(key.clone());
                    }
                }
                _ => {}
            }
        }
        for key in strip {
            tracing::trace!(schema_path = %ptr, property = %key, "removing additional property");
            map.remove(&key);
        }
    }

    fn visit_array(
        &self,
        node: &Map<String, Value>,
        ptr: &str,
        items: &mut Vec<Value>,
        depth: usize,
    ) {
        let tuple = node
            .get("prefixItems")
            .and_then(Value::as_array)
            .map(|t| (t, "prefixItems"))
            .or_else(|| node.get("items").and_then(Value::as_array).map(|t| (t, "items")));

        let Some((tuple, keyword)) = tuple else {
            if let Some(sub @ Value::Object(_)) = node.get("items") {
                let child_ptr = format!("{ptr}/items");
                for child in items.iter_mut() {
                    self.visit(sub, &child_ptr, child, depth + 1);
                }
            }
            return;
        };

        if self.use_defaults.is_enabled() {
            for (i, sub) in tuple.iter().enumerate() {
                let Some(default) = sub.get("default") else {
                    if i >= items.len() {
                        break;
                    }
                    continue;
                };
                if i < items.len() {
                    if self.use_defaults.should_fill(Some(&items[i])) {
                        items[i] = default.clone();
                    }
                } else {
                    items.push(default.clone());
                }
            }
        }

        for (i, (child, sub)) in items.iter_mut().zip(tuple).enumerate() {
            self.visit(sub, &format!("{ptr}/{keyword}/{i}"), child, depth + 1);
        }

        let rest_keyword = if keyword == "prefixItems" { "items" } else { "additionalItems" };
        if let Some(sub @ Value::Object(_)) = node.get(rest_keyword) {
            let child_ptr = format!("{ptr}/{rest_keyword}");
            for child in items.iter_mut().skip(tuple.len()) {
                self.visit(sub, &child_ptr, child, depth + 1);
            }
        }
    }

    fn resolve(&self, reference: &str) -> Option<(&Value, String)> {
        let fragment = reference.strip_prefix('#')?;
        if fragment.is_empty() {
            return Some((self.root, String::new()));
        }
        self.root
            .pointer(fragment)
            .map(|target| (target, fragment.to_string()))
    }
}

/// Escape a JSON Pointer reference token (RFC 6901).
pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Visit every schema object in `schema` together with its JSON Pointer.
///
/// Values of data keywords (`default`, `const`, `enum`, `examples`) are not
/// entered. Entries of name-to-schema maps (`properties`, `$defs`, ...) are
/// always entered, whatever their names.
pub fn walk_schema<F>(schema: &Value, ptr: &str, visit: &mut F)
where
    F: FnMut(&Map<String, Value>, &str),
{
    let Value::Object(node) = schema else {
        return;
    };
    visit(node, ptr);
    for (key, child) in node {
        if DATA_KEYWORDS.contains(&key.as_str()) {
            continue;
        }
        let child_ptr = format!("{ptr}/{}", escape_token(key));
        match child {
            Value::Object(entries) if SCHEMA_MAP_KEYWORDS.contains(&key.as_str()) => {
                for (name, sub) in entries {
                    walk_schema(sub, &format!("{child_ptr}/{}", escape_token(name)), visit);
                }
            }
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    walk_schema(item, &format!("{child_ptr}/{i}"), visit);
                }
            }
            _ => walk_schema(child, &child_ptr, visit),
        }
    }
}
