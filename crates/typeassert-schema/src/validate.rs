//! # JSON Schema Engine
//!
//! The default [`SchemaEngine`], backed by the `jsonschema` crate. The draft
//! is detected from `$schema` unless the `draft` passthrough option names
//! one.
//!
//! ## Compilation
//!
//! Compiling produces a [`JsonSchemaValidator`] holding:
//!
//! - the root `jsonschema::Validator`,
//! - one `{"pattern": key}` validator per `patternProperties` key, used by
//!   data preparation to classify property names with the engine's own
//!   regex dialect,
//! - for `removeAdditional: "failing"`, one validator per
//!   `additionalProperties` subschema, built as a `$ref` into the root
//!   document so local references inside the subschema still resolve.
//!
//! ## Reference Resolution
//!
//! A local retriever serves the root document under [`ROOT_SCHEMA_URI`] and
//! refuses every other URI. Nothing is fetched over the network; a schema
//! whose `$ref` points outside itself fails to compile.
//!
//! ## Passthrough Options
//!
//! | key               | type   | effect                                           |
//! |-------------------|--------|--------------------------------------------------|
//! | `draft`           | string | `draft4`, `draft6`, `draft7`, `draft2019-09`, `draft2020-12` |
//! | `allErrors`       | bool   | report every error (`true`) or only the first (default) |
//! | `validateFormats` | bool   | assert the `format` keyword                      |
//!
//! Any other key is logged and ignored.

use std::collections::HashMap;
use std::fmt;

use jsonschema::{Draft, Retrieve, Uri, ValidationOptions, Validator};
use serde_json::{json, Value};
use typeassert_core::{
    AssertOptions, CoerceTypes, ErrorRecord, ErrorRecords, RemoveAdditional, SchemaCompileError,
    UseDefaults,
};

use crate::engine::{CompiledSchema, SchemaEngine};
use crate::prepare::{walk_schema, Preparer};

/// URI under which the root schema document is served to `$ref` lookups.
pub const ROOT_SCHEMA_URI: &str = "https://typeassert.invalid/root.schema.json";

/// Retriever that answers only for the root document.
///
/// Prevents the jsonschema crate from making network requests for
/// references the document does not contain.
struct LocalSchemaRetriever {
    root: Value,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        let without_fragment = uri_str.split('#').next().unwrap_or(uri_str);
        if without_fragment == ROOT_SCHEMA_URI {
            return Ok(self.root.clone());
        }
        Err(format!("external reference '{uri_str}' is not available locally").into())
    }
}

/// Engine settings taken from the passthrough options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EngineSettings {
    draft: Option<Draft>,
    all_errors: bool,
    validate_formats: Option<bool>,
}

impl EngineSettings {
    fn from_options(options: &AssertOptions) -> Result<Self, SchemaCompileError> {
        let mut settings = Self {
            draft: None,
            all_errors: false,
            validate_formats: None,
        };
        for (key, value) in &options.extra {
            match key.as_str() {
                "draft" => settings.draft = Some(parse_draft(value)?),
                "allErrors" => settings.all_errors = expect_bool(key, value)?,
                "validateFormats" => settings.validate_formats = Some(expect_bool(key, value)?),
                other => {
                    tracing::warn!(option = %other, "option not recognized by the jsonschema engine; ignoring");
                }
            }
        }
        Ok(settings)
    }

    /// Build `ValidationOptions` with the local retriever installed.
    fn build_options(&self, root: &Value) -> ValidationOptions {
        let mut opts = jsonschema::options();
        if let Some(draft) = self.draft {
            opts.with_draft(draft);
        }
        if let Some(validate_formats) = self.validate_formats {
            opts.should_validate_formats(validate_formats);
        }
        opts.with_retriever(LocalSchemaRetriever { root: root.clone() });
        opts
    }

    fn max_errors(&self) -> usize {
        if self.all_errors {
            usize::MAX
        } else {
            1
        }
    }
}

fn parse_draft(value: &Value) -> Result<Draft, SchemaCompileError> {
    match value.as_str() {
        Some("draft4") => Ok(Draft::Draft4),
        Some("draft6") => Ok(Draft::Draft6),
        Some("draft7") => Ok(Draft::Draft7),
        Some("draft2019-09") => Ok(Draft::Draft201909),
        Some("draft2020-12") => Ok(Draft::Draft202012),
        _ => Err(SchemaCompileError::InvalidOption {
            option: "draft".to_string(),
            reason: format!(
                "expected one of draft4, draft6, draft7, draft2019-09, draft2020-12; got {value}"
            ),
        }),
    }
}

fn expect_bool(key: &str, value: &Value) -> Result<bool, SchemaCompileError> {
    value.as_bool().ok_or_else(|| SchemaCompileError::InvalidOption {
        option: key.to_string(),
        reason: format!("expected a boolean, got {value}"),
    })
}

/// The default engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaEngine;

impl JsonSchemaEngine {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaEngine for JsonSchemaEngine {
    type Validator = JsonSchemaValidator;

    fn compile(
        &self,
        schema: &Value,
        options: &AssertOptions,
    ) -> Result<JsonSchemaValidator, SchemaCompileError> {
        let settings = EngineSettings::from_options(options)?;
        let opts = settings.build_options(schema);
        let validator = opts
            .build(schema)
            .map_err(|e| SchemaCompileError::InvalidSchema {
                reason: e.to_string(),
            })?;

        let patterns = if options.mutates_input() {
            compile_patterns(schema, &opts)?
        } else {
            HashMap::new()
        };
        let additional_checks = if options.remove_additional == RemoveAdditional::Failing {
            compile_additional_checks(schema, &opts)?
        } else {
            HashMap::new()
        };

        tracing::debug!(
            remove_additional = %options.remove_additional,
            use_defaults = %options.use_defaults,
            coerce_types = %options.coerce_types,
            patterns = patterns.len(),
            additional_checks = additional_checks.len(),
            "compiled schema"
        );

        Ok(JsonSchemaValidator {
            validator,
            root: schema.clone(),
            remove_additional: options.remove_additional,
            use_defaults: options.use_defaults,
            coerce_types: options.coerce_types,
            patterns,
            additional_checks,
            max_errors: settings.max_errors(),
        })
    }
}

fn compile_patterns(
    schema: &Value,
    opts: &ValidationOptions,
) -> Result<HashMap<String, Validator>, SchemaCompileError> {
    let mut keys = Vec::new();
    walk_schema(schema, "", &mut |node, _| {
        if let Some(Value::Object(pattern_properties)) = node.get("patternProperties") {
            keys.extend(pattern_properties.keys().cloned());
        }
    });

    let mut patterns = HashMap::with_capacity(keys.len());
    for key in keys {
        if patterns.contains_key(&key) {
            continue;
        }
        let check = opts
            .build(&json!({ "pattern": key }))
            .map_err(|e| SchemaCompileError::InvalidPattern {
                pattern: key.clone(),
                reason: e.to_string(),
            })?;
        patterns.insert(key, check);
    }
    Ok(patterns)
}

fn compile_additional_checks(
    schema: &Value,
    opts: &ValidationOptions,
) -> Result<HashMap<String, Validator>, SchemaCompileError> {
    let mut pointers = Vec::new();
    walk_schema(schema, "", &mut |node, ptr| {
        if let Some(Value::Object(_)) = node.get("additionalProperties") {
            pointers.push(ptr.to_string());
        }
    });

    let mut checks = HashMap::with_capacity(pointers.len());
    for ptr in pointers {
        let reference = json!({
            "$ref": format!("{ROOT_SCHEMA_URI}#{}/additionalProperties", encode_fragment(&ptr))
        });
        let check = opts
            .build(&reference)
            .map_err(|e| SchemaCompileError::InvalidSchema {
                reason: format!("additionalProperties at '{ptr}': {e}"),
            })?;
        checks.insert(ptr, check);
    }
    Ok(checks)
}

/// Percent-encode a JSON Pointer for use as a URI fragment.
fn encode_fragment(pointer: &str) -> String {
    let mut encoded = String::with_capacity(pointer.len());
    for byte in pointer.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

/// A schema compiled by [`JsonSchemaEngine`].
pub struct JsonSchemaValidator {
    validator: Validator,
    root: Value,
    remove_additional: RemoveAdditional,
    use_defaults: UseDefaults,
    coerce_types: CoerceTypes,
    patterns: HashMap<String, Validator>,
    additional_checks: HashMap<String, Validator>,
    max_errors: usize,
}

impl fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaValidator")
            .field("remove_additional", &self.remove_additional)
            .field("use_defaults", &self.use_defaults)
            .field("coerce_types", &self.coerce_types)
            .field("patterns", &self.patterns.len())
            .field("additional_checks", &self.additional_checks.len())
            .field("max_errors", &self.max_errors)
            .finish_non_exhaustive()
    }
}

impl JsonSchemaValidator {
    /// The schema document this validator was compiled from.
    pub fn schema(&self) -> &Value {
        &self.root
    }

    fn mutates_input(&self) -> bool {
        self.remove_additional.is_enabled()
            || self.use_defaults.is_enabled()
            || self.coerce_types.is_enabled()
    }
}

impl CompiledSchema for JsonSchemaValidator {
    fn validate(&self, data: &mut Value) -> Result<(), ErrorRecords> {
        if self.mutates_input() {
            Preparer {
                root: &self.root,
                remove_additional: self.remove_additional,
                use_defaults: self.use_defaults,
                coerce_types: self.coerce_types,
                patterns: &self.patterns,
                additional_checks: &self.additional_checks,
            }
            .prepare(data);
        }

        let records: Vec<ErrorRecord> = self
            .validator
            .iter_errors(data)
            .take(self.max_errors)
            .map(|e| {
                ErrorRecord::new(
                    e.instance_path.to_string(),
                    e.schema_path.to_string(),
                    e.to_string(),
                )
            })
            .collect();

        tracing::trace!(errors = records.len(), "validated value");
        match ErrorRecords::new(records) {
            None => Ok(()),
            Some(errors) => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(schema: Value, options: AssertOptions) -> JsonSchemaValidator {
        JsonSchemaEngine::new().compile(&schema, &options).unwrap()
    }

    fn number_schema() -> Value {
        json!({
            "type": "object",
            "properties": {"n": {"type": "number"}},
            "required": ["n"],
            "additionalProperties": false
        })
    }

    #[test]
    fn test_valid_data_passes() {
        let validator = compile(number_schema(), AssertOptions::default());
        let mut data = json!({"n": 1});
        assert!(validator.validate(&mut data).is_ok());
        assert_eq!(data, json!({"n": 1}));
    }

    #[test]
    fn test_type_error_record() {
        let validator = compile(number_schema(), AssertOptions::default());
        let errors = validator.validate(&mut json!({"n": "x"})).unwrap_err();
        assert_eq!(errors.len(), 1);
        let record = errors.first();
        assert_eq!(record.instance_path, "/n");
        assert_eq!(record.keyword, "type");
        assert!(record.schema_path.ends_with("/type"));
    }

    #[test]
    fn test_first_error_only_by_default() {
        let schema = json!({
            "type": "object",
            "properties": {"a": {"type": "string"}, "b": {"type": "string"}}
        });
        let validator = compile(schema.clone(), AssertOptions::default());
        let errors = validator.validate(&mut json!({"a": 1, "b": 2})).unwrap_err();
        assert_eq!(errors.len(), 1);

        let all = compile(schema, AssertOptions::default().with_extra("allErrors", json!(true)));
        let errors = all.validate(&mut json!({"a": 1, "b": 2})).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_invalid_schema_fails_to_compile() {
        let err = JsonSchemaEngine::new()
            .compile(&json!({"type": "not_a_valid_type"}), &AssertOptions::default())
            .unwrap_err();
        assert!(matches!(err, SchemaCompileError::InvalidSchema { .. }), "{err}");
    }

    #[test]
    fn test_external_ref_fails_to_compile() {
        let schema = json!({"$ref": "https://example.com/other.schema.json"});
        let err = JsonSchemaEngine::new()
            .compile(&schema, &AssertOptions::default())
            .unwrap_err();
        assert!(matches!(err, SchemaCompileError::InvalidSchema { .. }), "{err}");
    }

    #[test]
    fn test_invalid_pattern_fails_when_preparing() {
        let schema = json!({"patternProperties": {"(": {}}});
        let opts = AssertOptions::default().with_remove_additional(RemoveAdditional::All);
        let err = JsonSchemaEngine::new().compile(&schema, &opts).unwrap_err();
        assert!(
            matches!(err, SchemaCompileError::InvalidSchema { .. } | SchemaCompileError::InvalidPattern { .. }),
            "{err}"
        );
    }

    #[test]
    fn test_bad_passthrough_values() {
        let engine = JsonSchemaEngine::new();
        let err = engine
            .compile(&json!({}), &AssertOptions::default().with_extra("draft", json!("draft99")))
            .unwrap_err();
        assert!(matches!(err, SchemaCompileError::InvalidOption { ref option, .. } if option == "draft"));

        let err = engine
            .compile(&json!({}), &AssertOptions::default().with_extra("allErrors", json!("yes")))
            .unwrap_err();
        assert!(matches!(err, SchemaCompileError::InvalidOption { ref option, .. } if option == "allErrors"));
    }

    #[test]
    fn test_unknown_passthrough_ignored() {
        let opts = AssertOptions::default().with_extra("verbose", json!(true));
        assert!(JsonSchemaEngine::new().compile(&json!({}), &opts).is_ok());
    }

    #[test]
    fn test_explicit_draft() {
        let opts = AssertOptions::default().with_extra("draft", json!("draft7"));
        let validator = compile(json!({"items": [{"type": "string"}]}), opts);
        assert!(validator.validate(&mut json!(["a", 1])).is_ok());
        assert!(validator.validate(&mut json!([1])).is_err());
    }

    #[test]
    fn test_remove_additional_declared_strips_before_matching() {
        let opts = AssertOptions::default().with_remove_additional(RemoveAdditional::Declared);
        let validator = compile(number_schema(), opts);
        let mut data = json!({"n": 1, "extra": "x"});
        assert!(validator.validate(&mut data).is_ok());
        assert_eq!(data, json!({"n": 1}));
    }

    #[test]
    fn test_remove_additional_failing() {
        let schema = json!({
            "type": "object",
            "properties": {"id": {"type": "integer"}},
            "additionalProperties": {"type": "string"}
        });
        let opts = AssertOptions::default().with_remove_additional(RemoveAdditional::Failing);
        let validator = compile(schema, opts);
        let mut data = json!({"id": 1, "label": "ok", "count": 3});
        assert!(validator.validate(&mut data).is_ok());
        assert_eq!(data, json!({"id": 1, "label": "ok"}));
    }

    #[test]
    fn test_remove_additional_failing_with_local_ref() {
        let schema = json!({
            "definitions": {"label": {"type": "string", "maxLength": 3}},
            "type": "object",
            "properties": {
                "meta": {
                    "type": "object",
                    "additionalProperties": {"$ref": "#/definitions/label"}
                }
            }
        });
        let opts = AssertOptions::default().with_remove_additional(RemoveAdditional::Failing);
        let validator = compile(schema, opts);
        let mut data = json!({"meta": {"a": "abc", "b": "toolong", "c": 1}});
        assert!(validator.validate(&mut data).is_ok());
        assert_eq!(data, json!({"meta": {"a": "abc"}}));
    }

    #[test]
    fn test_declared_mode_keeps_failing_additional() {
        let schema = json!({
            "type": "object",
            "additionalProperties": {"type": "string"}
        });
        let opts = AssertOptions::default().with_remove_additional(RemoveAdditional::Declared);
        let validator = compile(schema, opts);
        let mut data = json!({"count": 3});
        let errors = validator.validate(&mut data).unwrap_err();
        assert_eq!(errors.first().instance_path, "/count");
        assert_eq!(data, json!({"count": 3}));
    }

    #[test]
    fn test_defaults_make_required_pass() {
        let schema = json!({
            "type": "object",
            "properties": {"level": {"type": "string", "default": "info"}},
            "required": ["level"]
        });
        let strict = compile(schema.clone(), AssertOptions::default());
        assert!(strict.validate(&mut json!({})).is_err());

        let opts = AssertOptions::default().with_use_defaults(UseDefaults::Insert);
        let filling = compile(schema, opts);
        let mut data = json!({});
        assert!(filling.validate(&mut data).is_ok());
        assert_eq!(data, json!({"level": "info"}));
    }

    #[test]
    fn test_coercion_makes_type_pass() {
        let schema = json!({"type": "object", "properties": {"port": {"type": "integer"}}});
        let opts = AssertOptions::default().with_coerce_types(CoerceTypes::Scalar);
        let validator = compile(schema, opts);
        let mut data = json!({"port": "8080"});
        assert!(validator.validate(&mut data).is_ok());
        assert_eq!(data, json!({"port": 8080}));
    }

    #[test]
    fn test_debug_lists_modes() {
        let opts = AssertOptions::default().with_remove_additional(RemoveAdditional::All);
        let validator = compile(number_schema(), opts);
        let debug = format!("{validator:?}");
        assert!(debug.contains("JsonSchemaValidator"));
        assert!(debug.contains("All"));
    }

    #[test]
    fn test_lookaround_pattern_compiles_with_every_mode() {
        let schema = json!({
            "patternProperties": {"^(?!_)": {"type": "string"}},
            "additionalProperties": false
        });
        for mode in RemoveAdditional::ALL {
            let opts = AssertOptions::default()
                .with_remove_additional(*mode)
                .with_lazy_compile(false);
            assert!(JsonSchemaEngine::new().compile(&schema, &opts).is_ok(), "{mode}");
        }

        let opts = AssertOptions::default().with_remove_additional(RemoveAdditional::Declared);
        let validator = compile(schema, opts);
        let mut data = json!({"name": "a", "_hidden": "b"});
        assert!(validator.validate(&mut data).is_ok());
        assert_eq!(data, json!({"name": "a"}));
    }

    #[test]
    fn test_property_named_default_keeps_pattern_matches() {
        let schema = json!({
            "properties": {
                "default": {
                    "type": "object",
                    "patternProperties": {"^x": {}},
                    "additionalProperties": false
                }
            }
        });
        let opts = AssertOptions::default().with_remove_additional(RemoveAdditional::Declared);
        let validator = compile(schema, opts);
        let mut data = json!({"default": {"xa": 1}});
        assert!(validator.validate(&mut data).is_ok());
        assert_eq!(data, json!({"default": {"xa": 1}}));
    }

    #[test]
    fn test_failing_mode_under_property_named_enum() {
        let schema = json!({
            "type": "object",
            "properties": {
                "enum": {"type": "object", "additionalProperties": {"type": "string"}}
            }
        });
        let opts = AssertOptions::default().with_remove_additional(RemoveAdditional::Failing);
        let validator = compile(schema, opts);
        let mut data = json!({"enum": {"a": "ok", "b": 2}});
        assert!(validator.validate(&mut data).is_ok());
        assert_eq!(data, json!({"enum": {"a": "ok"}}));
    }

    #[test]
    fn test_encode_fragment() {
        assert_eq!(encode_fragment("/properties/a b"), "/properties/a%20b");
        assert_eq!(encode_fragment("/properties/a~1b"), "/properties/a~1b");
    }
}
