//! # typeassert-schema — Assertion Functions over JSON Schema
//!
//! Turns a JSON Schema document plus [`AssertOptions`] into a reusable
//! [`AssertFn`]. Each call checks one `serde_json::Value` and returns an
//! [`AssertResult`] instead of an error.
//!
//! ```no_run
//! use serde_json::json;
//! use typeassert_schema::{create_assert_fn, AssertOptions, RemoveAdditional};
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {"n": {"type": "number"}},
//!     "required": ["n"],
//!     "additionalProperties": false
//! });
//! let options = AssertOptions::new().with_remove_additional(RemoveAdditional::Declared);
//! let assert_n = create_assert_fn(options, schema)?;
//!
//! let value = assert_n.call(json!({"n": 1, "extra": "x"}))?.unwrap();
//! assert_eq!(value, json!({"n": 1}));
//! # Ok::<(), typeassert_schema::SchemaCompileError>(())
//! ```
//!
//! ## Modules
//!
//! - [`engine`] — the `SchemaEngine` / `CompiledSchema` seam the factory
//!   compiles through.
//! - [`validate`] — the default engine, backed by the `jsonschema` crate.
//! - [`prepare`] / [`coerce`] — in-place rewriting of data (defaults,
//!   stripping, coercion) run by the default engine before matching.
//! - [`factory`] — `AssertFn`, `TypedAssertFn` and the eager/lazy compile
//!   cell.
//! - [`load`] — JSON/YAML document and configuration loading.
//!
//! ## Crate Policy
//!
//! - Validation mismatches are always returned as `AssertResult::Failure`.
//! - Schema compile faults are always returned as `SchemaCompileError`,
//!   never converted into a result, never retried.
//! - No network access: `$ref`s outside the schema document do not resolve.

pub mod coerce;
pub mod engine;
pub mod factory;
pub mod load;
pub mod prepare;
pub mod validate;

pub use engine::{CompiledSchema, SchemaEngine};
pub use factory::{create_assert_fn, create_typed_assert_fn, AssertFn, TypedAssertFn};
pub use load::{load_document, load_options};
pub use validate::{JsonSchemaEngine, JsonSchemaValidator};

pub use typeassert_core::{
    AssertOptions, AssertResult, CoerceTypes, ErrorRecord, ErrorRecords, RemoveAdditional,
    SchemaCompileError, TypeAssertError, UseDefaults, ValidationError,
};
