//! # Engine Seam
//!
//! The factory never matches data itself. It compiles a schema through a
//! [`SchemaEngine`] and runs the resulting [`CompiledSchema`] on each call.
//! [`JsonSchemaEngine`](crate::JsonSchemaEngine) is the default; tests and
//! integrators can plug in their own.

use serde_json::Value;
use typeassert_core::{AssertOptions, ErrorRecords, SchemaCompileError};

/// Compiles schema documents into validators.
pub trait SchemaEngine: Send + Sync {
    /// The compiled artifact.
    type Validator: CompiledSchema;

    /// Compile `schema` under `options`. Unrecognized options are available
    /// in `options.extra`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaCompileError`] for a malformed schema or an option
    /// value the engine cannot honor.
    fn compile(
        &self,
        schema: &Value,
        options: &AssertOptions,
    ) -> Result<Self::Validator, SchemaCompileError>;
}

/// A compiled validator.
pub trait CompiledSchema: Send + Sync {
    /// Check `data`, rewriting it in place when the compile options ask for
    /// it. Returns the mismatch records on failure.
    fn validate(&self, data: &mut Value) -> Result<(), ErrorRecords>;
}

impl<E: SchemaEngine + ?Sized> SchemaEngine for std::sync::Arc<E> {
    type Validator = E::Validator;

    fn compile(
        &self,
        schema: &Value,
        options: &AssertOptions,
    ) -> Result<Self::Validator, SchemaCompileError> {
        (**self).compile(schema, options)
    }
}
