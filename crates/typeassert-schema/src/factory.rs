//! # Assertion Factory
//!
//! Binds a schema and [`AssertOptions`] into an [`AssertFn`].
//!
//! ## Compile Timing
//!
//! The validator lives in a one-shot cell with two states,
//! `Uncompiled → Compiled`:
//!
//! - `lazyCompile: false` — the engine compiles inside the factory call; a
//!   malformed schema is returned from the factory.
//! - `lazyCompile: true` (default) — the first call compiles, stores the
//!   outcome, then validates its own data. Later calls reuse the stored
//!   validator. A compile fault is stored too and returned from every call;
//!   compilation is never attempted twice.
//!
//! The cell is a [`OnceLock`], so racing first calls block on a single
//! compilation instead of each compiling their own.
//!
//! Each factory call owns its own cell. Two assertion functions built from
//! the same schema never share a validator.

use std::fmt;
use std::marker::PhantomData;
use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use serde_json::Value;
use typeassert_core::{AssertOptions, AssertResult, ErrorRecord, ErrorRecords, SchemaCompileError};

use crate::engine::{CompiledSchema, SchemaEngine};
use crate::validate::JsonSchemaEngine;

type CompileOutcome<V> = Result<V, SchemaCompileError>;

/// Build an assertion function on the default [`JsonSchemaEngine`].
///
/// # Errors
///
/// With `lazy_compile == false`, returns the engine's compile fault.
/// Lazy construction never fails.
pub fn create_assert_fn(
    options: AssertOptions,
    schema: Value,
) -> Result<AssertFn, SchemaCompileError> {
    AssertFn::with_engine(JsonSchemaEngine::new(), options, schema)
}

/// Build an assertion function whose successes are deserialized into `T`.
pub fn create_typed_assert_fn<T: DeserializeOwned>(
    options: AssertOptions,
    schema: Value,
) -> Result<TypedAssertFn<T>, SchemaCompileError> {
    create_assert_fn(options, schema).map(|assert_fn| assert_fn.typed())
}

/// A reusable check of `serde_json::Value`s against one schema.
pub struct AssertFn<E: SchemaEngine = JsonSchemaEngine> {
    engine: E,
    schema: Value,
    options: AssertOptions,
    validator: OnceLock<CompileOutcome<E::Validator>>,
}

impl<E: SchemaEngine> AssertFn<E> {
    /// Build an assertion function on a caller-supplied engine.
    ///
    /// # Errors
    ///
    /// With `lazy_compile == false`, returns the engine's compile fault.
    pub fn with_engine(
        engine: E,
        options: AssertOptions,
        schema: Value,
    ) -> Result<Self, SchemaCompileError> {
        let validator = if options.lazy_compile {
            OnceLock::new()
        } else {
            tracing::debug!("compiling schema eagerly");
            let compiled = engine.compile(&schema, &options)?;
            OnceLock::from(Ok(compiled))
        };
        Ok(Self {
            engine,
            schema,
            options,
            validator,
        })
    }

    /// Check `data`, returning it (possibly rewritten by the engine) on
    /// success or the engine's records on failure.
    ///
    /// # Errors
    ///
    /// Returns the compile fault of a lazily compiled schema, on the first
    /// call and on every call after it.
    pub fn call(&self, mut data: Value) -> Result<AssertResult<Value>, SchemaCompileError> {
        let validator = self.compiled()?;
        Ok(match validator.validate(&mut data) {
            Ok(()) => AssertResult::Success(data),
            Err(errors) => AssertResult::Failure(errors),
        })
    }

    /// Convert into a function that deserializes successes into `T`.
    pub fn typed<T: DeserializeOwned>(self) -> TypedAssertFn<T, E> {
        TypedAssertFn {
            inner: self,
            _target: PhantomData,
        }
    }

    /// The raw schema, available before and after compilation.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn options(&self) -> &AssertOptions {
        &self.options
    }

    /// Whether a validator has been compiled successfully.
    pub fn is_compiled(&self) -> bool {
        matches!(self.validator.get(), Some(Ok(_)))
    }

    fn compiled(&self) -> Result<&E::Validator, SchemaCompileError> {
        self.validator
            .get_or_init(|| {
                tracing::debug!("compiling schema on first use");
                let outcome = self.engine.compile(&self.schema, &self.options);
                if let Err(e) = &outcome {
                    tracing::warn!(error = %e, "lazy schema compilation failed");
                }
                outcome
            })
            .as_ref()
            .map_err(Clone::clone)
    }
}

impl<E: SchemaEngine> fmt::Debug for AssertFn<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.validator.get() {
            None => "uncompiled",
            Some(Ok(_)) => "compiled",
            Some(Err(_)) => "failed",
        };
        f.debug_struct("AssertFn")
            .field("schema", &self.schema)
            .field("options", &self.options)
            .field("state", &state)
            .finish()
    }
}

/// An [`AssertFn`] that also deserializes accepted values into `T`.
///
/// A value that passes the schema but does not fit `T` becomes a `Failure`
/// with one record whose keyword is `deserialize`.
pub struct TypedAssertFn<T, E: SchemaEngine = JsonSchemaEngine> {
    inner: AssertFn<E>,
    _target: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned, E: SchemaEngine> TypedAssertFn<T, E> {
    /// # Errors
    ///
    /// Same as [`AssertFn::call`].
    pub fn call(&self, data: Value) -> Result<AssertResult<T>, SchemaCompileError> {
        Ok(self.inner.call(data)?.and_then(|value| {
            match serde_json::from_value::<T>(value) {
                Ok(typed) => AssertResult::Success(typed),
                Err(e) => AssertResult::Failure(ErrorRecords::single(
                    ErrorRecord::new("", "", e.to_string()).with_keyword("deserialize"),
                )),
            }
        }))
    }

    pub fn untyped(&self) -> &AssertFn<E> {
        &self.inner
    }

    pub fn into_untyped(self) -> AssertFn<E> {
        self.inner
    }
}

impl<T, E: SchemaEngine> fmt::Debug for TypedAssertFn<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedAssertFn")
            .field("target", &std::any::type_name::<T>())
            .field("inner", &self.inner)
            .finish()
    }
}
