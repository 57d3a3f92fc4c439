//! # typeassert-core — Foundational Types
//!
//! Defines the value types shared by every typeassert crate. Nothing here
//! knows how a schema is matched; the types only describe the *outcome* of
//! matching and the knobs that shape it.
//!
//! ## Key Types
//!
//! 1. **[`AssertResult`]** — `Success(T)` or `Failure(ErrorRecords)`. Callers
//!    compose outcomes with `map`, `get_or_else`, `get_or_else_with` and only
//!    escalate to an error when they ask for it (`into_result`, `unwrap`).
//!
//! 2. **[`ErrorRecord`] / [`ErrorRecords`]** — structured mismatch reports
//!    produced by the engine. `ErrorRecords` cannot be empty.
//!
//! 3. **[`AssertOptions`]** — `removeAdditional`, `useDefaults`,
//!    `coerceTypes`, `lazyCompile`, plus unrecognized keys kept verbatim for
//!    the engine. Each boolean-or-literal option is its own enum.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `typeassert-*` crates (leaf of the DAG).
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests. `AssertResult::unwrap` is the single
//!   documented panic path and exists only as an opt-in escalation.

pub mod error;
pub mod options;
pub mod result;

pub use error::{
    ErrorRecord, ErrorRecords, SchemaCompileError, TypeAssertError, ValidationError,
    VALIDATION_ERROR_MESSAGE,
};
pub use options::{AssertOptions, CoerceTypes, RemoveAdditional, UseDefaults};
pub use result::AssertResult;
