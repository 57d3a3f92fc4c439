//! # Option Resolution
//!
//! Merges an optional options file with command-line flags. Flags override
//! the file; anything neither names keeps its default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use typeassert_core::{AssertOptions, CoerceTypes, RemoveAdditional, UseDefaults};
use typeassert_schema::load_options;

/// Assertion options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct OptionArgs {
    /// JSON or YAML file holding assertion options (camelCase keys).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Strip properties not declared by the schema (keep, declared, all, failing).
    #[arg(long, value_name = "MODE")]
    pub remove_additional: Option<RemoveAdditional>,

    /// Fill missing values from schema defaults (off, insert, empty, shared).
    #[arg(long, value_name = "MODE")]
    pub use_defaults: Option<UseDefaults>,

    /// Convert values toward their declared type (off, scalar, array).
    #[arg(long, value_name = "MODE")]
    pub coerce_types: Option<CoerceTypes>,

    /// Report every violation instead of stopping at the first.
    #[arg(long)]
    pub all_errors: bool,
}

impl OptionArgs {
    /// Build the effective [`AssertOptions`].
    pub fn resolve(&self) -> Result<AssertOptions> {
        let mut options = match &self.config {
            Some(path) => load_options(path)
                .with_context(|| format!("failed to load options from {}", path.display()))?,
            None => AssertOptions::default(),
        };

        if let Some(mode) = self.remove_additional {
            options = options.with_remove_additional(mode);
        }
        if let Some(mode) = self.use_defaults {
            options = options.with_use_defaults(mode);
        }
        if let Some(mode) = self.coerce_types {
            options = options.with_coerce_types(mode);
        }
        if self.all_errors {
            options = options.with_extra("allErrors", Value::Bool(true));
        }

        tracing::debug!(
            remove_additional = %options.remove_additional,
            use_defaults = %options.use_defaults,
            coerce_types = %options.coerce_types,
            "resolved assertion options"
        );
        Ok(options)
    }
}
