//! # Check — validate documents against a schema.
//!
//! Builds one assertion function from `--schema` and the resolved options,
//! then runs it over each data file in order. Every file yields one JSON line
//! on stdout:
//!
//! ```text
//! {"file":"a.json","tag":"success","value":{"n":1}}
//! {"file":"b.json","tag":"failure","errors":[{"instancePath":"/n",...}]}
//! ```
//!
//! With `--fallback <json>`, a failing file prints the fallback as its
//! `value` instead of its records. The exit code still reports the failure.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use serde_json::Value;

use typeassert_core::{AssertResult, ErrorRecords};
use typeassert_schema::{create_assert_fn, load_document};

use crate::options::OptionArgs;
use crate::{EXIT_INVALID, EXIT_OK};

/// Arguments for `typeassert check`.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Schema file (JSON or YAML).
    #[arg(long)]
    pub schema: PathBuf,

    /// Data files to check (JSON or YAML).
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub options: OptionArgs,

    /// Compile the schema before reading any data file.
    #[arg(long)]
    pub eager: bool,

    /// JSON value printed in place of a failing document.
    #[arg(long, value_name = "JSON")]
    pub fallback: Option<String>,
}

/// One output line.
#[derive(Debug, Serialize)]
struct CheckLine<'a> {
    file: &'a str,
    tag: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<ErrorRecords>,
}

/// Execute `typeassert check`, writing result lines to stdout.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    check_to(args, &mut out)
}

/// Execute `typeassert check`, writing result lines to `out`.
pub fn check_to<W: Write>(args: &CheckArgs, out: &mut W) -> Result<u8> {
    let mut options = args.options.resolve()?;
    if args.eager {
        options = options.with_lazy_compile(false);
    }
    let fallback = args
        .fallback
        .as_deref()
        .map(serde_json::from_str::<Value>)
        .transpose()
        .context("--fallback is not valid JSON")?;

    let schema = load_schema(&args.schema)?;
    let assert_fn = create_assert_fn(options, schema)
        .with_context(|| format!("failed to compile schema {}", args.schema.display()))?;

    let mut failed = 0usize;
    for path in &args.files {
        let data = load_document(path)
            .with_context(|| format!("failed to load data file {}", path.display()))?;
        let result = assert_fn
            .call(data)
            .with_context(|| format!("failed to compile schema {}", args.schema.display()))?;

        let file = path.display().to_string();
        let line = match (result, &fallback) {
            (AssertResult::Success(value), _) => {
                tracing::info!(file = %file, "document passed");
                CheckLine {
                    file: &file,
                    tag: "success",
                    value: Some(value),
                    errors: None,
                }
            }
            (failure, Some(fallback)) => {
                failed += 1;
                tracing::info!(file = %file, "document failed; printing fallback");
                CheckLine {
                    file: &file,
                    tag: "failure",
                    value: Some(failure.get_or_else(fallback.clone())),
                    errors: None,
                }
            }
            (failure, None) => {
                failed += 1;
                let errors = failure.into_errors();
                tracing::info!(
                    file = %file,
                    errors = errors.as_ref().map_or(0, ErrorRecords::len),
                    "document failed"
                );
                CheckLine {
                    file: &file,
                    tag: "failure",
                    value: None,
                    errors,
                }
            }
        };
        serde_json::to_writer(&mut *out, &line).context("failed to write result")?;
        writeln!(out).context("failed to write result")?;
    }

    tracing::debug!(files = args.files.len(), failed, "check finished");
    Ok(if failed == 0 { EXIT_OK } else { EXIT_INVALID })
}

pub(crate) fn load_schema(path: &Path) -> Result<Value> {
    load_document(path).with_context(|| format!("failed to load schema {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(schema: PathBuf, files: Vec<PathBuf>) -> CheckArgs {
        CheckArgs {
            schema,
            files,
            options: OptionArgs::default(),
            eager: false,
            fallback: None,
        }
    }

    #[test]
    fn invalid_fallback_json_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.json");
        std::fs::write(&schema, "{}").unwrap();
        let data = dir.path().join("data.json");
        std::fs::write(&data, "1").unwrap();

        let mut check = args(schema, vec![data]);
        check.fallback = Some("{oops".to_string());
        let err = check_to(&check, &mut Vec::new()).unwrap_err();
        assert!(format!("{err:#}").contains("--fallback"));
    }

    #[test]
    fn missing_schema_is_an_error() {
        let check = args(PathBuf::from("/nonexistent/schema.json"), vec![]);
        let err = check_to(&check, &mut Vec::new()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load schema"));
    }
}
