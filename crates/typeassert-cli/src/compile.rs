//! # Compile — check that a schema compiles.
//!
//! Always compiles eagerly, whatever `lazyCompile` the options file says.
//! Prints `{"schema": <path>, "compiled": true}` on success; a compile fault
//! is returned as an error.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use typeassert_schema::create_assert_fn;

use crate::check::load_schema;
use crate::options::OptionArgs;
use crate::EXIT_OK;

/// Arguments for `typeassert compile`.
#[derive(Args, Debug, Clone)]
pub struct CompileArgs {
    /// Schema file (JSON or YAML).
    #[arg(long)]
    pub schema: PathBuf,

    #[command(flatten)]
    pub options: OptionArgs,
}

/// Execute `typeassert compile`, writing the report to stdout.
pub fn run_compile(args: &CompileArgs) -> Result<u8> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    compile_to(args, &mut out)
}

/// Execute `typeassert compile`, writing the report to `out`.
pub fn compile_to<W: Write>(args: &CompileArgs, out: &mut W) -> Result<u8> {
    let options = args.options.resolve()?.with_lazy_compile(false);
    let schema = load_schema(&args.schema)?;

    create_assert_fn(options, schema)
        .with_context(|| format!("failed to compile schema {}", args.schema.display()))?;
    tracing::info!(schema = %args.schema.display(), "schema compiled");

    let report = json!({
        "schema": args.schema.display().to_string(),
        "compiled": true,
    });
    writeln!(out, "{report}").context("failed to write report")?;
    Ok(EXIT_OK)
}
