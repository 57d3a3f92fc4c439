//! # typeassert-cli — Command-Line Front End
//!
//! Provides the `typeassert` binary on top of `typeassert-schema`.
//!
//! ## Subcommands
//!
//! - `typeassert check` — build one assertion function and apply it to each
//!   data file, printing one JSON line per file.
//! - `typeassert compile` — compile a schema eagerly and report the outcome.
//!
//! ```bash
//! typeassert check --schema user.schema.json users/*.json --remove-additional declared
//! typeassert check --schema config.yaml app.yaml --use-defaults empty --fallback '{}'
//! typeassert compile --schema user.schema.json --config assert-options.yaml
//! ```
//!
//! ## Exit Codes
//!
//! `0` when every document passes, `1` when any fails, `2` on a compile fault,
//! an unreadable file, or a usage error.

pub mod check;
pub mod compile;
pub mod options;

/// Exit code for a run where every document passed.
pub const EXIT_OK: u8 = 0;

/// Exit code for a run where at least one document failed validation.
pub const EXIT_INVALID: u8 = 1;

/// Exit code for compile faults and I/O errors.
pub const EXIT_FAULT: u8 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        assert_ne!(EXIT_OK, EXIT_INVALID);
        assert_ne!(EXIT_INVALID, EXIT_FAULT);
    }
}
