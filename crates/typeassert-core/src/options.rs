//! # Assertion Options
//!
//! The configuration surface accepted by the assertion factory. Configuration
//! files use the established camelCase keys and boolean-or-literal values:
//!
//! ```yaml
//! removeAdditional: all      # false | true | "all" | "failing"
//! useDefaults: empty         # false | true | "empty" | "shared"
//! coerceTypes: array         # false | true | "array"
//! lazyCompile: false         # true (default) | false
//! allErrors: true            # unrecognized: passed to the engine verbatim
//! ```
//!
//! Each mixed option is a dedicated enum; the boolean and string spellings
//! are accepted only at the serde boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire spelling of a boolean-or-literal option (`true` or `"all"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionLiteral {
    Flag(bool),
    Name(String),
}

/// Implements the serde and `FromStr` plumbing shared by the option enums.
///
/// The `false` / `true` rows name the variants spelled as booleans together
/// with their CLI names; the remaining rows map string literals, which double
/// as CLI names. Deserialization accepts every CLI name as well, so a config
/// file may say `useDefaults: insert` where it could say `useDefaults: true`.
macro_rules! literal_option {
    (
        $ty:ident,
        false => ($off:ident, $off_name:literal),
        true => ($on:ident, $on_name:literal),
        { $($lit:literal => $variant:ident),* $(,)? }
    ) => {
        impl $ty {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$ty] = &[$ty::$off, $ty::$on $(, $ty::$variant)*];

            /// CLI-facing name of the variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $ty::$off => $off_name,
                    $ty::$on => $on_name,
                    $($ty::$variant => $lit,)*
                }
            }

            /// `true` unless this is the `false` spelling.
            pub fn is_enabled(&self) -> bool {
                !matches!(self, $ty::$off)
            }
        }

        impl TryFrom<OptionLiteral> for $ty {
            type Error = String;

            fn try_from(literal: OptionLiteral) -> Result<Self, Self::Error> {
                match literal {
                    OptionLiteral::Flag(false) => Ok($ty::$off),
                    OptionLiteral::Flag(true) => Ok($ty::$on),
                    OptionLiteral::Name(name) => $ty::ALL
                        .iter()
                        .copied()
                        .find(|v| v.as_str() == name)
                        .ok_or_else(|| format!(
                            "unknown {} value {name:?}; expected false, true, \"{}\", \"{}\"{}",
                            stringify!($ty),
                            $off_name,
                            $on_name,
                            [$(concat!(", \"", $lit, "\"")),*].concat(),
                        )),
                }
            }
        }

        impl From<$ty> for OptionLiteral {
            fn from(value: $ty) -> Self {
                match value {
                    $ty::$off => OptionLiteral::Flag(false),
                    $ty::$on => OptionLiteral::Flag(true),
                    $($ty::$variant => OptionLiteral::Name($lit.to_string()),)*
                }
            }
        }

        impl FromStr for $ty {
            type Err = String;

            /// Accepts the CLI names plus the `false`/`true` spellings.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    "false" => Ok($ty::$off),
                    "true" => Ok($ty::$on),
                    _ => $ty::ALL
                        .iter()
                        .copied()
                        .find(|v| v.as_str() == s)
                        .ok_or_else(|| {
                            let names: Vec<&str> = $ty::ALL.iter().map(|v| v.as_str()).collect();
                            format!("unknown value {s:?}; expected one of {}", names.join(", "))
                        }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Which unrecognized object properties the engine strips from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "OptionLiteral", into = "OptionLiteral")]
pub enum RemoveAdditional {
    /// `false` — never strip.
    #[default]
    Keep,
    /// `true` — strip where `additionalProperties` is `false`.
    Declared,
    /// `"all"` — strip every undeclared property, whatever
    /// `additionalProperties` says.
    All,
    /// `"failing"` — strip where `additionalProperties` is `false` and where
    /// the property fails the `additionalProperties` subschema.
    Failing,
}

literal_option!(RemoveAdditional, false => (Keep, "keep"), true => (Declared, "declared"), {
    "all" => All,
    "failing" => Failing,
});

/// Whether the engine fills in schema `default` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "OptionLiteral", into = "OptionLiteral")]
pub enum UseDefaults {
    /// `false` — ignore `default`.
    #[default]
    Off,
    /// `true` — fill missing properties and items.
    Insert,
    /// `"empty"` — also replace `null` and `""`.
    Empty,
    /// `"shared"` — accepted for compatibility; inserts like `Insert`.
    Shared,
}

literal_option!(UseDefaults, false => (Off, "off"), true => (Insert, "insert"), {
    "empty" => Empty,
    "shared" => Shared,
});

impl UseDefaults {
    /// Whether `current` should be replaced by the declared default.
    pub fn should_fill(&self, current: Option<&Value>) -> bool {
        match (self, current) {
            (UseDefaults::Off, _) => false,
            (_, None) => true,
            (UseDefaults::Empty, Some(Value::Null)) => true,
            (UseDefaults::Empty, Some(Value::String(s))) => s.is_empty(),
            _ => false,
        }
    }
}

/// Whether the engine converts data types to match `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "OptionLiteral", into = "OptionLiteral")]
pub enum CoerceTypes {
    /// `false` — no coercion.
    #[default]
    Off,
    /// `true` — coerce between scalar types.
    Scalar,
    /// `"array"` — scalar coercion plus scalar ↔ one-element array.
    Array,
}

literal_option!(CoerceTypes, false => (Off, "off"), true => (Scalar, "scalar"), {
    "array" => Array,
});

/// Options for one assertion function.
///
/// Absent keys take their defaults. Keys not listed here are collected in
/// [`extra`](Self::extra) and handed to the engine untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssertOptions {
    pub remove_additional: RemoveAdditional,
    pub use_defaults: UseDefaults,
    pub coerce_types: CoerceTypes,
    /// Compile on first use (`true`) or inside the factory (`false`).
    pub lazy_compile: bool,
    /// Unrecognized keys, passed through to the engine.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AssertOptions {
    fn default() -> Self {
        Self {
            remove_additional: RemoveAdditional::default(),
            use_defaults: UseDefaults::default(),
            coerce_types: CoerceTypes::default(),
            lazy_compile: true,
            extra: Map::new(),
        }
    }
}

impl AssertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_remove_additional(mut self, mode: RemoveAdditional) -> Self {
        self.remove_additional = mode;
        self
    }

    pub fn with_use_defaults(mut self, mode: UseDefaults) -> Self {
        self.use_defaults = mode;
        self
    }

    pub fn with_coerce_types(mut self, mode: CoerceTypes) -> Self {
        self.coerce_types = mode;
        self
    }

    pub fn with_lazy_compile(mut self, lazy: bool) -> Self {
        self.lazy_compile = lazy;
        self
    }

    /// Add a passthrough option.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Look up a passthrough option.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Whether any option asks the engine to rewrite the data.
    pub fn mutates_input(&self) -> bool {
        self.remove_additional.is_enabled()
            || self.use_defaults.is_enabled()
            || self.coerce_types.is_enabled()
    }
}
