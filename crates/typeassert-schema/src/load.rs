//! # Document Loading
//!
//! Reads schemas, data documents and option files from disk. The format is
//! chosen by extension: `.yaml`/`.yml` are parsed as YAML and converted into
//! the equivalent JSON value tree; anything else is parsed as JSON.

use std::path::Path;

use serde_json::Value;
use typeassert_core::{AssertOptions, TypeAssertError};

/// Load a JSON or YAML document as a `serde_json::Value`.
///
/// # Errors
///
/// Returns `TypeAssertError::DocumentLoad` if the file cannot be read or
/// parsed.
pub fn load_document(path: &Path) -> Result<Value, TypeAssertError> {
    let content = std::fs::read_to_string(path).map_err(|e| TypeAssertError::DocumentLoad {
        path: path.display().to_string(),
        reason: format!("cannot read file: {e}"),
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "yaml" | "yml" => {
            let yaml_value: serde_yaml::Value =
                serde_yaml::from_str(&content).map_err(|e| TypeAssertError::DocumentLoad {
                    path: path.display().to_string(),
                    reason: format!("invalid YAML: {e}"),
                })?;
            yaml_to_json_value(&yaml_value).map_err(|reason| TypeAssertError::DocumentLoad {
                path: path.display().to_string(),
                reason: format!("YAML-to-JSON conversion failed: {reason}"),
            })
        }
        _ => serde_json::from_str(&content).map_err(|e| TypeAssertError::DocumentLoad {
            path: path.display().to_string(),
            reason: format!("invalid JSON: {e}"),
        }),
    }
}

/// Load [`AssertOptions`] from a JSON or YAML file.
///
/// # Errors
///
/// Returns `TypeAssertError::DocumentLoad` if the file cannot be read or if
/// an option has a value outside its documented set.
pub fn load_options(path: &Path) -> Result<AssertOptions, TypeAssertError> {
    let value = load_document(path)?;
    serde_json::from_value(value).map_err(|e| TypeAssertError::DocumentLoad {
        path: path.display().to_string(),
        reason: format!("invalid options: {e}"),
    })
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Tags are dropped (the inner value is kept); scalar map keys are
/// stringified.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Tagged(tagged) => return yaml_to_json_value(&tagged.value),
        Yaml::Null => Value::Null,
        Yaml::Bool(flag) => Value::Bool(*flag),
        Yaml::String(text) => Value::String(text.clone()),
        Yaml::Number(number) => yaml_number(number)?,
        Yaml::Sequence(items) => Value::Array(
            items
                .iter()
                .map(yaml_to_json_value)
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, value)| -> Result<(String, Value), String> {
                    Ok((yaml_key(key)?, yaml_to_json_value(value)?))
                })
                .collect::<Result<_, _>>()?,
        ),
    })
}

fn yaml_number(number: &serde_yaml::Number) -> Result<Value, String> {
    if let Some(signed) = number.as_i64() {
        return Ok(Value::from(signed));
    }
    if let Some(unsigned) = number.as_u64() {
        return Ok(Value::from(unsigned));
    }
    number
        .as_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| format!("number {number} has no JSON representation"))
}

fn yaml_key(key: &serde_yaml::Value) -> Result<String, String> {
    match key {
        serde_yaml::Value::String(text) => Ok(text.clone()),
        serde_yaml::Value::Number(number) => Ok(number.to_string()),
        serde_yaml::Value::Bool(flag) => Ok(flag.to_string()),
        serde_yaml::Value::Tagged(tagged) => yaml_key(&tagged.value),
        other => Err(format!("map key {other:?} is not a scalar")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use typeassert_core::{RemoveAdditional, UseDefaults};

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_json_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "data.json", r#"{"n": 1, "tags": ["a"]}"#);
        assert_eq!(load_document(&path).unwrap(), json!({"n": 1, "tags": ["a"]}));
    }

    #[test]
    fn test_load_yaml_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "schema.yaml",
            "type: object\nproperties:\n  n:\n    type: number\nrequired: [n]\n",
        );
        assert_eq!(
            load_document(&path).unwrap(),
            json!({"type": "object", "properties": {"n": {"type": "number"}}, "required": ["n"]})
        );
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "bad.json", "{not json");
        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, TypeAssertError::DocumentLoad { .. }));
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_document(Path::new("/nonexistent/typeassert/data.json")).unwrap_err();
        assert!(err.to_string().contains("cannot read file"));
    }

    #[test]
    fn test_load_options_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "options.yml",
            "removeAdditional: failing\nuseDefaults: empty\nallErrors: true\n",
        );
        let opts = load_options(&path).unwrap();
        assert_eq!(opts.remove_additional, RemoveAdditional::Failing);
        assert_eq!(opts.use_defaults, UseDefaults::Empty);
        assert_eq!(opts.extra("allErrors"), Some(&json!(true)));
    }

    #[test]
    fn test_load_options_rejects_unknown_literal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "options.json", r#"{"coerceTypes": "object"}"#);
        let err = load_options(&path).unwrap_err();
        assert!(err.to_string().contains("invalid options"));
    }

    #[test]
    fn test_yaml_to_json_conversion() {
        let yaml_str = r#"
name: example
version: "1.0.0"
count: 42
ratio: 0.5
enabled: true
1: numeric-key
items:
  - one
  - !tagged two
"#;
        let yaml_value: serde_yaml::Value = serde_yaml::from_str(yaml_str).unwrap();
        let json_value = yaml_to_json_value(&yaml_value).unwrap();

        assert_eq!(json_value["name"], "example");
        assert_eq!(json_value["version"], "1.0.0");
        assert_eq!(json_value["count"], 42);
        assert_eq!(json_value["ratio"], 0.5);
        assert_eq!(json_value["enabled"], true);
        assert_eq!(json_value["1"], "numeric-key");
        assert_eq!(json_value["items"][1], "two");
    }

    #[test]
    fn test_yaml_non_finite_number_rejected() {
        let yaml_value: serde_yaml::Value = serde_yaml::from_str("ratio: .nan\n").unwrap();
        let err = yaml_to_json_value(&yaml_value).unwrap_err();
        assert!(err.contains("no JSON representation"), "{err}");
    }
}
