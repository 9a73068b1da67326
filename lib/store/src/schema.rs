//! Schema oracle — validate-or-fail for persisted documents.
//!
//! Every persisted document kind binds to one schema: structural conformance
//! comes from serde, domain invariants from `check()`. Validation runs on
//! both write and read, so short of external tampering the store never holds
//! a value that fails its own schema.

use serde::{Serialize, de::DeserializeOwned};

/// A single validation issue: where in the document, and what is wrong.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaIssue {
    pub path: String,
    pub message: String,
}

impl SchemaIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// The stored or supplied value does not conform to its document schema.
#[derive(Debug, Clone)]
pub struct SchemaError {
    /// Which document kind was being validated.
    pub kind: &'static str,
    pub issues: Vec<SchemaIssue>,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed validation:", self.kind)?;
        for issue in &self.issues {
            if issue.path.is_empty() {
                write!(f, " {};", issue.message)?;
            } else {
                write!(f, " {}: {};", issue.path, issue.message)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for SchemaError {}

/// A persisted document kind: a serde shape plus domain invariants.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Document kind name, used in logs and validation errors.
    fn kind() -> &'static str;

    /// Domain invariants beyond structural shape. Empty means valid.
    fn check(&self) -> Vec<SchemaIssue> {
        Vec::new()
    }

    /// Validate an untyped JSON value into this document kind.
    fn validate(value: serde_json::Value) -> Result<Self, SchemaError> {
        let doc: Self = serde_json::from_value(value).map_err(|e| SchemaError {
            kind: Self::kind(),
            issues: vec![SchemaIssue::new("", e.to_string())],
        })?;
        doc.checked()?;
        Ok(doc)
    }

    /// Run `check()` on an already-typed value, failing on any issue.
    fn checked(&self) -> Result<(), SchemaError> {
        let issues = self.check();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(SchemaError {
                kind: Self::kind(),
                issues,
            })
        }
    }
}

/// JSON arrays validate element-wise; the element index prefixes each issue path.
impl<T: Document> Document for Vec<T> {
    fn kind() -> &'static str {
        T::kind()
    }

    fn check(&self) -> Vec<SchemaIssue> {
        let mut issues = Vec::new();
        for (i, item) in self.iter().enumerate() {
            for issue in item.check() {
                issues.push(SchemaIssue::new(
                    join_path(&format!("[{}]", i), &issue.path),
                    issue.message,
                ));
            }
        }
        issues
    }
}

/// Bare strings are a valid document (the font-name cache is `Vec<String>`).
impl Document for String {
    fn kind() -> &'static str {
        "string"
    }
}

/// Join an issue path onto a parent path: `label` + `size.width` →
/// `label.size.width`, `[0]` + `width` → `[0].width`.
pub(crate) fn join_path(prefix: &str, path: &str) -> String {
    if path.is_empty() {
        prefix.to_string()
    } else if path.starts_with('[') {
        format!("{}{}", prefix, path)
    } else {
        format!("{}.{}", prefix, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Gauge {
        level: i32,
    }

    impl Document for Gauge {
        fn kind() -> &'static str {
            "gauge"
        }

        fn check(&self) -> Vec<SchemaIssue> {
            if self.level < 0 {
                vec![SchemaIssue::new("level", "must not be negative")]
            } else {
                Vec::new()
            }
        }
    }

    #[test]
    fn validate_conforming_value() {
        let value = serde_json::json!({"level": 3});
        let gauge = Gauge::validate(value).unwrap();
        assert_eq!(gauge, Gauge { level: 3 });
    }

    #[test]
    fn validate_wrong_shape_reports_kind() {
        let value = serde_json::json!({"level": "high"});
        let err = Gauge::validate(value).unwrap_err();
        assert_eq!(err.kind, "gauge");
        assert_eq!(err.issues.len(), 1);
    }

    #[test]
    fn validate_domain_invariant() {
        let value = serde_json::json!({"level": -1});
        let err = Gauge::validate(value).unwrap_err();
        assert_eq!(err.issues[0].path, "level");
    }

    #[test]
    fn checked_passes_valid_typed_value() {
        assert!(Gauge { level: 0 }.checked().is_ok());
        assert!(Gauge { level: -5 }.checked().is_err());
    }

    #[test]
    fn vec_elements_validate_with_index_path() {
        let value = serde_json::json!([{"level": 1}, {"level": -2}]);
        let err = Vec::<Gauge>::validate(value).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].path, "[1].level");
    }

    #[test]
    fn string_vec_is_a_document() {
        let value = serde_json::json!(["Arial", "Courier"]);
        let fonts = Vec::<String>::validate(value).unwrap();
        assert_eq!(fonts, vec!["Arial".to_string(), "Courier".to_string()]);
    }

    #[test]
    fn display_lists_issues() {
        let err = SchemaError {
            kind: "gauge",
            issues: vec![
                SchemaIssue::new("level", "must not be negative"),
                SchemaIssue::new("", "something else"),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("gauge"));
        assert!(text.contains("level: must not be negative"));
        assert!(text.contains("something else"));
    }

    #[test]
    fn join_path_rules() {
        assert_eq!(join_path("label", "size.width"), "label.size.width");
        assert_eq!(join_path("[0]", "width"), "[0].width");
        assert_eq!(join_path("[2]", ""), "[2]");
        assert_eq!(join_path("label", "[0]"), "label[0]");
    }
}
