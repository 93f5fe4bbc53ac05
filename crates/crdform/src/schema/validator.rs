use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::diag::AttributePath;
use crate::diag::Diagnostic;

/// Value-level check attached to an attribute.
///
/// String and integer validators skip null values and values of another
/// type; type mismatches are reported by the tree walk itself. Cross-field
/// validators always run, because their point is to look at unset siblings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Validator {
    LengthAtLeast { min: usize },
    LengthBetween { min: usize, max: usize },
    OneOf { values: &'static [&'static str] },
    Base64,
    Int64AtLeast { min: i64 },
    Int64Between { min: i64, max: i64 },
    /// Exactly one of this attribute and the named siblings must be set.
    ExactlyOneOf { siblings: &'static [&'static str] },
    /// None of the named siblings may be set together with this attribute.
    ConflictsWith { siblings: &'static [&'static str] },
}

/// Everything a validator gets to see about one attribute.
pub struct FieldContext<'a> {
    pub path: &'a AttributePath,
    pub name: &'a str,
    pub value: &'a Value,
    /// The object holding the attribute, so cross-field checks can look at
    /// the other attributes.
    pub siblings: &'a Map<String, Value>,
}

impl FieldContext<'_> {
    fn sibling_is_set(&self, name: &str) -> bool {
        self.siblings.get(name).is_some_and(|v| !v.is_null())
    }

    fn sibling_path(&self, name: &str) -> AttributePath {
        self.path.parent().name(name)
    }
}

impl Validator {
    pub fn check(&self, ctx: &FieldContext<'_>) -> Option<Diagnostic> {
        let path = ctx.path;
        match self {
            Self::LengthAtLeast { min } => {
                let len = ctx.value.as_str()?.chars().count();
                (len < *min).then(|| {
                    invalid_length(path, format!("at least {min}"), len)
                })
            }
            Self::LengthBetween { min, max } => {
                let len = ctx.value.as_str()?.chars().count();
                (len < *min || len > *max).then(|| {
                    invalid_length(path, format!("between {min} and {max}"), len)
                })
            }
            Self::OneOf { values } => {
                let value = ctx.value.as_str()?;
                (!values.contains(&value)).then(|| {
                    let allowed = values
                        .iter()
                        .map(|v| format!("{v:?}"))
                        .collect::<Vec<_>>()
                        .join(" ");
                    Diagnostic::error(
                        "Invalid Attribute Value Match",
                        format!("Attribute {path} value must be one of: [{allowed}], got: {value:?}"),
                    )
                    .at(path.clone())
                })
            }
            Self::Base64 => {
                let value = ctx.value.as_str()?;
                STANDARD.decode(value).err().map(|e| {
                    Diagnostic::error(
                        "Invalid Attribute Value",
                        format!("Attribute {path} must be a base64 encoded string, got: {e}"),
                    )
                    .at(path.clone())
                })
            }
            Self::Int64AtLeast { min } => {
                let value = ctx.value.as_i64()?;
                (value < *min).then(|| {
                    invalid_value(path, format!("at least {min}"), value)
                })
            }
            Self::Int64Between { min, max } => {
                let value = ctx.value.as_i64()?;
                (value < *min || value > *max).then(|| {
                    invalid_value(path, format!("between {min} and {max}"), value)
                })
            }
            Self::ExactlyOneOf { siblings } => {
                let mut set = usize::from(!ctx.value.is_null());
                set += siblings.iter().filter(|s| ctx.sibling_is_set(s)).count();
                if set == 1 {
                    return None;
                }
                let group = std::iter::once(path.clone())
                    .chain(siblings.iter().map(|s| ctx.sibling_path(s)))
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                let detail = if set == 0 {
                    format!("No attribute specified when one (and only one) of [{group}] is required")
                } else {
                    format!("{set} attributes specified when one (and only one) of [{group}] is required")
                };
                Some(Diagnostic::error("Invalid Attribute Combination", detail).at(path.clone()))
            }
            Self::ConflictsWith { siblings } => {
                if ctx.value.is_null() {
                    return None;
                }
                let conflicting = siblings.iter().find(|s| ctx.sibling_is_set(s))?;
                Some(
                    Diagnostic::error(
                        "Invalid Attribute Combination",
                        format!(
                            "Attribute \"{}\" cannot be specified when \"{path}\" is specified",
                            ctx.sibling_path(conflicting)
                        ),
                    )
                    .at(path.clone()),
                )
            }
        }
    }
}

fn invalid_length(path: &AttributePath, bound: String, len: usize) -> Diagnostic {
    Diagnostic::error(
        "Invalid Attribute Value Length",
        format!("Attribute {path} string length must be {bound}, got: {len}"),
    )
    .at(path.clone())
}

fn invalid_value(path: &AttributePath, bound: String, value: i64) -> Diagnostic {
    Diagnostic::error(
        "Invalid Attribute Value",
        format!("Attribute {path} value must be {bound}, got: {value}"),
    )
    .at(path.clone())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use similar_asserts::assert_eq;

    use super::*;

    fn check(validator: &Validator, name: &str, object: Value) -> Option<Diagnostic> {
        let siblings = object.as_object().cloned().unwrap_or_default();
        let path = AttributePath::root().name("spec").name(name);
        let value = siblings.get(name).cloned().unwrap_or(Value::Null);
        validator.check(&FieldContext {
            path: &path,
            name,
            value: &value,
            siblings: &siblings,
        })
    }

    #[test]
    fn one_of_names_allowed_values() {
        let validator = Validator::OneOf {
            values: &["Duplicate", "Divide"],
        };
        assert!(check(&validator, "mode", json!({"mode": "Divide"})).is_none());

        let diagnostic = check(&validator, "mode", json!({"mode": "Whatever"})).expect("rejected");
        assert_eq!(
            diagnostic.detail,
            r#"Attribute spec.mode value must be one of: ["Duplicate" "Divide"], got: "Whatever""#
        );
    }

    #[test]
    fn length_counts_characters() {
        let validator = Validator::LengthBetween { min: 1, max: 3 };
        assert!(check(&validator, "name", json!({"name": "äöü"})).is_none());
        assert!(check(&validator, "name", json!({"name": ""})).is_some());
        assert!(check(&validator, "name", json!({"name": "abcd"})).is_some());
        assert!(check(&validator, "name", json!({})).is_none());
    }

    #[test]
    fn base64_requires_padded_standard_alphabet() {
        let validator = Validator::Base64;
        assert!(check(&validator, "ca", json!({"ca": "aGVsbG8="})).is_none());
        assert!(check(&validator, "ca", json!({"ca": "not base64!"})).is_some());
    }

    #[test]
    fn integer_bounds() {
        let validator = Validator::Int64Between { min: 1, max: 30 };
        assert!(check(&validator, "timeout", json!({"timeout": 10})).is_none());
        let diagnostic = check(&validator, "timeout", json!({"timeout": 31})).expect("rejected");
        assert_eq!(
            diagnostic.detail,
            "Attribute spec.timeout value must be between 1 and 30, got: 31"
        );
    }

    #[test]
    fn exactly_one_of_counts_siblings() {
        let validator = Validator::ExactlyOneOf {
            siblings: &["service"],
        };
        assert!(check(&validator, "url", json!({"url": "https://x"})).is_none());
        assert!(check(&validator, "url", json!({"service": {"name": "a"}})).is_none());

        let none = check(&validator, "url", json!({})).expect("none set");
        assert_eq!(
            none.detail,
            "No attribute specified when one (and only one) of [spec.url,spec.service] is required"
        );
        let both = check(
            &validator,
            "url",
            json!({"url": "https://x", "service": {"name": "a"}}),
        )
        .expect("both set");
        assert!(both.detail.starts_with("2 attributes specified"));
    }

    #[test]
    fn conflicts_with_only_fires_when_set() {
        let validator = Validator::ConflictsWith {
            siblings: &["spread_by_label"],
        };
        assert!(check(
            &validator,
            "spread_by_field",
            json!({"spread_by_label": "zone"})
        )
        .is_none());
        assert!(check(
            &validator,
            "spread_by_field",
            json!({"spread_by_field": "region", "spread_by_label": "zone"})
        )
        .is_some());
    }
}
