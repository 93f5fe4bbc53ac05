//! User-facing diagnostics.
//!
//! Every failure an adapter operation can hit ends up here, either from
//! plan-time validation or converted from an [`AdapterError`] report. An
//! operation that returns diagnostics with an error has written no state.

use std::fmt;

use error_stack::AttachmentKind;
use error_stack::FrameKind;
use error_stack::Report;
use serde::Serialize;

use crate::error::AdapterError;

/// One step in an [`AttributePath`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStep {
    /// Attribute of an object.
    Name(String),
    /// Element of a list.
    Index(usize),
    /// Entry of a map.
    Key(String),
}

/// Location of an attribute inside a configuration tree, rendered as
/// `spec.override_rules[0].overriders`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttributePath(Vec<PathStep>);

impl AttributePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn name(&self, name: impl Into<String>) -> Self {
        self.with(PathStep::Name(name.into()))
    }

    pub fn index(&self, index: usize) -> Self {
        self.with(PathStep::Index(index))
    }

    pub fn key(&self, key: impl Into<String>) -> Self {
        self.with(PathStep::Key(key.into()))
    }

    /// Path of the enclosing object; the root is its own parent.
    pub fn parent(&self) -> Self {
        let mut steps = self.0.clone();
        steps.pop();
        Self(steps)
    }

    fn with(&self, step: PathStep) -> Self {
        let mut steps = self.0.clone();
        steps.push(step);
        Self(steps)
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            match step {
                PathStep::Name(name) if i == 0 => write!(f, "{name}")?,
                PathStep::Name(name) => write!(f, ".{name}")?,
                PathStep::Index(index) => write!(f, "[{index}]")?,
                PathStep::Key(key) => write!(f, "[{key:?}]")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<AttributePath>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
            path: None,
        }
    }

    /// Attach the attribute the diagnostic is about.
    pub fn at(mut self, path: AttributePath) -> Self {
        self.path = Some(path);
        self
    }

    /// Convert an adapter error into a diagnostic carrying the full error
    /// chain as detail, followed by every printable attachment.
    pub fn from_report(report: &Report<AdapterError>) -> Self {
        let context = report.current_context();
        let mut detail = format!("{}\n\n{report:#}", context.explanation());
        for frame in report.frames() {
            if let FrameKind::Attachment(AttachmentKind::Printable(attachment)) = frame.kind() {
                detail.push_str(&format!("\n{attachment}"));
            }
        }
        Self::error(context.summary(), detail)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        };
        write!(f, "{label}: {}", self.summary)?;
        if let Some(path) = self.path.as_ref().filter(|p| !p.is_root()) {
            write!(f, "\n\n  with {path}")?;
        }
        if !self.detail.is_empty() {
            write!(f, "\n\n{}", self.detail)?;
        }
        Ok(())
    }
}

/// Ordered collection of diagnostics produced by one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn has_error(&self) -> bool {
        self.0.iter().any(Diagnostic::is_error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    /// First error diagnostic, if any.
    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.0.iter().find(|d| d.is_error())
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Self(vec![diagnostic])
    }
}

impl From<Report<AdapterError>> for Diagnostics {
    fn from(report: Report<AdapterError>) -> Self {
        Diagnostic::from_report(&report).into()
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use serde_json::json;

    use super::*;
    use crate::error::ApiVerb;
    use crate::schema::Attribute;

    #[test]
    fn path_renders_names_indices_and_keys() {
        let path = AttributePath::root()
            .name("spec")
            .name("override_rules")
            .index(0)
            .name("overriders")
            .name("labels_overrider")
            .index(2)
            .name("value")
            .key("team");

        assert_eq!(
            path.to_string(),
            r#"spec.override_rules[0].overriders.labels_overrider[2].value["team"]"#
        );
        assert_eq!(
            path.parent().to_string(),
            "spec.override_rules[0].overriders.labels_overrider[2].value"
        );
    }

    #[test]
    fn report_keeps_verb_and_cause() {
        let report = Report::new(std::io::Error::other("connection refused")).change_context(
            AdapterError::Api {
                verb: ApiVerb::Get,
                target: "default/example".to_string(),
            },
        );

        let diagnostic = Diagnostic::from_report(&report);

        assert_eq!(diagnostic.summary, "Unable to GET resource");
        assert!(diagnostic.detail.contains("GET default/example failed"));
        assert!(diagnostic.detail.contains("connection refused"));
    }

    #[test]
    fn unmarshal_detail_names_expected_and_actual_types() {
        let attributes = vec![Attribute::object(
            "spec",
            "spec",
            vec![Attribute::int64("max_clusters", "maxClusters")],
        )];
        let object = json!({"spec": {"maxClusters": "three"}});

        let report = crate::convert::from_wire(&attributes, object.as_object().unwrap()).unwrap_err();
        let diagnostic = Diagnostic::from_report(&report);

        assert_eq!(diagnostic.summary, "Unable to unmarshal resource");
        assert!(
            diagnostic.detail.contains("failed to unmarshal spec.max_clusters"),
            "{}",
            diagnostic.detail
        );
        assert!(
            diagnostic.detail.contains("expected number (integer), got string"),
            "{}",
            diagnostic.detail
        );
    }

    #[test]
    fn diagnostics_track_errors_only() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            ..Diagnostic::error("deprecated", "")
        });
        assert!(!diagnostics.has_error());

        diagnostics.push(Diagnostic::error("broken", "details"));
        assert!(diagnostics.has_error());
        assert_eq!(diagnostics.first_error().map(|d| d.summary.as_str()), Some("broken"));
    }
}
