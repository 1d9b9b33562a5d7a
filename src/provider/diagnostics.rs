//! Diagnostics returned by resource and data source operations.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    /// Attribute the diagnostic points at, if any.
    pub attribute: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        let mut d = Self::new();
        d.add_error(summary, detail);
        d
    }

    pub fn from_err(summary: impl Into<String>, err: impl std::error::Error) -> Self {
        Self::error(summary, err.to_string())
    }

    pub fn add_error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Severity::Error, summary.into(), detail.into(), None);
    }

    pub fn add_warning(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Severity::Warning, summary.into(), detail.into(), None);
    }

    pub fn add_attribute_error(&mut self, attribute: impl Into<String>, summary: impl Into<String>) {
        self.push(Severity::Error, summary.into(), String::new(), Some(attribute.into()));
    }

    fn push(&mut self, severity: Severity, summary: String, detail: String, attribute: Option<String>) {
        self.0.push(Diagnostic {
            severity,
            summary,
            detail,
            attribute,
        });
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Warning)
    }
}

impl From<crate::error::ProviderError> for Diagnostics {
    fn from(err: crate::error::ProviderError) -> Self {
        match err {
            crate::error::ProviderError::Attribute { key, reason } => {
                let mut d = Diagnostics::new();
                d.add_attribute_error(key.clone(), format!("{} {}", key, reason));
                d
            }
            other => Diagnostics::error(other.to_string(), ""),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", label, self.summary)?;
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;

    #[test]
    fn warnings_do_not_count_as_errors() {
        let mut d = Diagnostics::new();
        d.add_warning("Failed to query password policy", "marking as removed");
        assert!(!d.has_errors());
        d.add_error("boom", "");
        assert!(d.has_errors());
        assert_eq!(
            d.to_string(),
            "warning: Failed to query password policy: marking as removed\nerror: boom"
        );
    }

    #[test]
    fn attribute_errors_keep_the_key() {
        let d: Diagnostics = ProviderError::Attribute {
            key: "name".into(),
            reason: "is required".into(),
        }
        .into();
        let first = d.errors().next().cloned();
        assert_eq!(first.and_then(|e| e.attribute), Some("name".to_string()));
    }
}
