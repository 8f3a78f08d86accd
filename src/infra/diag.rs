//! Per-invocation diagnostics collection.
//!
//! Components take an explicit `&mut Diagnostics` instead of logging into a
//! global sink, so callers (and tests) can inspect exactly what one
//! alignment or leverage pass reported. Every entry is still forwarded to
//! `tracing` so normal log output keeps working.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// One recorded anomaly, with enough context for manual follow-up.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Id or name of the text unit the entry is about, when known
    pub unit: Option<String>,
    pub message: String,
}

/// Collects warnings/errors for one engine invocation.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, unit: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(unit = unit.unwrap_or("-"), "{message}");
        self.entries.push(Diagnostic {
            severity: Severity::Warning,
            unit: unit.map(str::to_owned),
            message,
        });
    }

    pub fn error(&mut self, unit: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(unit = unit.unwrap_or("-"), "{message}");
        self.entries.push(Diagnostic {
            severity: Severity::Error,
            unit: unit.map(str::to_owned),
            message,
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Fold another collector's entries into this one (used when joining
    /// per-document passes run in parallel).
    pub fn merge(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_recorded_in_order() {
        let mut diag = Diagnostics::new();
        diag.warn(Some("u1"), "first");
        diag.error(None, "second");

        assert_eq!(diag.len(), 2);
        assert_eq!(diag.entries()[0].severity, Severity::Warning);
        assert_eq!(diag.entries()[0].unit.as_deref(), Some("u1"));
        assert_eq!(diag.entries()[1].severity, Severity::Error);
        assert_eq!(diag.warnings().count(), 1);
    }

    #[test]
    fn merge_appends() {
        let mut a = Diagnostics::new();
        a.warn(Some("u1"), "one");
        let mut b = Diagnostics::new();
        b.warn(Some("u2"), "two");
        a.merge(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.entries()[1].unit.as_deref(), Some("u2"));
    }
}
