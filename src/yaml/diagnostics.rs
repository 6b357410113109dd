//! Rich diagnostics for malformed record files
//!
//! Records are routinely hand-edited, so parse failures point at the
//! offending line and, where the message is recognisable, suggest a fix.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A record file that failed to parse, with the failing location labelled.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(qmt::record::parse))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    message: String,
}

impl YamlSyntaxError {
    /// Wrap a serde_yml error with the source it came from.
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = match err.location() {
            Some(loc) => (loc.line(), loc.column()),
            None => (1, 1),
        };
        let message = err.to_string();

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: span_at(source, line, column),
            help: advice_for(&message),
            message,
        }
    }
}

/// Errors from reading or parsing a record file
#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Byte span of the character at a 1-based line/column position.
fn span_at(source: &str, line: usize, column: usize) -> SourceSpan {
    let mut offset = 0;
    for (n, text) in source.split_inclusive('\n').enumerate() {
        if n + 1 == line {
            let width = text.trim_end_matches('\n').len();
            offset += column.saturating_sub(1).min(width);
            break;
        }
        offset += text.len();
    }

    let start = offset.min(source.len().saturating_sub(1));
    let len = usize::from(!source.is_empty());
    SourceSpan::new(start.into(), len)
}

/// Fix suggestions keyed on fragments of serde_yml error messages.
const ADVICE: &[(&str, &str)] = &[
    ("tab", "indent with spaces; YAML does not allow tabs"),
    ("duplicate key", "a field appears twice in this record; keep one"),
    (
        "expected block end",
        "check the indentation of the lines above this one",
    ),
    (
        "mapping values are not allowed",
        "add a space after ':' or fix the indentation",
    ),
    (
        "found unexpected ':'",
        "quote values that contain colons: \"ISO 9001: scope\"",
    ),
    (
        "unknown field",
        "this field is not part of the record type; compare against a freshly created record",
    ),
    (
        "invalid type",
        "the value does not match the field's type (e.g. text where a number is expected)",
    ),
];

fn advice_for(message: &str) -> Option<String> {
    let lower = message.to_lowercase();
    ADVICE
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, advice)| (*advice).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_at_start_of_lines() {
        let source = "id: RISK-1\nstatus: open\ntitle: x";
        assert_eq!(span_at(source, 1, 1).offset(), 0);
        assert_eq!(span_at(source, 2, 1).offset(), 11);
        assert_eq!(span_at(source, 3, 1).offset(), 24);
    }

    #[test]
    fn test_span_at_clamps_past_line_end() {
        let source = "ab\ncd";
        assert_eq!(span_at(source, 1, 99).offset(), 2);
    }

    #[test]
    fn test_advice_lookup() {
        assert!(advice_for("found character '\\t' that cannot start any token").is_some());
        assert!(advice_for("duplicate key in mapping").is_some());
        assert!(advice_for("unknown field `scoree`").is_some());
        assert!(advice_for("something inscrutable").is_none());
    }

    #[test]
    fn test_from_serde_error_carries_source() {
        let source = "likelihood: [3\n";
        let err = serde_yml::from_str::<serde_yml::Value>(source).unwrap_err();
        let diag = YamlSyntaxError::from_serde_error(&err, source, "RISK-x.qmt.yaml");
        assert!(!diag.message.is_empty());
    }
}
