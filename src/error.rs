use std::{
    error::Error,
    fmt::Display,
    num::{ParseFloatError, ParseIntError},
    sync::Arc,
};

use miette::{Diagnostic, SourceSpan};
use thiserror::Error as ThisError;

/// The toplevel error type for this crate: returned when a config document
/// (or a single literal value) failed to parse.
///
/// This diagnostic implements [`miette::Diagnostic`] and can be used to
/// display detailed, pretty-printed diagnostic messages when using
/// [`miette::Result`] and the `"fancy"` feature flag for `miette`:
///
/// ```no_run
/// fn main() -> miette::Result<()> {
///     "[section]\nitem = open('x')".parse::<inidot::IniContainer>()?;
///     Ok(())
/// }
/// ```
///
/// This will display a message like:
/// ```text
/// Error:
///   × Failed to parse INI config
///   ╰─▶   × not a valid literal value
///          ╭─[2:8]
///        1 │ [section]
///        2 │ item = open('x')
///          ·        ┬
///          ·        ╰── not a literal
///          ╰────
/// ```
#[derive(Debug, Diagnostic, Clone, Eq, PartialEq)]
pub struct IniParseFailure {
    /// Original input that this failure came from.
    #[source_code]
    pub input: Arc<String>,

    /// Sub-diagnostics for this failure. Parsing is fail-fast, so this holds
    /// exactly one diagnostic for the first malformed line.
    #[related]
    pub diagnostics: Vec<IniDiagnostic>,
}

impl Display for IniParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse INI config")
    }
}
impl Error for IniParseFailure {}

/// An individual diagnostic message for a config parsing issue.
#[derive(Debug, Diagnostic, Clone, Eq, PartialEq)]
pub struct IniDiagnostic {
    /// Shared source for the diagnostic.
    #[source_code]
    pub input: Arc<String>,

    /// Offset in chars of the error.
    #[label("{}", label.clone().unwrap_or_else(|| "here".into()))]
    pub span: SourceSpan,

    /// Label text for this span. Defaults to `"here"`.
    pub label: Option<String>,

    /// Suggestion for fixing the parser error.
    #[help]
    pub help: Option<String>,

    /// Severity level for the Diagnostic.
    #[diagnostic(severity)]
    pub severity: miette::Severity,

    /// Specific error kind for this diagnostic.
    pub kind: IniErrorKind,
}

impl Display for IniDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}
impl Error for IniDiagnostic {}

/// A type-erased sub-error kind, attached to an [`IniDiagnostic`].
///
/// The structural variants (`MismatchedSectionBrackets`, `SectionDepthJump`,
/// `ItemOutsideSection`, `UnrecognizedLine`) report malformed document shape;
/// the remaining variants report malformed literal values.
#[derive(Debug, ThisError, Clone, Eq, PartialEq)]
pub enum IniErrorKind {
    /// Error occurred while parsing an integer.
    #[error(transparent)]
    ParseIntError(ParseIntError),

    /// Error occurred while parsing a floating point number.
    #[error(transparent)]
    ParseFloatError(ParseFloatError),

    /// The text under an `=` is not part of the literal grammar.
    #[error("not a valid literal value")]
    InvalidLiteral,

    /// Composite literals were nested past the configured depth limit.
    #[error("literal nesting exceeds the configured depth limit")]
    LiteralNestingTooDeep,

    /// A section header's opening and closing bracket counts differ.
    #[error("mismatched brackets in section header")]
    MismatchedSectionBrackets,

    /// A header opened a subsection more than one level below the innermost
    /// open section.
    #[error("section header skips a nesting level")]
    SectionDepthJump,

    /// An item definition appeared before any section header.
    #[error("item defined outside of any section")]
    ItemOutsideSection,

    /// A line that is not a header, item, comment, or blank.
    #[error("line is not a section header, item definition, or comment")]
    UnrecognizedLine,

    /// Generic parsing error. The given context string denotes the component
    /// that failed to parse.
    #[error("Expected {0}.")]
    Context(&'static str),

    /// Generic unspecified error. If this is returned, the call site should
    /// be annotated with context, if possible.
    #[error("an unspecified parse error occurred")]
    Other,
}

/// Returned by [`IniContainer::update`](crate::IniContainer::update) when the
/// overlay and base trees hold entries of different kinds under the same
/// name. The merge is all-or-nothing: when this error is returned, the base
/// tree has not been modified.
#[derive(Debug, ThisError, Diagnostic, Clone, Eq, PartialEq)]
#[error("cannot merge {overlay_kind} `{path}` into existing {base_kind}")]
#[diagnostic(help("items and sections of the same name cannot replace one another; rename or remove one side"))]
pub struct MergeError {
    /// Dotted path of the conflicting entry, e.g. `section.subsection.item`.
    pub path: String,

    /// What the base tree holds at `path`.
    pub base_kind: EntryKind,

    /// What the overlay tree holds at `path`.
    pub overlay_kind: EntryKind,
}

/// The two kinds of entry a container can hold. Used in merge conflict
/// reports.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EntryKind {
    /// A `name = value` item.
    Item,
    /// A `[section]` container.
    Section,
}

impl Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::Item => write!(f, "item"),
            EntryKind::Section => write!(f, "section"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn parse_failure() {
        let failure = IniParseFailure {
            input: Default::default(),
            diagnostics: Default::default(),
        };

        assert_eq!(failure.to_string(), "Failed to parse INI config");
        assert!(failure.source().is_none());
    }

    #[test]
    fn diagnostic() {
        let diagnostic = IniDiagnostic {
            input: Default::default(),
            span: SourceSpan::new(0.into(), 1),
            label: Default::default(),
            help: Default::default(),
            severity: Default::default(),
            kind: IniErrorKind::ItemOutsideSection,
        };

        assert_eq!(diagnostic.to_string(), "item defined outside of any section");
        assert!(diagnostic.source().is_none());
    }

    #[test]
    fn merge_error() {
        let err = MergeError {
            path: "db.port".into(),
            base_kind: EntryKind::Section,
            overlay_kind: EntryKind::Item,
        };
        assert_eq!(
            err.to_string(),
            "cannot merge item `db.port` into existing section"
        );
    }
}
