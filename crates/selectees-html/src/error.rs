use std::io;

use thiserror::Error;

use crate::types::ReportId;

/// A string that is not a well-formed report identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid report identifier: {0:?}")]
pub struct ReportIdError(pub String);

/// A fixed-markup precondition that a source document failed to meet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
  #[error("expected exactly one `{selector}` element, found {found}")]
  ElementCount {
    selector: &'static str,
    found:    usize,
  },

  #[error("content container has no parent element")]
  OrphanContainer,

  #[error("no \"Related Materials\" marker in the content container")]
  MissingRelatedMaterials,

  #[error("no `div.w-100` follows the \"Related Materials\" marker")]
  MissingRelatedMaterialsBlock,

  #[error(
    "scroll-to-top icon is not wrapped inside an `h5` that contains a \
     `strong` caption"
  )]
  MisplacedScrollTopIcon,
}

/// Error type for report transformation.
#[derive(Debug, Error)]
pub enum TransformError {
  #[error("{report}: {violation}")]
  Schema {
    report:    ReportId,
    violation: SchemaViolation,
  },

  #[error("{report}: failed to build rewrite patterns: {source}")]
  Pattern {
    report: ReportId,
    #[source]
    source: regex::Error,
  },

  #[error("{report}: failed to serialize fragment: {source}")]
  Serialize {
    report: ReportId,
    #[source]
    source: io::Error,
  },
}

impl TransformError {
  /// Identifier of the report that failed.
  #[must_use]
  pub const fn report(&self) -> &ReportId {
    match self {
      Self::Schema { report, .. }
      | Self::Pattern { report, .. }
      | Self::Serialize { report, .. } => report,
    }
  }
}

/// Result type for report transformation.
pub type TransformResult<T> = Result<T, TransformError>;
