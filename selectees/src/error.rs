use std::{io, path::PathBuf};

use selectees_config::ConfigError;
use selectees_html::{ReportId, TransformError};
use thiserror::Error;

/// Error type for the selectees pipeline.
#[derive(Debug, Error)]
pub enum SelecteesError {
  #[error("Failed to read archive {}: {source}", .path.display())]
  ArchiveIo {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Not a valid zip archive: {}: {source}", .path.display())]
  Zip {
    path:   PathBuf,
    #[source]
    source: zip::result::ZipError,
  },

  #[error("Archive {} has no entry named {entry:?}", .path.display())]
  MissingEntry { path: PathBuf, entry: String },

  #[error("Malformed document map in {}: {source}", .path.display())]
  Json {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error(
    "{} selected report(s) missing from the archive: {}",
    .0.len(),
    join_ids(.0)
  )]
  MissingReports(Vec<ReportId>),

  #[error("{report} is matched by more than one archive key: {first:?} and {second:?}")]
  DuplicateReport {
    report: ReportId,
    first:  String,
    second: String,
  },

  #[error("{} report(s) failed the structure check: {}", .0.len(), join_ids(.0))]
  Structure(Vec<ReportId>),

  #[error("Failed to read {}: {source}", .path.display())]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to write {}: {source}", .path.display())]
  Write {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error(transparent)]
  Transform(#[from] TransformError),

  #[error(transparent)]
  Config(#[from] ConfigError),
}

/// Result type for the selectees pipeline.
pub type Result<T> = std::result::Result<T, SelecteesError>;

fn join_ids(ids: &[ReportId]) -> String {
  ids
    .iter()
    .map(ReportId::as_str)
    .collect::<Vec<_>>()
    .join(", ")
}
