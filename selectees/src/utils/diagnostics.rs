//! Diagnostic artifacts: the filtered document map and untouched source pages.
use std::{
  fs::{self, File},
  io::{BufWriter, Write},
  path::{Path, PathBuf},
};

use log::{info, warn};
use selectees_html::ReportId;

use crate::{
  error::{Result, SelecteesError},
  utils::select::Selection,
};

/// Write the selected entries as a JSON document map, in selection order.
///
/// The file can be passed back as the archive in place of the zip.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_document_map(path: &Path, selection: &Selection<'_>) -> Result<()> {
  create_parent(path)?;
  let write_error = |source| {
    SelecteesError::Write {
      path: path.to_path_buf(),
      source,
    }
  };

  let mut out = BufWriter::new(File::create(path).map_err(write_error)?);
  serde_json::to_writer(&mut out, &selection.to_document_map())
    .map_err(|e| write_error(e.into()))?;
  out.flush().map_err(write_error)?;

  info!(
    "Wrote {} documents to {}",
    selection.len(),
    path.display()
  );
  Ok(())
}

/// Write the source HTML of each of `reports` to `<dir>/<report>.html`.
///
/// Reports that were not selected are skipped with a warning. Returns the
/// paths written.
///
/// # Errors
///
/// Returns an error if the directory or a file cannot be written.
pub fn write_raw_reports(
  dir: &Path,
  selection: &Selection<'_>,
  reports: &[ReportId],
) -> Result<Vec<PathBuf>> {
  fs::create_dir_all(dir).map_err(|source| {
    SelecteesError::Write {
      path: dir.to_path_buf(),
      source,
    }
  })?;

  let mut written = Vec::with_capacity(reports.len());
  for report in reports {
    let Some(source) = selection.reports.get(report) else {
      warn!("{report} is not among the selected reports; skipping");
      continue;
    };

    let path = dir.join(format!("{report}.html"));
    fs::write(&path, source.html).map_err(|source| {
      SelecteesError::Write {
        path: path.clone(),
        source,
      }
    })?;
    info!("Wrote source of {report} ({}) to {}", source.key, path.display());
    written.push(path);
  }

  Ok(written)
}

fn create_parent(path: &Path) -> Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent).map_err(|source| {
      SelecteesError::Write {
        path: parent.to_path_buf(),
        source,
      }
    })?;
  }
  Ok(())
}
