//! Joining the boilerplate and the report fragments into one document.
use std::{
  fs::{self, File},
  io::{self, BufWriter, Write},
  path::Path,
};

use log::info;
use selectees_config::CollatePaths;
use selectees_html::Fragment;

use crate::error::{Result, SelecteesError};

/// Hand-authored HTML copied verbatim around the fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Boilerplate {
  pub head: String,
  pub toc:  String,
  pub tail: String,
}

impl Boilerplate {
  /// Read the head, table of contents and tail files.
  ///
  /// # Errors
  ///
  /// Returns an error naming the first file that cannot be read.
  pub fn read(paths: &CollatePaths) -> Result<Self> {
    let read = |path: &Path| {
      fs::read_to_string(path).map_err(|source| {
        SelecteesError::Read {
          path: path.to_path_buf(),
          source,
        }
      })
    };

    Ok(Self {
      head: read(&paths.head)?,
      toc:  read(&paths.toc)?,
      tail: read(&paths.tail)?,
    })
  }
}

/// Write head, table of contents, each fragment preceded by `separator`, then
/// the tail.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn collate_into<W: Write>(
  out: &mut W,
  boilerplate: &Boilerplate,
  fragments: &[Fragment],
  separator: &str,
) -> io::Result<()> {
  out.write_all(boilerplate.head.as_bytes())?;
  out.write_all(boilerplate.toc.as_bytes())?;
  for fragment in fragments {
    out.write_all(separator.as_bytes())?;
    out.write_all(fragment.html.as_bytes())?;
  }
  out.write_all(boilerplate.tail.as_bytes())
}

/// Collate into a file, creating its parent directories as needed.
///
/// # Errors
///
/// Returns an error if the directories or the file cannot be written.
pub fn write_collated(
  path: &Path,
  boilerplate: &Boilerplate,
  fragments: &[Fragment],
  separator: &str,
) -> Result<()> {
  let write_error = |source| {
    SelecteesError::Write {
      path: path.to_path_buf(),
      source,
    }
  };

  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
    && !parent.exists()
  {
    fs::create_dir_all(parent).map_err(write_error)?;
    info!("Created directory: {}", parent.display());
  }

  let mut out = BufWriter::new(File::create(path).map_err(write_error)?);
  collate_into(&mut out, boilerplate, fragments, separator)
    .and_then(|()| out.flush())
    .map_err(write_error)?;

  info!(
    "Wrote {} reports to {}",
    fragments.len(),
    path.display()
  );
  Ok(())
}
