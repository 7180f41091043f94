//! Loading the document map out of the archive.
use std::{
  ffi::OsStr,
  fs::{self, File},
  io::{BufReader, Read},
  path::Path,
};

use indexmap::IndexMap;
use log::{debug, info};
use zip::{ZipArchive, result::ZipError};

use crate::error::{Result, SelecteesError};

/// Document key (usually the report URL) to raw HTML, in archive order.
pub type DocumentMap = IndexMap<String, String>;

/// Load the document map from a zip archive, or from a plain `.json` file
/// such as the one written by `selectees extract`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a zip archive, lacks
/// `entry`, or does not hold a JSON object of strings.
pub fn load_archive(path: &Path, entry: &str) -> Result<DocumentMap> {
  let is_json = path
    .extension()
    .and_then(OsStr::to_str)
    .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

  let text = if is_json {
    debug!("Reading plain document map {}", path.display());
    fs::read_to_string(path).map_err(|source| {
      SelecteesError::ArchiveIo {
        path: path.to_path_buf(),
        source,
      }
    })?
  } else {
    read_zip_entry(path, entry)?
  };

  let documents: DocumentMap =
    serde_json::from_str(&text).map_err(|source| SelecteesError::Json {
      path: path.to_path_buf(),
      source,
    })?;

  info!("Loaded {} documents from {}", documents.len(), path.display());
  Ok(documents)
}

fn read_zip_entry(path: &Path, entry: &str) -> Result<String> {
  let io_error = |source| {
    SelecteesError::ArchiveIo {
      path: path.to_path_buf(),
      source,
    }
  };

  let file = File::open(path).map_err(io_error)?;
  let mut archive = ZipArchive::new(BufReader::new(file)).map_err(|source| {
    SelecteesError::Zip {
      path: path.to_path_buf(),
      source,
    }
  })?;

  let mut zipped = match archive.by_name(entry) {
    Ok(zipped) => zipped,
    Err(ZipError::FileNotFound) => {
      return Err(SelecteesError::MissingEntry {
        path:  path.to_path_buf(),
        entry: entry.to_string(),
      });
    },
    Err(source) => {
      return Err(SelecteesError::Zip {
        path: path.to_path_buf(),
        source,
      });
    },
  };

  debug!(
    "Decompressing {entry} ({} bytes) from {}",
    zipped.size(),
    path.display()
  );
  let mut text =
    String::with_capacity(usize::try_from(zipped.size()).unwrap_or_default());
  zipped.read_to_string(&mut text).map_err(io_error)?;
  Ok(text)
}
