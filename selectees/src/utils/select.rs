//! Narrowing the document map down to the selected reports.
use std::collections::{HashMap, HashSet, hash_map::Entry};

use indexmap::IndexMap;
use log::{debug, warn};
use selectees_html::ReportId;

use crate::{
  error::{Result, SelecteesError},
  utils::archive::DocumentMap,
};

/// One selected archive entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Source<'a> {
  /// Archive key the report was found under.
  pub key:  &'a str,
  /// Raw page HTML.
  pub html: &'a str,
}

/// Selected reports in selection order, plus the listed identifiers the
/// archive does not contain.
#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
  pub reports: IndexMap<ReportId, Source<'a>>,
  pub missing: Vec<ReportId>,
}

impl<'a> Selection<'a> {
  /// Fail unless every listed identifier was found.
  ///
  /// # Errors
  ///
  /// Returns [`SelecteesError::MissingReports`] naming every missing
  /// identifier.
  pub fn ensure_complete(&self) -> Result<()> {
    if self.missing.is_empty() {
      Ok(())
    } else {
      Err(SelecteesError::MissingReports(self.missing.clone()))
    }
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.reports.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.reports.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&ReportId, &Source<'a>)> {
    self.reports.iter()
  }

  /// The selected entries as a document map keyed by report identifier.
  /// Identifiers resolve to themselves, so the map can be selected from
  /// again.
  #[must_use]
  pub fn to_document_map(&self) -> DocumentMap {
    self
      .reports
      .iter()
      .map(|(report, source)| (report.to_string(), source.html.to_string()))
      .collect()
  }
}

/// Pick the selected reports out of the archive.
///
/// Each archive key is resolved to the first report identifier it embeds;
/// keys without one, or with one that is not selected, are skipped. The
/// result follows the order of `selection`, not the archive.
///
/// # Errors
///
/// Returns [`SelecteesError::DuplicateReport`] if two archive keys resolve to
/// the same selected identifier.
pub fn select<'a>(
  archive: &'a DocumentMap,
  selection: &[ReportId],
) -> Result<Selection<'a>> {
  let wanted: HashSet<&str> = selection.iter().map(ReportId::as_str).collect();
  let mut found: HashMap<ReportId, Source<'a>> = HashMap::new();

  for (key, html) in archive {
    let Some(report) = ReportId::from_key(key) else {
      continue;
    };
    if !wanted.contains(report.as_str()) {
      continue;
    }

    match found.entry(report) {
      Entry::Occupied(existing) => {
        return Err(SelecteesError::DuplicateReport {
          report: existing.key().clone(),
          first:  existing.get().key.to_string(),
          second: key.clone(),
        });
      },
      Entry::Vacant(slot) => {
        debug!("{} <- {key}", slot.key());
        slot.insert(Source { key, html });
      },
    }
  }

  let mut reports = IndexMap::with_capacity(selection.len());
  let mut missing = Vec::new();
  for report in selection {
    match found.remove(report) {
      Some(source) => {
        reports.insert(report.clone(), source);
      },
      None => missing.push(report.clone()),
    }
  }

  if !missing.is_empty() {
    warn!(
      "{} of {} selected reports are not in the archive",
      missing.len(),
      selection.len()
    );
  }

  Ok(Selection { reports, missing })
}
