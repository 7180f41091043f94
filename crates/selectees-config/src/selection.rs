//! The list of reports to collate, and its on-disk form.
//!
//! The list decides both which archive entries are used and the order of the
//! collated output. A selection file holds one identifier per line; blank
//! lines are skipped and `#` starts a comment.
use std::collections::HashSet;

use selectees_html::ReportId;

use crate::error::ConfigError;

/// Reports collated when no other selection is configured, in output order.
pub const DEFAULT_SELECTION: [&str; 56] = [
  "mm6802a1",
  "mm6806a2",
  "mm6817a3",
  "mm6827a2",
  "mm6834a3",
  "mm6841e3",
  "mm6844a1",
  "mm6848a1",
  "mm6903a1",
  "mm6906a3",
  "mm6911a5",
  "mm6916e1",
  "mm6920e2",
  "mm6923e4",
  "mm6924e1",
  "mm6925a1",
  "mm6927a4",
  "mm6928e3",
  "mm6930e1",
  "mm6932a1",
  "mm6932e5",
  "mm6935a2",
  "mm6935e2",
  "mm6936a5",
  "mm6939e2",
  "mm6943e3",
  "mm6944e3",
  "mm6947e2",
  "mm6949a2",
  "mm695152a3",
  "mm7001a4",
  "mm7004e3",
  "mm7006e2",
  "mm7010e3",
  "mm7010e4",
  "mm7011e3",
  "mm7013e3",
  "mm7018e1",
  "mm7021e1",
  "mm7023e2",
  "mm7024e1",
  "mm7031e1",
  "mm7032e3",
  "mm7034e5",
  "mm7037e1",
  "mm7039e3",
  "mm7041a2",
  "mm7043e2",
  "mm7047e1",
  "mm705152a2",
  "mm705152a3",
  "mm7104e1",
  "mm7110e1",
  "mm7114e1",
  "mm7121a2",
  "mm7121e1",
];

/// The embedded default selection as identifiers.
#[must_use]
pub fn default_selection() -> Vec<ReportId> {
  DEFAULT_SELECTION
    .iter()
    .filter_map(|id| id.parse().ok())
    .collect()
}

/// Parse the contents of a selection file.
///
/// # Errors
///
/// Returns an error naming the line of the first malformed identifier, or the
/// first identifier listed twice.
pub fn parse_selection(text: &str) -> Result<Vec<ReportId>, ConfigError> {
  let mut selection = Vec::new();
  for (index, line) in text.lines().enumerate() {
    let entry = line.split_once('#').map_or(line, |(entry, _)| entry).trim();
    if entry.is_empty() {
      continue;
    }
    let id = entry.parse::<ReportId>().map_err(|e| {
      ConfigError::Selection(format!("line {}: {e}", index + 1))
    })?;
    selection.push(id);
  }

  ensure_unique(&selection)?;
  Ok(selection)
}

/// Reject a selection that lists any identifier more than once.
///
/// # Errors
///
/// Returns an error naming every repeated identifier.
pub fn ensure_unique(selection: &[ReportId]) -> Result<(), ConfigError> {
  let mut seen = HashSet::new();
  let mut repeated = Vec::new();
  for id in selection {
    if !seen.insert(id.as_str()) && !repeated.contains(&id.as_str()) {
      repeated.push(id.as_str());
    }
  }

  if repeated.is_empty() {
    Ok(())
  } else {
    Err(ConfigError::Selection(format!(
      "identifiers listed more than once: {}",
      repeated.join(", ")
    )))
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use super::*;

  #[test]
  fn default_selection_is_complete_and_unique() {
    let selection = default_selection();
    assert_eq!(selection.len(), DEFAULT_SELECTION.len());
    assert!(ensure_unique(&selection).is_ok());
    assert_eq!(selection[0].as_str(), "mm6802a1");
    assert_eq!(selection[55].as_str(), "mm7121e1");
  }

  #[test]
  fn parse_selection_skips_comments_and_blanks() {
    let selection = parse_selection(
      "# first volume\nmm6802a1\n\n  mm6806a2  # trailing note\n#mm6817a3\n",
    )
    .unwrap();
    let ids: Vec<&str> = selection.iter().map(ReportId::as_str).collect();
    assert_eq!(ids, ["mm6802a1", "mm6806a2"]);
  }

  #[test]
  fn parse_selection_names_bad_line() {
    let err = parse_selection("mm6802a1\nnot-an-id\n").unwrap_err();
    assert!(err.to_string().contains("line 2"), "{err}");
  }

  #[test]
  fn duplicates_are_rejected_once_each() {
    let err = parse_selection("mm6802a1\nmm6806a2\nmm6802a1\nmm6802a1\n")
      .unwrap_err();
    assert_eq!(
      err.to_string(),
      "Selection error: identifiers listed more than once: mm6802a1"
    );
  }
}
