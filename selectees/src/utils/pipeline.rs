//! Running the transformer and the structure survey over a selection.
use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use selectees_html::{
  Fragment,
  ReportId,
  ReportTransformer,
  SchemaViolation,
  StructureSurvey,
  TransformError,
  TransformStats,
};

use crate::utils::select::Selection;

fn progress_bar(len: usize) -> ProgressBar {
  let bar = ProgressBar::new(u64::try_from(len).unwrap_or(u64::MAX));
  bar.set_style(
    ProgressStyle::with_template(
      "{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar()),
  );
  bar
}

/// Transform every selected report, in selection order.
///
/// Stops at the first report that does not have the expected structure.
///
/// # Errors
///
/// Returns the first [`TransformError`], tagged with its report.
pub fn transform_all(
  transformer: &ReportTransformer,
  selection: &Selection<'_>,
) -> Result<Vec<Fragment>, TransformError> {
  let bar = progress_bar(selection.len());
  let mut fragments = Vec::with_capacity(selection.len());
  let mut totals = TransformStats::default();

  for (report, source) in selection.iter() {
    bar.set_message(report.to_string());
    let fragment = match transformer.transform(report, source.html) {
      Ok(fragment) => fragment,
      Err(e) => {
        bar.abandon_with_message(format!("{report} failed"));
        return Err(e);
      },
    };
    totals += fragment.stats;
    fragments.push(fragment);
    bar.inc(1);
  }

  bar.finish_and_clear();
  info!("Transformed {} reports: {totals}", fragments.len());
  Ok(fragments)
}

/// Outcome of checking a selection without writing anything.
#[derive(Debug, Default)]
pub struct CheckReport {
  /// Structure counts per report, in selection order.
  pub surveys:  IndexMap<ReportId, StructureSurvey>,
  /// Page-level layout problems found by the survey.
  pub problems: Vec<(ReportId, SchemaViolation)>,
  /// Reports that fail the transform itself.
  pub failures: Vec<TransformError>,
}

impl CheckReport {
  /// Reports with any problem, in selection order.
  #[must_use]
  pub fn failing_reports(&self) -> Vec<ReportId> {
    self
      .surveys
      .keys()
      .filter(|report| {
        self.problems.iter().any(|(failed, _)| failed == *report)
          || self.failures.iter().any(|e| e.report() == *report)
      })
      .cloned()
      .collect()
  }

  /// For every survey field, how many reports had each count.
  #[must_use]
  pub fn histogram(&self) -> IndexMap<&'static str, IndexMap<usize, usize>> {
    let mut histogram: IndexMap<&'static str, IndexMap<usize, usize>> =
      IndexMap::new();
    for survey in self.surveys.values() {
      for (field, count) in survey.fields() {
        *histogram.entry(field).or_default().entry(count).or_default() += 1;
      }
    }
    for counts in histogram.values_mut() {
      counts.sort_keys();
    }
    histogram
  }
}

/// Survey every selected report, then dry-run the transform on each.
#[must_use]
pub fn check(
  transformer: &ReportTransformer,
  selection: &Selection<'_>,
) -> CheckReport {
  let bar = progress_bar(selection.len());
  let mut report = CheckReport::default();

  for (id, source) in selection.iter() {
    bar.set_message(id.to_string());
    let survey = StructureSurvey::of_html(source.html);
    if !survey.has_expected_mail_links() {
      warn!("{id}: {} mailto links", survey.mail_links);
    }
    for violation in survey.violations() {
      report.problems.push((id.clone(), violation));
    }
    report.surveys.insert(id.clone(), survey);

    match transformer.transform(id, source.html) {
      Ok(fragment) => debug!("{id}: {}", fragment.stats),
      Err(e) => report.failures.push(e),
    }
    bar.inc(1);
  }

  bar.finish_and_clear();
  report
}
