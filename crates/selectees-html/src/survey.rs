//! Structural element counts for a report page.
//!
//! The transformer assumes a fixed page layout. A [`StructureSurvey`] counts
//! the elements that layout depends on across the whole page, so a batch of
//! reports can be checked before anything is rewritten.
use std::ops::RangeInclusive;

use kuchikikiki::NodeRef;
use tendril::TendrilSink;

use crate::{
  error::SchemaViolation,
  transform::{
    CONTENT_CONTAINER,
    RELATED_MATERIALS,
    REMOVED_BLOCKS,
    TOP_PARAGRAPH,
  },
  utils::select_all,
};

/// Number of `mailto:` links a report page is known to carry.
pub const EXPECTED_MAIL_LINKS: RangeInclusive<usize> = 1..=2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructureSurvey {
  pub content_containers: usize,
  pub headings:           usize,
  pub rules:              usize,
  pub mail_links:         usize,
  pub related_pages:      usize,
  pub no_syndicate:       usize,
  pub pull_left:          usize,
  pub top_paragraphs:     usize,
  pub related_materials:  usize,
}

impl StructureSurvey {
  #[must_use]
  pub fn of_html(html: &str) -> Self {
    Self::of_document(&kuchikikiki::parse_html().one(html))
  }

  #[must_use]
  pub fn of_document(document: &NodeRef) -> Self {
    let count = |selector: &str| select_all(document, selector).len();
    let [related_pages, no_syndicate, pull_left] = REMOVED_BLOCKS.map(count);

    Self {
      content_containers: count(CONTENT_CONTAINER),
      headings: count("h1"),
      rules: count("hr"),
      mail_links: count(r#"a[href^="mailto:"]"#),
      related_pages,
      no_syndicate,
      pull_left,
      top_paragraphs: count(TOP_PARAGRAPH),
      related_materials: document
        .descendants()
        .filter(|node| {
          node
            .as_text()
            .is_some_and(|text| text.borrow().trim() == RELATED_MATERIALS)
        })
        .count(),
    }
  }

  /// Survey fields paired with their labels, in display order.
  #[must_use]
  pub const fn fields(&self) -> [(&'static str, usize); 9] {
    [
      ("content-fullwidth", self.content_containers),
      ("h1", self.headings),
      ("hr", self.rules),
      ("mailto", self.mail_links),
      ("tp-related-pages", self.related_pages),
      ("no-syndicate", self.no_syndicate),
      ("pull-left", self.pull_left),
      ("top", self.top_paragraphs),
      ("related-materials", self.related_materials),
    ]
  }

  /// Layout assumptions the page breaks. An empty list means the page can be
  /// transformed, barring problems inside the content row itself.
  #[must_use]
  pub fn violations(&self) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();
    let [related_pages, no_syndicate, pull_left] = REMOVED_BLOCKS;
    for (selector, found) in [
      (CONTENT_CONTAINER, self.content_containers),
      ("h1", self.headings),
      ("hr", self.rules),
      (related_pages, self.related_pages),
      (no_syndicate, self.no_syndicate),
      (pull_left, self.pull_left),
    ] {
      if found != 1 {
        violations.push(SchemaViolation::ElementCount { selector, found });
      }
    }
    if self.related_materials == 0 {
      violations.push(SchemaViolation::MissingRelatedMaterials);
    }
    violations
  }

  /// Whether the page has the usual number of contact links. Other counts
  /// are not an error, but worth a look.
  #[must_use]
  pub fn has_expected_mail_links(&self) -> bool {
    EXPECTED_MAIL_LINKS.contains(&self.mail_links)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn survey_counts_layout_elements() {
    let survey = StructureSurvey::of_html(
      r##"<h1>T</h1><div class="row"><div class="content-fullwidth">
         <div class="tp-related-pages"></div><div class="no-syndicate"></div>
         <div class="pull-left"></div><p class="text-right"><a href="#">Top</a></p>
         <p class="text-right"><a href="#">Top</a></p>
         <a href="mailto:a@b.c">a</a><a href="mailto:d@e.f">d</a><hr>
         <h4>Related Materials</h4></div></div>"##,
    );
    assert_eq!(survey, StructureSurvey {
      content_containers: 1,
      headings:           1,
      rules:              1,
      mail_links:         2,
      related_pages:      1,
      no_syndicate:       1,
      pull_left:          1,
      top_paragraphs:     2,
      related_materials:  1,
    });
    assert!(survey.violations().is_empty());
    assert!(survey.has_expected_mail_links());
  }

  #[test]
  fn survey_reports_every_violation() {
    let survey = StructureSurvey::of_html("<p>nothing here</p><hr><hr>");
    let violations = survey.violations();
    assert_eq!(violations.len(), 7);
    assert!(violations.contains(&SchemaViolation::ElementCount {
      selector: "hr",
      found:    2,
    }));
    assert!(violations.contains(&SchemaViolation::MissingRelatedMaterials));
    assert!(!survey.has_expected_mail_links());
  }
}
