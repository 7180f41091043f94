#![allow(clippy::unwrap_used, clippy::panic, reason = "Fine in tests")]
use selectees_html::{
  ReportId,
  ReportTransformer,
  SchemaViolation,
  StructureSurvey,
  TransformError,
  TransformOptions,
};

const SYNTHETIC: &str = r##"<!DOCTYPE html>
<html><head><title>Synthetic</title></head><body>
<div class="container">
<div class="row"><div class="col content content-fullwidth">
<div class="tp-related-pages"><a href="/mmwr/index.html">Related pages</a></div>
<div class="no-syndicate"><a href="#share-new">Share</a></div>
<div class="pull-left"><p>Pull quote</p></div>
<h1>Synthetic Report Title</h1>
<p>Corresponding author: <a href="mailto:author@example.org">Jane Doe</a>, Example Branch.</p>
<p class="text-right"><a href="#">Top</a></p>
<a id="References" title="Acknowledgment">References</a>
<a href="#References">See references</a>
<a href="https://www.facebook.com/x">Facebook</a>
<a href="#headerSearch">Search</a>
<a href="/mmwr/volumes/70/wr/pdfs/mm0000a1-H.pdf">PDF</a>
<a href="/mmwr/volumes/70/wr/mm0000a2.htm">Other report</a>
<a aria-controls="nav-group-abcde" href="#nav-group-abcde">Navigation</a>
<img src="/mmwr/volumes/70/wr/mm0000a1-f1.gif">
<h5><strong>Figure 1</strong>. Caption<a href="#F1_down"><img src="//www.cdc.gov/images/arrow_up.gif"></a></h5>
<p class="text-right"><a href="#">Top</a></p>
<p id="suggestedcitation">Suggested citation</p>
<h4>Related Materials</h4>
<div class="w-100">Opening paragraph</div><br>
<hr>
</div></div>
</div></body></html>
"##;

fn report() -> ReportId {
  "mm0000a1".parse().unwrap()
}

fn transform(html: &str) -> Result<String, TransformError> {
  ReportTransformer::new(TransformOptions::default())
    .transform(&report(), html)
    .map(|fragment| fragment.html)
}

fn schema_violation(html: &str) -> SchemaViolation {
  match transform(html) {
    Err(TransformError::Schema { report, violation }) => {
      assert_eq!(report.as_str(), "mm0000a1");
      violation
    },
    other => panic!("expected a schema violation, got {other:?}"),
  }
}

#[test]
fn synthetic_report_end_to_end() {
  let transformer = ReportTransformer::new(TransformOptions::default());
  let fragment = transformer.transform(&report(), SYNTHETIC).unwrap();
  let html = &fragment.html;

  // extracted the content row, not the whole page
  assert!(html.starts_with(r#"<div class="row">"#));
  assert!(!html.contains("<title>"));

  // mailto unwrapped to plain text
  assert!(!html.contains("mailto:"));
  assert!(html.contains("Corresponding author: Jane Doe, Example Branch."));

  // removable blocks gone
  for class in ["tp-related-pages", "no-syndicate", "pull-left"] {
    assert!(!html.contains(class), "{class} still present");
  }

  // heading anchored and suffixed
  assert!(html.contains(
    r#"<h1><a id="_mm0000a1"></a>Synthetic Report Title [mm0000a1]</h1>"#
  ));

  // no horizontal rule left
  assert!(!html.contains("<hr"));

  // both Top paragraphs replaced, none duplicated
  assert_eq!(fragment.stats.top_paragraphs, 2);
  assert_eq!(html.matches("Top of page").count(), 2);
  assert_eq!(
    html.matches(r##"<a href="#_mm0000a1">Top of mm0000a1</a>"##).count(),
    2
  );
  assert!(!html.contains(">Top</a>"));
}

#[test]
fn synthetic_report_links_are_rewritten() {
  let html = transform(SYNTHETIC).unwrap();

  assert!(html.contains(r#"id="References_mm0000a1""#));
  assert!(html.contains(r#"title="Acknowledgment_mm0000a1""#));
  assert!(html.contains(r##"href="#References_mm0000a1""##));
  assert!(html.contains(r#"<a href="">Facebook</a>"#));
  assert!(html.contains(r#"<a href="">Search</a>"#));
  assert!(html.contains(r#"<a href="pdfs/mm0000a1-H.pdf">PDF</a>"#));
  assert!(html.contains(
    r#"<a href="https://www.cdc.gov/mmwr/volumes/70/wr/mm0000a2.htm">Other report</a>"#
  ));
  assert!(html.contains(r#"aria-controls="nav-group-abcde_mm0000a1""#));
  assert!(html.contains(r##"href="#nav-group-abcde_mm0000a1""##));
}

#[test]
fn synthetic_report_images_and_layout() {
  let html = transform(SYNTHETIC).unwrap();

  assert!(html.contains(r#"<img src="gifs/mm0000a1-f1.gif">"#));
  assert!(html.contains(
    r##"<h5><strong>Figure 1</strong><a href="#F1_down_mm0000a1"><img src="gifs/arrow_up.gif"></a>. Caption</h5>"##
  ));
  assert!(html.contains(r#"<p id="suggestedcitation_mm0000a1">"#));
  assert!(html.contains(
    r#"<div class="w-100 clear">Opening paragraph</div><!--br/-->"#
  ));
  assert!(!html.contains("</div><br>"));
}

#[test]
fn stats_count_each_edit() {
  let transformer = ReportTransformer::new(TransformOptions::default());
  let stats = transformer.transform(&report(), SYNTHETIC).unwrap().stats;
  assert_eq!(stats.unwrapped_links, 1);
  assert_eq!(stats.blanked_links, 2);
  assert_eq!(stats.local_pdfs, 1);
  assert_eq!(stats.local_gifs, 1);
  assert_eq!(stats.relocated_icons, 1);
  assert_eq!(stats.absolute_links, 1);
}

#[test]
fn every_mail_link_is_unwrapped() {
  let page = SYNTHETIC.replace(
    r#"<a href="mailto:author@example.org">Jane Doe</a>"#,
    r#"<a href="mailto:a@b.c">A</a> and <a href="mailto:d@e.f">D</a>"#,
  );
  let transformer = ReportTransformer::new(TransformOptions::default());
  let fragment = transformer.transform(&report(), &page).unwrap();

  assert!(!fragment.html.contains("mailto:"));
  assert!(
    fragment
      .html
      .contains("<p>Corresponding author: A and D, Example Branch.</p>")
  );
  assert_eq!(fragment.stats.unwrapped_links, 2);
}

#[test]
fn site_root_is_configurable() {
  let options = TransformOptions {
    site_root: "https://mirror.example.org".to_string(),
    pdf_dir: "assets/pdf".to_string(),
    ..TransformOptions::default()
  };
  let html = ReportTransformer::new(options)
    .transform(&report(), SYNTHETIC)
    .unwrap()
    .html;
  assert!(html.contains(
    r#"href="https://mirror.example.org/mmwr/volumes/70/wr/mm0000a2.htm""#
  ));
  assert!(html.contains(r#"href="assets/pdf/mm0000a1-H.pdf""#));
}

#[test]
fn missing_rule_is_a_schema_violation() {
  let page = SYNTHETIC.replace("<hr>", "");
  assert_eq!(schema_violation(&page), SchemaViolation::ElementCount {
    selector: "hr",
    found:    0,
  });
}

#[test]
fn duplicate_heading_is_a_schema_violation() {
  let page = SYNTHETIC.replace(
    "<h1>Synthetic Report Title</h1>",
    "<h1>One</h1><h1>Two</h1>",
  );
  assert_eq!(schema_violation(&page), SchemaViolation::ElementCount {
    selector: "h1",
    found:    2,
  });
}

#[test]
fn missing_removable_block_is_a_schema_violation() {
  let page =
    SYNTHETIC.replace(r#"<div class="pull-left"><p>Pull quote</p></div>"#, "");
  assert_eq!(schema_violation(&page), SchemaViolation::ElementCount {
    selector: ".pull-left",
    found:    0,
  });
}

#[test]
fn missing_container_is_a_schema_violation() {
  let page = SYNTHETIC.replace("content-fullwidth", "content-narrow");
  assert_eq!(schema_violation(&page), SchemaViolation::ElementCount {
    selector: ".content-fullwidth",
    found:    0,
  });
}

#[test]
fn missing_related_materials_is_a_schema_violation() {
  let page = SYNTHETIC.replace("Related Materials", "See Also");
  assert_eq!(
    schema_violation(&page),
    SchemaViolation::MissingRelatedMaterials
  );
}

#[test]
fn schema_errors_name_the_report() {
  let err = transform(&SYNTHETIC.replace("<hr>", "")).unwrap_err();
  assert_eq!(err.report().as_str(), "mm0000a1");
  assert_eq!(
    err.to_string(),
    "mm0000a1: expected exactly one `hr` element, found 0"
  );
}

#[test]
fn survey_agrees_with_transform_preconditions() {
  let survey = StructureSurvey::of_html(SYNTHETIC);
  assert!(survey.violations().is_empty());
  assert_eq!(survey.top_paragraphs, 2);
  assert_eq!(survey.mail_links, 1);

  let broken = StructureSurvey::of_html(&SYNTHETIC.replace("<hr>", ""));
  assert_eq!(broken.violations(), vec![SchemaViolation::ElementCount {
    selector: "hr",
    found:    0,
  }]);
}
