//! Trimming and rewriting of a single report page.
//!
//! A report page is parsed into its own tree, edited in place and the content
//! row is serialized back out. Every structural assumption about the page is
//! checked and reported as a [`SchemaViolation`] tagged with the report
//! identifier.
use kuchikikiki::NodeRef;
use log::{debug, trace};
use tendril::TendrilSink;

use crate::{
  error::{SchemaViolation, TransformError, TransformResult},
  rules::{
    ATTR_SUFFIX_RULES,
    HrefRule,
    Rewrite,
    RewriteContext,
    SrcRule,
    match_href,
    match_src,
  },
  types::{Fragment, ReportId, TransformOptions, TransformStats},
  utils::{
    add_class,
    attr,
    has_class,
    new_element,
    select_all,
    set_attr,
    tag_name,
    unwrap_node,
  },
};

/// Element holding the report body. Its parent row is what gets extracted.
pub const CONTENT_CONTAINER: &str = ".content-fullwidth";

/// Blocks removed from every report, one of each.
pub const REMOVED_BLOCKS: [&str; 3] =
  [".tp-related-pages", ".no-syndicate", ".pull-left"];

/// "Top" navigation paragraphs.
pub const TOP_PARAGRAPH: &str = "p.text-right";

/// Text of the marker preceding the block that must not wrap.
pub const RELATED_MATERIALS: &str = "Related Materials";

/// Serialized `<br>` directly after a closing `div`, and its inert stand-in.
const BR_AFTER_DIV: &str = "</div><br>";
const BR_AFTER_DIV_MARKER: &str = "</div><!--br/-->";

/// Turns report pages into collatable fragments.
#[derive(Debug, Clone, Default)]
pub struct ReportTransformer {
  options: TransformOptions,
}

impl ReportTransformer {
  #[must_use]
  pub const fn new(options: TransformOptions) -> Self {
    Self { options }
  }

  /// Parse one report page and produce its trimmed fragment.
  ///
  /// # Errors
  ///
  /// Returns [`TransformError::Schema`] when the page does not have the
  /// expected fixed structure, and other variants if the rewrite patterns
  /// cannot be built or the result cannot be serialized.
  pub fn transform(
    &self,
    report: &ReportId,
    html: &str,
  ) -> TransformResult<Fragment> {
    let ctx = RewriteContext::new(report, &self.options).map_err(|source| {
      TransformError::Pattern {
        report: report.clone(),
        source,
      }
    })?;

    let document = kuchikikiki::parse_html().one(html);
    let mut stats = TransformStats::default();
    let container =
      apply_edits(&document, &ctx, &mut stats).map_err(|violation| {
        TransformError::Schema {
          report: report.clone(),
          violation,
        }
      })?;

    let mut out = Vec::new();
    container
      .serialize(&mut out)
      .map_err(|source| TransformError::Serialize {
        report: report.clone(),
        source,
      })?;
    let html = String::from_utf8_lossy(&out)
      .replace(BR_AFTER_DIV, BR_AFTER_DIV_MARKER);

    debug!("{report}: {stats}");
    Ok(Fragment {
      report: report.clone(),
      html,
      stats,
    })
  }
}

fn apply_edits(
  document: &NodeRef,
  ctx: &RewriteContext<'_>,
  stats: &mut TransformStats,
) -> Result<NodeRef, SchemaViolation> {
  let container = content_row(document)?;

  for block in REMOVED_BLOCKS {
    exactly_one(&container, block)?.detach();
  }

  replace_top_paragraphs(&container, ctx, stats);
  rewrite_links(&container, ctx, stats);
  rewrite_images(&container, ctx, stats)?;
  suffix_citation(&container, ctx, stats);
  mark_heading(&container, ctx)?;
  clear_related_materials(&container)?;
  exactly_one(&container, "hr")?.detach();

  Ok(container)
}

/// The row wrapping the content container; it carries the layout classes.
fn content_row(document: &NodeRef) -> Result<NodeRef, SchemaViolation> {
  exactly_one(document, CONTENT_CONTAINER)?
    .parent()
    .filter(|parent| parent.as_element().is_some())
    .ok_or(SchemaViolation::OrphanContainer)
}

fn exactly_one(
  root: &NodeRef,
  selector: &'static str,
) -> Result<NodeRef, SchemaViolation> {
  let [node]: [NodeRef; 1] =
    select_all(root, selector)
      .try_into()
      .map_err(|found: Vec<NodeRef>| {
        SchemaViolation::ElementCount {
          selector,
          found: found.len(),
        }
      })?;
  Ok(node)
}

/// `[ Top of page | Top of <report> ]`
fn top_paragraph(ctx: &RewriteContext<'_>) -> NodeRef {
  let report = ctx.report();
  let paragraph = new_element("p", &[("class", "text-right")]);

  let page = new_element("a", &[("href", "#")]);
  page.append(NodeRef::new_text("Top of page"));

  let anchor = format!("#_{report}");
  let top = new_element("a", &[("href", &anchor)]);
  top.append(NodeRef::new_text(format!("Top of {report}")));

  paragraph.append(NodeRef::new_text("[\u{a0}"));
  paragraph.append(page);
  paragraph.append(NodeRef::new_text(" | "));
  paragraph.append(top);
  paragraph.append(NodeRef::new_text("\u{a0}]"));
  paragraph
}

fn replace_top_paragraphs(
  container: &NodeRef,
  ctx: &RewriteContext<'_>,
  stats: &mut TransformStats,
) {
  for paragraph in select_all(container, TOP_PARAGRAPH) {
    paragraph.insert_before(top_paragraph(ctx));
    paragraph.detach();
    stats.top_paragraphs += 1;
  }
}

fn rewrite_links(
  container: &NodeRef,
  ctx: &RewriteContext<'_>,
  stats: &mut TransformStats,
) {
  for link in select_all(container, "a") {
    for rule in ATTR_SUFFIX_RULES {
      if let Some(value) = attr(&link, rule.attribute())
        && rule.matches(&value)
      {
        set_attr(&link, rule.attribute(), ctx.suffix(&value));
        stats.suffixed_attributes += 1;
      }
    }

    let Some(href) = attr(&link, "href").filter(|href| !href.is_empty())
    else {
      continue;
    };
    let Some(rule) = match_href(&href, ctx) else {
      continue;
    };

    match rule.apply(&href, ctx) {
      Rewrite::Keep => {},
      Rewrite::Unwrap => {
        trace!("{}: unwrapping {href}", ctx.report());
        unwrap_node(&link);
        stats.unwrapped_links += 1;
      },
      Rewrite::Replace(value) => {
        set_attr(&link, "href", value);
        match rule {
          HrefRule::PageChrome | HrefRule::SocialMedia => {
            stats.blanked_links += 1;
          },
          HrefRule::IntraPageAnchor => stats.suffixed_links += 1,
          HrefRule::ReportPdf => stats.local_pdfs += 1,
          HrefRule::SitePath => stats.absolute_links += 1,
          HrefRule::Contact => {},
        }
      },
    }
  }
}

fn rewrite_images(
  container: &NodeRef,
  ctx: &RewriteContext<'_>,
  stats: &mut TransformStats,
) -> Result<(), SchemaViolation> {
  for image in select_all(container, "img") {
    let Some(src) = attr(&image, "src") else {
      continue;
    };
    let Some(rule) = match_src(&src, ctx) else {
      continue;
    };
    if let Rewrite::Replace(value) = rule.apply(&src, ctx) {
      set_attr(&image, "src", value);
    }

    match rule {
      SrcRule::ReportGif => stats.local_gifs += 1,
      SrcRule::SitePath => stats.absolute_images += 1,
      SrcRule::ScrollTopIcon => {
        relocate_scroll_top_icon(&image)?;
        stats.relocated_icons += 1;
      },
    }
  }
  Ok(())
}

/// Move the icon's wrapper to right after the figure caption, the way table
/// captions already lay it out.
///
/// Expected shape: `<h5>…<strong>caption</strong>…<a><img></a></h5>`.
fn relocate_scroll_top_icon(icon: &NodeRef) -> Result<(), SchemaViolation> {
  let wrapper = icon
    .parent()
    .ok_or(SchemaViolation::MisplacedScrollTopIcon)?;
  let heading = wrapper
    .parent()
    .filter(|node| tag_name(node).as_deref() == Some("h5"))
    .ok_or(SchemaViolation::MisplacedScrollTopIcon)?;
  let caption = heading
    .select_first("strong")
    .map(|strong| strong.as_node().clone())
    .map_err(|()| SchemaViolation::MisplacedScrollTopIcon)?;

  if caption.ancestors().any(|ancestor| ancestor == wrapper) {
    return Err(SchemaViolation::MisplacedScrollTopIcon);
  }

  wrapper.detach();
  caption.insert_after(wrapper);
  Ok(())
}

fn suffix_citation(
  container: &NodeRef,
  ctx: &RewriteContext<'_>,
  stats: &mut TransformStats,
) {
  for paragraph in select_all(container, "p#suggestedcitation") {
    set_attr(&paragraph, "id", ctx.suffix("suggestedcitation"));
    stats.suffixed_attributes += 1;
  }
}

/// Append ` [<report>]` to the title and anchor it as `_<report>`.
fn mark_heading(
  container: &NodeRef,
  ctx: &RewriteContext<'_>,
) -> Result<(), SchemaViolation> {
  let heading = exactly_one(container, "h1")?;
  let suffix = format!(" [{}]", ctx.report());

  let last = heading.last_child();
  match last.as_ref().and_then(|node| node.as_text()) {
    Some(text) => text.borrow_mut().push_str(&suffix),
    None => heading.append(NodeRef::new_text(suffix)),
  }

  let anchor_id = format!("_{}", ctx.report());
  heading.prepend(new_element("a", &[("id", &anchor_id)]));
  Ok(())
}

/// Give the first `div.w-100` after the "Related Materials" marker the
/// `clear` class so the opening paragraph does not wrap the aside before it.
fn clear_related_materials(
  container: &NodeRef,
) -> Result<(), SchemaViolation> {
  let mut past_marker = false;
  for node in container.descendants() {
    if !past_marker {
      past_marker = node
        .as_text()
        .is_some_and(|text| text.borrow().trim() == RELATED_MATERIALS);
      continue;
    }
    if tag_name(&node).as_deref() == Some("div")
      && has_class(&node, "w-100")
    {
      add_class(&node, "clear");
      return Ok(());
    }
  }

  Err(if past_marker {
    SchemaViolation::MissingRelatedMaterialsBlock
  } else {
    SchemaViolation::MissingRelatedMaterials
  })
}
