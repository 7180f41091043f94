//! Ordered rewrite rules for links, images and anchor attributes.
//!
//! Link targets and image sources are each run through a fixed table in which
//! the first matching rule wins. Anchor attributes are checked independently
//! against [`ATTR_SUFFIX_RULES`]. Keeping the tables as data means their order
//! and coverage can be tested without building a document.
use std::sync::LazyLock;

use regex::Regex;

use crate::{
  types::{ReportId, TransformOptions},
  utils::compile_static,
};

/// Link schemes whose anchors are unwrapped to plain text.
pub const CONTACT_SCHEMES: [&str; 2] = ["mailto:", "tel:"];

/// Page-chrome fragment targets that have no counterpart in the collated
/// document.
pub const PAGE_CHROME_ANCHORS: [&str; 2] = ["#headerSearch", "#share-new"];

static SOCIAL_MEDIA: LazyLock<Regex> = LazyLock::new(|| {
  compile_static(
    "SOCIAL_MEDIA",
    r"((api\.addthis|facebook|instagram|linkedin|pinterest|snapchat|twitter|youtube)\.com|tools\.cdc.gov)",
  )
});

static INTRA_PAGE_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
  compile_static(
    "INTRA_PAGE_ANCHOR",
    r"^#([BFT][123]_(up|down)|nav-group-\w{5}|References|content|contribAff|discussion|suggestedcitation)",
  )
});

static NAV_GROUP_CONTROL: LazyLock<Regex> = LazyLock::new(|| {
  compile_static("NAV_GROUP_CONTROL", r"^nav-group-\w{5}")
});

static ANCHOR_ID: LazyLock<Regex> = LazyLock::new(|| {
  compile_static(
    "ANCHOR_ID",
    r"^(Acknowledgment|[BFT][123]_(up|down)|contribAff|discussion|suggestedcitation|References)",
  )
});

/// What to do with a link target or image source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
  /// Leave the value as it is.
  Keep,
  /// Replace the value.
  Replace(String),
  /// Remove the element but keep its children.
  Unwrap,
}

/// Per-report state shared by every rule: the identifier used for suffixes
/// and the identifier-specific asset patterns.
#[derive(Debug)]
pub struct RewriteContext<'a> {
  report:    &'a ReportId,
  options:   &'a TransformOptions,
  pdf_asset: Regex,
  gif_asset: Regex,
}

impl<'a> RewriteContext<'a> {
  /// Build the context for one report.
  ///
  /// # Errors
  ///
  /// Returns an error if the identifier-specific asset patterns fail to
  /// compile.
  pub fn new(
    report: &'a ReportId,
    options: &'a TransformOptions,
  ) -> Result<Self, regex::Error> {
    let id = regex::escape(report.as_str());
    Ok(Self {
      report,
      options,
      pdf_asset: Regex::new(&format!(r"/mmwr/.*?/({id}.*?\.pdf)"))?,
      gif_asset: Regex::new(&format!(r"/mmwr/.*?/({id}.*?\.gif)"))?,
    })
  }

  #[must_use]
  pub const fn report(&self) -> &ReportId {
    self.report
  }

  /// Append `_<report>` so the value stays unique once reports are collated.
  #[must_use]
  pub fn suffix(&self, value: &str) -> String {
    format!("{value}_{}", self.report)
  }

  fn local_pdf(&self, target: &str) -> Option<String> {
    local_asset(&self.pdf_asset, &self.options.pdf_dir, self.report, target)
  }

  fn local_gif(&self, target: &str) -> Option<String> {
    local_asset(&self.gif_asset, &self.options.gif_dir, self.report, target)
  }

  fn is_site_path(&self, target: &str) -> bool {
    target.starts_with(&self.options.site_path_prefix)
  }

  fn absolute(&self, target: &str) -> String {
    format!("{}{target}", self.options.site_root)
  }
}

fn local_asset(
  pattern: &Regex,
  dir: &str,
  report: &ReportId,
  target: &str,
) -> Option<String> {
  if !target.contains(report.as_str()) {
    return None;
  }
  pattern
    .captures(target)
    .and_then(|caps| caps.get(1))
    .map(|name| format!("{dir}/{}", name.as_str()))
}

/// Rules applied to an anchor's `href`, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HrefRule {
  /// `mailto:` and `tel:` links are unwrapped.
  Contact,
  /// Search box and share widget anchors are blanked.
  PageChrome,
  /// Social-media and sharing-tool links are blanked.
  SocialMedia,
  /// In-page anchors get the report suffix.
  IntraPageAnchor,
  /// The report's own PDF is pointed at the local copy.
  ReportPdf,
  /// Other site-relative links become absolute.
  SitePath,
}

/// First match wins.
pub const HREF_RULES: [HrefRule; 6] = [
  HrefRule::Contact,
  HrefRule::PageChrome,
  HrefRule::SocialMedia,
  HrefRule::IntraPageAnchor,
  HrefRule::ReportPdf,
  HrefRule::SitePath,
];

impl HrefRule {
  #[must_use]
  pub fn matches(self, href: &str, ctx: &RewriteContext<'_>) -> bool {
    match self {
      Self::Contact => {
        CONTACT_SCHEMES
          .iter()
          .any(|scheme| href.starts_with(scheme))
      },
      Self::PageChrome => PAGE_CHROME_ANCHORS.contains(&href),
      Self::SocialMedia => SOCIAL_MEDIA.is_match(href),
      Self::IntraPageAnchor => INTRA_PAGE_ANCHOR.is_match(href),
      Self::ReportPdf => ctx.local_pdf(href).is_some(),
      Self::SitePath => ctx.is_site_path(href),
    }
  }

  /// Apply the rule to a target it matched.
  #[must_use]
  pub fn apply(self, href: &str, ctx: &RewriteContext<'_>) -> Rewrite {
    match self {
      Self::Contact => Rewrite::Unwrap,
      Self::PageChrome | Self::SocialMedia => Rewrite::Replace(String::new()),
      Self::IntraPageAnchor => Rewrite::Replace(ctx.suffix(href)),
      Self::ReportPdf => {
        ctx
          .local_pdf(href)
          .map_or(Rewrite::Keep, Rewrite::Replace)
      },
      Self::SitePath => Rewrite::Replace(ctx.absolute(href)),
    }
  }

  /// Whether rewriting an already rewritten target leaves it unchanged.
  ///
  /// Suffixing is the exception: a second pass appends the identifier again.
  #[must_use]
  pub const fn is_idempotent(self) -> bool {
    !matches!(self, Self::IntraPageAnchor)
  }
}

/// Find the rule that decides an `href`.
#[must_use]
pub fn match_href(href: &str, ctx: &RewriteContext<'_>) -> Option<HrefRule> {
  HREF_RULES
    .iter()
    .copied()
    .find(|rule| rule.matches(href, ctx))
}

/// Run an `href` through [`HREF_RULES`].
#[must_use]
pub fn rewrite_href(href: &str, ctx: &RewriteContext<'_>) -> Rewrite {
  match_href(href, ctx).map_or(Rewrite::Keep, |rule| rule.apply(href, ctx))
}

/// Rules applied to an image's `src`, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SrcRule {
  /// The report's own figures are pointed at the local copy.
  ReportGif,
  /// Other site-relative images become absolute.
  SitePath,
  /// The shared scroll-to-top icon is pointed at the local copy; the
  /// transformer also moves it next to the figure caption.
  ScrollTopIcon,
}

/// First match wins.
pub const SRC_RULES: [SrcRule; 3] =
  [SrcRule::ReportGif, SrcRule::SitePath, SrcRule::ScrollTopIcon];

impl SrcRule {
  #[must_use]
  pub fn matches(self, src: &str, ctx: &RewriteContext<'_>) -> bool {
    match self {
      Self::ReportGif => ctx.local_gif(src).is_some(),
      Self::SitePath => ctx.is_site_path(src),
      Self::ScrollTopIcon => src == ctx.options.scroll_top_icon,
    }
  }

  /// Apply the rule to a source it matched.
  #[must_use]
  pub fn apply(self, src: &str, ctx: &RewriteContext<'_>) -> Rewrite {
    match self {
      Self::ReportGif => {
        ctx.local_gif(src).map_or(Rewrite::Keep, Rewrite::Replace)
      },
      Self::SitePath => Rewrite::Replace(ctx.absolute(src)),
      Self::ScrollTopIcon => {
        Rewrite::Replace(ctx.options.local_scroll_top_icon())
      },
    }
  }
}

/// Find the rule that decides an image `src`.
#[must_use]
pub fn match_src(src: &str, ctx: &RewriteContext<'_>) -> Option<SrcRule> {
  SRC_RULES.iter().copied().find(|rule| rule.matches(src, ctx))
}

/// Anchor attributes that get the report suffix. Every rule is checked; they
/// apply to different attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrRule {
  /// `aria-controls` of collapsible navigation groups.
  NavGroupControl,
  /// Anchor ids used as in-page link targets.
  AnchorId,
  /// Acknowledgment titles.
  AcknowledgmentTitle,
}

pub const ATTR_SUFFIX_RULES: [AttrRule; 3] = [
  AttrRule::NavGroupControl,
  AttrRule::AnchorId,
  AttrRule::AcknowledgmentTitle,
];

impl AttrRule {
  #[must_use]
  pub const fn attribute(self) -> &'static str {
    match self {
      Self::NavGroupControl => "aria-controls",
      Self::AnchorId => "id",
      Self::AcknowledgmentTitle => "title",
    }
  }

  #[must_use]
  pub fn matches(self, value: &str) -> bool {
    match self {
      Self::NavGroupControl => NAV_GROUP_CONTROL.is_match(value),
      Self::AnchorId => ANCHOR_ID.is_match(value),
      Self::AcknowledgmentTitle => value.starts_with("Acknowledgment"),
    }
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::panic, reason = "Fine in tests")]
  use super::*;

  fn report() -> ReportId {
    "mm0000a1".parse().unwrap()
  }

  #[test]
  fn social_media_links_are_blanked() {
    let (id, options) = (report(), TransformOptions::default());
    let ctx = RewriteContext::new(&id, &options).unwrap();
    assert_eq!(
      rewrite_href("https://www.facebook.com/x", &ctx),
      Rewrite::Replace(String::new())
    );
    assert_eq!(
      rewrite_href("https://tools.cdc.gov/api/embed", &ctx),
      Rewrite::Replace(String::new())
    );
    assert_eq!(
      rewrite_href("//api.addthis.com/share", &ctx),
      Rewrite::Replace(String::new())
    );
  }

  #[test]
  fn contact_links_unwrap() {
    let (id, options) = (report(), TransformOptions::default());
    let ctx = RewriteContext::new(&id, &options).unwrap();
    assert_eq!(rewrite_href("mailto:a@b.c", &ctx), Rewrite::Unwrap);
    assert_eq!(rewrite_href("tel:555-0100", &ctx), Rewrite::Unwrap);
  }

  #[test]
  fn page_chrome_requires_exact_target() {
    let (id, options) = (report(), TransformOptions::default());
    let ctx = RewriteContext::new(&id, &options).unwrap();
    assert_eq!(match_href("#headerSearch", &ctx), Some(HrefRule::PageChrome));
    assert_eq!(match_href("#share-new", &ctx), Some(HrefRule::PageChrome));
    assert_eq!(match_href("#headerSearchBox", &ctx), None);
  }

  #[test]
  fn intra_page_anchors_get_suffix() {
    let (id, options) = (report(), TransformOptions::default());
    let ctx = RewriteContext::new(&id, &options).unwrap();
    for href in [
      "#T1_down",
      "#F2_up",
      "#B3_down",
      "#nav-group-a1b2c",
      "#References",
      "#contribAff",
      "#discussion",
      "#suggestedcitation",
      "#content",
    ] {
      assert_eq!(
        rewrite_href(href, &ctx),
        Rewrite::Replace(format!("{href}_mm0000a1")),
        "{href}"
      );
    }
    assert_eq!(rewrite_href("#", &ctx), Rewrite::Keep);
    assert_eq!(rewrite_href("#T4_down", &ctx), Rewrite::Keep);
  }

  #[test]
  fn report_pdf_becomes_local() {
    let (id, options) = (report(), TransformOptions::default());
    let ctx = RewriteContext::new(&id, &options).unwrap();
    assert_eq!(
      rewrite_href("/mmwr/volumes/70/wr/pdfs/mm0000a1-H.pdf", &ctx),
      Rewrite::Replace("pdfs/mm0000a1-H.pdf".to_string())
    );
    assert_eq!(
      rewrite_href("/mmwr/volumes/70/wr/pdfs/mm0000a1-H.pdf#page=2", &ctx),
      Rewrite::Replace("pdfs/mm0000a1-H.pdf".to_string())
    );
  }

  #[test]
  fn other_report_links_fall_through_to_site_path() {
    let (id, options) = (report(), TransformOptions::default());
    let ctx = RewriteContext::new(&id, &options).unwrap();
    assert_eq!(
      match_href("/mmwr/volumes/70/wr/mm0000a1.htm", &ctx),
      Some(HrefRule::SitePath)
    );
    assert_eq!(
      rewrite_href("/mmwr/volumes/70/wr/pdfs/mm9999a9-H.pdf", &ctx),
      Rewrite::Replace(
        "https://www.cdc.gov/mmwr/volumes/70/wr/pdfs/mm9999a9-H.pdf"
          .to_string()
      )
    );
    assert_eq!(rewrite_href("/other/page.html", &ctx), Rewrite::Keep);
  }

  #[test]
  fn first_matching_rule_wins() {
    let (id, options) = (report(), TransformOptions::default());
    let ctx = RewriteContext::new(&id, &options).unwrap();
    // matches both the contact and social media rules
    assert_eq!(
      match_href("mailto:share@facebook.com", &ctx),
      Some(HrefRule::Contact)
    );
    // matches both the report pdf and site path rules
    assert_eq!(
      match_href("/mmwr/volumes/70/wr/pdfs/mm0000a1-H.pdf", &ctx),
      Some(HrefRule::ReportPdf)
    );
    assert_eq!(
      match_src("/mmwr/volumes/70/wr/figures/mm0000a1-F1.gif", &ctx),
      Some(SrcRule::ReportGif)
    );
  }

  #[test]
  fn image_sources_are_rewritten() {
    let (id, options) = (report(), TransformOptions::default());
    let ctx = RewriteContext::new(&id, &options).unwrap();
    let apply = |src: &str| {
      match_src(src, &ctx).map_or(Rewrite::Keep, |rule| rule.apply(src, &ctx))
    };
    assert_eq!(
      apply("/mmwr/volumes/70/wr/mm0000a1-f1.gif"),
      Rewrite::Replace("gifs/mm0000a1-f1.gif".to_string())
    );
    assert_eq!(
      apply("/mmwr/volumes/70/wr/images/logo.png"),
      Rewrite::Replace(
        "https://www.cdc.gov/mmwr/volumes/70/wr/images/logo.png".to_string()
      )
    );
    assert_eq!(
      apply("//www.cdc.gov/images/arrow_up.gif"),
      Rewrite::Replace("gifs/arrow_up.gif".to_string())
    );
    assert_eq!(apply("https://example.org/x.gif"), Rewrite::Keep);
  }

  #[test]
  fn idempotent_rules_are_stable_under_reapplication() {
    let (id, options) = (report(), TransformOptions::default());
    let ctx = RewriteContext::new(&id, &options).unwrap();
    let once = |href: &str| {
      match rewrite_href(href, &ctx) {
        Rewrite::Replace(value) => value,
        Rewrite::Keep | Rewrite::Unwrap => href.to_string(),
      }
    };

    for href in [
      "https://twitter.com/CDCgov",
      "#headerSearch",
      "/mmwr/volumes/70/wr/pdfs/mm0000a1-H.pdf",
      "/mmwr/volumes/70/wr/mm0000a2.htm",
    ] {
      let rule = match_href(href, &ctx).unwrap();
      assert!(rule.is_idempotent(), "{rule:?}");
      let first = once(href);
      // a blanked target is skipped entirely on later passes
      if !first.is_empty() {
        assert_eq!(once(&first), first, "{rule:?} on {href}");
      }
    }
  }

  #[test]
  fn suffix_rule_is_not_idempotent() {
    let (id, options) = (report(), TransformOptions::default());
    let ctx = RewriteContext::new(&id, &options).unwrap();
    assert!(!HrefRule::IntraPageAnchor.is_idempotent());
    let Rewrite::Replace(first) = rewrite_href("#References", &ctx) else {
      panic!("expected a rewrite");
    };
    assert_eq!(
      rewrite_href(&first, &ctx),
      Rewrite::Replace("#References_mm0000a1_mm0000a1".to_string())
    );
  }

  #[test]
  fn attribute_rules() {
    assert!(AttrRule::NavGroupControl.matches("nav-group-4f1b2"));
    assert!(!AttrRule::NavGroupControl.matches("nav-group-4f"));
    assert!(AttrRule::AnchorId.matches("Acknowledgments"));
    assert!(AttrRule::AnchorId.matches("T1_down"));
    assert!(!AttrRule::AnchorId.matches("Table1"));
    assert!(AttrRule::AcknowledgmentTitle.matches("Acknowledgment"));
    assert!(!AttrRule::AcknowledgmentTitle.matches("Footnotes"));
    assert_eq!(
      ATTR_SUFFIX_RULES.map(AttrRule::attribute),
      ["aria-controls", "id", "title"]
    );
  }
}
