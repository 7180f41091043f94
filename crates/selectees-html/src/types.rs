use std::{borrow::Borrow, fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{error::ReportIdError, utils::compile_static};

/// Report identifier embedded in an archive key. A match directly followed by
/// `_` or `-` belongs to a longer name (supplements, figures) and is skipped.
static REPORT_ID_IN_KEY: LazyLock<Regex> = LazyLock::new(|| {
  compile_static("REPORT_ID_IN_KEY", r"(mm\d{4,6}[ae]\d{1,2})(?:[^_-]|$)")
});

static REPORT_ID_EXACT: LazyLock<Regex> = LazyLock::new(|| {
  compile_static("REPORT_ID_EXACT", r"^mm\d{4,6}[ae]\d{1,2}$")
});

/// Identifier of a single archived report, e.g. `mm6802a1`.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct ReportId(String);

impl ReportId {
  /// Extract the first report identifier embedded in an archive key.
  ///
  /// ```
  /// use selectees_html::ReportId;
  ///
  /// let id = ReportId::from_key("/mmwr/volumes/68/wr/mm6802a1.htm");
  /// assert_eq!(id.as_deref(), Some("mm6802a1"));
  /// assert_eq!(ReportId::from_key("/mmwr/volumes/68/wr/mm6802a1-H.pdf"), None);
  /// ```
  #[must_use]
  pub fn from_key(key: &str) -> Option<Self> {
    REPORT_ID_IN_KEY
      .captures(key)
      .and_then(|caps| caps.get(1))
      .map(|m| Self(m.as_str().to_string()))
  }

  #[must_use]
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl FromStr for ReportId {
  type Err = ReportIdError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    if REPORT_ID_EXACT.is_match(trimmed) {
      Ok(Self(trimmed.to_string()))
    } else {
      Err(ReportIdError(s.to_string()))
    }
  }
}

impl TryFrom<String> for ReportId {
  type Error = ReportIdError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<ReportId> for String {
  fn from(id: ReportId) -> Self {
    id.0
  }
}

impl fmt::Display for ReportId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl AsRef<str> for ReportId {
  fn as_ref(&self) -> &str {
    &self.0
  }
}

impl Borrow<str> for ReportId {
  fn borrow(&self) -> &str {
    &self.0
  }
}

impl std::ops::Deref for ReportId {
  type Target = str;

  fn deref(&self) -> &str {
    &self.0
  }
}

/// Site-specific constants used by the rewrite rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
  /// Absolute origin prepended to site-relative links and images.
  pub site_root: String,

  /// Path prefix identifying site-relative report links.
  pub site_path_prefix: String,

  /// Local directory that report PDFs are rewritten into.
  pub pdf_dir: String,

  /// Local directory that report GIFs (and the scroll-to-top icon) are
  /// rewritten into.
  pub gif_dir: String,

  /// Source of the "scroll to top" icon shown next to figure captions.
  pub scroll_top_icon: String,
}

impl Default for TransformOptions {
  fn default() -> Self {
    Self {
      site_root:        "https://www.cdc.gov".to_string(),
      site_path_prefix: "/mmwr/volumes".to_string(),
      pdf_dir:          "pdfs".to_string(),
      gif_dir:          "gifs".to_string(),
      scroll_top_icon:  "//www.cdc.gov/images/arrow_up.gif".to_string(),
    }
  }
}

impl TransformOptions {
  /// Local path the scroll-to-top icon is rewritten to.
  #[must_use]
  pub fn local_scroll_top_icon(&self) -> String {
    let file_name = self
      .scroll_top_icon
      .rsplit('/')
      .next()
      .unwrap_or(&self.scroll_top_icon);
    format!("{}/{file_name}", self.gif_dir)
  }
}

/// Counts of each edit applied while transforming one report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
  pub top_paragraphs:      usize,
  pub unwrapped_links:     usize,
  pub blanked_links:       usize,
  pub suffixed_links:      usize,
  pub local_pdfs:          usize,
  pub absolute_links:      usize,
  pub suffixed_attributes: usize,
  pub local_gifs:          usize,
  pub absolute_images:     usize,
  pub relocated_icons:     usize,
}

impl fmt::Display for TransformStats {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} top, {} unwrapped, {} blanked, {} anchors suffixed, {} pdfs, {} \
       absolute links, {} attributes suffixed, {} gifs, {} absolute images, \
       {} icons moved",
      self.top_paragraphs,
      self.unwrapped_links,
      self.blanked_links,
      self.suffixed_links,
      self.local_pdfs,
      self.absolute_links,
      self.suffixed_attributes,
      self.local_gifs,
      self.absolute_images,
      self.relocated_icons
    )
  }
}

impl std::ops::AddAssign for TransformStats {
  fn add_assign(&mut self, other: Self) {
    self.top_paragraphs += other.top_paragraphs;
    self.unwrapped_links += other.unwrapped_links;
    self.blanked_links += other.blanked_links;
    self.suffixed_links += other.suffixed_links;
    self.local_pdfs += other.local_pdfs;
    self.absolute_links += other.absolute_links;
    self.suffixed_attributes += other.suffixed_attributes;
    self.local_gifs += other.local_gifs;
    self.absolute_images += other.absolute_images;
    self.relocated_icons += other.relocated_icons;
  }
}

/// Trimmed and rewritten HTML for one report, ready for collation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
  pub report: ReportId,
  pub html:   String,
  pub stats:  TransformStats,
}
