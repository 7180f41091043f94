use std::fmt;

/// Error type for template operations.
#[derive(Debug)]
pub enum TemplateError {
  /// The requested configuration format is not supported. Contains the name
  /// of the unsupported format.
  UnsupportedFormat(String),
}

impl fmt::Display for TemplateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnsupportedFormat(format) => {
        write!(f, "Unsupported config format: {format}")
      },
    }
  }
}

impl std::error::Error for TemplateError {}

/// Default configuration template in TOML, commented so that a fresh
/// `selectees init` explains every key.
pub const DEFAULT_TOML_TEMPLATE: &str = r##"# selectees configuration file

# Zip archive holding the JSON document map (key -> HTML)
archive = "mmwr_art_en_html.zip"

# Name of the JSON entry inside the archive
archive_entry = "mmwr_art_en_html.json"

# Reports to collate, in output order. The 56 embedded identifiers are used
# when neither `selection` nor `selection_file` is set.
# selection = ["mm6802a1", "mm6806a2"]

# File with one identifier per line ('#' starts a comment). Replaces `selection`.
# selection_file = "selectees.txt"

# Static boilerplate copied verbatim around the fragments
head = "html/head.html"
toc = "html/toc.html"
tail = "html/tail.html"

# Collated output document
output = "build/mmwr_selectees.html"

# Markup written before every fragment
separator = "\n<hr style=\"border-top:1px solid\"/>\n"

[transform]
# Origin prepended to site-relative links and images
site_root = "https://www.cdc.gov"

# Local directories for the reports' own PDFs and GIFs
pdf_dir = "pdfs"
gif_dir = "gifs"

# Source of the scroll-to-top icon next to figure captions
scroll_top_icon = "//www.cdc.gov/images/arrow_up.gif"

[diagnostics]
# Filtered document map written by `selectees extract`
# json = "build/mmwr_selectees.json"

# Directory receiving the untouched HTML of `raw_reports`
# raw_dir = "build/raw"
raw_reports = ["mm6802a1", "mm7121e1"]
"##;

/// Default configuration template in JSON format.
pub const DEFAULT_JSON_TEMPLATE: &str = r##"{
  "archive": "mmwr_art_en_html.zip",
  "archive_entry": "mmwr_art_en_html.json",
  "head": "html/head.html",
  "toc": "html/toc.html",
  "tail": "html/tail.html",
  "output": "build/mmwr_selectees.html",
  "separator": "\n<hr style=\"border-top:1px solid\"/>\n",
  "transform": {
    "site_root": "https://www.cdc.gov",
    "pdf_dir": "pdfs",
    "gif_dir": "gifs",
    "scroll_top_icon": "//www.cdc.gov/images/arrow_up.gif"
  },
  "diagnostics": {
    "json": "build/mmwr_selectees.json",
    "raw_dir": "build/raw",
    "raw_reports": ["mm6802a1", "mm7121e1"]
  }
}
"##;

/// Get the correct configuration template based on the requested format.
///
/// # Errors
///
/// Returns an error if the requested format is not supported.
pub fn get_template(format: &str) -> Result<&'static str, TemplateError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    _ => Err(TemplateError::UnsupportedFormat(format.to_string())),
  }
}
