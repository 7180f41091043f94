use std::{
  fs,
  path::{Path, PathBuf},
};

use selectees_html::{ReportId, TransformOptions};
use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, selection};

/// Name of the JSON entry inside the archive.
pub const DEFAULT_ARCHIVE_ENTRY: &str = "mmwr_art_en_html.json";

/// Markup written before each fragment in the collated document.
pub const DEFAULT_SEPARATOR: &str = "\n<hr style=\"border-top:1px solid\"/>\n";

/// Configuration for the selectees pipeline.
///
/// [`Config`] holds every input and output location of the pipeline together
/// with the site constants used while rewriting reports. Fields are loaded
/// from one or more TOML or JSON files, adjusted by `--config KEY=VALUE`
/// overrides, and finally by subcommand flags.
///
/// No path has an implicit default; commands that need a path ask for it
/// through [`Config::require_archive`] or [`Config::collate_paths`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Zip archive (or plain JSON file) holding the document map.
  pub archive: Option<PathBuf>,

  /// Name of the JSON entry inside the archive.
  pub archive_entry: String,

  /// Reports to collate, in output order. [`None`] means the embedded
  /// default selection.
  pub selection: Option<Vec<ReportId>>,

  /// File listing the reports to collate. Takes precedence over
  /// `selection`.
  pub selection_file: Option<PathBuf>,

  /// Boilerplate written before the table of contents.
  pub head: Option<PathBuf>,

  /// Table of contents written after the head.
  pub toc: Option<PathBuf>,

  /// Boilerplate written after the last fragment.
  pub tail: Option<PathBuf>,

  /// Collated output document.
  pub output: Option<PathBuf>,

  /// Markup written before every fragment.
  pub separator: String,

  /// Site constants used by the rewrite rules.
  pub transform: TransformOptions,

  /// Diagnostic artifacts written by `extract`.
  pub diagnostics: DiagnosticsConfig,
}

/// Locations of the diagnostic artifacts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
  /// Filtered document map, written as JSON.
  pub json: Option<PathBuf>,

  /// Directory receiving the untouched source HTML of `raw_reports`.
  pub raw_dir: Option<PathBuf>,

  /// Reports whose source HTML is written to `raw_dir`.
  pub raw_reports: Vec<ReportId>,
}

/// Every path the `collate` command reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollatePaths {
  pub head:   PathBuf,
  pub toc:    PathBuf,
  pub tail:   PathBuf,
  pub output: PathBuf,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      archive:        None,
      archive_entry:  DEFAULT_ARCHIVE_ENTRY.to_string(),
      selection:      None,
      selection_file: None,
      head:           None,
      toc:            None,
      tail:           None,
      output:         None,
      separator:      DEFAULT_SEPARATOR.to_string(),
      transform:      TransformOptions::default(),
      diagnostics:    DiagnosticsConfig::default(),
    }
  }
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  #[allow(
    clippy::option_if_let_else,
    reason = "Clearer with explicit match on extension"
  )]
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to read config file: {}: {}",
        path.display(),
        e
      ))
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
      Some(ext) => {
        match ext.to_lowercase().as_str() {
          "json" => {
            serde_json::from_str(&content).map_err(|e| {
              ConfigError::Config(format!(
                "Failed to parse JSON config from {}: {}",
                path.display(),
                e
              ))
            })
          },
          "toml" => {
            toml::from_str(&content).map_err(|e| {
              ConfigError::Config(format!(
                "Failed to parse TOML config from {}: {}",
                path.display(),
                e
              ))
            })
          },
          _ => {
            Err(ConfigError::Config(format!(
              "Unsupported config file format: {}",
              path.display()
            )))
          },
        }
      },
      None => {
        Err(ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        )))
      },
    }
  }

  /// Load configuration from config files and `KEY=VALUE` overrides.
  ///
  /// Files are merged in order, later files taking precedence. Without any
  /// file, a config file in the working directory is used if one exists.
  /// Paths are not checked here; see [`Config::validate_paths`].
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be loaded, an override is malformed,
  /// or the configured selection lists a report twice.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if let Some((first, rest)) = config_files.split_first() {
      let mut merged_config = Self::from_file(first).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to load config from {}: {}",
          first.display(),
          e
        ))
      })?;

      for config_path in rest {
        let additional_config = Self::from_file(config_path).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to load config from {}: {}",
            config_path.display(),
            e
          ))
        })?;
        merged_config.merge(additional_config);
      }

      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }

      merged_config
    } else if let Some(discovered_config) = Self::find_config_file() {
      log::info!(
        "Using discovered config file: {}",
        discovered_config.display()
      );
      Self::from_file(&discovered_config).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to load discovered config from {}: {}",
          discovered_config.display(),
          e
        ))
      })?
    } else {
      Self::default()
    };

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    config.validate()?;
    Ok(config)
  }

  /// Check the values that do not depend on the filesystem.
  ///
  /// # Errors
  ///
  /// Returns an error if the configured selection lists a report twice.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if let Some(ref ids) = self.selection {
      selection::ensure_unique(ids)?;
    }
    if self.selection.is_some() && self.selection_file.is_some() {
      log::warn!(
        "Both 'selection' and 'selection_file' are set; the selection file \
         takes precedence"
      );
    }
    Ok(())
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// # Errors
  ///
  /// Returns an error if an override is not in KEY=VALUE format, names an
  /// unknown key, or has a value that cannot be parsed for its key.
  ///
  /// # Example
  ///
  /// ```rust, ignore
  /// config.apply_overrides(&vec![
  ///     "transform.site_root=https://mirror.example.org".to_string(),
  ///     "selection=mm6802a1,mm7121e1".to_string(),
  /// ])?;
  /// ```
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  /// Apply a single override. An empty value clears an optional field.
  ///
  /// Identifier lists are comma-separated. In `separator`, the escapes `\n`
  /// and `\t` stand for a newline and a tab.
  ///
  /// # Errors
  ///
  /// Returns an error for an unknown key or an invalid identifier.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    match key {
      "archive" => self.archive = optional_path(value),
      "archive_entry" => self.archive_entry = value.to_string(),
      "selection" => {
        self.selection = if value.is_empty() {
          None
        } else {
          Some(id_list(key, value)?)
        };
      },
      "selection_file" => self.selection_file = optional_path(value),
      "head" => self.head = optional_path(value),
      "toc" => self.toc = optional_path(value),
      "tail" => self.tail = optional_path(value),
      "output" => self.output = optional_path(value),
      "separator" => {
        self.separator = value.replace("\\n", "\n").replace("\\t", "\t");
      },
      "transform.site_root" => self.transform.site_root = value.to_string(),
      "transform.site_path_prefix" => {
        self.transform.site_path_prefix = value.to_string();
      },
      "transform.pdf_dir" => self.transform.pdf_dir = value.to_string(),
      "transform.gif_dir" => self.transform.gif_dir = value.to_string(),
      "transform.scroll_top_icon" => {
        self.transform.scroll_top_icon = value.to_string();
      },
      "diagnostics.json" => self.diagnostics.json = optional_path(value),
      "diagnostics.raw_dir" => self.diagnostics.raw_dir = optional_path(value),
      "diagnostics.raw_reports" => {
        self.diagnostics.raw_reports = id_list(key, value)?;
      },
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: '{key}'. See documentation for \
           supported keys."
        )));
      },
    }

    log::debug!("Config override: {key} = {value:?}");
    Ok(())
  }

  /// Merge another config into this one, with the other config's values taking
  /// precedence.
  ///
  /// # Merge Rules
  ///
  /// - [`Option<T>`] fields: Other's [`Some`] value replaces this config's
  ///   value
  /// - Plain fields: Other's value replaces this config's value unless it is
  ///   the default, so a later file only changes what it sets
  /// - `diagnostics.raw_reports`: Other's identifiers are appended, skipping
  ///   ones already listed
  pub fn merge(&mut self, other: Self) {
    let defaults = Self::default();

    merge_option(&mut self.archive, other.archive);
    merge_value(
      &mut self.archive_entry,
      other.archive_entry,
      &defaults.archive_entry,
    );
    merge_option(&mut self.selection, other.selection);
    merge_option(&mut self.selection_file, other.selection_file);
    merge_option(&mut self.head, other.head);
    merge_option(&mut self.toc, other.toc);
    merge_option(&mut self.tail, other.tail);
    merge_option(&mut self.output, other.output);
    merge_value(&mut self.separator, other.separator, &defaults.separator);

    let (transform, default_transform) =
      (other.transform, &defaults.transform);
    merge_value(
      &mut self.transform.site_root,
      transform.site_root,
      &default_transform.site_root,
    );
    merge_value(
      &mut self.transform.site_path_prefix,
      transform.site_path_prefix,
      &default_transform.site_path_prefix,
    );
    merge_value(
      &mut self.transform.pdf_dir,
      transform.pdf_dir,
      &default_transform.pdf_dir,
    );
    merge_value(
      &mut self.transform.gif_dir,
      transform.gif_dir,
      &default_transform.gif_dir,
    );
    merge_value(
      &mut self.transform.scroll_top_icon,
      transform.scroll_top_icon,
      &default_transform.scroll_top_icon,
    );

    merge_option(&mut self.diagnostics.json, other.diagnostics.json);
    merge_option(&mut self.diagnostics.raw_dir, other.diagnostics.raw_dir);
    for id in other.diagnostics.raw_reports {
      if !self.diagnostics.raw_reports.contains(&id) {
        self.diagnostics.raw_reports.push(id);
      }
    }
  }

  /// Search for a config file in the working directory, then in
  /// `$XDG_CONFIG_HOME/selectees`.
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    let current_dir = std::env::current_dir().ok()?;
    let local = [
      "selectees.toml",
      "selectees.json",
      ".selectees.toml",
      ".selectees.json",
    ]
    .into_iter()
    .map(|filename| current_dir.join(filename));

    let xdg = std::env::var_os("XDG_CONFIG_HOME")
      .map(|home| PathBuf::from(home).join("selectees"))
      .into_iter()
      .flat_map(|dir| {
        ["config.toml", "config.json"].map(|filename| dir.join(filename))
      });

    local.chain(xdg).find(|path| path.is_file())
  }

  /// The reports to collate, in output order.
  ///
  /// Priority order:
  ///
  /// 1. The identifiers listed in `selection_file`
  /// 2. The `selection` list
  /// 3. The embedded default selection
  ///
  /// # Errors
  ///
  /// Returns an error if the selection file cannot be read or is malformed.
  pub fn resolve_selection(&self) -> Result<Vec<ReportId>, ConfigError> {
    if let Some(ref path) = self.selection_file {
      let text = fs::read_to_string(path).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to read selection file: {}: {}",
          path.display(),
          e
        ))
      })?;
      let ids = selection::parse_selection(&text).map_err(|e| {
        ConfigError::Selection(format!("{}: {e}", path.display()))
      })?;
      log::debug!(
        "Loaded {} report identifiers from {}",
        ids.len(),
        path.display()
      );
      return Ok(ids);
    }

    Ok(
      self
        .selection
        .clone()
        .unwrap_or_else(selection::default_selection),
    )
  }

  /// The archive path.
  ///
  /// # Errors
  ///
  /// Returns an error if no archive is configured.
  pub fn require_archive(&self) -> Result<&Path, ConfigError> {
    self
      .archive
      .as_deref()
      .ok_or_else(|| missing_keys(&["archive"]))
  }

  /// Every path `collate` needs, reporting all missing ones at once.
  ///
  /// # Errors
  ///
  /// Returns an error naming every missing key.
  pub fn collate_paths(&self) -> Result<CollatePaths, ConfigError> {
    match (&self.head, &self.toc, &self.tail, &self.output) {
      (Some(head), Some(toc), Some(tail), Some(output)) => {
        Ok(CollatePaths {
          head:   head.clone(),
          toc:    toc.clone(),
          tail:   tail.clone(),
          output: output.clone(),
        })
      },
      _ => {
        let missing: Vec<&str> = [
          ("head", self.head.is_none()),
          ("toc", self.toc.is_none()),
          ("tail", self.tail.is_none()),
          ("output", self.output.is_none()),
        ]
        .into_iter()
        .filter_map(|(key, missing)| missing.then_some(key))
        .collect();
        Err(missing_keys(&missing))
      },
    }
  }

  /// Validate all paths specified in the configuration
  ///
  /// # Errors
  ///
  /// Returns an error listing every configured input that does not exist or
  /// is not a file, and every output that is blocked by a directory or file.
  pub fn validate_paths(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    for (label, path) in [
      ("Archive", &self.archive),
      ("Selection file", &self.selection_file),
      ("Head file", &self.head),
      ("Table of contents file", &self.toc),
      ("Tail file", &self.tail),
    ] {
      if let Some(path) = path {
        if !path.exists() {
          errors.push(format!("{label} does not exist: {}", path.display()));
        } else if !path.is_file() {
          errors.push(format!("{label} is not a file: {}", path.display()));
        }
      }
    }

    for (label, path) in [
      ("Output", &self.output),
      ("Diagnostic JSON", &self.diagnostics.json),
    ] {
      if let Some(path) = path
        && path.is_dir()
      {
        errors.push(format!("{label} path is a directory: {}", path.display()));
      }
    }

    if let Some(ref raw_dir) = self.diagnostics.raw_dir
      && raw_dir.exists()
      && !raw_dir.is_dir()
    {
      errors.push(format!(
        "Raw report directory path is not a directory: {}",
        raw_dir.display()
      ));
    }

    if !errors.is_empty() {
      let error_message = errors.join("\n");
      return Err(ConfigError::Config(format!(
        "Configuration path validation errors:\n{error_message}"
      )));
    }

    Ok(())
  }

  /// Generate a default configuration file with commented explanations
  ///
  /// # Errors
  ///
  /// Returns an error if the template cannot be retrieved or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let config_content = crate::templates::get_template(format)
      .map_err(|e| ConfigError::Template(e.to_string()))?;

    fs::write(path, config_content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {}",
        path.display(),
        e
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }
}

fn optional_path(value: &str) -> Option<PathBuf> {
  (!value.is_empty()).then(|| PathBuf::from(value))
}

fn id_list(key: &str, value: &str) -> Result<Vec<ReportId>, ConfigError> {
  let ids = value
    .split(',')
    .map(str::trim)
    .filter(|id| !id.is_empty())
    .map(|id| {
      id.parse::<ReportId>().map_err(|e| {
        ConfigError::Config(format!("Invalid value for '{key}': '{value}' - {e}"))
      })
    })
    .collect::<Result<Vec<_>, _>>()?;
  selection::ensure_unique(&ids)?;
  Ok(ids)
}

fn missing_keys(keys: &[&str]) -> ConfigError {
  ConfigError::Config(format!(
    "Missing required configuration {}: {}. Set it in a config file, with \
     --config KEY=VALUE, or with the matching command flag.",
    if keys.len() == 1 { "key" } else { "keys" },
    keys.join(", ")
  ))
}

fn merge_option<T>(target: &mut Option<T>, value: Option<T>) {
  if value.is_some() {
    *target = value;
  }
}

fn merge_value<T: PartialEq>(target: &mut T, value: T, default: &T) {
  if value != *default {
    *target = value;
  }
}
