use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use selectees_config::Config;
use selectees_html::ReportId;

/// Command line interface for selectees
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "Collate a fixed selection of archived MMWR reports into one HTML \
           document"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times). Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(
    short = 'c',
    long = "config-file",
    global = true,
    action = clap::ArgAction::Append
  )]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", global = true, action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// Inputs shared by every command that reads the archive.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
  /// Zip archive (or plain JSON document map) to read.
  #[arg(short, long)]
  pub archive: Option<PathBuf>,

  /// File listing the reports to use, one identifier per line.
  #[arg(short, long = "selection-file")]
  pub selection_file: Option<PathBuf>,
}

/// All supported subcommands for the selectees CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Initialize a new selectees configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "selectees.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Transform the selected reports and collate them into one document.
  Collate {
    #[command(flatten)]
    source: SourceArgs,

    /// HTML written before the table of contents.
    #[arg(long)]
    head: Option<PathBuf>,

    /// Table of contents HTML.
    #[arg(long)]
    toc: Option<PathBuf>,

    /// HTML written after the last report.
    #[arg(long)]
    tail: Option<PathBuf>,

    /// Collated output document.
    #[arg(short, long)]
    output: Option<PathBuf>,
  },

  /// Check that the archive holds every selected report with the expected
  /// page structure, without writing anything.
  Check {
    #[command(flatten)]
    source: SourceArgs,
  },

  /// Write the filtered document map and raw source pages for inspection.
  Extract {
    #[command(flatten)]
    source: SourceArgs,

    /// Where to write the filtered document map as JSON.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Directory receiving raw source pages.
    #[arg(long = "raw-dir")]
    raw_dir: Option<PathBuf>,

    /// Report whose raw source page is written (can be specified multiple
    /// times). Replaces the configured list.
    #[arg(short, long = "report", action = clap::ArgAction::Append)]
    reports: Vec<ReportId>,
  },
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }

  /// Merge subcommand flags into `config`, prioritizing them over values from
  /// config files and overrides.
  pub fn merge_with_cli(&self, config: &mut Config) {
    match &self.command {
      Commands::Init { .. } => {},
      Commands::Collate {
        source,
        head,
        toc,
        tail,
        output,
      } => {
        source.merge_into(config);
        replace_if_set(&mut config.head, head.as_ref());
        replace_if_set(&mut config.toc, toc.as_ref());
        replace_if_set(&mut config.tail, tail.as_ref());
        replace_if_set(&mut config.output, output.as_ref());
      },
      Commands::Check { source } => source.merge_into(config),
      Commands::Extract {
        source,
        json,
        raw_dir,
        reports,
      } => {
        source.merge_into(config);
        replace_if_set(&mut config.diagnostics.json, json.as_ref());
        replace_if_set(&mut config.diagnostics.raw_dir, raw_dir.as_ref());
        if !reports.is_empty() {
          config.diagnostics.raw_reports.clone_from(reports);
        }
      },
    }
  }
}

impl SourceArgs {
  fn merge_into(&self, config: &mut Config) {
    replace_if_set(&mut config.archive, self.archive.as_ref());
    replace_if_set(&mut config.selection_file, self.selection_file.as_ref());
  }
}

fn replace_if_set(target: &mut Option<PathBuf>, value: Option<&PathBuf>) {
  if let Some(value) = value {
    *target = Some(value.clone());
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use super::*;

  #[test]
  fn global_flags_follow_the_subcommand() {
    let cli = Cli::try_parse_from([
      "selectees",
      "check",
      "-v",
      "-c",
      "a.toml",
      "-c",
      "b.json",
      "--config",
      "archive=x.zip",
    ])
    .unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.config_files, [
      PathBuf::from("a.toml"),
      PathBuf::from("b.json")
    ]);
    assert_eq!(cli.config_overrides, ["archive=x.zip"]);
  }

  #[test]
  fn collate_flags_override_config() {
    let cli = Cli::try_parse_from([
      "selectees",
      "collate",
      "--archive",
      "cli.zip",
      "--head",
      "head.html",
      "-o",
      "out.html",
    ])
    .unwrap();

    let mut config = Config {
      archive: Some(PathBuf::from("file.zip")),
      toc: Some(PathBuf::from("toc.html")),
      ..Config::default()
    };
    cli.merge_with_cli(&mut config);

    assert_eq!(config.archive, Some(PathBuf::from("cli.zip")));
    assert_eq!(config.head, Some(PathBuf::from("head.html")));
    assert_eq!(config.toc, Some(PathBuf::from("toc.html")));
    assert_eq!(config.output, Some(PathBuf::from("out.html")));
    assert!(config.tail.is_none());
  }

  #[test]
  fn extract_reports_are_parsed_as_identifiers() {
    let cli = Cli::try_parse_from([
      "selectees",
      "extract",
      "--report",
      "mm6802a1",
      "-r",
      "mm7121e1",
    ])
    .unwrap();
    let mut config = Config::default();
    cli.merge_with_cli(&mut config);
    assert_eq!(config.diagnostics.raw_reports.len(), 2);

    assert!(
      Cli::try_parse_from(["selectees", "extract", "--report", "bogus"])
        .is_err()
    );
  }

  #[test]
  fn init_rejects_unknown_format() {
    assert!(
      Cli::try_parse_from(["selectees", "init", "-F", "yaml"]).is_err()
    );
  }
}
