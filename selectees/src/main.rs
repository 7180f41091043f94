use std::fs;

use color_eyre::eyre::{Context, Result, bail};
use log::{LevelFilter, info, warn};
use selectees::{
  SelecteesError,
  cli::{Cli, Commands},
  utils::{
    archive::{DocumentMap, load_archive},
    collate::{Boilerplate, write_collated},
    diagnostics::{write_document_map, write_raw_reports},
    pipeline::{self, CheckReport},
    select::select,
  },
};
use selectees_config::Config;
use selectees_html::{ReportId, ReportTransformer, StructureSurvey};

fn main() -> Result<()> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  if let Commands::Init {
    output,
    format,
    force,
  } = &cli.command
  {
    if output.exists() && !force {
      bail!(
        "Configuration file already exists: {}. Use --force to overwrite.",
        output.display()
      );
    }

    if let Some(parent) = output.parent()
      && !parent.as_os_str().is_empty()
      && !parent.exists()
    {
      fs::create_dir_all(parent).wrap_err_with(|| {
        format!("Failed to create directory: {}", parent.display())
      })?;
      info!("Created directory: {}", parent.display());
    }

    Config::generate_default_config(format, output).wrap_err_with(|| {
      format!("Failed to generate configuration file: {}", output.display())
    })?;

    info!(
      "Configuration file created successfully. Edit it to point at your \
       archive and boilerplate files."
    );
    return Ok(());
  }

  let mut config = Config::load(&cli.config_files, &cli.config_overrides)
    .wrap_err("Failed to load configuration")?;
  cli.merge_with_cli(&mut config);
  config.validate_paths()?;

  match &cli.command {
    Commands::Init { .. } => Ok(()),
    Commands::Collate { .. } => collate(&config),
    Commands::Check { .. } => check(&config),
    Commands::Extract { .. } => extract(&config),
  }
}

/// Load the archive and the list of reports to use from it.
fn load_sources(config: &Config) -> Result<(DocumentMap, Vec<ReportId>)> {
  let archive_path = config.require_archive()?;
  let archive = load_archive(archive_path, &config.archive_entry)
    .wrap_err("Archive load failed")?;
  let selection = config
    .resolve_selection()
    .wrap_err("Failed to resolve the report selection")?;
  info!("Selection lists {} reports", selection.len());
  Ok((archive, selection))
}

/// The full pipeline: load, select, transform, collate.
fn collate(config: &Config) -> Result<()> {
  let paths = config.collate_paths()?;
  let (archive, ids) = load_sources(config)?;

  let selection = select(&archive, &ids).wrap_err("Selection failed")?;
  selection.ensure_complete().wrap_err("Selection failed")?;

  let boilerplate = Boilerplate::read(&paths)?;
  let transformer = ReportTransformer::new(config.transform.clone());
  let fragments = pipeline::transform_all(&transformer, &selection)
    .wrap_err("Transform failed")?;

  write_collated(&paths.output, &boilerplate, &fragments, &config.separator)
    .wrap_err("Collation failed")?;
  Ok(())
}

/// Survey and dry-run every selected report.
fn check(config: &Config) -> Result<()> {
  let (archive, ids) = load_sources(config)?;
  let selection = select(&archive, &ids).wrap_err("Selection failed")?;
  for report in &selection.missing {
    warn!("{report} is not in the archive");
  }

  let transformer = ReportTransformer::new(config.transform.clone());
  let report = pipeline::check(&transformer, &selection);
  print_survey(&report);

  for (id, violation) in &report.problems {
    warn!("{id}: {violation}");
  }
  for failure in &report.failures {
    warn!("{failure}");
  }

  selection.ensure_complete()?;
  let failing = report.failing_reports();
  if !failing.is_empty() {
    return Err(SelecteesError::Structure(failing).into());
  }

  info!("All {} selected reports passed", selection.len());
  Ok(())
}

#[allow(clippy::print_stdout, reason = "The survey table is the output")]
fn print_survey(report: &CheckReport) {
  let labels = StructureSurvey::default().fields().map(|(label, _)| label);
  println!("{:<12} {}", "report", labels.join(" "));
  for (id, survey) in &report.surveys {
    let counts: Vec<String> = survey
      .fields()
      .iter()
      .map(|(label, count)| format!("{count:>width$}", width = label.len()))
      .collect();
    println!("{:<12} {}", id.as_str(), counts.join(" "));
  }

  for (field, counts) in report.histogram() {
    let summary: Vec<String> = counts
      .iter()
      .map(|(count, reports)| format!("{count}: {reports}"))
      .collect();
    info!("{field}: {}", summary.join(", "));
  }
}

/// Write the diagnostic artifacts that are configured.
fn extract(config: &Config) -> Result<()> {
  let diagnostics = &config.diagnostics;
  if diagnostics.json.is_none() && diagnostics.raw_dir.is_none() {
    bail!(
      "Nothing to extract: set diagnostics.json or diagnostics.raw_dir, or \
       pass --json or --raw-dir"
    );
  }

  let (archive, ids) = load_sources(config)?;
  let selection = select(&archive, &ids).wrap_err("Selection failed")?;
  for report in &selection.missing {
    warn!("{report} is not in the archive");
  }

  if let Some(ref path) = diagnostics.json {
    write_document_map(path, &selection)?;
  }

  if let Some(ref dir) = diagnostics.raw_dir {
    if diagnostics.raw_reports.is_empty() {
      warn!(
        "No reports listed in diagnostics.raw_reports; nothing written to {}",
        dir.display()
      );
    } else {
      write_raw_reports(dir, &selection, &diagnostics.raw_reports)?;
    }
  }

  Ok(())
}
