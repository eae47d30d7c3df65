//! # Check Command
//!
//! Flags for checking and repairing copyright headers, and the run that
//! wires them into the processor.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::Args;
use copyright_check::config::{Config, load_config};
use copyright_check::copyright::YearStyle;
use copyright_check::diff::DiffManager;
use copyright_check::formats::FormatGroups;
use copyright_check::info_log;
use copyright_check::logging::{ColorMode, init_tracing, set_quiet, set_verbose};
use copyright_check::output::print_summary;
use copyright_check::processor::{Processor, ProcessorConfig, RunOptions};
use copyright_check::repair::RepairOptions;
use copyright_check::report::ReportGenerator;
use copyright_check::scm::{CommandBackend, DEFAULT_TIMEOUT, ScmKind};
use copyright_check::templates::{TemplateCatalog, TemplateSources};
use copyright_check::workspace::resolve_workspace;
use tracing::debug;

/// Arguments for a check or repair run
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
  /// Files or directories to check. Directories are walked recursively.
  #[arg(value_name = "PATH", default_value = ".")]
  pub paths: Vec<PathBuf>,

  /// Repair files with findings
  #[arg(long, short = 'r')]
  pub repair: bool,

  /// With --repair, write repaired content to <file>.new instead of replacing
  /// the file
  #[arg(long, short = 'n', requires = "repair")]
  pub dry_run: bool,

  /// Don't check that the copyright year matches the last change
  #[arg(long, short = 'y')]
  pub ignore_year: bool,

  /// Skip files that aren't under version control
  #[arg(long, short = 's')]
  pub scm_only: bool,

  /// Print the summary of findings at the end of the run
  #[arg(long, short = 'c')]
  pub count: bool,

  /// Suppress per-file messages
  #[arg(long, short = 'q', conflicts_with = "verbose")]
  pub quiet: bool,

  /// Print every file checked and every repair made
  #[arg(long, short = 'v')]
  pub verbose: bool,

  /// Print debugging output
  #[arg(long, short = 'd')]
  pub debug: bool,

  /// Don't warn about copyright lines after the header
  #[arg(long, short = 'w')]
  pub no_warn: bool,

  /// Leave files containing the do-not-alter marker untouched
  #[arg(long, short = 'e')]
  pub explicit_exclude: bool,

  /// Accept only the correct template, and re-render stale headers in full
  #[arg(long, short = 'N')]
  pub normalize: bool,

  /// Join years with a dash (2010-2015) instead of a comma (2010, 2015)
  #[arg(long, short = 'D')]
  pub use_dash: bool,

  /// Keep the copyright lines of headers that are replaced
  #[arg(long, short = 'P')]
  pub preserve_copyrights: bool,

  /// Exclude paths containing this string or matching this glob; `@FILE`
  /// reads one pattern per line from FILE (repeatable)
  #[arg(long, short = 'X', value_name = "PATTERN")]
  pub exclude: Vec<String>,

  /// Template every file should carry, either a bundled name or a file
  #[arg(long, short = 'C', value_name = "TEMPLATE")]
  pub correct_template: Option<String>,

  /// Additional acceptable templates, separated like PATH entries
  /// (repeatable)
  #[arg(long, short = 'A', value_name = "TEMPLATES")]
  pub alternate_templates: Vec<String>,

  /// Template used to repair BSD-style headers
  #[arg(long, short = 'B', value_name = "TEMPLATE")]
  pub bsd_template: Option<String>,

  /// Check hidden files and directories too
  #[arg(long, short = 'H')]
  pub hidden: bool,

  /// Check Java-like sources (all groups are checked unless one is selected)
  #[arg(long, short = 'j')]
  pub java: bool,

  /// Check XML, HTML and JSP files
  #[arg(long, short = 'x')]
  pub xml: bool,

  /// Check properties-style files
  #[arg(long, short = 'p')]
  pub properties: bool,

  /// Check all other text files
  #[arg(long, short = 't')]
  pub text: bool,

  /// Version control system to ask for last-changed dates [default: git]
  #[arg(long, value_enum, value_name = "SCM")]
  pub scm: Option<ScmKind>,

  /// Seconds a single version control command may take
  #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
  pub scm_timeout: Option<u64>,

  /// Path to config file (default: .copyright.toml in workspace root)
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Ignore config file even if present
  #[arg(long)]
  pub no_config: bool,

  /// Show a diff of every repair
  #[arg(long)]
  pub show_diff: bool,

  /// Append a diff of every repair to a file
  #[arg(long, value_name = "FILE")]
  pub save_diff: Option<PathBuf>,

  /// Write a JSON report of every file checked to the specified path
  #[arg(long, value_name = "OUTPUT")]
  pub report_json: Option<PathBuf>,

  /// Control when to use colored output (auto, never, always)
  #[arg(
    long,
    value_name = "WHEN",
    num_args = 0..=1,
    default_value_t = ColorMode::Auto,
    default_missing_value = "always",
    value_enum
  )]
  pub colors: ColorMode,
}

/// Settings after merging command-line flags over the config file.
#[derive(Debug, Clone)]
pub struct Settings {
  pub sources: TemplateSources,
  pub excludes: Vec<String>,
  pub scm: ScmKind,
  pub scm_timeout: Duration,
  pub options: RunOptions,
  pub repair_options: RepairOptions,
  pub include_hidden: bool,
}

impl CheckArgs {
  /// Merges the flags with an optional config file. A flag that is set wins;
  /// an unset flag falls back to the config value, then the default.
  pub fn settings(&self, config: Option<Config>) -> Settings {
    let config = config.unwrap_or_default();

    let alternates: Vec<String> = if self.alternate_templates.is_empty() {
      config.alternate_templates
    } else {
      self
        .alternate_templates
        .iter()
        .flat_map(|list| std::env::split_paths(list).collect::<Vec<_>>())
        .map(|path| path.to_string_lossy().to_string())
        .filter(|name| !name.is_empty())
        .collect()
    };

    let mut excludes = config.excludes;
    excludes.extend(self.exclude.iter().cloned());

    let use_dash = self.use_dash || config.use_dash.unwrap_or(false);

    Settings {
      sources: TemplateSources {
        correct: self.correct_template.clone().or(config.correct_template),
        alternates,
        bsd: self.bsd_template.clone().or(config.bsd_template),
      },
      excludes,
      scm: self.scm.or(config.scm).unwrap_or_default(),
      scm_timeout: self
        .scm_timeout
        .or(config.scm_timeout_secs)
        .map_or(DEFAULT_TIMEOUT, Duration::from_secs),
      options: RunOptions {
        repair: self.repair,
        dry_run: self.dry_run,
        ignore_year: self.ignore_year || config.ignore_year.unwrap_or(false),
        normalize: self.normalize || config.normalize.unwrap_or(false),
        scm_only: self.scm_only,
        warnings: !self.no_warn && config.warnings.unwrap_or(true),
        explicit_exclude: self.explicit_exclude,
        groups: FormatGroups {
          java: self.java,
          xml: self.xml,
          properties: self.properties,
          text: self.text,
        },
      },
      repair_options: RepairOptions {
        preserve: self.preserve_copyrights || config.preserve_copyrights.unwrap_or(false),
        style: if use_dash { YearStyle::Dash } else { YearStyle::Comma },
      },
      include_hidden: self.hidden || config.hidden.unwrap_or(false),
    }
  }
}

/// Run the check command with the given arguments.
///
/// # Returns
///
/// The process exit status: the number of errors found, capped at 255.
pub async fn run_check(args: CheckArgs) -> Result<i32> {
  if args.verbose {
    set_verbose();
  } else if args.quiet {
    set_quiet();
  }
  init_tracing(args.debug);
  args.colors.apply();

  let workspace = resolve_workspace()?;
  debug!("Using workspace root: {}", workspace.root().display());

  let config = load_config(args.config.as_deref(), workspace.root(), args.no_config)?;
  let settings = args.settings(config);

  let catalog = TemplateCatalog::load(&settings.sources).context("Failed to load copyright templates")?;
  debug!(
    "Correct template: {}, {} alternates, licensor {}",
    catalog.primary().name(),
    catalog.alternates().len(),
    catalog.licensor()
  );

  let current_year = chrono::Local::now().year().to_string();
  let scm = CommandBackend::new(settings.scm, settings.scm_timeout, current_year.clone());

  let diff_manager = DiffManager::new(args.show_diff, args.save_diff.clone());

  let processor = Processor::new(ProcessorConfig {
    options: settings.options,
    repair_options: settings.repair_options,
    excludes: settings.excludes,
    include_hidden: settings.include_hidden,
    diff_manager: Some(diff_manager),
    ..ProcessorConfig::new(Arc::new(catalog), Arc::new(scm), current_year)
  })?;

  let summary = processor.process(&args.paths).await;

  if args.count {
    print_summary(&summary, settings.options.ignore_year);
  }

  if let Some(path) = &args.report_json {
    ReportGenerator::new(path, Some(workspace.root())).generate(&processor.file_reports(), &summary)?;
    info_log!("Generated JSON report at {}", path.display());
  }

  Ok(i32::try_from(summary.errors.min(255)).unwrap_or(255))
}

