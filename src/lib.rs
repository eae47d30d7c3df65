//! # copyright-check
//!
//! A tool that audits the copyright headers of source files and repairs the
//! ones that are missing, outdated or written against a legacy license.
//!
//! Every file's leading comment is extracted according to its format (Java,
//! XML, JSP, properties, shell, batch, markdown, asciidoc or plain text) and
//! compared with a catalog of license templates. A header that matches the
//! correct template must also name the year the file last changed, as
//! reported by git, Mercurial or Subversion.
//!
//! ## Features
//!
//! * Recognizes the correct template, acceptable alternates and a set of known
//!   legacy licenses
//! * Checks copyright years against version control history
//! * Repairs headers in place, or stages the repaired copy next to the file
//! * Keeps shebangs, XML prologs and package lines where they are
//! * Optional summary tally, unified diffs and a JSON report
//!
//! ## Usage as a Library
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use copyright_check::processor::{Processor, ProcessorConfig, RunOptions};
//! use copyright_check::scm::{CommandBackend, ScmKind};
//! use copyright_check::templates::TemplateCatalog;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let catalog = Arc::new(TemplateCatalog::bundled()?);
//!     let scm = Arc::new(CommandBackend::new(ScmKind::Git, Duration::from_secs(30), "2025"));
//!
//!     let processor = Processor::new(ProcessorConfig {
//!         options: RunOptions { repair: true, dry_run: true, warnings: true, ..RunOptions::default() },
//!         ..ProcessorConfig::new(catalog, scm, "2025")
//!     })?;
//!
//!     let summary = processor.process(&[PathBuf::from("src")]).await;
//!     if summary.errors > 0 {
//!         println!("{} files need attention", summary.errors);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! * [`processor`] - Runs the per-file pipeline over a set of paths
//! * [`formats`] - Comment extraction and rendering per file format
//! * [`templates`] - License templates and the catalog built from them
//! * [`classify`] - Classification of extracted headers
//! * [`date_check`] / [`scm`] - Copyright year validation against version control
//! * [`repair`] - Header replacement and year updates
//!
//! [`processor`]: crate::processor
//! [`formats`]: crate::formats
//! [`templates`]: crate::templates
//! [`classify`]: crate::classify
//! [`date_check`]: crate::date_check
//! [`scm`]: crate::scm
//! [`repair`]: crate::repair

pub mod classify;
pub mod config;
pub mod copyright;
pub mod date_check;
pub mod diff;
pub mod formats;
pub mod logging;
pub mod output;
pub mod processor;
pub mod repair;
pub mod report;
pub mod scm;
pub mod templates;
pub mod workspace;
