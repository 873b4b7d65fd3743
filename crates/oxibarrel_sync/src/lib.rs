//! Generation of the aggregator ("barrel") module and of the leading import
//! line in every consumer module.
//!
//! A run walks the configured import roots, extracts each module's named
//! exports, writes the aggregator, then rewrites each consumer under the
//! modify roots so it imports every aggregated name it does not define
//! itself. Both artifacts are only written when their content changes.
//!
//! # Examples
//!
//! ```no_run
//! use oxibarrel_sync::{Settings, print_summary, run_sync};
//! use std::io::{BufWriter, Write};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut settings = Settings::new("/path/to/site");
//! settings.import_roots = vec!["./src/components/".to_string()];
//!
//! let result = run_sync(&settings)?;
//!
//! let mut stdout = BufWriter::new(std::io::stdout());
//! print_summary(&mut stdout, &result)?;
//! stdout.flush()?;
//! # Ok(())
//! # }
//! ```

mod aggregator;
mod config;
mod consumer;
mod exports;
mod reporter;
mod runner;
mod strategy;
mod types;
mod writer;

// Re-export public API
pub use config::{AggregatorTarget, Config, FileOptions, FilterOptions, Settings, normalize_output_name};
pub use reporter::print_summary;
pub use runner::{Lifecycle, run_lifecycle, run_sync};
pub use strategy::{
    CustomHandler, CustomImport, PathFilter, SubstringFilter, TemplateHandler, TemplateRule,
};
pub use types::{FileChange, SyncResult, WriteOutcome};
pub use writer::{Granularity, WriteMode};
