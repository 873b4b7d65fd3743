//! Core building blocks for oxibarrel.
//!
//! This crate holds everything that operates on a single file or path,
//! independent of configuration and file writing:
//! - Normalizing and ordering module paths
//! - Walking a file tree
//! - Purging import lines previously generated into a module, including
//!   ones caught in unresolved merge conflicts
//! - Extracting the named exports of a JS/TS module with `oxc`
//! - The insertion-ordered export set and the aggregator document model

mod constants;
mod error;
mod order;
mod parser;
mod path;
mod purge;
mod types;
mod walker;

// Re-export public API
pub use constants::{DEFAULT_JS_EXTENSIONS, DEFAULT_OTHER_EXTENSIONS, DEFAULT_OUTPUT_NAME};
pub use error::{BarrelError, Result};
pub use order::{compare_paths, sort_paths};
pub use parser::{ExtractOptions, ParserOptions, exports_for};
pub use path::{ModulePath, make_relative, normalize_path, relative_reference};
pub use purge::{ImportReferences, first_line, purge_generated_imports};
pub use types::{AggregatorDocument, ExportNameSet, ImportStatement, ModuleKind, ModuleRecord};
pub use walker::{WalkConfig, collect_files};
