use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use path_clean::clean;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use oxibarrel_core::{
    BarrelError, DEFAULT_JS_EXTENSIONS, DEFAULT_OTHER_EXTENSIONS, DEFAULT_OUTPUT_NAME,
    ExtractOptions, ImportReferences, ModuleKind, ModulePath, ParserOptions, WalkConfig,
    collect_files, normalize_path, sort_paths,
};

use crate::{
    strategy::{CustomHandler, PathFilter, SubstringFilter, TemplateHandler, TemplateRule},
    writer::WriteMode,
};

const DEFAULT_IMPORT_ROOTS: &[&str] = &["./src/resources/"];
const DEFAULT_MODIFY_ROOTS: &[&str] = &["./src/resources/", "./src/pages/"];

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "sync")]
#[command(about = "Regenerate the aggregator module and the imports of every consumer")]
pub struct Config {
    /// Directory that configured paths are relative to (defaults to the current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// JSON options file; command-line flags take precedence over it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path scanned to build the aggregator's exports (repeatable)
    #[arg(long = "import", value_name = "PATH")]
    pub import: Vec<String>,

    /// Path whose modules receive the generated import line (repeatable)
    #[arg(long = "modify", value_name = "PATH")]
    pub modify: Vec<String>,

    /// Name of the generated aggregator module
    #[arg(long)]
    pub output_name: Option<String>,

    /// Former aggregator names whose stale import lines should be purged (repeatable)
    #[arg(long = "previous-output-name", value_name = "NAME")]
    pub previous_output_names: Vec<String>,

    /// Extension routed to named-export extraction (repeatable)
    #[arg(long = "js-extension", value_name = "EXT")]
    pub js_extensions: Vec<String>,

    /// Extension routed to side-effect-only imports (repeatable)
    #[arg(long = "other-extension", value_name = "EXT")]
    pub other_extensions: Vec<String>,

    /// Only import files whose path contains this text (repeatable)
    #[arg(long, value_name = "TEXT")]
    pub include: Vec<String>,

    /// Skip files whose path contains this text (repeatable)
    #[arg(long, value_name = "TEXT")]
    pub exclude: Vec<String>,

    /// Apply the include/exclude filter to consumer rewrites as well
    #[arg(long)]
    pub filter_modify: bool,

    /// Honour .gitignore/.ignore files while walking
    #[arg(long)]
    pub respect_ignore: bool,

    /// Also export names of exported function and class declarations
    #[arg(long)]
    pub include_declarations: bool,

    /// Report stale files without writing anything
    #[arg(long)]
    pub check: bool,
}

/// Options read from the `--config` JSON file. Keys are camelCase.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileOptions {
    pub import: Option<Vec<String>>,
    pub modify: Option<Vec<String>>,
    pub output_name: Option<String>,
    pub previous_output_names: Vec<String>,
    #[serde(alias = "babel")]
    pub parser: ParserOptions,
    pub file_extensions_js: Option<Vec<String>>,
    pub file_extensions_other: Option<Vec<String>>,
    pub filter: Option<FilterOptions>,
    pub file_extensions_custom: Vec<TemplateRule>,
    pub respect_ignore_files: bool,
    pub include_declarations: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterOptions {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub apply_to_modify: bool,
}

/// Where the aggregator module lives and which names identify its import
/// lines inside consumers.
#[derive(Debug, Clone)]
pub struct AggregatorTarget {
    pub path: PathBuf,
    /// Output path relative to the root, e.g. `gen/barrel.js`
    pub name: String,
    pub previous_names: Vec<String>,
}

impl AggregatorTarget {
    pub fn new(root: &Path, output_name: &str, previous_names: &[String]) -> Self {
        let relative = normalize_output_name(output_name);
        let path = clean_path(&root.join(&relative));
        let name = root_relative(&relative);
        let previous_names =
            previous_names.iter().map(|p| root_relative(&normalize_output_name(p))).collect();
        Self { path, name, previous_names }
    }

    pub fn module_path(&self) -> ModulePath {
        ModulePath::from_path(&self.path)
    }

    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }

    pub fn references(&self) -> ImportReferences {
        ImportReferences::new(&self.name, &self.previous_names)
    }
}

/// Fully resolved settings for one run.
pub struct Settings {
    pub root: PathBuf,
    pub import_roots: Vec<String>,
    pub modify_roots: Vec<String>,
    pub aggregator: AggregatorTarget,
    pub extract: ExtractOptions,
    pub js_extensions: Vec<String>,
    pub other_extensions: Vec<String>,
    pub filter: Option<Box<dyn PathFilter>>,
    /// Whether `filter` also gates which consumers are rewritten
    pub filter_modify: bool,
    pub custom: Option<Box<dyn CustomHandler>>,
    pub respect_ignore_files: bool,
    pub mode: WriteMode,
}

impl Settings {
    /// Defaults for a project rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let aggregator = AggregatorTarget::new(&root, DEFAULT_OUTPUT_NAME, &[]);
        Self {
            root,
            import_roots: to_strings(DEFAULT_IMPORT_ROOTS),
            modify_roots: to_strings(DEFAULT_MODIFY_ROOTS),
            aggregator,
            extract: ExtractOptions::default(),
            js_extensions: to_strings(DEFAULT_JS_EXTENSIONS),
            other_extensions: to_strings(DEFAULT_OTHER_EXTENSIONS),
            filter: None,
            filter_modify: false,
            custom: None,
            respect_ignore_files: false,
            mode: WriteMode::Write,
        }
    }

    /// Resolves a configured path against the root.
    pub fn resolve(&self, configured: &str) -> PathBuf {
        clean_path(&self.root.join(normalize_path(configured)))
    }

    /// Walks a configured root and returns its files in comparator order.
    pub fn scan(&self, configured: &str) -> Result<Vec<ModulePath>, BarrelError> {
        let cfg = WalkConfig {
            root: self.resolve(configured),
            respect_ignore_files: self.respect_ignore_files,
        };
        let mut files = collect_files(&cfg)?;
        sort_paths(&mut files);
        Ok(files)
    }

    /// Routes a file by extension; `None` means the file is skipped.
    pub fn classify(&self, path: &ModulePath) -> Option<ModuleKind> {
        if path.has_extension(&self.js_extensions) {
            Some(ModuleKind::JsLike)
        } else if path.has_extension(&self.other_extensions) {
            Some(ModuleKind::OtherAsset)
        } else if self.custom.is_some() {
            Some(ModuleKind::Custom)
        } else {
            None
        }
    }

    pub fn accepts(&self, path: &ModulePath) -> bool {
        self.filter.as_ref().is_none_or(|f| f.accept(path))
    }
}

impl Config {
    /// Layers built-in defaults, the optional JSON file and command-line flags
    /// into [`Settings`].
    pub fn load(&self) -> Result<Settings> {
        let root = resolve_root(self.root.clone())?;
        info!("Using root directory: {}", root.display());

        let file = match &self.config {
            Some(path) => read_options_file(path)?,
            None => FileOptions::default(),
        };

        let mut settings = Settings::new(root);
        settings.import_roots = pick(&self.import, file.import, DEFAULT_IMPORT_ROOTS);
        settings.modify_roots = pick(&self.modify, file.modify, DEFAULT_MODIFY_ROOTS);
        settings.js_extensions =
            pick(&self.js_extensions, file.file_extensions_js, DEFAULT_JS_EXTENSIONS);
        settings.other_extensions =
            pick(&self.other_extensions, file.file_extensions_other, DEFAULT_OTHER_EXTENSIONS);

        let output_name = self
            .output_name
            .clone()
            .or(file.output_name)
            .unwrap_or_else(|| DEFAULT_OUTPUT_NAME.to_string());
        let previous = if self.previous_output_names.is_empty() {
            file.previous_output_names
        } else {
            self.previous_output_names.clone()
        };
        settings.aggregator = AggregatorTarget::new(&settings.root, &output_name, &previous);
        debug!(
            "Aggregator: {} (previous names: {:?})",
            settings.aggregator.path.display(),
            settings.aggregator.previous_names
        );

        settings.extract = ExtractOptions {
            parser: file.parser,
            include_declarations: self.include_declarations || file.include_declarations,
        };
        settings.respect_ignore_files = self.respect_ignore || file.respect_ignore_files;
        settings.mode = if self.check { WriteMode::Check } else { WriteMode::Write };

        let filter_file = file.filter.unwrap_or_default();
        let include = if self.include.is_empty() { filter_file.include } else { self.include.clone() };
        let exclude = if self.exclude.is_empty() { filter_file.exclude } else { self.exclude.clone() };
        settings.filter_modify = self.filter_modify || filter_file.apply_to_modify;
        if !include.is_empty() || !exclude.is_empty() {
            match SubstringFilter::new(include, exclude) {
                Ok(filter) => settings.filter = Some(Box::new(filter)),
                Err(e) => warn!("Ignoring file filter: {}", e),
            }
        }

        if !file.file_extensions_custom.is_empty() {
            let aggregator_dir = settings.aggregator.dir().to_path_buf();
            match TemplateHandler::new(file.file_extensions_custom, aggregator_dir) {
                Ok(handler) => settings.custom = Some(Box::new(handler)),
                Err(e) => warn!("Ignoring custom extension handler: {}", e),
            }
        }

        debug!(
            "Import roots: {:?}, modify roots: {:?}",
            settings.import_roots, settings.modify_roots
        );
        Ok(settings)
    }
}

fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    match root {
        Some(r) => {
            debug!("Using provided root directory: {:?}", r);
            Ok(r.canonicalize().unwrap_or(r))
        }
        None => {
            debug!("No root provided, using the current directory");
            Ok(env::current_dir()?)
        }
    }
}

fn read_options_file(path: &Path) -> Result<FileOptions> {
    debug!("Reading options from {}", path.display());
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Normalizes an aggregator name: canonical slashes, `.js` appended when missing.
pub fn normalize_output_name(name: &str) -> String {
    let name = normalize_path(name);
    if name.ends_with(".js") { name } else { format!("{}.js", name) }
}

fn pick(cli: &[String], file: Option<Vec<String>>, default: &[&str]) -> Vec<String> {
    if !cli.is_empty() {
        cli.to_vec()
    } else {
        file.unwrap_or_else(|| to_strings(default))
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn root_relative(name: &str) -> String {
    normalize_path(&clean(name).to_string_lossy())
}

fn clean_path(path: &Path) -> PathBuf {
    PathBuf::from(clean(path.to_string_lossy().to_string()))
}
