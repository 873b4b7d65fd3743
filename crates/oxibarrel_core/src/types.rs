use indexmap::IndexSet;
use std::fmt;

use crate::path::ModulePath;

/// How a scanned file is routed into the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// Named-export extraction
    JsLike,
    /// Side-effect-only import
    OtherAsset,
    /// Delegated to the configured custom-extension handler
    Custom,
}

#[derive(Debug, Clone)]
pub struct ModuleRecord {
    pub path: ModulePath,
    pub kind: ModuleKind,
    pub local_exports: Vec<String>,
}

/// Insertion-ordered, deduplicating set of exported identifiers.
///
/// Iteration order is first-seen order and drives the textual order of the
/// generated export statement; membership alone drives difference queries.
#[derive(Debug, Clone, Default)]
pub struct ExportNameSet {
    names: IndexSet<String>,
}

impl ExportNameSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a name, returning false if it was already present. Empty names
    /// are ignored.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if name.is_empty() {
            return false;
        }
        self.names.insert(name)
    }

    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.insert(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|s| s.as_str())
    }

    /// Every name in the set that `local` does not define, in set order.
    pub fn missing_from<S: AsRef<str>>(&self, local: &[S]) -> Vec<String> {
        self.names
            .iter()
            .filter(|name| !local.iter().any(|l| l.as_ref() == name.as_str()))
            .cloned()
            .collect()
    }
}

/// One line of generated import code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStatement {
    /// `import {a, b} from '<source>';`, possibly with an empty name list
    Named { source: String, names: Vec<String> },
    /// `import '<source>';`
    SideEffect { source: String },
    /// A line supplied verbatim by a custom-extension handler
    Raw(String),
}

impl fmt::Display for ImportStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportStatement::Named { source, names } => {
                write!(f, "import {{{}}} from '{}';", names.join(", "), source)
            }
            ImportStatement::SideEffect { source } => write!(f, "import '{}';", source),
            ImportStatement::Raw(line) => f.write_str(line.trim_end()),
        }
    }
}

/// The generated aggregator module: one import per scanned file followed by
/// a single combined export statement.
#[derive(Debug, Clone, Default)]
pub struct AggregatorDocument {
    pub imports: Vec<ImportStatement>,
    pub exports: ExportNameSet,
}

impl AggregatorDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for import in &self.imports {
            out.push_str(&import.to_string());
            out.push('\n');
        }
        out.push('\n');
        let names: Vec<&str> = self.exports.iter().collect();
        out.push_str(&format!("export {{{}}};\n", names.join(", ")));
        out
    }
}
