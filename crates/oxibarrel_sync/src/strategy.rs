//! Pluggable file filter and custom-extension handler.
//!
//! Both are trait objects so library callers can pass closures, while the
//! command line builds the config-driven implementations below.

use log::trace;
use serde::Deserialize;
use std::path::PathBuf;

use oxibarrel_core::{BarrelError, ModulePath, Result, relative_reference};

/// Decides whether a scanned file takes part in the import phase.
pub trait PathFilter: Send + Sync {
    fn accept(&self, path: &ModulePath) -> bool;
}

impl<F> PathFilter for F
where
    F: Fn(&ModulePath) -> bool + Send + Sync,
{
    fn accept(&self, path: &ModulePath) -> bool {
        self(path)
    }
}

/// What a custom-extension handler contributes for one file. Either part may
/// be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomImport {
    pub import_line: Option<String>,
    pub exported_names: Option<Vec<String>>,
}

/// Handles files whose extension is neither JS-like nor a plain asset.
pub trait CustomHandler: Send + Sync {
    fn handle(&self, path: &ModulePath) -> CustomImport;
}

impl<F> CustomHandler for F
where
    F: Fn(&ModulePath) -> CustomImport + Send + Sync,
{
    fn handle(&self, path: &ModulePath) -> CustomImport {
        self(path)
    }
}

/// Substring include/exclude filter. A path passes when it contains any
/// include pattern (or none are given) and no exclude pattern.
#[derive(Debug, Clone)]
pub struct SubstringFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl SubstringFilter {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Result<Self> {
        if include.iter().chain(exclude.iter()).any(|p| p.is_empty()) {
            return Err(BarrelError::InvalidConfig("filter patterns must not be empty".into()));
        }
        Ok(Self { include, exclude })
    }
}

impl PathFilter for SubstringFilter {
    fn accept(&self, path: &ModulePath) -> bool {
        let p = path.as_str();
        let included = self.include.is_empty() || self.include.iter().any(|i| p.contains(i));
        let excluded = self.exclude.iter().any(|e| p.contains(e));
        if !included || excluded {
            trace!("Filtered out: {}", p);
        }
        included && !excluded
    }
}

/// One extension mapped to a templated import line and export names.
///
/// Templates may use `{path}` (reference from the aggregator to the file) and
/// `{stem}` (file name without its last extension).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRule {
    pub extension: String,
    #[serde(default)]
    pub import_line: Option<String>,
    #[serde(default)]
    pub exports: Vec<String>,
}

/// Config-driven [`CustomHandler`]: the first rule whose extension matches wins.
#[derive(Debug, Clone)]
pub struct TemplateHandler {
    rules: Vec<TemplateRule>,
    aggregator_dir: PathBuf,
}

impl TemplateHandler {
    pub fn new(rules: Vec<TemplateRule>, aggregator_dir: PathBuf) -> Result<Self> {
        if rules.is_empty() {
            return Err(BarrelError::InvalidConfig("custom extension handler has no rules".into()));
        }
        for rule in &rules {
            if rule.extension.trim_start_matches('.').is_empty() {
                return Err(BarrelError::InvalidConfig(
                    "custom extension rule is missing its extension".into(),
                ));
            }
            if rule.import_line.is_none() && rule.exports.is_empty() {
                return Err(BarrelError::InvalidConfig(format!(
                    "custom extension rule for '{}' has neither importLine nor exports",
                    rule.extension
                )));
            }
        }
        Ok(Self { rules, aggregator_dir })
    }

    fn render(&self, template: &str, path: &ModulePath) -> String {
        let stem = path.as_path().file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
        template
            .replace("{path}", &relative_reference(&self.aggregator_dir, path.as_path()))
            .replace("{stem}", &stem)
    }
}

impl CustomHandler for TemplateHandler {
    fn handle(&self, path: &ModulePath) -> CustomImport {
        let Some(rule) = self.rules.iter().find(|r| path.has_extension(&[r.extension.as_str()]))
        else {
            return CustomImport::default();
        };
        trace!("Custom rule '{}' matched {}", rule.extension, path);

        CustomImport {
            import_line: rule.import_line.as_deref().map(|t| self.render(t, path)),
            exported_names: if rule.exports.is_empty() {
                None
            } else {
                Some(rule.exports.iter().map(|t| self.render(t, path)).collect())
            },
        }
    }
}
