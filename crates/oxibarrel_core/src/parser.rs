use indexmap::IndexSet;
use log::{debug, trace};
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_parser::{Parser as OxcParser, ParserReturn};
use oxc_span::SourceType;
use serde::Deserialize;

use crate::{
    constants::{JSX_EXTENSIONS, TYPESCRIPT_EXTENSIONS},
    error::{BarrelError, Result},
    path::ModulePath,
};

/// Syntax options handed to the parser for every scanned module.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserOptions {
    /// Accept JSX in plain JavaScript files
    pub jsx: bool,
    /// Force TypeScript syntax on or off; inferred from the extension when unset
    pub typescript: Option<bool>,
    /// Parse as an ES module rather than a script
    pub module: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self { jsx: true, typescript: None, module: true }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub parser: ParserOptions,
    /// Also collect names of exported function and class declarations
    pub include_declarations: bool,
}

/// Returns the identifiers a module exports by name, in source order.
///
/// Only top-level named exports count: export specifiers (the exported side
/// of an alias), plain variable declarators, identifiers bound directly by
/// an array pattern and identifiers bound as object pattern values. Default
/// exports are ignored. Duplicates keep their first position.
pub fn exports_for(path: &ModulePath, source: &str, opts: &ExtractOptions) -> Result<Vec<String>> {
    trace!("Parsing file for exports: {}", path);
    let st = source_type_for(path, &opts.parser);
    let allocator = Allocator::default();
    let ParserReturn { program, errors, panicked, .. } =
        OxcParser::new(&allocator, source, st).parse();

    if panicked || !errors.is_empty() {
        let mut message = errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ");
        if message.is_empty() {
            message = "parser aborted".to_string();
        }
        return Err(BarrelError::Parse { path: path.to_string(), message });
    }

    let mut names: IndexSet<String> = IndexSet::new();
    for stmt in &program.body {
        match stmt {
            Statement::ExportNamedDeclaration(decl) => {
                collect_named_export(decl, opts, &mut names);
            }
            // `export * as ns from '...'` binds a name; a bare `export *` does not
            Statement::ExportAllDeclaration(decl) => {
                if let Some(name) = decl.exported.as_ref().and_then(export_name) {
                    trace!("Found namespace re-export: '{}'", name);
                    names.insert(name);
                }
            }
            _ => {}
        }
    }
    names.retain(|n| !n.is_empty());

    debug!("Found {} exports in {}", names.len(), path);
    Ok(names.into_iter().collect())
}

fn collect_named_export(
    decl: &ExportNamedDeclaration,
    opts: &ExtractOptions,
    names: &mut IndexSet<String>,
) {
    for spec in &decl.specifiers {
        if let Some(name) = export_name(&spec.exported) {
            trace!("Found export specifier: '{}'", name);
            names.insert(name);
        }
    }

    match &decl.declaration {
        Some(Declaration::VariableDeclaration(var)) => {
            for d in &var.declarations {
                if let BindingPatternKind::BindingIdentifier(id) = &d.id.kind {
                    names.insert(id.name.to_string());
                }
            }
            for d in &var.declarations {
                if let BindingPatternKind::ArrayPattern(arr) = &d.id.kind {
                    for elem in arr.elements.iter().flatten() {
                        if let BindingPatternKind::BindingIdentifier(id) = &elem.kind {
                            names.insert(id.name.to_string());
                        }
                    }
                }
            }
            for d in &var.declarations {
                if let BindingPatternKind::ObjectPattern(obj) = &d.id.kind {
                    for prop in &obj.properties {
                        if let BindingPatternKind::BindingIdentifier(id) = &prop.value.kind {
                            names.insert(id.name.to_string());
                        }
                    }
                }
            }
        }
        Some(Declaration::FunctionDeclaration(func)) if opts.include_declarations => {
            if let Some(id) = &func.id {
                names.insert(id.name.to_string());
            }
        }
        Some(Declaration::ClassDeclaration(class)) if opts.include_declarations => {
            if let Some(id) = &class.id {
                names.insert(id.name.to_string());
            }
        }
        _ => {}
    }
}

// String-literal export names cannot appear in an import list
fn export_name(name: &ModuleExportName) -> Option<String> {
    match name {
        ModuleExportName::IdentifierName(id) => Some(id.name.to_string()),
        ModuleExportName::IdentifierReference(id) => Some(id.name.to_string()),
        ModuleExportName::StringLiteral(_) => None,
    }
}

fn source_type_for(path: &ModulePath, opts: &ParserOptions) -> SourceType {
    let ext = path
        .as_path()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let typescript =
        opts.typescript.unwrap_or_else(|| TYPESCRIPT_EXTENSIONS.contains(&ext.as_str()));
    let jsx = if typescript {
        // JSX in a .ts file breaks angle-bracket type assertions
        JSX_EXTENSIONS.contains(&ext.as_str())
    } else {
        opts.jsx || JSX_EXTENSIONS.contains(&ext.as_str())
    };

    SourceType::default().with_typescript(typescript).with_jsx(jsx).with_module(opts.module)
}
