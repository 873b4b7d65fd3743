use anyhow::{Context, Result};
use log::{debug, info, trace, warn};
use rayon::prelude::*;
use std::{collections::HashSet, fs, path::Path};

use oxibarrel_core::{
    AggregatorDocument, ImportStatement, ModuleKind, ModulePath, ModuleRecord,
    purge_generated_imports, relative_reference,
};

use crate::{
    config::Settings,
    exports::{ExportCache, local_exports},
};

pub(crate) struct AggregatorOutput {
    pub(crate) document: AggregatorDocument,
    /// Files that contributed an import statement or names
    pub(crate) files_scanned: usize,
    pub(crate) parse_failures: usize,
}

/// What one scanned file adds to the aggregator.
struct Contribution {
    record: ModuleRecord,
    import: Option<ImportStatement>,
    parse_failed: bool,
}

/// Walks every import root and builds the aggregator document.
///
/// Files are extracted in parallel; results are folded in comparator order, so
/// the document is a pure function of the sorted file list and each file's
/// exports. A missing import root is an error.
pub(crate) fn build_aggregator(settings: &Settings, cache: &ExportCache) -> Result<AggregatorOutput> {
    let aggregator_path = settings.aggregator.module_path();
    let mut seen: HashSet<ModulePath> = HashSet::new();
    let mut document = AggregatorDocument::new();
    let mut files_scanned = 0;
    let mut parse_failures = 0;

    for configured in &settings.import_roots {
        let files = settings.scan(configured)?;
        debug!("Import root {} has {} files", configured, files.len());

        let candidates: Vec<(ModulePath, ModuleKind)> = files
            .into_iter()
            .filter(|path| *path != aggregator_path)
            .filter(|path| settings.accepts(path))
            .filter_map(|path| {
                let Some(kind) = settings.classify(&path) else {
                    trace!("Skipping unrouted file: {}", path);
                    return None;
                };
                seen.insert(path.clone()).then_some((path, kind))
            })
            .collect();

        let contributions: Vec<Option<Contribution>> = candidates
            .par_iter()
            .map(|(path, kind)| contribution_for(settings, path, *kind, cache))
            .collect::<Result<_>>()?;

        for contribution in contributions.into_iter().flatten() {
            files_scanned += 1;
            if contribution.parse_failed {
                parse_failures += 1;
            }
            let record = contribution.record;
            trace!(
                "{} ({:?}) contributes {} names",
                record.path,
                record.kind,
                record.local_exports.len()
            );
            if let Some(import) = contribution.import {
                document.imports.push(import);
            }
            document.exports.extend(record.local_exports);
        }
    }

    info!(
        "Aggregator covers {} files and exports {} names",
        files_scanned,
        document.exports.len()
    );
    Ok(AggregatorOutput { document, files_scanned, parse_failures })
}

fn contribution_for(
    settings: &Settings,
    path: &ModulePath,
    kind: ModuleKind,
    cache: &ExportCache,
) -> Result<Option<Contribution>> {
    let source = relative_reference(settings.aggregator.dir(), path.as_path());
    match kind {
        ModuleKind::JsLike => {
            let source_text = read_source(path.as_path())?;
            let purged =
                purge_generated_imports(&source_text.text, &settings.aggregator.references());
            let extraction = local_exports(path, purged, &settings.extract, cache);
            trace!("{} exports {:?}", path, extraction.names);
            Ok(Some(Contribution {
                import: Some(ImportStatement::Named { source, names: extraction.names.clone() }),
                record: ModuleRecord { path: path.clone(), kind, local_exports: extraction.names },
                parse_failed: extraction.parse_failed,
            }))
        }
        ModuleKind::OtherAsset => Ok(Some(Contribution {
            import: Some(ImportStatement::SideEffect { source }),
            record: ModuleRecord { path: path.clone(), kind, local_exports: Vec::new() },
            parse_failed: false,
        })),
        ModuleKind::Custom => {
            let Some(handler) = settings.custom.as_ref() else {
                return Ok(None);
            };
            let custom = handler.handle(path);
            if custom.import_line.is_none() && custom.exported_names.is_none() {
                trace!("Custom handler ignored {}", path);
                return Ok(None);
            }
            Ok(Some(Contribution {
                import: custom.import_line.map(ImportStatement::Raw),
                record: ModuleRecord {
                    path: path.clone(),
                    kind,
                    local_exports: custom.exported_names.unwrap_or_default(),
                },
                parse_failed: false,
            }))
        }
    }
}

/// Module text as read from disk.
pub(crate) struct SourceText {
    pub(crate) text: String,
    /// Invalid UTF-8 was replaced while decoding
    pub(crate) lossy: bool,
}

/// Reads a module, decoding invalid UTF-8 lossily instead of failing.
pub(crate) fn read_source(path: &Path) -> Result<SourceText> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(SourceText { text, lossy: false }),
        Err(e) => {
            warn!("{} is not valid UTF-8; decoding it lossily", path.display());
            let text = String::from_utf8_lossy(e.as_bytes()).into_owned();
            Ok(SourceText { text, lossy: true })
        }
    }
}
