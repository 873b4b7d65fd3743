use dashmap::DashMap;
use log::{trace, warn};
use std::hash::{DefaultHasher, Hash, Hasher};

use oxibarrel_core::{ExtractOptions, ModulePath, exports_for};

/// Extracted exports per file, tagged with a fingerprint of the purged text
/// they were computed from. Shared by both phases of a run so a file under
/// both an import and a modify root is parsed once.
pub(crate) type ExportCache = DashMap<ModulePath, (u64, Vec<String>)>;

pub(crate) struct Extraction {
    pub(crate) names: Vec<String>,
    pub(crate) parse_failed: bool,
}

/// Local exports of an already-purged module. Parse failures are logged and
/// yield an empty list.
pub(crate) fn local_exports(
    path: &ModulePath,
    purged: &str,
    opts: &ExtractOptions,
    cache: &ExportCache,
) -> Extraction {
    let fingerprint = fingerprint(purged);
    if let Some(entry) = cache.get(path) {
        let (cached_fingerprint, names) = entry.value();
        if *cached_fingerprint == fingerprint {
            trace!("Cache hit for exports: {}", path);
            return Extraction { names: names.clone(), parse_failed: false };
        }
    }

    match exports_for(path, purged, opts) {
        Ok(names) => {
            cache.insert(path.clone(), (fingerprint, names.clone()));
            Extraction { names, parse_failed: false }
        }
        Err(e) => {
            warn!("{}; treating it as exporting nothing", e);
            Extraction { names: Vec::new(), parse_failed: true }
        }
    }
}

fn fingerprint(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}
