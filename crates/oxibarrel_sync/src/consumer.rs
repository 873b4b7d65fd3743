use anyhow::Result;
use log::{debug, info, trace, warn};
use rayon::prelude::*;
use std::collections::HashSet;

use oxibarrel_core::{
    ExportNameSet, ImportStatement, ModulePath, ModuleKind, purge_generated_imports,
    relative_reference,
};

use crate::{
    aggregator::read_source,
    config::Settings,
    exports::{ExportCache, local_exports},
    types::FileChange,
    writer::{Granularity, write_if_changed},
};

/// Rewrite computed for one consumer, not yet applied.
struct Plan {
    path: ModulePath,
    original: String,
    content: String,
}

/// Rewrites the leading import line of every JS-like file under the modify
/// roots so it imports, from the aggregator, each exported name the file does
/// not define itself.
///
/// Plans are computed in parallel and written sequentially in comparator
/// order. Only the first line is compared, so edits to the body never force
/// a rewrite.
pub(crate) fn rewrite_consumers(
    settings: &Settings,
    exports: &ExportNameSet,
    cache: &ExportCache,
) -> Result<Vec<FileChange>> {
    let aggregator_path = settings.aggregator.module_path();
    let mut seen: HashSet<ModulePath> = HashSet::new();
    let mut changes = Vec::new();

    for configured in &settings.modify_roots {
        let files = settings.scan(configured)?;
        debug!("Modify root {} has {} files", configured, files.len());

        let consumers: Vec<ModulePath> = files
            .into_iter()
            .filter(|path| *path != aggregator_path)
            .filter(|path| settings.classify(path) == Some(ModuleKind::JsLike))
            .filter(|path| !settings.filter_modify || settings.accepts(path))
            .filter(|path| seen.insert(path.clone()))
            .collect();

        let plans: Vec<Option<Plan>> = consumers
            .par_iter()
            .map(|path| plan_for(settings, path, exports, cache))
            .collect::<Result<_>>()?;

        for plan in plans.into_iter().flatten() {
            let outcome = write_if_changed(
                plan.path.as_path(),
                &plan.content,
                &plan.original,
                Granularity::FirstLine,
                settings.mode,
            )?;
            trace!("{}: {:?}", plan.path, outcome);
            changes.push(FileChange { path: plan.path, outcome });
        }
    }

    info!("Checked {} consumer files", changes.len());
    Ok(changes)
}

/// `None` when the file cannot be rewritten without corrupting it.
fn plan_for(
    settings: &Settings,
    path: &ModulePath,
    exports: &ExportNameSet,
    cache: &ExportCache,
) -> Result<Option<Plan>> {
    let source = read_source(path.as_path())?;
    if source.lossy {
        warn!("Leaving {} untouched: it is not valid UTF-8", path);
        return Ok(None);
    }
    let original = source.text;
    let purged = purge_generated_imports(&original, &settings.aggregator.references());
    let local = local_exports(path, purged, &settings.extract, cache);

    let dir = path.as_path().parent().unwrap_or(path.as_path());
    let import = ImportStatement::Named {
        source: relative_reference(dir, &settings.aggregator.path),
        names: exports.missing_from(&local.names),
    };
    let content = format!("{}\n{}", import, purged);
    Ok(Some(Plan { path: path.clone(), original, content }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{types::WriteOutcome, writer::WriteMode};
    use std::{fs, path::Path};
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> std::path::PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    fn names(items: &[&str]) -> ExportNameSet {
        let mut set = ExportNameSet::new();
        set.extend(items.iter().copied());
        set
    }

    fn settings_for(root: &Path) -> Settings {
        let mut settings = Settings::new(root);
        settings.modify_roots = vec!["./src/pages/".to_string()];
        settings
    }

    #[test]
    fn test_prepends_import_without_local_names() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let page = create_test_file(root, "src/pages/c.js", "export const qux = 1;\n");

        let changes =
            rewrite_consumers(&settings_for(root), &names(&["foo", "qux", "bar"]), &ExportCache::new())
                .unwrap();

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].outcome, WriteOutcome::Written);
        assert_eq!(
            fs::read_to_string(page).unwrap(),
            "import {foo, bar} from './../../imports.js';\nexport const qux = 1;\n"
        );
    }

    #[test]
    fn test_replaces_stale_import_line() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let page = create_test_file(
            root,
            "src/pages/nested/p.js",
            "import {old} from './../../../imports.js';\nconsole.log(foo);\n",
        );

        rewrite_consumers(&settings_for(root), &names(&["foo"]), &ExportCache::new()).unwrap();
        assert_eq!(
            fs::read_to_string(page).unwrap(),
            "import {foo} from './../../../imports.js';\nconsole.log(foo);\n"
        );
    }

    #[test]
    fn test_empty_difference_still_writes_import() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let page = create_test_file(root, "src/pages/a.js", "export const a = 1;\n");

        rewrite_consumers(&settings_for(root), &names(&["a"]), &ExportCache::new()).unwrap();
        assert_eq!(
            fs::read_to_string(page).unwrap(),
            "import {} from './../../imports.js';\nexport const a = 1;\n"
        );
    }

    #[test]
    fn test_body_edit_does_not_rewrite() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let body = "import {foo} from './../../imports.js';\nconst edited = foo + 1;\n";
        let page = create_test_file(root, "src/pages/a.js", body);

        let changes =
            rewrite_consumers(&settings_for(root), &names(&["foo"]), &ExportCache::new()).unwrap();
        assert_eq!(changes[0].outcome, WriteOutcome::Unchanged);
        assert_eq!(fs::read_to_string(page).unwrap(), body);
    }

    #[test]
    fn test_only_js_like_files_are_rewritten() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let style = create_test_file(root, "src/pages/a.css", "body {}\n");

        let changes =
            rewrite_consumers(&settings_for(root), &names(&["foo"]), &ExportCache::new()).unwrap();
        assert!(changes.is_empty());
        assert_eq!(fs::read_to_string(style).unwrap(), "body {}\n");
    }

    #[test]
    fn test_filter_gates_modify_only_when_enabled() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/pages/a.test.js", "test();\n");

        let mut settings = settings_for(root);
        settings.filter = Some(Box::new(|p: &ModulePath| !p.as_str().contains(".test.")));
        settings.mode = WriteMode::Check;
        let exports = names(&["foo"]);

        let changes = rewrite_consumers(&settings, &exports, &ExportCache::new()).unwrap();
        assert_eq!(changes.len(), 1);

        settings.filter_modify = true;
        let changes = rewrite_consumers(&settings, &exports, &ExportCache::new()).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn test_user_import_ending_in_aggregator_name_is_kept() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let page = create_test_file(
            root,
            "src/pages/p.js",
            "import {helper} from './lib/imports.js';\nhelper(a);\n",
        );

        rewrite_consumers(&settings_for(root), &names(&["a"]), &ExportCache::new()).unwrap();
        assert_eq!(
            fs::read_to_string(page).unwrap(),
            "import {a} from './../../imports.js';\n\
             import {helper} from './lib/imports.js';\n\
             helper(a);\n"
        );
    }

    #[test]
    fn test_non_utf8_consumer_is_left_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let bytes: &[u8] = b"// caf\xe9\nrender();\n";
        let page = root.join("src/pages/latin1.js");
        fs::create_dir_all(page.parent().unwrap()).unwrap();
        fs::write(&page, bytes).unwrap();
        create_test_file(root, "src/pages/ok.js", "render();\n");

        let changes =
            rewrite_consumers(&settings_for(root), &names(&["a"]), &ExportCache::new()).unwrap();
        assert_eq!(changes.len(), 1);
        assert!(changes[0].path.as_str().ends_with("ok.js"));
        assert_eq!(fs::read(&page).unwrap(), bytes);
    }

    #[test]
    fn test_missing_modify_root_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(
            rewrite_consumers(&settings_for(temp_dir.path()), &names(&[]), &ExportCache::new())
                .is_err()
        );
    }
}
