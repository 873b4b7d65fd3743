use anyhow::Result;
use clap::ValueEnum;
use log::{debug, info};

use crate::{
    aggregator::build_aggregator,
    config::Settings,
    consumer::rewrite_consumers,
    exports::ExportCache,
    types::{FileChange, SyncResult},
    writer::{Granularity, read_or_empty, write_if_changed},
};

/// Build lifecycle points at which a full run is triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Lifecycle {
    /// Before the build tool initializes
    PreInit,
    /// Before the build tool extracts page queries
    PreExtractQueries,
}

/// Full run for a lifecycle stage. Every stage performs the identical run.
pub fn run_lifecycle(stage: Lifecycle, settings: &Settings) -> Result<SyncResult> {
    info!("Lifecycle hook: {:?}", stage);
    run_sync(settings)
}

/// Regenerates the aggregator, then rewrites consumers against its final
/// export set.
///
/// The aggregator is written before the consumer phase starts.
pub fn run_sync(settings: &Settings) -> Result<SyncResult> {
    info!("Starting sync");
    let cache = ExportCache::new();

    let output = build_aggregator(settings, &cache)?;
    let aggregator_path = &settings.aggregator.path;
    let rendered = output.document.render();
    let previous = read_or_empty(aggregator_path);
    let outcome = write_if_changed(
        aggregator_path,
        &rendered,
        &previous,
        Granularity::FullContent,
        settings.mode,
    )?;
    debug!("Aggregator {}: {:?}", aggregator_path.display(), outcome);

    let consumers = rewrite_consumers(settings, &output.document.exports, &cache)?;

    Ok(SyncResult {
        aggregator: FileChange { path: settings.aggregator.module_path(), outcome },
        consumers,
        files_scanned: output.files_scanned,
        exported_names: output.document.exports.len(),
        parse_failures: output.parse_failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{types::WriteOutcome, writer::WriteMode};
    use oxibarrel_core::BarrelError;
    use std::{
        fs,
        path::{Path, PathBuf},
    };
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    fn site(root: &Path) {
        create_test_file(root, "src/resources/A.js", "export const foo = 1;\n");
        create_test_file(root, "src/resources/B.js", "export const bar = 1, baz = 2;\n");
        create_test_file(root, "src/resources/C.js", "export const qux = foo + bar;\n");
        create_test_file(root, "src/resources/style.scss", "a { color: red; }\n");
        create_test_file(root, "src/pages/index.js", "render(foo);\n");
    }

    #[test]
    fn test_full_run_generates_aggregator_and_consumers() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        site(root);

        let result = run_sync(&Settings::new(root)).unwrap();
        assert_eq!(result.aggregator.outcome, WriteOutcome::Written);
        assert_eq!(result.files_scanned, 4);
        assert_eq!(result.exported_names, 4);

        assert_eq!(
            fs::read_to_string(root.join("imports.js")).unwrap(),
            "import {foo} from './src/resources/A.js';\n\
             import {bar, baz} from './src/resources/B.js';\n\
             import {qux} from './src/resources/C.js';\n\
             import './src/resources/style.scss';\n\
             \n\
             export {foo, bar, baz, qux};\n"
        );
        assert_eq!(
            fs::read_to_string(root.join("src/resources/C.js")).unwrap(),
            "import {foo, bar, baz} from './../../imports.js';\nexport const qux = foo + bar;\n"
        );
        assert_eq!(
            fs::read_to_string(root.join("src/pages/index.js")).unwrap(),
            "import {foo, bar, baz, qux} from './../../imports.js';\nrender(foo);\n"
        );
    }

    #[test]
    fn test_second_run_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        site(root);
        let settings = Settings::new(root);

        let first = run_sync(&settings).unwrap();
        assert!(first.written().count() > 0);

        let second = run_sync(&settings).unwrap();
        assert_eq!(second.written().count(), 0);
        assert_eq!(second.aggregator.outcome, WriteOutcome::Unchanged);
    }

    #[test]
    fn test_new_export_updates_consumer_first_line() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        site(root);
        let settings = Settings::new(root);
        run_sync(&settings).unwrap();

        create_test_file(root, "src/resources/D.js", "export const extra = 1;\n");
        let result = run_sync(&settings).unwrap();

        assert_eq!(result.aggregator.outcome, WriteOutcome::Written);
        assert_eq!(
            fs::read_to_string(root.join("src/pages/index.js")).unwrap(),
            "import {foo, bar, baz, qux, extra} from './../../imports.js';\nrender(foo);\n"
        );
    }

    #[test]
    fn test_previous_output_name_is_purged() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/resources/a.js", "export const a = 1;\n");
        create_test_file(
            root,
            "src/pages/p.js",
            "<<<<<<< HEAD\n\
             import {a} from './../../imports.js';\n\
             =======\n\
             import {a} from './../../old-imports.js';\n\
             >>>>>>> branch\n\
             page();\n",
        );

        let mut settings = Settings::new(root);
        settings.aggregator = crate::config::AggregatorTarget::new(
            root,
            "imports",
            &["old-imports".to_string()],
        );
        run_sync(&settings).unwrap();

        assert_eq!(
            fs::read_to_string(root.join("src/pages/p.js")).unwrap(),
            "import {a} from './../../imports.js';\npage();\n"
        );
    }

    #[test]
    fn test_check_mode_reports_without_writing() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        site(root);
        let mut settings = Settings::new(root);
        settings.mode = WriteMode::Check;

        let result = run_sync(&settings).unwrap();
        assert!(result.has_stale());
        assert_eq!(result.written().count(), 0);
        assert!(!root.join("imports.js").exists());
        assert_eq!(fs::read_to_string(root.join("src/pages/index.js")).unwrap(), "render(foo);\n");
    }

    #[test]
    fn test_parse_failure_does_not_abort_run() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        site(root);
        create_test_file(root, "src/resources/broken.js", "export const = ;\n");

        let result = run_sync(&Settings::new(root)).unwrap();
        assert_eq!(result.parse_failures, 1);
        assert_eq!(result.exported_names, 4);
    }

    #[test]
    fn test_user_import_from_nested_imports_module_survives() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/resources/a.js", "export const a = 1;\n");
        create_test_file(
            root,
            "src/pages/p.js",
            "import {helper} from './lib/imports.js';\nhelper(a);\n",
        );
        let settings = Settings::new(root);

        run_sync(&settings).unwrap();
        let expected =
            "import {a} from './../../imports.js';\nimport {helper} from './lib/imports.js';\nhelper(a);\n";
        assert_eq!(fs::read_to_string(root.join("src/pages/p.js")).unwrap(), expected);

        let second = run_sync(&settings).unwrap();
        assert_eq!(second.written().count(), 0);
        assert_eq!(fs::read_to_string(root.join("src/pages/p.js")).unwrap(), expected);
    }

    #[test]
    fn test_non_utf8_file_does_not_abort_run() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        site(root);
        let bytes: &[u8] = b"// caf\xe9\nexport const b = 2;\n";
        let latin1 = root.join("src/resources/latin1.js");
        fs::write(&latin1, bytes).unwrap();

        let result = run_sync(&Settings::new(root)).unwrap();
        assert_eq!(result.aggregator.outcome, WriteOutcome::Written);
        assert_eq!(result.exported_names, 5);
        assert!(
            fs::read_to_string(root.join("imports.js"))
                .unwrap()
                .contains("import {b} from './src/resources/latin1.js';")
        );
        assert_eq!(fs::read(&latin1).unwrap(), bytes);
    }

    #[test]
    fn test_missing_root_propagates() {
        let temp_dir = TempDir::new().unwrap();
        let err = run_sync(&Settings::new(temp_dir.path())).err().unwrap();
        assert!(matches!(err.downcast_ref::<BarrelError>(), Some(BarrelError::PathNotFound(_))));
    }

    #[test]
    fn test_lifecycle_stages_run_identically() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        site(root);
        let settings = Settings::new(root);

        let first = run_lifecycle(Lifecycle::PreInit, &settings).unwrap();
        let second = run_lifecycle(Lifecycle::PreExtractQueries, &settings).unwrap();
        assert_eq!(first.exported_names, second.exported_names);
        assert_eq!(second.written().count(), 0);
    }
}
