use std::{
    env,
    io::{self, Write},
};

use colored::Colorize;
use log::{debug, trace};

use oxibarrel_core::{ModulePath, make_relative};

use crate::types::{FileChange, SyncResult, WriteOutcome};

/// Relativize a path to the current working directory for clickable links
fn relativize_to_cwd(path: &ModulePath) -> String {
    let cwd = match env::current_dir() {
        Ok(cwd) => cwd,
        Err(_) => {
            debug!("Failed to get current directory");
            return path.to_string();
        }
    };
    match make_relative(path.as_path(), &cwd) {
        Some(rel) => rel.to_string_lossy().to_string(),
        None => {
            trace!("Could not relativize '{}', using original", path);
            path.to_string()
        }
    }
}

fn print_change<W: Write>(writer: &mut W, change: &FileChange, prefix: &str) -> io::Result<()> {
    let display_path = relativize_to_cwd(&change.path);
    match change.outcome {
        WriteOutcome::Written => {
            writeln!(writer, "{}  {} {}", prefix.dimmed(), "written".green(), display_path.blue())
        }
        WriteOutcome::Stale => {
            writeln!(writer, "{}  {} {}", prefix.dimmed(), "stale".yellow(), display_path.blue())
        }
        WriteOutcome::Unchanged => {
            writeln!(writer, "{}  {} {}", prefix.dimmed(), "unchanged".dimmed(), display_path)
        }
    }
}

pub fn print_summary<W: Write>(writer: &mut W, result: &SyncResult) -> io::Result<()> {
    debug!("Printing summary for {} consumers", result.consumers.len());

    let header = if result.has_stale() {
        format!("{} Generated files are out of date", "⚠".yellow().bold())
    } else if result.written().next().is_some() {
        format!("{} Generated files updated", "✓".green().bold())
    } else {
        format!("{} Generated files are up to date", "✓".green().bold())
    };
    writeln!(writer, "{}\n", header)?;

    writeln!(
        writer,
        "{} ({} names from {} files)",
        "Aggregator".bright_white().bold(),
        result.exported_names.to_string().cyan(),
        result.files_scanned.to_string().cyan()
    )?;
    print_change(writer, &result.aggregator, "└──")?;

    let touched: Vec<&FileChange> =
        result.consumers.iter().filter(|c| c.outcome != WriteOutcome::Unchanged).collect();
    writeln!(
        writer,
        "\n{} ({} of {} changed)",
        "Consumers".bright_white().bold(),
        touched.len().to_string().cyan(),
        result.consumers.len().to_string().cyan()
    )?;
    for (idx, change) in touched.iter().enumerate() {
        let prefix = if idx == touched.len() - 1 { "└──" } else { "├──" };
        print_change(writer, change, prefix)?;
    }

    if result.parse_failures > 0 {
        writeln!(
            writer,
            "\n{} {} files could not be parsed and export nothing",
            "⚠".yellow().bold(),
            result.parse_failures.to_string().yellow()
        )?;
    }

    writer.flush()?;
    Ok(())
}
