use log::trace;

use crate::{
    constants::{CONFLICT_END, CONFLICT_SEPARATOR, CONFLICT_START},
    path::normalize_path,
};

/// Textual references that identify an import line generated by this tool.
///
/// Each aggregator path, current or previous, is given relative to the
/// project root (`imports.js`, `gen/barrel.js`). A generated reference is
/// always `./` or `../` followed by a trailing run of that path's segments,
/// so one `./<tail>';` pattern is kept per tail. A user import such as
/// `./lib/imports.js` never contains `./imports.js';` and is left alone.
#[derive(Debug, Clone)]
pub struct ImportReferences {
    patterns: Vec<String>,
}

impl ImportReferences {
    pub fn new<S: AsRef<str>>(current: &str, previous: &[S]) -> Self {
        let mut patterns: Vec<String> = Vec::new();
        for name in std::iter::once(current).chain(previous.iter().map(|p| p.as_ref())) {
            let normalized = normalize_path(name);
            let segments: Vec<&str> =
                normalized.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
            for start in 0..segments.len() {
                let pattern = format!("./{}';", segments[start..].join("/"));
                if !patterns.contains(&pattern) {
                    patterns.push(pattern);
                }
            }
        }
        Self { patterns }
    }

    /// True when `line` contains any known aggregator reference.
    pub fn matches(&self, line: &str) -> bool {
        self.patterns.iter().any(|p| line.contains(p.as_str()))
    }
}

/// First non-blank line of `code`, trimmed.
pub fn first_line(code: &str) -> &str {
    let code = code.trim_start();
    match code.find('\n') {
        Some(idx) => code[..idx].trim(),
        None => code.trim(),
    }
}

/// Strips leading import lines previously generated by this tool, including
/// ones trapped inside an unresolved merge conflict whose two sides are both
/// generated lines.
///
/// Runs to a fixpoint: each round removes one line or one conflict block from
/// the front. Text the purger cannot fully recognise is returned untouched,
/// and when nothing is removed the input comes back byte for byte.
pub fn purge_generated_imports<'a>(code: &'a str, refs: &ImportReferences) -> &'a str {
    let mut code = code;
    loop {
        let trimmed = code.trim_start();
        let line = first_line(trimmed);

        if refs.matches(line) {
            trace!("Purging generated import line: {}", line);
            code = match trimmed.find('\n') {
                Some(idx) => &trimmed[idx + 1..],
                None => "",
            };
            continue;
        }

        if line.starts_with(CONFLICT_START)
            && let Some(rest) = strip_conflict_block(trimmed, refs)
        {
            trace!("Purging conflict block between generated import lines");
            code = rest;
            continue;
        }

        return code;
    }
}

/// `text` starts at a conflict start marker. Returns the text after the end
/// marker's line when both sides are single generated import lines.
fn strip_conflict_block<'a>(text: &'a str, refs: &ImportReferences) -> Option<&'a str> {
    let ours_start = text.find('\n')? + 1;
    let separator = ours_start + text[ours_start..].find(CONFLICT_SEPARATOR)?;
    let ours = text[ours_start..separator].trim();

    let theirs_start = separator + text[separator..].find('\n')? + 1;
    let end = theirs_start + text[theirs_start..].find(CONFLICT_END)?;
    let theirs = text[theirs_start..end].trim();

    if ours.contains('\n') || theirs.contains('\n') {
        return None;
    }
    if !refs.matches(ours) || !refs.matches(theirs) {
        return None;
    }

    Some(match text[end..].find('\n') {
        Some(idx) => &text[end + idx + 1..],
        None => "",
    })
}
