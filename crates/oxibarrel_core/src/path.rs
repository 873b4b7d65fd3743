use path_clean::clean;
use std::{
    fmt,
    path::{Component, Path, PathBuf},
};

/// Canonicalizes a raw path string: backslashes become forward slashes and
/// any number of trailing slashes are stripped.
pub fn normalize_path(raw: &str) -> String {
    raw.replace('\\', "/").trim_end_matches('/').to_string()
}

/// A normalized, forward-slash path identifying one scanned file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModulePath(String);

impl ModulePath {
    pub fn new(raw: &str) -> Self {
        Self(normalize_path(raw))
    }

    pub fn from_path(path: &Path) -> Self {
        Self::new(&path.to_string_lossy())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Last path segment
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Case-insensitive suffix match against `.ext` for each configured
    /// extension. Extensions may be given with or without the leading dot, and
    /// may contain dots themselves (`module.css`).
    pub fn has_extension<S: AsRef<str>>(&self, extensions: &[S]) -> bool {
        let lower = self.0.to_lowercase();
        extensions.iter().any(|ext| {
            let ext = ext.as_ref().trim_start_matches('.').to_lowercase();
            !ext.is_empty() && lower.ends_with(&format!(".{}", ext))
        })
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<Path> for ModulePath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

fn cleaned(path: &Path) -> PathBuf {
    PathBuf::from(clean(path.to_string_lossy().to_string()))
}

/// Create a relative path from `base` to `target`.
///
/// Both paths are lexically cleaned first. Returns `None` when no relative
/// path exists, e.g. one side is absolute and the other is not, or `base`
/// would have to climb out of a `..` it cannot name.
pub fn make_relative(target: &Path, base: &Path) -> Option<PathBuf> {
    let target = cleaned(target);
    let base = cleaned(base);
    if target.is_absolute() != base.is_absolute() {
        return None;
    }

    let target_parts: Vec<Component> =
        target.components().filter(|c| !matches!(c, Component::CurDir)).collect();
    let base_parts: Vec<Component> =
        base.components().filter(|c| !matches!(c, Component::CurDir)).collect();

    let common =
        target_parts.iter().zip(base_parts.iter()).take_while(|(t, b)| t == b).count();

    if common == 0 && target.is_absolute() {
        // Different roots or drive prefixes
        return None;
    }
    if base_parts[common..].iter().any(|c| matches!(c, Component::ParentDir)) {
        return None;
    }

    let mut result = PathBuf::new();
    for _ in &base_parts[common..] {
        result.push("..");
    }
    for component in &target_parts[common..] {
        result.push(component.as_os_str());
    }

    if result.as_os_str().is_empty() { Some(PathBuf::from(".")) } else { Some(result) }
}

/// Builds the module reference used inside a generated import line: the path
/// from `from_dir` to `target`, forward-slashed and prefixed with `./`, so a
/// target two levels up renders as `./../../name.js`.
///
/// Falls back to the normalized target when no relative path exists.
pub fn relative_reference(from_dir: &Path, target: &Path) -> String {
    match make_relative(target, from_dir) {
        Some(rel) => {
            let joined = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            format!("./{}", joined)
        }
        None => normalize_path(&target.to_string_lossy()),
    }
}
