use std::cmp::Ordering;

use crate::path::ModulePath;

/// Segment-wise, case-insensitive ordering of normalized paths.
///
/// Paths are split on `/` and compared pair by pair; the first differing
/// segment decides. When one path is a segment prefix of the other, the one
/// with fewer segments sorts first. Paths that are equal ignoring case fall
/// back to a byte comparison so the order stays total on case-sensitive
/// filesystems.
pub fn compare_paths(a: &str, b: &str) -> Ordering {
    let mut a_parts = a.split('/');
    let mut b_parts = b.split('/');

    loop {
        match (a_parts.next(), b_parts.next()) {
            (Some(x), Some(y)) => {
                let cmp = compare_segment(x, y);
                if cmp != Ordering::Equal {
                    return cmp;
                }
            }
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (None, None) => return a.cmp(b),
        }
    }
}

fn compare_segment(a: &str, b: &str) -> Ordering {
    a.chars().flat_map(char::to_lowercase).cmp(b.chars().flat_map(char::to_lowercase))
}

/// Sorts module paths in place using [`compare_paths`].
pub fn sort_paths(paths: &mut [ModulePath]) {
    paths.sort_by(|a, b| compare_paths(a.as_str(), b.as_str()));
}
