//! Pure path helpers: companion names, directory/basename split, directory distance.

use std::path::{Component, Path};

use crate::error::Error;

/// Last segment of `path` as UTF-8, if it has one.
pub fn base_name(path: &Path) -> Option<&str> {
    return path.file_name().and_then(|n| return n.to_str());
}

/// Derive the companion file names for the active file, in the order they must be tried.
///
/// `.c` and `.cpp` map to `.h`. `.h` maps to `.cpp` first, then `.c`.
///
/// # Errors
///
/// Returns `Error::UnsupportedExtension` for any other extension, or when the path
/// has no UTF-8 file name.
pub fn companion_names(path: &Path) -> Result<Vec<String>, Error> {
    let unsupported = || {
        return Error::UnsupportedExtension {
            path: path.to_path_buf(),
        };
    };
    let Some(name) = base_name(path) else {
        return Err(unsupported());
    };
    let Some((_, ext)) = name.rsplit_once('.') else {
        return Err(unsupported());
    };
    let stem = strip_extension(name);

    return match ext {
        "c" | "cpp" => Ok(vec![format!("{stem}.h")]),
        "h" => Ok(vec![format!("{stem}.cpp"), format!("{stem}.c")]),
        _ => Err(unsupported()),
    };
}

/// Every segment of `path` but the last. Empty for a bare file name.
pub fn directory(path: &Path) -> &Path {
    return path.parent().unwrap_or_else(|| return Path::new(""));
}

/// Distance between two directories measured from the root.
///
/// Finds the longest common prefix of components and counts the segments left over
/// on each side. Directories that share only a suffix are as far apart as they can be.
pub fn directory_distance(a: &Path, b: &Path) -> usize {
    let left: Vec<Component<'_>> = a.components().collect();
    let right: Vec<Component<'_>> = b.components().collect();
    let common = left
        .iter()
        .zip(right.iter())
        .take_while(|(l, r)| return l == r)
        .count();

    return left
        .len()
        .saturating_sub(common)
        .saturating_add(right.len().saturating_sub(common));
}

/// File name without its final extension. Names without a dot come back unchanged.
pub fn strip_extension(name: &str) -> &str {
    return name.rsplit_once('.').map_or(name, |(stem, _)| return stem);
}
