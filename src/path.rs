//! URL and file path helpers used to key loaded assets.

#[cfg(test)]
#[path = "path_test.rs"]
mod path_test;

/// Last path segment. Without `keep_ext`, everything from the first `.` on
/// is dropped, so `"img/logo.min.png"` becomes `"logo"`.
#[must_use]
pub fn basename(path: &str, keep_ext: bool) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    if keep_ext { name } else { name.split('.').next().unwrap_or(name) }
}

/// Lower-cased extension with any query string removed.
#[must_use]
pub fn extension(path: &str) -> String {
    let last = path.rsplit('.').next().unwrap_or(path);
    last.split('?').next().unwrap_or(last).to_lowercase()
}
