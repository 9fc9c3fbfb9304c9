//! Validation of module names and version literals

/// Whether `name` is a legal Perl package name usable as a dependency.
/// Names ending in a separator, or using the archaic `'` separator, are
/// not accepted.
pub fn is_module_name(name: &str) -> bool {
    let re = crate::pattern!(r"^[A-Za-z_]\w*(?:::\w+)*$");
    re.is_match(name)
}

/// Whether `text` is a version literal: a decimal like `1.23`, a dotted
/// string like `1.2.3`, or a v-string like `v5.10`.
pub fn is_version(text: &str) -> bool {
    let re = crate::pattern!(r"^(?:v\d+(?:\.\d+)*|\d[\d_]*(?:\.[\d_]+)*)$");
    re.is_match(text)
}

/// Translate a file name given to `require` into a package name:
/// `Foo/Bar.pm` becomes `Foo::Bar`. Returns None for anything that isn't
/// a relative path to a `.pm` file.
pub fn module_from_path(path: &str) -> Option<String> {
    let stem = path.strip_suffix(".pm")?;
    if stem.starts_with('/') || stem.contains("..") {
        return None;
    }

    let name = stem.replace('/', "::");
    if is_module_name(&name) {
        Some(name)
    } else {
        None
    }
}
