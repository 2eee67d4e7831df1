use std::path::{Component, Path, PathBuf};

/// Returns an Option containing the given `PathBuf`, if the `PathBuf` points to an actual file
pub fn some_if_file(path: PathBuf) -> Option<PathBuf> {
    path.is_file().then_some(path)
}

/// Returns an Option containing the given `PathBuf`, if the `PathBuf` points to an actual directory
pub fn some_if_dir(path: PathBuf) -> Option<PathBuf> {
    path.is_dir().then_some(path)
}

/// Whether `path` contains the component `parent` immediately followed by the component `child`,
/// compared case-insensitively
pub fn contains_components(path: &Path, parent: &str, child: &str) -> bool {
    let names: Vec<_> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => name.to_str(),
            _ => None,
        })
        .collect();

    names
        .windows(2)
        .any(|w| w[0].eq_ignore_ascii_case(parent) && w[1].eq_ignore_ascii_case(child))
}

/// File name of `path` without its extension, if it is valid UTF-8
pub fn file_stem_str(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}
