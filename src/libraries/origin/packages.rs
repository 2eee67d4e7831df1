//! Install packages, the `*.mfst` markers Origin keeps for every installed offer.

use std::path::Path;

use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use super::LIBRARY;
use crate::{parsers::parse_trailing_digits, utils::file_stem_str};

const PACKAGE_EXTENSION: &str = "mfst";
/// Ids with this prefix are already in their canonical form
const RESERVED_PREFIX: &str = "Origin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPackage {
    /// File name of the package marker, without its extension
    pub original_id: String,
    /// Offer id used by the catalog
    pub converted_id: String,
    /// Sub-type marker split off the id, including its leading `@`
    pub source: Option<String>,
}

impl InstallPackage {
    /// Id passed to the client to launch this package
    pub fn launch_id(&self) -> String {
        format!("{}{}", self.converted_id, self.source.as_deref().unwrap_or_default())
    }
}

/// Converts a package id to an offer id. A `:` is inserted before the trailing number
/// (`OFB-EAST52017` becomes `OFB-EAST:52017`) unless the id starts with `Origin`, then any
/// `@` sub-type marker is split off. Returns `None` for ids without a trailing number.
pub fn convert_package_id(id: &str) -> Option<InstallPackage> {
    let mut converted_id = id.to_owned();

    if !id.starts_with(RESERVED_PREFIX) {
        let (_, (prefix, digits)) = parse_trailing_digits(id).ok()?;
        converted_id = format!("{prefix}:{digits}");
    }

    let source = converted_id.find('@').map(|index| {
        let source = converted_id[index..].to_owned();
        converted_id.truncate(index);
        source
    });

    Some(InstallPackage {
        original_id: id.to_owned(),
        converted_id,
        source,
    })
}

/// Every install package found anywhere below the `LocalContent` directory, in file name order
#[tracing::instrument(level = "trace")]
pub fn get_install_packages(path_local_content: &Path) -> Vec<InstallPackage> {
    if !path_local_content.is_dir() {
        debug!("{LIBRARY} - No local content directory at {path_local_content:?}");
        return Vec::new();
    }

    WalkDir::new(path_local_content)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| {
            entry
                .map_err(|e| warn!("{LIBRARY} - Failed to read local content entry: {e}"))
                .ok()
        })
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(PACKAGE_EXTENSION))
        })
        .filter_map(|entry| {
            let path = entry.path();
            let id = file_stem_str(path)?;

            let Some(package) = convert_package_id(id) else {
                warn!("{LIBRARY} - Failed to get game id from file {path:?}");
                return None;
            };

            trace!("{LIBRARY} - Found install package {package:?}");
            Some(package)
        })
        .collect()
}
