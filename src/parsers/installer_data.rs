//! Model and lookup of Origin's `installerdata.xml` game descriptors.

use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Deserializer};
use tracing::{debug, error, trace};

use crate::{data::SupportedLibraries, error::ParseError, utils::some_if_dir};

const LIBRARY: SupportedLibraries = SupportedLibraries::Origin;

pub const INSTALLER_DATA_FILE_NAME: &str = "installerdata.xml";
const INSTALLER_DIR_NAMES: [&str; 2] = ["__Installer", "__installer"];
const MAX_PARENT_LEVELS: usize = 4;

/// Flags are written as `0`/`1` or `false`/`true`
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();

    Ok(raw == "1" || raw.eq_ignore_ascii_case("true"))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Launcher {
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub parameters: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub execute_elevated: bool,
    #[serde(default, rename = "requires64BitOS", deserialize_with = "deserialize_flag")]
    pub requires_64_bit_os: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub trial: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Runtime {
    #[serde(default, rename = "launcher")]
    pub launchers: Vec<Launcher>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GameVersion {
    #[serde(default, rename = "@version")]
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BuildMetaData {
    #[serde(default, rename = "gameVersion")]
    pub game_version: GameVersion,
}

/// Root `<DiPManifest>` element
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GameInstallerData {
    #[serde(default)]
    pub runtime: Runtime,
    #[serde(default, rename = "buildMetaData")]
    pub build_meta_data: BuildMetaData,
}

impl GameInstallerData {
    /// The authoritative launcher, which is the last one listed
    pub fn launcher(&self) -> Option<&Launcher> {
        self.runtime.launchers.last()
    }

    /// Installed build version, if one is declared
    pub fn version(&self) -> Option<&str> {
        Some(self.build_meta_data.game_version.version.as_str()).filter(|v| !v.is_empty())
    }
}

pub fn parse_installer_data(content: &str) -> Result<GameInstallerData, ParseError> {
    let content = content.trim_start_matches('\u{feff}');
    Ok(quick_xml::de::from_str(content)?)
}

fn read_installer_data(path: &Path) -> Result<GameInstallerData, ParseError> {
    let content = read_to_string(path)?;
    parse_installer_data(&content)
}

fn find_installer_dir(path: &Path) -> Option<PathBuf> {
    INSTALLER_DIR_NAMES
        .iter()
        .find_map(|name| some_if_dir(path.join(name)))
}

/// Locates the descriptor for `data_path`, which is either the descriptor itself or a path
/// somewhere below the install directory. Up to 4 parent levels are searched for an
/// `__Installer` directory.
pub fn find_installer_data_path(data_path: &Path) -> Option<PathBuf> {
    if data_path.is_file() {
        return Some(data_path.to_path_buf());
    }

    let mut root = data_path.to_path_buf();
    for _ in 0..MAX_PARENT_LEVELS {
        if let Some(installer_dir) = find_installer_dir(&root) {
            root = installer_dir;
            break;
        }

        match root.parent() {
            Some(parent) => root = parent.to_path_buf(),
            None => break,
        }
    }

    let path = root.join(INSTALLER_DATA_FILE_NAME);
    trace!("{LIBRARY} - Probing for installer data at {path:?}");

    path.is_file().then_some(path)
}

/// Finds and parses the game descriptor for `data_path`. Missing or incompatible descriptors are
/// logged and reported as `None`.
#[tracing::instrument(level = "trace")]
pub fn get_game_installer_data(data_path: &Path) -> Option<GameInstallerData> {
    let Some(path) = find_installer_data_path(data_path) else {
        debug!("{LIBRARY} - No installer data found for {data_path:?}");
        return None;
    };

    read_installer_data(&path)
        .map_err(|e| {
            error!("{LIBRARY} - Failed to deserialize game installer xml {path:?}: {e}");
        })
        .ok()
}
