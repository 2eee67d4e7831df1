#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::data::Credentials;

/// User-facing import settings shared by every library
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct LibrarySettings {
    pub import_installed_games: bool,
    pub connect_account: bool,
    /// When `false`, account games are only used to enrich installed ones
    pub import_uninstalled_games: bool,
    /// Steam only: also detect installed GoldSrc/Source mods
    pub include_mods: bool,
    pub credentials: Option<Credentials>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            import_installed_games: true,
            connect_account: false,
            import_uninstalled_games: false,
            include_mods: true,
            credentials: None,
        }
    }
}
