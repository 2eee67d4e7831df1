use std::fmt::{self, Display, Formatter};

const APP_TYPE_GAME_MOD: u64 = 2;
const MOD_ID_HIGH_BIT: u32 = 0x8000_0000;

/// 64-bit Steam game id: app id in the low 24 bits, app type in the next 8 bits and mod id in the
/// high 32 bits. Plain apps are just their app id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SteamGameId(u64);

impl SteamGameId {
    pub fn game_mod(app_id: u32, mod_id: u32) -> Self {
        Self((u64::from(mod_id) << 32) | (APP_TYPE_GAME_MOD << 24) | u64::from(app_id & 0xFF_FFFF))
    }

    /// Id Steam assigns to a mod installed in `folder_name` for the given base app
    pub fn for_mod_folder(app_id: u32, folder_name: &str) -> Self {
        Self::game_mod(app_id, crc32fast::hash(folder_name.as_bytes()) | MOD_ID_HIGH_BIT)
    }

    /// Game id for a key of the per-app sections in the user config files, which are either a
    /// plain app id or `<appId>_<modId>` for mods
    pub fn from_config_key(key: &str) -> Option<String> {
        let Some((app_id, mod_id)) = key.split_once('_') else {
            return Some(key.to_owned());
        };

        let app_id = app_id.parse().ok()?;
        let mod_id = mod_id.parse().ok()?;

        Some(Self::game_mod(app_id, mod_id).to_string())
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for SteamGameId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
