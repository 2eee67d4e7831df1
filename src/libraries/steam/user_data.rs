//! Per-user Steam config files: `loginusers.vdf`, `localconfig.vdf` and `sharedconfig.vdf`.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use tracing::{trace, warn};

use super::{LIBRARY, game_id::SteamGameId};
use crate::{
    data::{GameRecord, SupportedLibraries},
    parsers::key_value::{KeyValue, KvNode},
};

const TAG_FAVORITE: &str = "favorite";

/// A user which has logged into the local Steam client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSteamUser {
    pub id: u64,
    pub account_name: String,
    pub persona_name: String,
    pub recent: bool,
}

/// 32-bit account id of a 64-bit Steam id, used to name the `userdata` directories
pub fn account_id(steam_id: u64) -> u32 {
    (steam_id & 0xFFFF_FFFF) as u32
}

pub fn path_local_config(path_steam_dir: &Path, steam_id: u64) -> PathBuf {
    path_steam_dir
        .join("userdata")
        .join(account_id(steam_id).to_string())
        .join("config/localconfig.vdf")
}

pub fn path_shared_config(path_steam_dir: &Path, steam_id: u64) -> PathBuf {
    path_steam_dir
        .join("userdata")
        .join(account_id(steam_id).to_string())
        .join("7/remote/sharedconfig.vdf")
}

/// Users listed in `loginusers.vdf`. Entries whose name is not a Steam id are skipped.
pub fn steam_users(login_users: &KeyValue) -> Vec<LocalSteamUser> {
    login_users
        .children
        .iter()
        .filter_map(|user| {
            let Ok(id) = user.name.parse() else {
                warn!("{LIBRARY} - Invalid user id in loginusers.vdf: {:?}", user.name);
                return None;
            };

            Some(LocalSteamUser {
                id,
                account_name: user.get("AccountName").as_str().to_owned(),
                persona_name: user.get("PersonaName").as_str().to_owned(),
                recent: user.get("mostrecent").as_bool(),
            })
        })
        .collect()
}

/// Per-app sections of a user config file which hold any data, with their game ids
fn app_sections(config: &KeyValue) -> impl Iterator<Item = (String, KvNode<'_>)> {
    config
        .get("Software")
        .get("Valve")
        .get("Steam")
        .get("apps")
        .children()
        .iter()
        .filter(|app| !app.children.is_empty())
        .filter_map(|app| {
            let Some(game_id) = SteamGameId::from_config_key(&app.name) else {
                trace!("{LIBRARY} - Skipping malformed app key {:?}", app.name);
                return None;
            };

            Some((game_id, app.node()))
        })
}

/// Last played timestamps from `localconfig.vdf`, keyed by game id
pub fn games_last_activity(local_config: &KeyValue) -> HashMap<String, DateTime<Utc>> {
    app_sections(local_config)
        .filter_map(|(game_id, app)| {
            let last_played = DateTime::from_timestamp(app.get("LastPlayed").as_i64(), 0)?;
            Some((game_id, last_played))
        })
        .collect()
}

/// Categories, favorite and hidden flags from `sharedconfig.vdf`
pub fn categorized_games(shared_config: &KeyValue) -> Vec<GameRecord> {
    app_sections(shared_config)
        .map(|(game_id, app)| {
            let mut game = GameRecord::new(SupportedLibraries::Steam, game_id, String::new());

            for tag in app.get("tags").children() {
                let tag = tag.node().as_str();
                if tag == TAG_FAVORITE {
                    game.favorite = true;
                } else if !tag.is_empty() {
                    game.categories.insert(tag.to_owned());
                }
            }

            game.hidden = app.get("hidden").as_i64() == 1;
            game
        })
        .collect()
}
