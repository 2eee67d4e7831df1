//! Detection of installed GoldSrc (`liblist.gam`) and Source (`gameinfo.txt`) mods.

use std::{
    collections::HashMap,
    fs::{read_dir, read_to_string},
    io,
    path::{Path, PathBuf},
};

use tracing::{debug, error, trace};

use super::{LIBRARY, game_id::SteamGameId, get_play_action};
use crate::{
    data::{GameRecord, SupportedLibraries},
    error::ParseError,
    parsers::{key_value::parse_key_value, parse_unquoted_key_value},
    utils::{clean_game_title, some_if_file},
};

const APP_ID_HALF_LIFE: u32 = 70;
const APP_ID_SOURCE_SDK_BASE: u32 = 215;

/// Mods bundled with Half-Life, which Steam already lists as their own apps
const FIRST_PARTY_MODS: [&str; 10] = [
    "bshift", "cstrike", "czero", "czeror", "dmc", "dod", "gearbox", "ricochet", "tfc", "valve",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModType {
    /// GoldSrc mod, described by `liblist.gam`
    GoldSrc,
    /// Source mod, described by `gameinfo.txt`
    Source,
}

impl ModType {
    fn descriptor_file_name(self) -> &'static str {
        match self {
            ModType::GoldSrc => "liblist.gam",
            ModType::Source => "gameinfo.txt",
        }
    }
}

/// Data of one installed mod, as read from its descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModInfo {
    pub game_id: SteamGameId,
    pub name: String,
    pub developer: Option<String>,
    pub links: Vec<String>,
    pub categories: Vec<String>,
    pub icon: Option<PathBuf>,
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

fn category_for_type(mod_type: &str) -> Option<String> {
    match mod_type {
        "singleplayer_only" => Some(String::from("Single-player")),
        "multiplayer_only" => Some(String::from("Multi-player")),
        _ => None,
    }
}

/// Parses the `key "value"` lines of a `liblist.gam` file. Keys are lowercased, comment and
/// unparsable lines are ignored.
pub fn parse_liblist(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("//"))
        .filter_map(|line| {
            let (_, (key, value)) = parse_unquoted_key_value(line)
                .map_err(|e| trace!("{LIBRARY} - Ignoring liblist.gam line {line:?}: {e}"))
                .ok()?;

            Some((key.to_lowercase(), value.to_owned()))
        })
        .collect()
}

fn folder_name(path_mod: &Path) -> Option<&str> {
    path_mod.file_name().and_then(|name| name.to_str())
}

fn mod_info_gold_src(path_mod: &Path, content: &str) -> Option<ModInfo> {
    let liblist = parse_liblist(content);
    let value = |key: &str| liblist.get(key).and_then(|v| non_empty(v));

    let name = value("game")?;
    let links = ["url_info", "url_dl"]
        .into_iter()
        .filter_map(value)
        .collect();

    Some(ModInfo {
        game_id: SteamGameId::for_mod_folder(APP_ID_HALF_LIFE, folder_name(path_mod)?),
        name,
        developer: value("developer"),
        links,
        categories: value("type")
            .and_then(|t| category_for_type(&t))
            .into_iter()
            .collect(),
        icon: value("icon")
            .and_then(|icon| some_if_file(path_mod.join(icon)))
            .or_else(|| some_if_file(path_mod.join("game.ico"))),
    })
}

fn mod_info_source(path_mod: &Path, content: &str) -> Result<Option<ModInfo>, ParseError> {
    let game_info = parse_key_value(content)?;
    let node = game_info.node();

    let Some(name) = non_empty(node.get("game").as_str()) else {
        return Ok(None);
    };

    let app_id = match node.get("FileSystem").get("SteamAppId").as_u64() {
        0 => APP_ID_SOURCE_SDK_BASE,
        id => u32::try_from(id).unwrap_or(APP_ID_SOURCE_SDK_BASE),
    };

    let Some(folder) = folder_name(path_mod) else {
        return Ok(None);
    };

    let icon = non_empty(node.get("icon").as_str()).and_then(|icon| {
        ["tga", "ico"]
            .into_iter()
            .find_map(|ext| some_if_file(path_mod.join(format!("{icon}.{ext}"))))
    });

    Ok(Some(ModInfo {
        game_id: SteamGameId::for_mod_folder(app_id, folder),
        name,
        developer: non_empty(node.get("developer").as_str()),
        links: non_empty(node.get("developer_url").as_str())
            .into_iter()
            .collect(),
        categories: non_empty(node.get("type").as_str())
            .and_then(|t| category_for_type(&t))
            .into_iter()
            .collect(),
        icon,
    }))
}

/// Reads the descriptor of the mod installed in `path_mod`. A missing descriptor means the folder
/// is not a mod and yields `Ok(None)`.
#[tracing::instrument(level = "trace")]
pub fn get_mod_info(path_mod: &Path, mod_type: ModType) -> Result<Option<ModInfo>, ParseError> {
    let Some(path_descriptor) = some_if_file(path_mod.join(mod_type.descriptor_file_name()))
    else {
        trace!("{LIBRARY} - No mod descriptor in {path_mod:?}");
        return Ok(None);
    };

    let content = read_to_string(path_descriptor)?;

    match mod_type {
        ModType::GoldSrc => Ok(mod_info_gold_src(path_mod, &content)),
        ModType::Source => mod_info_source(path_mod, &content),
    }
}

fn game_from_mod(path_mod: &Path, info: ModInfo) -> GameRecord {
    let mut game = GameRecord::new(
        SupportedLibraries::Steam,
        info.game_id.to_string(),
        clean_game_title(&info.name),
    );

    game.install_directory = Some(path_mod.to_path_buf());
    game.play_action = Some(get_play_action(info.game_id));
    game.is_installed = true;
    game.developers = info.developer.into_iter().collect();
    game.links = info.links;
    game.categories = info.categories.into_iter().collect();
    game.icon = info.icon;

    game
}

/// Every mod installed directly under `path_mods`. Folders whose descriptor cannot be read are
/// logged and skipped.
#[tracing::instrument(level = "trace")]
pub fn get_installed_mods_from_folder(
    path_mods: &Path,
    mod_type: ModType,
) -> Result<Vec<GameRecord>, io::Error> {
    let mut folders = read_dir(path_mods)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect::<Vec<_>>();
    folders.sort();

    Ok(folders
        .into_iter()
        .filter(|path| {
            let is_first_party = mod_type == ModType::GoldSrc
                && folder_name(path).is_some_and(|name| FIRST_PARTY_MODS.contains(&name));

            if is_first_party {
                trace!("{LIBRARY} - Skipping first-party mod folder {path:?}");
            }

            !is_first_party
        })
        .filter_map(|path| match get_mod_info(&path, mod_type) {
            Ok(Some(info)) => {
                debug!("{LIBRARY} - Found {mod_type:?} mod '{}' in {path:?}", info.name);
                Some(game_from_mod(&path, info))
            }
            Ok(None) => None,
            Err(e) => {
                error!("{LIBRARY} - Failed to get information about installed {mod_type:?} mod from {path:?}: {e}");
                None
            }
        })
        .collect())
}
