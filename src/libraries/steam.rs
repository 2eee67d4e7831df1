mod game_id;
mod mods;
mod user_data;

use std::{
    collections::HashMap,
    fmt::Display,
    fs::read_dir,
    io,
    iter::once,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use itertools::Itertools;
use nom::{
    IResult, Parser,
    bytes::complete::{tag, take_till1},
    sequence::delimited,
};
use tracing::{debug, error, trace, warn};

pub use game_id::SteamGameId;
pub use mods::{ModInfo, ModType, get_installed_mods_from_folder, get_mod_info, parse_liblist};
pub use user_data::{LocalSteamUser, categorized_games, games_last_activity, steam_users};

use crate::{
    data::{
        Credentials, GameRecord, InstalledGames, InstalledResult, LibraryResult, LibraryScanner,
        PlayAction, SupportedLibraries,
    },
    error::{LibraryError, ParseError},
    importers::{GameStore, apply_categories, apply_last_activity, validate},
    macros::logs::{debug_fallback_flatpak, debug_path, info_skipped, warn_no_games},
    parsers::key_value::KeyValue,
    platform_path::{RegistryReader, RegistryRoot, RegistryView},
    remote::SteamCatalog,
    utils::{clean_game_title, contains_components, some_if_dir},
};

const LIBRARY: SupportedLibraries = SupportedLibraries::Steam;

/// Steamworks Common Redistributables, which is not a game
const APP_ID_REDIST: &str = "228980";
const DEFAULT_BRANCH: &str = "public";
const STATE_FLAG_UPDATE_REQUIRED: u64 = 2;
const REGISTRY_KEY_STEAM: &str = r"Software\Valve\Steam";

// UTILS --------------------------------------------------------------------------------
pub fn get_play_action(game_id: impl Display) -> PlayAction {
    PlayAction::url(format!("steam://rungameid/{game_id}"))
}

/// Used for checking if a file name matches the structure for an app manifest file
fn parse_manifest_filename(filename: &str) -> IResult<&str, &str> {
    delimited(
        tag("appmanifest_"),
        take_till1(|c: char| !c.is_ascii_alphanumeric()),
        tag(".acf"),
    )
    .parse(filename)
}

/// Library folders declared in `libraryfolders.vdf`. Numerically named children are libraries,
/// holding their path either as their own value or in a `path` child.
pub fn library_folders_from_kv(folders: &KeyValue) -> Vec<PathBuf> {
    folders
        .children
        .iter()
        .filter(|child| child.name.parse::<u32>().is_ok())
        .filter_map(|child| {
            let node = child.node();
            let path = match node.as_str() {
                "" => node.get("path").as_str(),
                path => path,
            };

            (!path.is_empty()).then(|| PathBuf::from(path))
        })
        .collect()
}

/// Returns a new game from the given path to a steam app manifest file (`appmanifest_.*.acf`).
/// Manifests without an app id yield `None`.
#[tracing::instrument(level = "trace")]
pub fn get_installed_game_from_file(
    path_app_manifest: &Path,
) -> Result<Option<GameRecord>, ParseError> {
    let kv = KeyValue::read_file(path_app_manifest)?;

    let app_id = kv.get("appid").as_u64();
    if app_id == 0 {
        debug!("{LIBRARY} - No app id in manifest {path_app_manifest:?}");
        return Ok(None);
    }

    let name = match kv.get("name").as_str() {
        "" => kv.get("UserConfig").get("name").as_str(),
        name => name,
    };

    // Soundtracks are installed under `music` rather than `common`
    let install_dir_name = kv.get("installdir").as_str();
    let install_directory = match (install_dir_name, path_app_manifest.parent()) {
        ("", _) | (_, None) => None,
        (dir_name, Some(path_steamapps)) => ["common", "music"]
            .into_iter()
            .find_map(|folder| some_if_dir(path_steamapps.join(folder).join(dir_name))),
    };

    let branch = match kv.get("UserConfig").get("betakey").as_str() {
        "" => DEFAULT_BRANCH,
        branch => branch,
    };

    let mut game = GameRecord::new(LIBRARY, app_id.to_string(), clean_game_title(name));
    game.install_directory = install_directory;
    game.play_action = Some(get_play_action(app_id));
    game.is_installed = true;
    game.version = Some(kv.get("buildid").as_u64().to_string());
    game.branch = Some(branch.to_owned());
    game.outdated =
        kv.get("StateFlags").as_u64() & STATE_FLAG_UPDATE_REQUIRED == STATE_FLAG_UPDATE_REQUIRED;

    if game.outdated {
        debug!("{LIBRARY} - Manifest flags '{}' as needing an update", game.name);
    }

    Ok(Some(game))
}

/// Find and return paths of the app manifest files, if they exist
fn get_manifest_paths(path_steamapps: &Path) -> Result<Vec<PathBuf>, io::Error> {
    let mut paths = read_dir(path_steamapps)?
        .flatten()
        .filter_map(|entry| {
            let filename_os_str = entry.file_name();

            let Some(filename) = filename_os_str.to_str() else {
                debug!("{LIBRARY} - Could not convert OS string to str: {filename_os_str:?}");
                return None;
            };

            if parse_manifest_filename(filename).is_err() {
                trace!(
                    "{LIBRARY} - File skipped as it did not match the pattern of a manifest file: {filename}"
                );
                return None;
            }

            Some(entry.path())
        })
        .collect::<Vec<_>>();

    paths.sort();
    Ok(paths)
}

/// All games installed in a `steamapps` folder. Unreadable manifests, games without an install
/// directory and soundtracks are skipped.
#[tracing::instrument(level = "trace")]
pub fn get_installed_games_from_folder(path_steamapps: &Path) -> Result<Vec<GameRecord>, io::Error> {
    let manifest_paths = get_manifest_paths(path_steamapps)?;

    if manifest_paths.is_empty() {
        warn!("{LIBRARY} - No app manifest files found for steam library: {path_steamapps:?}");
    }

    Ok(manifest_paths
        .iter()
        .filter_map(|path| match get_installed_game_from_file(path) {
            Ok(Some(game)) => {
                let is_soundtrack = game
                    .install_directory
                    .as_deref()
                    .is_some_and(|dir| contains_components(dir, "steamapps", "music"));

                if game.install_directory.is_none() || is_soundtrack {
                    info_skipped!(game.name, "not properly installed or it's a soundtrack");
                    return None;
                }

                Some(game)
            }
            Ok(None) => None,
            Err(e) => {
                // Steam can write invalid manifests
                error!("{LIBRARY} - Failed to get information about installed game from {path:?}: {e}");
                None
            }
        })
        .collect())
}

// STEAM PATHS --------------------------------------------------------------------------
/// Locations of the Steam client and the folders it installs mods into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SteamPaths {
    pub path_steam_dir: PathBuf,
    /// GoldSrc mods, usually inside the Half-Life install
    pub path_mod_install: PathBuf,
    /// Source mods
    pub path_source_mod_install: PathBuf,
}

impl SteamPaths {
    pub fn new(path_steam_dir: PathBuf) -> Self {
        Self {
            path_mod_install: path_steam_dir.join("steamapps/common/Half-Life"),
            path_source_mod_install: path_steam_dir.join("steamapps/sourcemods"),
            path_steam_dir,
        }
    }

    /// Locates the Steam client through the registry, falling back to the default data
    /// directory and then to the flatpak install
    pub fn detect(registry: &dyn RegistryReader) -> Option<Self> {
        let read = |value_name: &str| {
            registry
                .read_value(
                    RegistryRoot::CurrentUser,
                    REGISTRY_KEY_STEAM,
                    value_name,
                    RegistryView::Registry64,
                )
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        };

        let path_steam_dir = match read("SteamPath") {
            Some(path) => path,
            None => {
                let path_data_steam = dirs::data_dir()?.join("Steam");

                if path_data_steam.is_dir() {
                    path_data_steam
                } else {
                    debug_fallback_flatpak!();
                    dirs::home_dir()?.join(".var/app/com.valvesoftware.Steam/data/Steam")
                }
            }
        };

        debug_path!("main Steam directory", path_steam_dir);

        let mut paths = Self::new(path_steam_dir);
        if let Some(path) = read("ModInstallPath") {
            paths.path_mod_install = path;
        }
        if let Some(path) = read("SourceModInstallPath") {
            paths.path_source_mod_install = path;
        }

        Some(paths)
    }

    pub fn path_library_folders(&self) -> PathBuf {
        self.path_steam_dir.join("steamapps/libraryfolders.vdf")
    }

    pub fn path_login_users(&self) -> PathBuf {
        self.path_steam_dir.join("config/loginusers.vdf")
    }
}

// STEAM LIBRARY ------------------------------------------------------------------------
#[derive(Debug)]
pub struct Steam {
    paths: SteamPaths,
    include_mods: bool,
    catalog: Box<dyn SteamCatalog>,
}

impl Steam {
    pub fn new(paths: SteamPaths, include_mods: bool, catalog: Box<dyn SteamCatalog>) -> Self {
        Self {
            paths,
            include_mods,
            catalog,
        }
    }

    pub fn paths(&self) -> &SteamPaths {
        &self.paths
    }

    /// The Steam install directory, followed by any existing library folder declared in
    /// `libraryfolders.vdf`
    #[tracing::instrument(level = "trace")]
    pub fn get_library_folders(&self) -> Vec<PathBuf> {
        let path_library_folders = self.paths.path_library_folders();

        let declared_folders = if path_library_folders.is_file() {
            KeyValue::read_file(&path_library_folders)
                .map(|kv| library_folders_from_kv(&kv))
                .unwrap_or_else(|e| {
                    error!("{LIBRARY} - Failed to get additional Steam library folders: {e}");
                    Vec::new()
                })
        } else {
            Vec::new()
        };

        once(self.paths.path_steam_dir.clone())
            .chain(declared_folders.into_iter().filter(|folder| {
                if !folder.is_dir() {
                    warn!("{LIBRARY} - Found external Steam directory, but path doesn't exist: {folder:?}");
                }
                folder.is_dir()
            }))
            .unique()
            .collect()
    }

    /// Users which have logged into the local client
    pub fn get_steam_users(&self) -> Vec<LocalSteamUser> {
        let path_login_users = self.paths.path_login_users();
        if !path_login_users.is_file() {
            return Vec::new();
        }

        KeyValue::read_file(&path_login_users)
            .map(|kv| steam_users(&kv))
            .unwrap_or_else(|e| {
                error!("{LIBRARY} - Failed to get list of local users: {e}");
                Vec::new()
            })
    }

    pub fn get_games_last_activity(
        &self,
        steam_id: u64,
    ) -> Result<HashMap<String, DateTime<Utc>>, ParseError> {
        let path = user_data::path_local_config(&self.paths.path_steam_dir, steam_id);
        Ok(games_last_activity(&KeyValue::read_file(&path)?))
    }

    pub fn get_categorized_games(&self, steam_id: u64) -> Result<Vec<GameRecord>, ParseError> {
        let path = user_data::path_shared_config(&self.paths.path_steam_dir, steam_id);
        Ok(categorized_games(&KeyValue::read_file(&path)?))
    }

    fn get_installed_mods(&self, games: &mut InstalledGames) {
        let mod_folders = [
            (&self.paths.path_mod_install, ModType::GoldSrc),
            (&self.paths.path_source_mod_install, ModType::Source),
        ];

        for (path_mods, mod_type) in mod_folders {
            if !path_mods.is_dir() {
                trace!("{LIBRARY} - No {mod_type:?} mod folder at {path_mods:?}");
                continue;
            }

            match get_installed_mods_from_folder(path_mods, mod_type) {
                Ok(mods) => games.extend(mods),
                Err(e) => error!("{LIBRARY} - Failed to import Steam {mod_type:?} mods: {e}"),
            }
        }
    }

    /// Updates the last activity of the stored games from the account's `localconfig.vdf`,
    /// returning how many games were updated
    pub fn import_last_activity(
        &self,
        account_id: u64,
        store: &mut dyn GameStore,
    ) -> Result<usize, LibraryError> {
        validate(account_id, store)?;

        let activity = self.get_games_last_activity(account_id)?;
        Ok(apply_last_activity(store, LIBRARY, &activity))
    }

    /// Merges the categories, favorite and hidden flags from the account's `sharedconfig.vdf`
    /// into the stored games, returning how many games were updated
    pub fn import_categories(
        &self,
        account_id: u64,
        store: &mut dyn GameStore,
    ) -> Result<usize, LibraryError> {
        validate(account_id, store)?;

        let categorized = self.get_categorized_games(account_id)?;
        Ok(apply_categories(store, &categorized))
    }
}

impl LibraryScanner for Steam {
    fn get_library_type(&self) -> SupportedLibraries {
        LIBRARY
    }

    fn is_detected(&self) -> bool {
        self.paths.path_steam_dir.is_dir()
    }

    #[tracing::instrument(level = "trace")]
    fn scan_installed(&self) -> InstalledResult {
        let mut games = InstalledGames::new();

        if !self.is_detected() {
            debug!("{LIBRARY} - Steam is not installed");
            return Ok(games);
        }

        for path_library in self.get_library_folders() {
            let path_steamapps = path_library.join("steamapps");
            if !path_steamapps.is_dir() {
                warn!("{LIBRARY} - Steam library {path_steamapps:?} not found");
                continue;
            }

            for game in get_installed_games_from_folder(&path_steamapps)? {
                if game.game_id == APP_ID_REDIST {
                    trace!("{LIBRARY} - Ignoring redistributables in {path_steamapps:?}");
                    continue;
                }

                games.insert(game);
            }
        }

        if self.include_mods {
            self.get_installed_mods(&mut games);
        }

        if games.is_empty() {
            warn_no_games!();
        }

        Ok(games)
    }

    #[tracing::instrument(level = "trace")]
    fn scan_remote(&self, credentials: &Credentials) -> LibraryResult {
        let owned_games = self.catalog.fetch_owned_games(credentials)?;

        let last_activity = self
            .get_games_last_activity(credentials.account_id)
            .unwrap_or_else(|e| {
                warn!("{LIBRARY} - Failed to import Steam last activity: {e}");
                HashMap::new()
            });

        Ok(owned_games
            .into_iter()
            .filter_map(|owned| {
                // Some apps have no name, e.g. 243870
                if owned.name.is_empty() {
                    trace!("{LIBRARY} - Ignoring app without a name: {}", owned.id);
                    return None;
                }

                let mut game = GameRecord::new(LIBRARY, owned.id, clean_game_title(&owned.name));
                game.playtime = owned.playtime_minutes.saturating_mul(60);
                game.last_activity = last_activity.get(&game.game_id).copied();

                Some(game)
            })
            .collect())
    }

    /// Compares the installed build against the latest build of the installed branch, unless
    /// the manifest already flags the game as outdated
    fn refresh_outdated(&self, game: &mut GameRecord) {
        if game.outdated {
            return;
        }

        // The version may not have been set correctly
        let Some(installed_build) = game.version.as_deref().and_then(|v| v.parse::<u64>().ok())
        else {
            return;
        };

        let branch = game.branch.as_deref().unwrap_or(DEFAULT_BRANCH);
        match self.catalog.fetch_latest_build(&game.game_id, branch) {
            Ok(Some(latest_build)) if installed_build < latest_build => {
                debug!(
                    "{LIBRARY} - '{}' is on build {installed_build}, latest is {latest_build}",
                    game.name
                );
                game.outdated = true;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("{LIBRARY} - Failed to get the latest build of '{}': {e}", game.name);
            }
        }
    }
}
