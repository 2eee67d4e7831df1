mod packages;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, error, trace};

pub use packages::{InstallPackage, convert_package_id, get_install_packages};

use crate::{
    data::{
        Credentials, GameRecord, InstalledGames, InstalledResult, LibraryResult, LibraryScanner,
        PlayAction, SupportedLibraries,
    },
    error::{LibraryError, PathResolveError},
    macros::logs::{debug_path, info_skipped, warn_no_games},
    parsers::{
        installer_data::{INSTALLER_DATA_FILE_NAME, get_game_installer_data},
        local_data::{DownloadUrl, GameLocalData},
    },
    platform_path::{PathResolver, PlatformPath, join_platform_path},
    remote::{OFFER_TYPE_OWNED_BASE_GAME, OriginCatalog, fetch_local_data_or_placeholder},
    utils::clean_game_title,
};

const LIBRARY: SupportedLibraries = SupportedLibraries::Origin;

// UTILS --------------------------------------------------------------------------------
/// Client URL which launches (or, if needed, downloads) the given offer
pub fn get_launch_url(launch_id: &str) -> String {
    format!("origin2://game/launch?offerIds={launch_id}&autoDownload=1")
}

fn is_url(path: &str) -> bool {
    path.contains("://")
}

fn ends_with_installer_data(path: &str) -> bool {
    path.to_lowercase().ends_with(INSTALLER_DATA_FILE_NAME)
}

fn parent_dir(path: &str) -> Option<String> {
    Path::new(path)
        .parent()
        .map(|parent| parent.to_string_lossy().into_owned())
}

/// Build version of the most recent download whose effective date is not after `now`
pub fn latest_effective_version(history: &[DownloadUrl], now: DateTime<Utc>) -> Option<&str> {
    history
        .iter()
        .filter(|download| download.effective_date.is_some_and(|date| date <= now))
        .max_by_key(|download| download.effective_date)
        .and_then(|download| download.build_release_version.as_deref())
}

/// Whether `installed_version` differs from the latest version published as of `now`. Unknown
/// versions are never out of date.
fn is_version_out_of_date(
    local_data: &GameLocalData,
    installed_version: Option<&str>,
    now: DateTime<Utc>,
) -> bool {
    let latest_version = local_data
        .windows_software()
        .and_then(|software| latest_effective_version(software.download_history(), now));

    match (installed_version, latest_version) {
        (Some(installed), Some(latest)) => installed != latest,
        _ => false,
    }
}

/// Launch action for a resolved executable path. Files are started from the registry root they
/// were resolved against, or from their own directory when there is no relative part.
fn play_action_for_path(paths: PlatformPath) -> PlayAction {
    if is_url(&paths.complete_path) {
        return PlayAction::url(paths.complete_path);
    }

    let working_dir = match (paths.has_relative_path(), &paths.root) {
        (true, Some(root)) => root.clone(),
        _ => parent_dir(&paths.complete_path).unwrap_or_default(),
    };

    PlayAction::file(paths.complete_path, working_dir)
}

// ORIGIN LIBRARY -----------------------------------------------------------------------
#[derive(Debug)]
pub struct Origin {
    path_local_content: PathBuf,
    resolver: PathResolver,
    catalog: Box<dyn OriginCatalog>,
}

impl Origin {
    pub fn new(
        path_local_content: PathBuf,
        resolver: PathResolver,
        catalog: Box<dyn OriginCatalog>,
    ) -> Self {
        debug_path!("Origin local content directory", path_local_content);

        Self {
            path_local_content,
            resolver,
            catalog,
        }
    }

    /// Default `LocalContent` directory, under the machine-wide program data directory
    pub fn detect_local_content() -> Option<PathBuf> {
        std::env::var_os("PROGRAMDATA")
            .map(|path_program_data| PathBuf::from(path_program_data).join("Origin/LocalContent"))
    }

    /// Resolves a platform path. Malformed paths are treated as unresolvable, while unknown
    /// registry roots are returned as errors.
    fn resolve(&self, path: &str) -> Result<Option<PlatformPath>, PathResolveError> {
        match self.resolver.resolve(path) {
            Ok(None) => {
                debug!("{LIBRARY} - Could not resolve {path:?}");
                Ok(None)
            }
            Err(PathResolveError::Malformed(_)) => Ok(None),
            other => other,
        }
    }

    /// Launch action described by an `installerdata.xml` descriptor, from its last launcher
    pub fn get_play_action_from_installer_data(
        &self,
        installer_data_path: &str,
    ) -> Result<Option<PlayAction>, PathResolveError> {
        let Some(data) = get_game_installer_data(Path::new(installer_data_path)) else {
            return Ok(None);
        };

        let Some(launcher) = data.launcher() else {
            debug!("{LIBRARY} - No launcher in installer data {installer_data_path:?}");
            return Ok(None);
        };

        Ok(self.resolve(&launcher.file_path)?.map(play_action_for_path))
    }

    /// Launch action from the execute path of the Windows software entry, which is either a URL,
    /// an executable or an `installerdata.xml` descriptor
    pub fn get_play_action(
        &self,
        local_data: &GameLocalData,
    ) -> Result<Option<PlayAction>, PathResolveError> {
        let Some(execute_path) = local_data
            .windows_software()
            .and_then(|software| software.fulfillment_attributes.execute_path_override.as_deref())
            .filter(|path| !path.is_empty())
        else {
            return Ok(None);
        };

        if is_url(execute_path) {
            return Ok(Some(PlayAction::url(execute_path)));
        }

        let Some(paths) = self.resolve(execute_path)? else {
            return Ok(None);
        };

        if ends_with_installer_data(&paths.complete_path) {
            return self.get_play_action_from_installer_data(&paths.complete_path);
        }

        Ok(Some(play_action_for_path(paths)))
    }

    /// Install directory of an offer, if its install check file exists. This is the working
    /// directory of file play actions, and the directory of the install check file otherwise.
    pub fn get_install_directory(
        &self,
        local_data: &GameLocalData,
    ) -> Result<Option<PathBuf>, PathResolveError> {
        let Some(install_check) = local_data
            .windows_software()
            .and_then(|software| software.fulfillment_attributes.install_check_override.as_deref())
        else {
            return Ok(None);
        };

        let Some(install_path) = self.resolve(install_check)? else {
            return Ok(None);
        };

        let path_install_check = PathBuf::from(&install_path.complete_path);
        if install_path.complete_path.is_empty() || !path_install_check.is_file() {
            trace!("{LIBRARY} - Install check file does not exist: {path_install_check:?}");
            return Ok(None);
        }

        if let Some(working_dir) = self
            .get_play_action(local_data)?
            .and_then(|action| action.working_dir().cloned())
        {
            return Ok(Some(working_dir));
        }

        Ok(path_install_check.parent().map(Path::to_path_buf))
    }

    /// Path of the descriptor holding the installed version: the execute path itself when it
    /// is a descriptor, else `__installer/installerdata.xml` under the resolved root
    fn installer_data_path(paths: &PlatformPath) -> Option<String> {
        if ends_with_installer_data(&paths.complete_path) {
            return Some(paths.complete_path.clone());
        }

        let root = paths
            .root
            .clone()
            .or_else(|| parent_dir(&paths.complete_path))?;

        Some(join_platform_path(
            &join_platform_path(&root, "__installer"),
            INSTALLER_DATA_FILE_NAME,
        ))
    }

    /// Version declared by the installed game's descriptor
    pub fn installed_version(
        &self,
        local_data: &GameLocalData,
    ) -> Result<Option<String>, PathResolveError> {
        let Some(execute_path) = local_data
            .windows_software()
            .and_then(|software| software.fulfillment_attributes.execute_path_override.as_deref())
            .filter(|path| !path.is_empty() && !is_url(path))
        else {
            return Ok(None);
        };

        let Some(paths) = self.resolve(execute_path)? else {
            return Ok(None);
        };

        // Some games use a different, incompatible descriptor
        Ok(Self::installer_data_path(&paths)
            .and_then(|path| get_game_installer_data(Path::new(&path)))
            .and_then(|data| data.version().map(str::to_owned)))
    }

    /// Whether the installed version differs from the latest version published as of `now`.
    /// Games without installed version info are never out of date.
    pub fn is_out_of_date(
        &self,
        local_data: &GameLocalData,
        now: DateTime<Utc>,
    ) -> Result<bool, PathResolveError> {
        Ok(is_version_out_of_date(
            local_data,
            self.installed_version(local_data)?.as_deref(),
            now,
        ))
    }

    /// Installed game for an install package, or `None` for packages which are not installed
    /// games
    #[tracing::instrument(level = "trace")]
    pub fn get_installed_game(
        &self,
        package: &InstallPackage,
        now: DateTime<Utc>,
    ) -> Result<Option<GameRecord>, LibraryError> {
        let local_data =
            fetch_local_data_or_placeholder(self.catalog.as_ref(), &package.converted_id)?;

        if !local_data.is_importable() {
            info_skipped!(
                package.converted_id,
                format!("offer type is {:?}", local_data.offer_type)
            );
            return Ok(None);
        }

        let name = clean_game_title(local_data.display_name());
        let Some(install_directory) = self.get_install_directory(&local_data)? else {
            info_skipped!(name, "no install directory found");
            return Ok(None);
        };

        let mut game = GameRecord::new(LIBRARY, package.converted_id.clone(), name);
        game.install_directory = Some(install_directory);
        game.play_action = Some(PlayAction::url(get_launch_url(&package.launch_id())));
        game.is_installed = true;
        game.version = self.installed_version(&local_data)?;
        game.outdated = is_version_out_of_date(&local_data, game.version.as_deref(), now);

        if game.outdated {
            debug!("{LIBRARY} - '{}' needs an update", game.name);
        }

        Ok(Some(game))
    }
}

impl LibraryScanner for Origin {
    fn get_library_type(&self) -> SupportedLibraries {
        LIBRARY
    }

    fn is_detected(&self) -> bool {
        self.path_local_content.is_dir()
    }

    #[tracing::instrument(level = "trace")]
    fn scan_installed(&self) -> InstalledResult {
        let now = Utc::now();
        let mut games = InstalledGames::new();

        for package in get_install_packages(&self.path_local_content) {
            match self.get_installed_game(&package, now) {
                Ok(Some(game)) => {
                    games.insert(game);
                }
                Ok(None) => {}
                Err(e) => {
                    error!("{LIBRARY} - Failed to import installed Origin game {package:?}: {e}");
                }
            }
        }

        if games.is_empty() {
            warn_no_games!();
        }

        Ok(games)
    }

    #[tracing::instrument(level = "trace")]
    fn scan_remote(&self, credentials: &Credentials) -> LibraryResult {
        let owned_games = self.catalog.fetch_owned_games(credentials)?;

        Ok(owned_games
            .into_iter()
            .filter(|owned| owned.offer_type == OFFER_TYPE_OWNED_BASE_GAME)
            .filter_map(|owned| {
                let usage = self
                    .catalog
                    .fetch_usage(credentials, &owned.id)
                    .map_err(|e| error!("{LIBRARY} - Failed to get usage data for {}: {e}", owned.id))
                    .ok();

                let name = match fetch_local_data_or_placeholder(self.catalog.as_ref(), &owned.id) {
                    Ok(local_data) if local_data.display_name().is_empty() => owned.id.clone(),
                    Ok(local_data) => clean_game_title(local_data.display_name()),
                    Err(e) => {
                        error!("{LIBRARY} - Failed to get Origin manifest for {}: {e}", owned.id);
                        return None;
                    }
                };

                let mut game = GameRecord::new(LIBRARY, owned.id, name);
                game.playtime = usage
                    .as_ref()
                    .map_or(owned.playtime_minutes, |usage| usage.total_minutes)
                    .saturating_mul(60);
                game.last_activity = usage.and_then(|usage| usage.last_session_end);

                Some(game)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use test_case::test_case;

    use super::*;
    use crate::{
        error::RemoteServiceError,
        parsers::local_data::parse_local_data,
        platform_path::RegistryRoot,
        remote::{OwnedGame, Usage},
        test_utils::{MockRegistry, write_file},
    };

    const REGISTRY_KEY: &str = r"SOFTWARE\EA Games\Test Game";

    #[derive(Debug, Default)]
    struct FakeCatalog {
        owned: Vec<OwnedGame>,
        local_data: HashMap<String, GameLocalData>,
        usage: HashMap<String, Usage>,
    }

    impl OriginCatalog for FakeCatalog {
        fn fetch_owned_games(&self, _: &Credentials) -> Result<Vec<OwnedGame>, RemoteServiceError> {
            Ok(self.owned.clone())
        }

        fn fetch_local_data(&self, id: &str) -> Result<GameLocalData, RemoteServiceError> {
            match id {
                "OFB-EAST:500" => Err(RemoteServiceError::Transport(String::from("timeout"))),
                _ => self
                    .local_data
                    .get(id)
                    .cloned()
                    .ok_or_else(|| RemoteServiceError::NotFound(id.to_owned())),
            }
        }

        fn fetch_usage(&self, _: &Credentials, id: &str) -> Result<Usage, RemoteServiceError> {
            self.usage
                .get(id)
                .cloned()
                .ok_or_else(|| RemoteServiceError::Transport(String::from("no usage")))
        }
    }

    const INSTALLER_DATA: &str = r#"<DiPManifest version="4.0">
  <buildMetaData><gameVersion version="1.0.5"/></buildMetaData>
  <runtime>
    <launcher><filePath>[HKEY_LOCAL_MACHINE\SOFTWARE\EA Games\Test Game\Install Dir]Trial.exe</filePath></launcher>
    <launcher><filePath>[HKEY_LOCAL_MACHINE\SOFTWARE\EA Games\Test Game\Install Dir]Game.exe</filePath></launcher>
  </runtime>
</DiPManifest>"#;

    fn local_data(offer_type: &str, execute_path: &str, history: &str) -> GameLocalData {
        let json = format!(
            r#"{{
                "offerId": "OFB-EAST:52017",
                "offerType": "{offer_type}",
                "localizableAttributes": {{ "displayName": "Test Game™" }},
                "publishing": {{ "softwareList": {{ "software": [{{
                    "softwarePlatform": "PCWIN",
                    "fulfillmentAttributes": {{
                        "executePathOverride": {execute_path},
                        "installCheckOverride": "[HKEY_LOCAL_MACHINE\\SOFTWARE\\EA Games\\Test Game\\Install Dir]Game.exe"
                    }},
                    "downloadURLs": {{ "downloadURL": [{history}] }}
                }}] }} }}
            }}"#
        );

        parse_local_data(&json).unwrap()
    }

    fn descriptor_local_data(history: &str) -> GameLocalData {
        local_data(
            "Base Game",
            r#""[HKEY_LOCAL_MACHINE\\SOFTWARE\\EA Games\\Test Game\\Install Dir]__Installer\\installerdata.xml""#,
            history,
        )
    }

    fn download(version: &str, date: &str) -> String {
        format!(r#"{{ "buildReleaseVersion": "{version}", "effectiveDate": "{date}" }}"#)
    }

    /// Game installed in a temp directory, registered under `REGISTRY_KEY`
    fn mock_install() -> (TempDir, String, MockRegistry) {
        let dir = TempDir::new().unwrap();
        let path_install = dir.path().join("Test Game");
        write_file(&path_install.join("Game.exe"), "");
        write_file(
            &path_install.join("__Installer/installerdata.xml"),
            INSTALLER_DATA,
        );

        let root = path_install.to_string_lossy().into_owned();
        let registry =
            MockRegistry::default().with_any_view(RegistryRoot::LocalMachine, REGISTRY_KEY, "Install Dir", &root);

        (dir, root, registry)
    }

    fn origin(path_local_content: PathBuf, registry: MockRegistry, catalog: FakeCatalog) -> Origin {
        Origin::new(
            path_local_content,
            PathResolver::new(Box::new(registry)),
            Box::new(catalog),
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_launch_url() {
        assert_eq!(
            get_launch_url("OFB-EAST:52017"),
            "origin2://game/launch?offerIds=OFB-EAST:52017&autoDownload=1"
        );
    }

    #[test_case(&[("5", "2019-01-01T00:00:00Z"), ("9", "2021-01-01T00:00:00Z")], Some("5"); "future build ignored")]
    #[test_case(&[("7", "2019-06-01T00:00:00Z"), ("6", "2019-01-01T00:00:00Z")], Some("7"); "most recent past build")]
    #[test_case(&[("9", "2021-01-01T00:00:00Z")], None; "only future builds")]
    #[test_case(&[], None; "empty history")]
    fn test_latest_effective_version(history: &[(&str, &str)], expected: Option<&str>) {
        let history = history
            .iter()
            .map(|(version, date)| DownloadUrl {
                build_release_version: Some((*version).to_owned()),
                effective_date: Some(DateTime::parse_from_rfc3339(date).unwrap().with_timezone(&Utc)),
                ..Default::default()
            })
            .collect::<Vec<_>>();

        assert_eq!(latest_effective_version(&history, now()), expected);
    }

    #[test]
    fn test_play_action_from_installer_data() {
        let (_dir, root, registry) = mock_install();
        let origin = origin(PathBuf::new(), registry, FakeCatalog::default());

        let action = origin
            .get_play_action(&descriptor_local_data(""))
            .unwrap()
            .unwrap();

        assert_eq!(
            action,
            PlayAction::file(format!("{root}/Game.exe"), root.clone())
        );
    }

    #[test]
    fn test_play_action_url_and_unresolvable() {
        let origin = origin(PathBuf::new(), MockRegistry::default(), FakeCatalog::default());

        let url = local_data("Base Game", r#""link2ea://launchgame/1""#, "");
        assert_eq!(
            origin.get_play_action(&url).unwrap(),
            Some(PlayAction::url("link2ea://launchgame/1"))
        );

        assert_eq!(
            origin.get_play_action(&descriptor_local_data("")).unwrap(),
            None
        );

        let missing = local_data("Base Game", "null", "");
        assert_eq!(origin.get_play_action(&missing).unwrap(), None);
    }

    #[test]
    fn test_install_directory() {
        let (_dir, root, registry) = mock_install();
        let origin = origin(PathBuf::new(), registry, FakeCatalog::default());

        assert_eq!(
            origin
                .get_install_directory(&descriptor_local_data(""))
                .unwrap(),
            Some(PathBuf::from(&root))
        );

        // Without a file action, the install check file's directory is used
        let url = local_data("Base Game", r#""link2ea://launchgame/1""#, "");
        assert_eq!(
            origin.get_install_directory(&url).unwrap(),
            Some(PathBuf::from(&root))
        );
    }

    #[test]
    fn test_install_directory_requires_install_check_file() {
        let (_dir, root, registry) = mock_install();
        std::fs::remove_file(Path::new(&root).join("Game.exe")).unwrap();
        let origin = origin(PathBuf::new(), registry, FakeCatalog::default());

        assert_eq!(
            origin
                .get_install_directory(&descriptor_local_data(""))
                .unwrap(),
            None
        );
    }

    #[test_case(&download("1.0.5", "2019-01-01T00:00:00Z"), false; "up to date")]
    #[test_case(&format!("{},{}", download("1.0.5", "2019-01-01T00:00:00Z"), download("1.0.9", "2021-01-01T00:00:00Z")), false; "future build ignored")]
    #[test_case(&download("1.0.7", "2019-01-01T00:00:00Z"), true; "newer build")]
    #[test_case(&download("1.0.4", "2019-01-01T00:00:00Z"), true; "older build differs")]
    #[test_case("", false; "no history")]
    fn test_is_out_of_date(history: &str, expected: bool) {
        let (_dir, _, registry) = mock_install();
        let origin = origin(PathBuf::new(), registry, FakeCatalog::default());

        assert_eq!(
            origin
                .is_out_of_date(&descriptor_local_data(history), now())
                .unwrap(),
            expected
        );
    }

    #[test]
    fn test_malformed_installer_data_is_not_out_of_date() {
        let (_dir, root, registry) = mock_install();
        write_file(
            &Path::new(&root).join("__Installer/installerdata.xml"),
            "<DiPManifest><buildMetaData>",
        );
        let origin = origin(PathBuf::new(), registry, FakeCatalog::default());

        let data = descriptor_local_data(&download("1.0.7", "2019-01-01T00:00:00Z"));
        assert!(!origin.is_out_of_date(&data, now()).unwrap());
    }

    #[test]
    fn test_installed_version_for_executable_path() {
        let (_dir, _, registry) = mock_install();
        let origin = origin(PathBuf::new(), registry, FakeCatalog::default());

        let data = local_data(
            "Base Game",
            r#""[HKEY_LOCAL_MACHINE\\SOFTWARE\\EA Games\\Test Game\\Install Dir]Game.exe""#,
            "",
        );

        assert_eq!(
            origin.installed_version(&data).unwrap().as_deref(),
            Some("1.0.5")
        );
    }

    #[test]
    fn test_scan_installed() {
        let (dir, root, registry) = mock_install();
        let path_local_content = dir.path().join("LocalContent");
        write_file(&path_local_content.join("Test Game/OFB-EAST52017.mfst"), "");
        write_file(&path_local_content.join("DLC/OFB-EAST52018.mfst"), "");
        write_file(&path_local_content.join("Unknown/OFB-EAST52019.mfst"), "");
        write_file(&path_local_content.join("Broken/OFB-EAST500.mfst"), "");

        let mut dlc = descriptor_local_data("");
        dlc.offer_type = String::from("Extra Content");

        let catalog = FakeCatalog {
            local_data: HashMap::from([
                (
                    String::from("OFB-EAST:52017"),
                    descriptor_local_data(&download("1.0.7", "2019-01-01T00:00:00Z")),
                ),
                (String::from("OFB-EAST:52018"), dlc),
            ]),
            ..Default::default()
        };
        let origin = origin(path_local_content, registry, catalog);

        assert!(origin.is_detected());

        let games = origin.scan_installed().unwrap();
        assert_eq!(games.len(), 1);

        let game = games.get("OFB-EAST:52017").unwrap();
        assert_eq!(game.name, "Test Game");
        assert!(game.is_installed);
        assert!(game.outdated);
        assert_eq!(game.version.as_deref(), Some("1.0.5"));
        assert_eq!(game.install_directory, Some(PathBuf::from(root)));
        assert_eq!(
            game.play_action,
            Some(PlayAction::url(
                "origin2://game/launch?offerIds=OFB-EAST:52017&autoDownload=1"
            ))
        );
    }

    #[test]
    fn test_scan_remote() {
        let catalog = FakeCatalog {
            owned: vec![
                OwnedGame {
                    id: String::from("OFB-EAST:52017"),
                    offer_type: String::from("basegame"),
                    playtime_minutes: 10,
                    ..Default::default()
                },
                OwnedGame {
                    id: String::from("OFB-EAST:52018"),
                    offer_type: String::from("extra"),
                    ..Default::default()
                },
                OwnedGame {
                    id: String::from("OFB-EAST:1"),
                    offer_type: String::from("basegame"),
                    playtime_minutes: 3,
                    ..Default::default()
                },
                OwnedGame {
                    id: String::from("OFB-EAST:500"),
                    offer_type: String::from("basegame"),
                    ..Default::default()
                },
            ],
            local_data: HashMap::from([(
                String::from("OFB-EAST:52017"),
                descriptor_local_data(""),
            )]),
            usage: HashMap::from([(
                String::from("OFB-EAST:52017"),
                Usage {
                    total_minutes: 120,
                    last_session_end: Some(now()),
                },
            )]),
        };

        let origin = origin(PathBuf::new(), MockRegistry::default(), catalog);
        let games = origin
            .scan_remote(&Credentials {
                account_id: 1,
                access_token: String::from("token"),
            })
            .unwrap();

        assert_eq!(games.len(), 2);

        assert_eq!(games[0].name, "Test Game");
        assert_eq!(games[0].playtime, 7200);
        assert_eq!(games[0].last_activity, Some(now()));

        // Unknown to the catalog, and without usage data
        assert_eq!(games[1].game_id, "OFB-EAST:1");
        assert_eq!(games[1].name, "OFB-EAST:1");
        assert_eq!(games[1].playtime, 180);
        assert_eq!(games[1].last_activity, None);
    }

    #[test_case(Some(u64::MAX / 2), 0; "from usage")]
    #[test_case(None, u64::MAX / 2; "from owned games")]
    fn test_scan_remote_saturates_playtime(usage_minutes: Option<u64>, owned_minutes: u64) {
        let id = String::from("OFB-EAST:52017");
        let catalog = FakeCatalog {
            owned: vec![OwnedGame {
                id: id.clone(),
                offer_type: String::from("basegame"),
                playtime_minutes: owned_minutes,
                ..Default::default()
            }],
            local_data: HashMap::from([(id.clone(), descriptor_local_data(""))]),
            usage: usage_minutes
                .map(|total_minutes| {
                    (
                        id.clone(),
                        Usage {
                            total_minutes,
                            last_session_end: None,
                        },
                    )
                })
                .into_iter()
                .collect(),
        };

        let games = origin(PathBuf::new(), MockRegistry::default(), catalog)
            .scan_remote(&Credentials {
                account_id: 1,
                access_token: String::from("token"),
            })
            .unwrap();

        assert_eq!(games.len(), 1);
        assert_eq!(games[0].playtime, u64::MAX);
    }

    /// Local data whose install check uses the given platform path
    fn install_check_local_data(install_check: &str) -> GameLocalData {
        let mut data = descriptor_local_data("");
        if let Some(software) = data.publishing.software_list.software.first_mut() {
            software.fulfillment_attributes.install_check_override = Some(install_check.to_owned());
        }
        data
    }

    #[test_case(r"[HKEY_USERS\SOFTWARE\EA Games\Other\Install Dir]Game.exe"; "unknown registry root")]
    #[test_case(r"[HKEY_LOCAL_MACHINE]Game.exe"; "malformed registry path")]
    fn test_scan_installed_skips_unresolvable_package(install_check: &str) {
        let (dir, root, registry) = mock_install();
        let path_local_content = dir.path().join("LocalContent");
        write_file(&path_local_content.join("Broken/OFB-EAST1.mfst"), "");
        write_file(&path_local_content.join("Test Game/OFB-EAST52017.mfst"), "");

        let catalog = FakeCatalog {
            local_data: HashMap::from([
                (
                    String::from("OFB-EAST:1"),
                    install_check_local_data(install_check),
                ),
                (String::from("OFB-EAST:52017"), descriptor_local_data("")),
            ]),
            ..Default::default()
        };
        let origin = origin(path_local_content, registry, catalog);

        let games = origin.scan_installed().unwrap();

        assert_eq!(
            games.iter().map(|g| g.game_id.as_str()).collect::<Vec<_>>(),
            vec!["OFB-EAST:52017"]
        );
        assert_eq!(
            games.get("OFB-EAST:52017").unwrap().install_directory,
            Some(PathBuf::from(root))
        );
    }

    #[test]
    fn test_unknown_registry_root_fails_the_package() {
        let (_dir, _, registry) = mock_install();
        let catalog = FakeCatalog {
            local_data: HashMap::from([(
                String::from("OFB-EAST:1"),
                install_check_local_data(r"[HKEY_USERS\SOFTWARE\EA Games\Other\Install Dir]Game.exe"),
            )]),
            ..Default::default()
        };
        let origin = origin(PathBuf::new(), registry, catalog);
        let package = convert_package_id("OFB-EAST1").unwrap();

        assert!(matches!(
            origin.get_installed_game(&package, now()),
            Err(LibraryError::Path(PathResolveError::UnknownRoot(root))) if root == "HKEY_USERS"
        ));
    }
}
