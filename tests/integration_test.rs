use std::{
    cell::RefCell,
    fs::{create_dir_all, write},
    path::Path,
};

use chrono::DateTime;
use lib_library_importer::{
    data::{Credentials, LibraryScanner, SupportedLibraries},
    error::{ImportPhase, RemoteServiceError},
    libraries::steam::{Steam, SteamPaths},
    reconcile::{Notifier, get_games},
    remote::{OfflineCatalog, OwnedGame, SteamCatalog},
    settings::LibrarySettings,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const STEAM_ID: u64 = 76_561_197_960_287_930;
const ACCOUNT_ID: u32 = 22_202;

#[derive(Debug, Default)]
struct Notifications {
    added: RefCell<Vec<String>>,
    removed: RefCell<Vec<String>>,
}

impl Notifier for Notifications {
    fn add(&self, id: &str, _: &str) {
        self.added.borrow_mut().push(id.to_owned());
    }

    fn remove(&self, id: &str) {
        self.removed.borrow_mut().push(id.to_owned());
    }
}

#[derive(Debug)]
struct Catalog;

impl SteamCatalog for Catalog {
    fn fetch_owned_games(&self, _: &Credentials) -> Result<Vec<OwnedGame>, RemoteServiceError> {
        Ok(vec![
            OwnedGame {
                id: String::from("440"),
                name: String::from("Team Fortress 2"),
                playtime_minutes: 10,
                ..Default::default()
            },
            OwnedGame {
                id: String::from("730"),
                name: String::from("Counter-Strike 2"),
                playtime_minutes: 2,
                ..Default::default()
            },
        ])
    }

    fn fetch_latest_build(&self, _: &str, _: &str) -> Result<Option<u64>, RemoteServiceError> {
        Ok(Some(200))
    }
}

fn write_file(path: &Path, content: &str) {
    create_dir_all(path.parent().unwrap()).unwrap();
    write(path, content).unwrap();
}

fn mock_steam_dir(dir: &TempDir) -> SteamPaths {
    let path_steam_dir = dir.path().join("Steam");
    let path_steamapps = path_steam_dir.join("steamapps");

    for (app_id, name, install_dir) in [
        ("440", "Team Fortress 2", "Team Fortress 2"),
        ("570", "Dota 2", "dota 2 beta"),
    ] {
        write_file(
            &path_steamapps.join(format!("appmanifest_{app_id}.acf")),
            &format!(
                "\"AppState\"\n{{\n\t\"appid\"\t\t\"{app_id}\"\n\t\"name\"\t\t\"{name}\"\n\t\"installdir\"\t\t\"{install_dir}\"\n\t\"buildid\"\t\t\"100\"\n}}\n"
            ),
        );
        create_dir_all(path_steamapps.join("common").join(install_dir)).unwrap();
    }

    write_file(
        &path_steam_dir.join(format!("userdata/{ACCOUNT_ID}/config/localconfig.vdf")),
        r#""UserLocalConfigStore" { "Software" { "Valve" { "Steam" { "apps" { "730" { "LastPlayed" "1600000000" } } } } } }"#,
    );

    SteamPaths::new(path_steam_dir)
}

fn settings() -> LibrarySettings {
    LibrarySettings {
        connect_account: true,
        import_uninstalled_games: true,
        credentials: Some(Credentials {
            account_id: STEAM_ID,
            access_token: String::from("token"),
        }),
        ..Default::default()
    }
}

#[test]
fn test_import_steam_library() {
    let dir = TempDir::new().unwrap();
    let steam = Steam::new(mock_steam_dir(&dir), true, Box::new(Catalog));
    let notifier = Notifications::default();

    assert!(steam.is_detected());
    assert_eq!(steam.get_library_type(), SupportedLibraries::Steam);

    let outcome = get_games(&steam, &settings(), &notifier);
    assert!(outcome.error.is_none());

    let summary = outcome
        .games
        .iter()
        .map(|g| (g.game_id.as_str(), g.is_installed, g.playtime, g.outdated))
        .collect::<Vec<_>>();
    assert_eq!(
        summary,
        vec![
            ("440", true, 600, true),
            ("570", true, 0, false),
            ("730", false, 120, false),
        ]
    );
    assert_eq!(
        outcome.games[2].last_activity,
        DateTime::from_timestamp(1_600_000_000, 0)
    );

    assert_eq!(*notifier.added.borrow(), vec!["updateAvailableSteam-440"]);
    assert_eq!(*notifier.removed.borrow(), vec!["steamlibImportError"]);
}

#[test]
fn test_import_offline_keeps_installed_games() {
    let dir = TempDir::new().unwrap();
    let steam = Steam::new(mock_steam_dir(&dir), true, Box::new(OfflineCatalog));
    let notifier = Notifications::default();

    let outcome = get_games(&steam, &settings(), &notifier);

    assert_eq!(outcome.error.map(|e| e.phase), Some(ImportPhase::Library));
    assert_eq!(outcome.games.len(), 2);
    assert!(outcome.games.iter().all(|g| g.is_installed));
    assert_eq!(*notifier.added.borrow(), vec!["steamlibImportError"]);
}
