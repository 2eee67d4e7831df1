//! Merging of installed and account games, and the full import run of a library.

use std::collections::HashSet;

use tracing::{debug, error, info};

use crate::{
    data::{GameRecord, InstalledGames, LibraryScanner, SupportedLibraries},
    error::{ImportError, ImportPhase, LibraryError, ValidationError},
    settings::LibrarySettings,
};

/// User-visible notifications of the host application
pub trait Notifier {
    /// Shows a notification, replacing any existing one with the same id
    fn add(&self, id: &str, message: &str);
    fn remove(&self, id: &str);
}

/// Id of the notification shown when an import phase of `library` fails
pub fn import_error_id(library: SupportedLibraries) -> String {
    format!("{}libImportError", library.tag())
}

/// Id of the notification shown when an installed game has an update available
pub fn update_available_id(library: SupportedLibraries, game_id: &str) -> String {
    format!("updateAvailable{library}-{game_id}")
}

/// Merges account games into the installed games, calling `on_match` for every installed game
/// which is also in the account library.
///
/// Matched installed games get the playtime and last activity of their account entry. Account
/// games which are not installed are appended, marked as not installed, unless
/// `import_uninstalled` is `false`. Installed games come first in scan order, followed by the
/// appended games in account order. Ids are never repeated.
pub fn reconcile_with(
    mut installed: InstalledGames,
    remote: Vec<GameRecord>,
    import_uninstalled: bool,
    mut on_match: impl FnMut(&mut GameRecord),
) -> Vec<GameRecord> {
    let mut seen = HashSet::new();
    let mut appended = Vec::new();

    for mut game in remote {
        if let Some(installed_game) = installed.get_mut(&game.game_id) {
            installed_game.playtime = game.playtime;
            installed_game.last_activity = game.last_activity;
            on_match(installed_game);
            continue;
        }

        if !import_uninstalled || !seen.insert(game.game_id.clone()) {
            continue;
        }

        game.is_installed = false;
        game.install_directory = None;
        appended.push(game);
    }

    let mut games = installed.into_vec();
    games.extend(appended);
    games
}

/// [`reconcile_with`] without a match callback
pub fn reconcile(
    installed: InstalledGames,
    remote: Vec<GameRecord>,
    import_uninstalled: bool,
) -> Vec<GameRecord> {
    reconcile_with(installed, remote, import_uninstalled, |_| {})
}

/// Games of one import run, along with the error of the last failed phase, if any
#[derive(Debug)]
pub struct ImportOutcome {
    pub games: Vec<GameRecord>,
    pub error: Option<ImportError>,
}

/// Runs a full import of `scanner`'s library according to `settings`.
///
/// A failed phase is recorded and reported through `notifier` under [`import_error_id`], without
/// discarding the games of the other phase. The notification is removed after a run without
/// errors. Every outdated installed game gets an update notification.
#[tracing::instrument(level = "trace", skip(notifier))]
pub fn get_games(
    scanner: &dyn LibraryScanner,
    settings: &LibrarySettings,
    notifier: &dyn Notifier,
) -> ImportOutcome {
    let library = scanner.get_library_type();
    let mut import_error = None;

    let mut installed = InstalledGames::new();
    if settings.import_installed_games {
        match scanner.scan_installed() {
            Ok(games) => {
                debug!("{library} - Found {} installed games", games.len());
                installed = games;
            }
            Err(e) => {
                error!("{library} - Failed to import installed games: {e}");
                import_error = Some(ImportError {
                    phase: ImportPhase::Installed,
                    source: e,
                });
            }
        }
    }

    let mut remote = Vec::new();
    if settings.connect_account {
        let result = match &settings.credentials {
            Some(credentials) => scanner.scan_remote(credentials),
            None => Err(LibraryError::from(ValidationError::InvalidAccount)),
        };

        match result {
            Ok(games) => {
                debug!("{library} - Found {} library games", games.len());
                remote = games;
            }
            Err(e) => {
                error!("{library} - Failed to import linked account games details: {e}");
                import_error = Some(ImportError {
                    phase: ImportPhase::Library,
                    source: e,
                });
            }
        }
    }

    let games = reconcile_with(
        installed,
        remote,
        settings.import_uninstalled_games,
        |game| scanner.refresh_outdated(game),
    );

    for game in games.iter().filter(|game| game.is_installed && game.outdated) {
        info!("{library} - Game: {} needs an update", game.name);
        notifier.add(
            &update_available_id(library, &game.game_id),
            &format!("An update is available for {} via {library}", game.name),
        );
    }

    let error_id = import_error_id(library);
    match &import_error {
        Some(e) => notifier.add(
            &error_id,
            &format!("Failed to import games from {library}.\n{e}"),
        ),
        None => notifier.remove(&error_id),
    }

    ImportOutcome {
        games,
        error: import_error,
    }
}
