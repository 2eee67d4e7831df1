use std::{
    collections::{BTreeSet, HashMap},
    fmt::{self, Debug, Display, Formatter},
    path::PathBuf,
};

use chrono::{DateTime, Utc};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::error::LibraryError;

/// Data structure representing a supported game library
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum SupportedLibraries {
    Steam,
    Origin,
}

impl SupportedLibraries {
    /// Short lowercase tag, used to build notification ids
    pub fn tag(&self) -> &'static str {
        match self {
            SupportedLibraries::Steam => "steam",
            SupportedLibraries::Origin => "origin",
        }
    }
}

impl Debug for SupportedLibraries {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SupportedLibraries::Steam => "Steam",
                SupportedLibraries::Origin => "Origin",
            }
        )
    }
}

impl Display for SupportedLibraries {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

/// How a game gets launched
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum PlayActionKind {
    /// Open a URL, usually a custom protocol handled by the vendor client
    Url(String),
    /// Execute a file from the given working directory
    File { path: PathBuf, working_dir: PathBuf },
}

/// Launch action for a game, along with whether the plugin (rather than generic OS file
/// execution) is responsible for resolving and running it
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct PlayAction {
    pub kind: PlayActionKind,
    pub is_handled_by_plugin: bool,
}

impl PlayAction {
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            kind: PlayActionKind::Url(url.into()),
            is_handled_by_plugin: true,
        }
    }

    pub fn file(path: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            kind: PlayActionKind::File {
                path: path.into(),
                working_dir: working_dir.into(),
            },
            is_handled_by_plugin: true,
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self.kind, PlayActionKind::Url(_))
    }

    /// Working directory of a file action
    pub fn working_dir(&self) -> Option<&PathBuf> {
        match &self.kind {
            PlayActionKind::File { working_dir, .. } => Some(working_dir),
            PlayActionKind::Url(_) => None,
        }
    }
}

/// Data structure which defines all relevant data about any particular game
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct GameRecord {
    pub source: SupportedLibraries,
    /// Platform-native identifier, unique within one library
    pub game_id: String,
    pub name: String,
    pub install_directory: Option<PathBuf>,
    pub play_action: Option<PlayAction>,
    pub is_installed: bool,
    /// Total playtime, in seconds
    pub playtime: u64,
    pub last_activity: Option<DateTime<Utc>>,
    pub version: Option<String>,
    pub branch: Option<String>,
    pub outdated: bool,
    pub categories: BTreeSet<String>,
    pub hidden: bool,
    pub favorite: bool,
    pub developers: Vec<String>,
    pub links: Vec<String>,
    pub icon: Option<PathBuf>,
}

impl GameRecord {
    pub fn new(
        source: SupportedLibraries,
        game_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            source,
            game_id: game_id.into(),
            name: name.into(),
            install_directory: None,
            play_action: None,
            is_installed: false,
            playtime: 0,
            last_activity: None,
            version: None,
            branch: None,
            outdated: false,
            categories: BTreeSet::new(),
            hidden: false,
            favorite: false,
            developers: Vec::new(),
            links: Vec::new(),
            icon: None,
        }
    }
}

/// Installed games keyed by game id, iterated in insertion (scan) order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledGames {
    games: Vec<GameRecord>,
    index: HashMap<String, usize>,
}

impl InstalledGames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the game unless a game with the same id is already present. Returns whether the game
    /// was added.
    pub fn insert(&mut self, game: GameRecord) -> bool {
        if self.index.contains_key(&game.game_id) {
            return false;
        }

        self.index.insert(game.game_id.clone(), self.games.len());
        self.games.push(game);
        true
    }

    pub fn contains(&self, game_id: &str) -> bool {
        self.index.contains_key(game_id)
    }

    pub fn get(&self, game_id: &str) -> Option<&GameRecord> {
        self.index.get(game_id).map(|&i| &self.games[i])
    }

    pub fn get_mut(&mut self, game_id: &str) -> Option<&mut GameRecord> {
        self.index.get(game_id).map(|&i| &mut self.games[i])
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameRecord> {
        self.games.iter()
    }

    pub fn into_vec(self) -> Vec<GameRecord> {
        self.games
    }
}

impl FromIterator<GameRecord> for InstalledGames {
    fn from_iter<T: IntoIterator<Item = GameRecord>>(iter: T) -> Self {
        let mut games = Self::new();
        iter.into_iter().for_each(|g| {
            games.insert(g);
        });
        games
    }
}

impl Extend<GameRecord> for InstalledGames {
    fn extend<T: IntoIterator<Item = GameRecord>>(&mut self, iter: T) {
        iter.into_iter().for_each(|g| {
            self.insert(g);
        });
    }
}

/// Bearer credential for an online account, obtained out-of-band
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Credentials {
    pub account_id: u64,
    pub access_token: String,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_id", &self.account_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

pub type InstalledResult = Result<InstalledGames, LibraryError>;
pub type LibraryResult = Result<Vec<GameRecord>, LibraryError>;

// Detection and reconciliation is divided up by "libraries" which are the platform-specific
// sources of games, e.g. Steam, Origin
pub trait LibraryScanner: Debug {
    fn get_library_type(&self) -> SupportedLibraries;
    fn is_detected(&self) -> bool;
    /// Games installed locally, found without any network access
    fn scan_installed(&self) -> InstalledResult;
    /// Games owned by the given account, as reported by the online catalog
    fn scan_remote(&self, credentials: &Credentials) -> LibraryResult;
    /// Chance for a library to refine the `outdated` flag of an installed game once it has been
    /// matched against the account library
    fn refresh_outdated(&self, _game: &mut GameRecord) {}
}
