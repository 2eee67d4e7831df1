//! A Rust library for discovering locally installed Steam and Origin / EA games, and reconciling
//! them with the games owned by an online account.
//!
//! # Description
//!
//! This is a Rust library intended to be used by game library managers which import games from
//! multiple platforms. It can provide information such as which games are installed, where they
//! are installed, how they are launched and whether they need an update, and can merge that
//! with account data (playtime, last activity, categories) fetched through caller-provided
//! catalog clients.
//!
//! # Usage
//!
//! ```rust
//! use lib_library_importer::{
//!     data::SupportedLibraries, get_scanner, reconcile::{Notifier, get_games},
//!     settings::LibrarySettings,
//! };
//!
//! struct PrintNotifier;
//!
//! impl Notifier for PrintNotifier {
//!     fn add(&self, id: &str, message: &str) {
//!         println!("{id}: {message}");
//!     }
//!
//!     fn remove(&self, _: &str) {}
//! }
//!
//! let settings = LibrarySettings::default();
//! if let Some(scanner) = get_scanner(SupportedLibraries::Steam, &settings) {
//!     let outcome = get_games(scanner.as_ref(), &settings, &PrintNotifier);
//!     println!("Found {} games", outcome.games.len());
//! }
//! ```
//!
//! Account data is only available when the scanners are built with a real catalog client, see
//! [`remote::SteamCatalog`] and [`remote::OriginCatalog`].
//!
//! # Currently supported game sources
//!
//! - Steam
//!   - GoldSrc and Source mods are also detected, unless disabled in the settings
//! - Origin / EA app

pub mod data;
pub mod error;
pub mod importers;
pub mod libraries;
mod macros;
pub mod parsers;
pub mod platform_path;
pub mod reconcile;
pub mod remote;
pub mod settings;
#[cfg(test)]
mod test_utils;
mod utils;

use data::{LibraryScanner, SupportedLibraries};
use libraries::{
    origin::Origin,
    steam::{Steam, SteamPaths},
};
use platform_path::{PathResolver, SystemRegistry};
use remote::OfflineCatalog;
use settings::LibrarySettings;
use tracing::debug;

/// Primary entry point into the crate - get a scanner for `library`, if it is installed on this
/// system. The scanner uses the default install locations and an [`OfflineCatalog`], so only its
/// installed phase can succeed.
pub fn get_scanner(
    library: SupportedLibraries,
    settings: &LibrarySettings,
) -> Option<Box<dyn LibraryScanner>> {
    let scanner: Box<dyn LibraryScanner> = match library {
        SupportedLibraries::Steam => Box::new(Steam::new(
            SteamPaths::detect(&SystemRegistry::default())?,
            settings.include_mods,
            Box::new(OfflineCatalog),
        )),
        SupportedLibraries::Origin => Box::new(Origin::new(
            Origin::detect_local_content()?,
            PathResolver::default(),
            Box::new(OfflineCatalog),
        )),
    };

    if !scanner.is_detected() {
        debug!("{library} - Not detected on this system");
        return None;
    }

    Some(scanner)
}
