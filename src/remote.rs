//! Contracts of the vendor web services. Transport is left to the implementor; this crate only
//! consumes already-parsed responses.

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    data::{Credentials, SupportedLibraries},
    error::RemoteServiceError,
    parsers::local_data::GameLocalData,
};

pub const OFFER_TYPE_OWNED_BASE_GAME: &str = "basegame";

/// Entry of an account's owned-games catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedGame {
    pub id: String,
    pub name: String,
    pub offer_type: String,
    pub playtime_minutes: u64,
}

/// Usage statistics of one game for one account
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Usage {
    pub total_minutes: u64,
    pub last_session_end: Option<DateTime<Utc>>,
}

/// Origin / EA web services
pub trait OriginCatalog: Debug {
    fn fetch_owned_games(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<OwnedGame>, RemoteServiceError>;

    /// Localized catalog record for an offer. Implementations return
    /// [`RemoteServiceError::NotFound`] when the service does not know the offer.
    fn fetch_local_data(&self, id: &str) -> Result<GameLocalData, RemoteServiceError>;

    fn fetch_usage(
        &self,
        credentials: &Credentials,
        id: &str,
    ) -> Result<Usage, RemoteServiceError>;
}

/// Steam web services
pub trait SteamCatalog: Debug {
    fn fetch_owned_games(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<OwnedGame>, RemoteServiceError>;

    /// Latest build id published on `branch` of the given app, if the branch exists
    fn fetch_latest_build(
        &self,
        app_id: &str,
        branch: &str,
    ) -> Result<Option<u64>, RemoteServiceError>;
}

/// Catalog for when no network access is available: every call fails
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineCatalog;

fn offline<T>() -> Result<T, RemoteServiceError> {
    Err(RemoteServiceError::Transport(String::from(
        "no remote catalog configured",
    )))
}

impl OriginCatalog for OfflineCatalog {
    fn fetch_owned_games(&self, _: &Credentials) -> Result<Vec<OwnedGame>, RemoteServiceError> {
        offline()
    }

    fn fetch_local_data(&self, _: &str) -> Result<GameLocalData, RemoteServiceError> {
        offline()
    }

    fn fetch_usage(&self, _: &Credentials, _: &str) -> Result<Usage, RemoteServiceError> {
        offline()
    }
}

impl SteamCatalog for OfflineCatalog {
    fn fetch_owned_games(&self, _: &Credentials) -> Result<Vec<OwnedGame>, RemoteServiceError> {
        offline()
    }

    fn fetch_latest_build(&self, _: &str, _: &str) -> Result<Option<u64>, RemoteServiceError> {
        offline()
    }
}

/// Fetches the local data for `id`, substituting a "does not exist" placeholder when the
/// service reports the offer as not found
pub fn fetch_local_data_or_placeholder(
    catalog: &dyn OriginCatalog,
    id: &str,
) -> Result<GameLocalData, RemoteServiceError> {
    const LIBRARY: SupportedLibraries = SupportedLibraries::Origin;

    match catalog.fetch_local_data(id) {
        Err(RemoteServiceError::NotFound(_)) => {
            info!("{LIBRARY} - manifest {id} not found on EA server, generating fake manifest");
            Ok(GameLocalData::missing(id))
        }
        other => other,
    }
}
