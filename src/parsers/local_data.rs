//! Model of the per-offer catalog record ("local data") served by the Origin API.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::ParseError;

pub const PLATFORM_WINDOWS: &str = "PCWIN";
pub const OFFER_TYPE_BASE_GAME: &str = "Base Game";
pub const OFFER_TYPE_DEMO: &str = "DEMO";
pub const OFFER_TYPE_MISSING: &str = "Doesn't exist";

/// Accepts RFC 3339 timestamps, as well as timestamps without an offset which are taken as UTC
fn deserialize_effective_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    if let Ok(date) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(date.with_timezone(&Utc)));
    }

    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S")
        .map(|date| Some(date.and_utc()))
        .map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalizableAttributes {
    pub display_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FulfillmentAttributes {
    /// Platform path of the executable (or of `installerdata.xml`), or a launch URL
    pub execute_path_override: Option<String>,
    /// Platform path of a file which exists when the game is installed
    pub install_check_override: Option<String>,
}

/// One downloadable build of a piece of software
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DownloadUrl {
    #[serde(rename = "downloadURL")]
    pub download_url: Option<String>,
    pub build_release_version: Option<String>,
    #[serde(deserialize_with = "deserialize_effective_date")]
    pub effective_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DownloadUrls {
    #[serde(rename = "downloadURL")]
    pub download_url: Vec<DownloadUrl>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Software {
    pub software_id: Option<String>,
    pub software_platform: String,
    pub fulfillment_attributes: FulfillmentAttributes,
    #[serde(rename = "downloadURLs")]
    pub download_urls: DownloadUrls,
}

impl Software {
    /// Download history, ordered as listed
    pub fn download_history(&self) -> &[DownloadUrl] {
        &self.download_urls.download_url
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SoftwareList {
    pub software: Vec<Software>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Publishing {
    pub software_list: SoftwareList,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameLocalData {
    pub offer_id: String,
    pub offer_type: String,
    pub localizable_attributes: LocalizableAttributes,
    pub publishing: Publishing,
}

impl GameLocalData {
    /// Placeholder used when the catalog does not know about an offer
    pub fn missing(offer_id: impl Into<String>) -> Self {
        Self {
            offer_id: offer_id.into(),
            offer_type: OFFER_TYPE_MISSING.to_owned(),
            ..Default::default()
        }
    }

    pub fn is_missing(&self) -> bool {
        self.offer_type == OFFER_TYPE_MISSING
    }

    /// Only full games and demos are imported as installed games
    pub fn is_importable(&self) -> bool {
        self.offer_type == OFFER_TYPE_BASE_GAME || self.offer_type == OFFER_TYPE_DEMO
    }

    pub fn display_name(&self) -> &str {
        &self.localizable_attributes.display_name
    }

    /// The Windows software entry, which is the only one used for installs
    pub fn windows_software(&self) -> Option<&Software> {
        self.publishing
            .software_list
            .software
            .iter()
            .find(|s| s.software_platform == PLATFORM_WINDOWS)
    }
}

pub fn parse_local_data(content: &str) -> Result<GameLocalData, ParseError> {
    Ok(serde_json::from_str(content)?)
}
