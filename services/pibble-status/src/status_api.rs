//! Client for the third-party Minecraft server status API

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::config::PlayerCounts;
use crate::error::StatusFetchError;
use crate::io::HttpClient;

/// Status API response. Every field is optional: offline servers come back
/// as little more than `{"online": false}`. A field holding null or a value
/// of the wrong type decodes as absent, so the display fallbacks apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteServerStatus {
    #[serde(default, deserialize_with = "lenient")]
    pub online: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub players: Option<RemotePlayers>,
    #[serde(default, deserialize_with = "lenient")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub motd: Option<Motd>,
}

/// `players` as reported; either count may be missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RemotePlayers {
    #[serde(default, deserialize_with = "lenient")]
    pub online: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub max: Option<u32>,
}

impl RemotePlayers {
    pub const fn new(online: u32, max: u32) -> Self {
        Self {
            online: Some(online),
            max: Some(max),
        }
    }

    /// Fill missing counts from `defaults`
    pub fn or_defaults(&self, defaults: PlayerCounts) -> PlayerCounts {
        PlayerCounts {
            online: self.online.unwrap_or(defaults.online),
            max: self.max.unwrap_or(defaults.max),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Motd {
    #[serde(default, deserialize_with = "lenient")]
    pub clean: Option<MotdText>,
}

/// `motd.clean` is one string per line, though some mirrors flatten it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MotdText {
    Lines(Vec<String>),
    Text(String),
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl MotdText {
    pub fn joined(&self) -> String {
        match self {
            MotdText::Lines(lines) => lines.join("\n"),
            MotdText::Text(text) => text.clone(),
        }
    }
}

impl RemoteServerStatus {
    /// Cleaned MOTD text, if the response carried one
    pub fn motd_text(&self) -> Option<String> {
        self.motd
            .as_ref()
            .and_then(|m| m.clean.as_ref())
            .map(MotdText::joined)
    }
}

/// Version 2 endpoint for a server address
pub fn endpoint_url(api_base: &str, server_address: &str) -> String {
    format!("{}/2/{}", api_base.trim_end_matches('/'), server_address)
}

/// One GET + decode against the status API
pub async fn fetch_status(
    http: &dyn HttpClient,
    url: &str,
) -> Result<RemoteServerStatus, StatusFetchError> {
    let response = http
        .get(url)
        .await
        .map_err(|e| StatusFetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    if !response.is_success() {
        return Err(StatusFetchError::Status {
            status: response.status,
        });
    }

    let status: RemoteServerStatus = serde_json::from_str(&response.body)?;
    Ok(status)
}
