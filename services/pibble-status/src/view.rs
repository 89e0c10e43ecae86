//! Text the two status call sites render from a `DisplayStatus`

use serde::Serialize;

use crate::display::DisplayStatus;

/// Colour of the home page status dot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    Pending,
    Online,
    Offline,
}

/// Home page indicator. Errors show up as plain "offline".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompactView {
    pub indicator: Indicator,
    pub label: String,
}

impl CompactView {
    pub fn render(status: &DisplayStatus) -> Self {
        if status.loading {
            return Self {
                indicator: Indicator::Pending,
                label: "Checking...".to_string(),
            };
        }
        if status.online && status.error.is_none() {
            Self {
                indicator: Indicator::Online,
                label: format!("Server Online – {} Players", status.players.online),
            }
        } else {
            Self {
                indicator: Indicator::Offline,
                label: "Server Offline".to_string(),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum DetailState {
    Loading,
    Error(String),
    Ready,
}

/// Status page panels
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedView {
    pub state: DetailState,
    pub online_label: &'static str,
    pub player_ratio: String,
    pub player_caption: String,
    pub version: String,
    pub motd: String,
}

impl DetailedView {
    pub fn render(status: &DisplayStatus) -> Self {
        let state = if status.loading {
            DetailState::Loading
        } else if let Some(message) = &status.error {
            DetailState::Error(message.clone())
        } else {
            DetailState::Ready
        };

        Self {
            state,
            online_label: if status.online { "Online" } else { "Offline" },
            player_ratio: format!("{}/{}", status.players.online, status.players.max),
            player_caption: player_caption(status.players.online),
            version: status.version.clone(),
            motd: status.motd.clone(),
        }
    }
}

pub fn player_caption(online: u32) -> String {
    match online {
        0 => "No players online".to_string(),
        1 => "1 player online".to_string(),
        n => format!("{} players online", n),
    }
}
