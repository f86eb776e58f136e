use std::fmt;

use serde::{Deserialize, Serialize};

/// Wagering games offered by the arcade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Crash,
    Slot,
    HiLo,
}

impl GameType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Crash => "crash",
            GameType::Slot => "slot",
            GameType::HiLo => "hilo",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
