use serde::{Deserialize, Serialize};
use str_derive::Str;

#[derive(Copy, Clone, Debug, Default, Deserialize, Serialize, Str, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FanMode {
    #[default]
    Auto,
    Manual,
}

/// Value of the fan node. Always written as a whole, never patched.
#[derive(Copy, Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct FanState {
    pub speed: u8,
    pub mode: FanMode,
}

impl FanState {
    pub const fn auto(speed: u8) -> FanState {
        FanState {
            speed,
            mode: FanMode::Auto,
        }
    }

    pub const fn manual(speed: u8) -> FanState {
        FanState {
            speed,
            mode: FanMode::Manual,
        }
    }

    pub fn to_payload(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}
