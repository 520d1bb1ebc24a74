use crate::types::Millis;
use serde::{Deserialize, Serialize};

/// All host-issued control signals.
/// The reducer absorbs any command that is invalid for the current phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum SimCommand {
    Play,
    Pause,
    Reset,
    Tick { delta_ms: Millis },
}
