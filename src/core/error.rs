use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavError {
    #[error("monsters detected in movement path")]
    MonstersInPath,

    #[error("player is stuck")]
    PlayerStuck,

    #[error("player round trip")]
    PlayerRoundTrip,

    #[error("path couldn't be calculated")]
    NoPath,

    #[error("area transition detected but collision data failed to load for area {area}")]
    AreaDataUnavailable { area: String },

    #[error("failed to open door after {attempts} attempts: {reason}")]
    DoorInteraction { attempts: u32, reason: String },

    #[error("Interaction failed: {0}")]
    Interaction(String),

    #[error("Movement interrupted: {0}")]
    Interrupted(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl NavError {
    /// True for the four named failures that end a move without a fault in
    /// the collaborators: the caller decides whether to clear, retry or reroute
    pub fn is_movement_interrupt(&self) -> bool {
        matches!(
            self,
            NavError::MonstersInPath
                | NavError::PlayerStuck
                | NavError::PlayerRoundTrip
                | NavError::NoPath
        )
    }
}

pub type Result<T> = std::result::Result<T, NavError>;
