//! Error types
//!
//! Only setup can fail. Once a viewer is running, every abnormal condition
//! (lost updates, vanished members, invalid local actions) is absorbed by
//! the simulation instead of being reported.

/// Why settings could not be loaded or accepted
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),

    /// Cooldown must be finite and positive
    #[error("reset cooldown must be a positive number of milliseconds, got {0}")]
    InvalidCooldown(f64),

    #[error("{0} has no key bound")]
    UnboundAction(&'static str),

    #[error("key {key:?} is bound to both {first} and {second}")]
    DuplicateBinding {
        key: String,
        first: &'static str,
        second: &'static str,
    },
}

/// Why a viewer could not be started
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("pong can not be played without a room")]
    NoRoom,

    #[error("no render surface")]
    NoSurface,

    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),
}
