//! Duet Pong - two-player Pong shared across a collaborative session
//!
//! Every viewer runs its own simulation against a local mirror of the shared
//! state. Only the owner of a seat writes that seat's paddle; ball writes are
//! convergent so any viewer may publish them.
//!
//! Core modules:
//! - `sim`: Deterministic simulation (collision, entity model, seats, tick)
//! - `sync`: Publish/subscribe bridge to the shared store
//! - `session`: Room membership, identity and logical clock
//! - `scheduler`: Fixed-rate frame clock and cancellable deferred actions
//! - `input`: Key events to queued intents
//! - `renderer`: Drawing onto an abstract surface
//! - `app`: Wires the above into a running viewer

pub mod app;
pub mod error;
pub mod input;
pub mod renderer;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod sim;
pub mod sync;

pub use app::PongApp;
pub use error::{SettingsError, SetupError};
pub use settings::Settings;

/// Game configuration constants
///
/// These are shared by every client and must not vary between them, which is
/// why they are not part of `Settings`.
pub mod consts {
    /// Base unit: wall thickness, ball size, paddle width
    pub const GRID: f32 = 15.0;

    /// Logical arena dimensions
    pub const CANVAS_WIDTH: f32 = 750.0;
    pub const CANVAS_HEIGHT: f32 = 585.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = GRID;
    pub const PADDLE_HEIGHT: f32 = GRID * 5.0;
    pub const MIN_PADDLE_Y: f32 = GRID;
    pub const MAX_PADDLE_Y: f32 = CANVAS_HEIGHT - GRID - PADDLE_HEIGHT;
    /// Paddle speed (units per tick)
    pub const PADDLE_SPEED: f32 = 6.0;

    /// Ball defaults
    pub const BALL_SIZE: f32 = GRID;
    /// Ball speed per axis (units per tick)
    pub const BALL_SPEED: f32 = 5.0;

    /// Fixed simulation step (60 Hz animation clock)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per host frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default delay before the ball is relaunched after leaving the arena
    pub const RESET_COOLDOWN_MS: f64 = 400.0;

    /// Canvas is inset this much from its container on each resize
    pub const CANVAS_INSET: f32 = 8.0;
}
