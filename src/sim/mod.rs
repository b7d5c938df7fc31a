//! Deterministic simulation module
//!
//! All gameplay logic lives here. Every viewer runs this same code against
//! its own mirror of the shared state, so it must stay deterministic:
//! - One fixed step per tick, no wall-clock dependence
//! - No randomness
//! - No rendering, transport or platform dependencies

pub mod collision;
pub mod seats;
pub mod state;
pub mod tick;

pub use collision::{Rect, collides};
pub use seats::{claim_seat, local_side, reap_absent_seats, release_seat};
pub use state::{
    Attributes, Ball, Field, FieldUpdate, MemberId, NO_MEMBER, Paddle, PlayerSlot, SharedState,
    Side,
};
pub use tick::{BallStep, GamePhase, TickContext, TickOutcome, relaunch_ball, step_ball, tick};
