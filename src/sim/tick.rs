//! Per-frame simulation step
//!
//! Advances the local mirror by one tick. The step is pure with respect to
//! the outside world: it reports what must be published and whether a ball
//! relaunch must be scheduled, and the caller carries those out.

use std::collections::HashSet;

use super::collision::collides;
use super::seats::{local_side, reap_absent_seats};
use super::state::{Ball, FieldUpdate, MemberId, Paddle, SharedState};
use crate::consts::*;

/// What one viewer knows about the session when stepping
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    /// Local viewer
    pub me: MemberId,
    /// Members currently present in the session
    pub members: &'a HashSet<MemberId>,
    /// Session logical clock, used to stamp updates
    pub clock: f64,
}

/// Which branch of the step ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamePhase {
    /// A seat was just vacated; nothing but rendering this tick
    Reconciling,
    /// Local viewer holds no seat
    #[default]
    Spectating,
    /// Local viewer is seated, opponent seat is empty
    Waiting,
    /// Both seats filled, physics running
    Playing,
}

/// Side effects requested by a tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub phase: GamePhase,
    /// Updates to publish, in order
    pub publishes: Vec<FieldUpdate>,
    /// The ball just left the arena; relaunch it after the cooldown
    pub schedule_relaunch: bool,
}

/// Events produced by one ball step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BallStep {
    pub wall_bounce: bool,
    pub paddle_hit: bool,
    pub scored: bool,
}

impl BallStep {
    /// A boundary event changed the ball in a way other viewers must see
    pub fn needs_publish(&self) -> bool {
        self.wall_bounce || self.paddle_hit
    }
}

/// Advance the shared state by one tick
pub fn tick(state: &mut SharedState, ctx: &TickContext) -> TickOutcome {
    let reaped = reap_absent_seats(state, ctx.members);
    if !reaped.is_empty() {
        return TickOutcome {
            phase: GamePhase::Reconciling,
            publishes: reaped,
            schedule_relaunch: false,
        };
    }

    let Some(side) = local_side(state, ctx.me) else {
        return TickOutcome::default();
    };
    if !state.player(side.opponent()).is_occupied() {
        return TickOutcome {
            phase: GamePhase::Waiting,
            ..Default::default()
        };
    }

    // Remote paddle moves with its last known velocity; clamping is local only
    state.left_paddle.integrate();
    state.right_paddle.integrate();

    let step = step_ball(
        &mut state.ball,
        &state.left_paddle,
        &state.right_paddle,
        ctx.clock,
    );
    log::trace!("tick: ball=({}, {}) {:?}", state.ball.x, state.ball.y, step);

    let mut outcome = TickOutcome {
        phase: GamePhase::Playing,
        publishes: Vec::new(),
        schedule_relaunch: step.scored,
    };
    if step.needs_publish() {
        outcome.publishes.push(FieldUpdate::Ball(state.ball));
    }
    outcome
}

/// Move the ball and apply wall, scoring and paddle rules
///
/// Every viewer applies exactly this rule to the same pre-state, which is
/// what makes concurrent ball publishes converge.
pub fn step_ball(ball: &mut Ball, left: &Paddle, right: &Paddle, clock: f64) -> BallStep {
    let mut step = BallStep::default();

    if !ball.resetting {
        ball.x += ball.dx;
        ball.y += ball.dy;
    }

    // Walls
    if ball.y < GRID {
        ball.y = GRID;
        ball.dy = -ball.dy;
        ball.t = clock;
        step.wall_bounce = true;
    } else if ball.y + BALL_SIZE > CANVAS_HEIGHT - GRID {
        ball.y = CANVAS_HEIGHT - GRID - BALL_SIZE;
        ball.dy = -ball.dy;
        ball.t = clock;
        step.wall_bounce = true;
    }

    // Past a paddle: latch once, the relaunch is scheduled by the caller
    if ball.is_out() && !ball.resetting {
        ball.resetting = true;
        step.scored = true;
    }

    // Paddles; only one can be hit per tick
    let rect = ball.rect();
    if collides(&rect, &left.rect()) {
        ball.dx = -ball.dx;
        ball.x = left.x + PADDLE_WIDTH;
        ball.t = clock;
        step.paddle_hit = true;
    } else if collides(&rect, &right.rect()) {
        ball.dx = -ball.dx;
        ball.x = right.x - BALL_SIZE;
        ball.t = clock;
        step.paddle_hit = true;
    }

    step
}

/// Finish a pending reset: recenter and release the latch
///
/// Velocity is kept, so the ball heads back toward the side that scored.
pub fn relaunch_ball(ball: &mut Ball, clock: f64) -> FieldUpdate {
    let (x, y) = Ball::center();
    ball.resetting = false;
    ball.x = x;
    ball.y = y;
    ball.t = clock;
    FieldUpdate::Ball(*ball)
}
