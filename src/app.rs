//! One viewer of a shared Pong session
//!
//! `PongApp` owns the local mirror and steps it once per animation frame:
//!
//! 1. apply remote updates delivered since the last frame
//! 2. fire due relaunches
//! 3. consume queued input intents
//! 4. run the fixed-step simulation, publishing what it reports
//! 5. render
//!
//! Everything happens on the caller's thread; sharing with other viewers
//! goes exclusively through the `SyncBridge`.

use glam::Vec2;

use crate::error::SetupError;
use crate::input::{InputQueue, Intent, KeyEvent};
use crate::renderer::{FrameView, Renderer, Surface};
use crate::scheduler::{CancelToken, Deferred, FrameClock};
use crate::session::{Session, display_name};
use crate::settings::Settings;
use crate::sim::{
    FieldUpdate, GamePhase, SharedState, Side, TickContext, claim_seat, local_side,
    relaunch_ball, release_seat, tick,
};
use crate::sync::{SharedStore, SyncBridge};

/// Collaborators the host hands to a new viewer
///
/// Session and surface are optional because hosts may fail to provide them;
/// setup refuses to start without either.
pub struct HostContext<S: Surface> {
    pub session: Option<Box<dyn Session>>,
    pub store: Box<dyn SharedStore>,
    pub surface: Option<S>,
    pub settings: Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferredAction {
    RelaunchBall,
}

/// A running viewer
pub struct PongApp<S: Surface> {
    session: Box<dyn Session>,
    bridge: SyncBridge,
    surface: S,
    renderer: Renderer,
    settings: Settings,
    state: SharedState,
    input: InputQueue,
    frame_clock: FrameClock,
    deferred: Deferred<DeferredAction>,
    token: CancelToken,
    phase: GamePhase,
    /// Balls this viewer saw leave the court while simulating
    points: u32,
}

impl<S: Surface> PongApp<S> {
    /// Connect to the shared store and hydrate the local mirror
    pub fn setup(ctx: HostContext<S>) -> Result<Self, SetupError> {
        let HostContext {
            session,
            store,
            surface,
            settings,
        } = ctx;
        let session = session.ok_or(SetupError::NoRoom)?;
        let surface = surface.ok_or(SetupError::NoSurface)?;
        settings.validate()?;

        let bridge = SyncBridge::connect(store);
        let state = SharedState::hydrate(bridge.snapshot(), session.clock());
        let me = session.observer_id();
        if let Some(side) = local_side(&state, me) {
            log::info!("member {} rejoined holding {} seat", me, side.as_str());
        }

        let token = CancelToken::new();
        log::info!("pong viewer {} started", me);
        Ok(Self {
            session,
            bridge,
            surface,
            renderer: Renderer::new(&settings),
            settings,
            state,
            input: InputQueue::new(),
            frame_clock: FrameClock::default(),
            deferred: Deferred::new(token.clone()),
            token,
            phase: GamePhase::default(),
            points: 0,
        })
    }

    /// Queue a key event; it takes effect on the next frame
    pub fn handle_key(&mut self, event: KeyEvent) {
        if self.token.is_cancelled() {
            return;
        }
        self.input.push(event);
    }

    /// Queue a key event given as a host key name (e.g. `"ArrowUp"`)
    pub fn handle_key_name(&mut self, name: &str, pressed: bool) {
        let Some(key) = self.settings.keys.resolve(name) else {
            return;
        };
        self.handle_key(if pressed {
            KeyEvent::Down(key)
        } else {
            KeyEvent::Up(key)
        });
    }

    /// Host container changed size
    pub fn resize(&mut self, container: Vec2) {
        self.renderer.resize(&mut self.surface, container);
    }

    /// Run one animation frame at host time `now` (ms)
    ///
    /// A no-op after `destroy`.
    pub fn frame(&mut self, now: f64) -> GamePhase {
        if self.token.is_cancelled() {
            return self.phase;
        }

        self.bridge.drain(&mut self.state);
        self.run_deferred(now);
        self.apply_intents();

        let members = self.session.members();
        for _ in 0..self.frame_clock.advance(now) {
            let ctx = TickContext {
                me: self.session.observer_id(),
                members: &members,
                clock: self.session.clock(),
            };
            let outcome = tick(&mut self.state, &ctx);
            self.bridge.publish_all(outcome.publishes);
            if outcome.schedule_relaunch {
                self.points += 1;
                log::debug!("ball out, relaunch in {}ms", self.settings.reset_cooldown_ms);
                self.deferred
                    .schedule(now + self.settings.reset_cooldown_ms, DeferredAction::RelaunchBall);
            }
            self.phase = outcome.phase;
            if self.phase != GamePhase::Playing {
                break;
            }
        }

        self.render();
        self.phase
    }

    /// Stop the viewer: unsubscribe, drop pending actions, ignore input
    ///
    /// Safe to call more than once.
    pub fn destroy(&mut self) {
        if self.token.is_cancelled() {
            return;
        }
        self.token.cancel();
        self.deferred.clear();
        self.input.clear();
        self.bridge.disconnect();
        log::info!("pong viewer {} destroyed", self.session.observer_id());
    }

    pub fn is_destroyed(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Points scored while this viewer was seated
    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Seat held by this viewer according to its mirror
    pub fn side(&self) -> Option<Side> {
        local_side(&self.state, self.session.observer_id())
    }

    fn run_deferred(&mut self, now: f64) {
        for action in self.deferred.take_due(now) {
            match action {
                DeferredAction::RelaunchBall => {
                    // Another viewer's relaunch may already have arrived
                    if !self.state.ball.resetting {
                        log::debug!("relaunch skipped: ball already relaunched");
                        continue;
                    }
                    let update = relaunch_ball(&mut self.state.ball, self.session.clock());
                    self.bridge.publish(update);
                }
            }
        }
    }

    fn apply_intents(&mut self) {
        let me = self.session.observer_id();
        let clock = self.session.clock();
        let intents: Vec<Intent> = self.input.drain().collect();
        for intent in intents {
            let update = match intent {
                Intent::Claim(side) => claim_seat(&mut self.state, side, me, clock),
                Intent::Release => release_seat(&mut self.state, me),
                Intent::Move(dy) => self.move_paddle(dy, clock),
            };
            if let Some(update) = update {
                self.bridge.publish(update);
            }
        }
    }

    fn move_paddle(&mut self, dy: f32, clock: f64) -> Option<FieldUpdate> {
        let Some(side) = self.side() else {
            log::debug!("ignoring paddle input while not seated");
            return None;
        };
        let paddle = self.state.paddle(side).with_velocity(dy, clock);
        let update = FieldUpdate::paddle(side, paddle);
        self.state.apply(update);
        Some(update)
    }

    fn render(&mut self) {
        let names_visible = self.phase != GamePhase::Reconciling;
        let name = |member| {
            if names_visible {
                display_name(self.session.as_ref(), member)
            } else {
                None
            }
        };
        let view = FrameView {
            state: &self.state,
            phase: self.phase,
            left_name: name(self.state.left_player.member_id),
            right_name: name(self.state.right_player.member_id),
        };
        self.renderer.draw(&mut self.surface, &view);
    }
}
