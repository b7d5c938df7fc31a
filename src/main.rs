//! Duet Pong headless demo
//!
//! Runs two bot players and a spectator in one process, connected through a
//! jittery in-memory store, then swaps the spectator in when a player leaves.
//!
//! Usage: `duet-pong [seconds] [settings.json]`

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use duet_pong::app::{HostContext, PongApp};
use duet_pong::consts::*;
use duet_pong::input::{Key, KeyEvent};
use duet_pong::renderer::CommandBuffer;
use duet_pong::session::Room;
use duet_pong::sim::{MemberId, Side};
use duet_pong::sync::{LinkConfig, MemoryStore};
use duet_pong::{Settings, SetupError};

const SEED: u64 = 0x5eed;

/// Keeps a seated viewer's paddle under the ball
struct Bot {
    held: Option<Key>,
    rng: Pcg32,
}

impl Bot {
    fn new(seed: u64) -> Self {
        Self {
            held: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    fn drive(&mut self, app: &mut PongApp<CommandBuffer>) {
        let Some(side) = app.side() else {
            return;
        };
        // Hesitate now and then so rallies end
        if self.rng.random_bool(0.2) {
            return;
        }
        let state = app.state();
        let paddle = state.paddle(side);
        let target = state.ball.y + BALL_SIZE / 2.0;
        let center = paddle.y + PADDLE_HEIGHT / 2.0;
        let want = if target < center - GRID {
            Some(Key::MoveUp)
        } else if target > center + GRID {
            Some(Key::MoveDown)
        } else {
            None
        };
        if want == self.held {
            return;
        }
        if let Some(key) = self.held {
            app.handle_key(KeyEvent::Up(key));
        }
        if let Some(key) = want {
            app.handle_key(KeyEvent::Down(key));
        }
        self.held = want;
    }
}

fn spawn(
    room: &Room,
    store: &MemoryStore,
    settings: &Settings,
    id: MemberId,
    name: &str,
) -> Result<PongApp<CommandBuffer>, SetupError> {
    let mut app = PongApp::setup(HostContext {
        session: Some(Box::new(room.join(id, name))),
        store: Box::new(store.clone()),
        surface: Some(CommandBuffer::new(0.0, 0.0)),
        settings: settings.clone(),
    })?;
    app.resize(glam::Vec2::new(CANVAS_WIDTH + CANVAS_INSET, CANVAS_HEIGHT + CANVAS_INSET));
    Ok(app)
}

fn run(seconds: f64, settings: Settings) -> Result<(), SetupError> {
    let room = Room::new();
    let store = MemoryStore::new().with_link(LinkConfig {
        seed: SEED,
        latency_ms: 35.0,
        jitter_ms: 50.0,
        loss: 0.02,
    });

    let mut viewers: HashMap<MemberId, PongApp<CommandBuffer>> = HashMap::new();
    let mut bots: HashMap<MemberId, Bot> = HashMap::new();
    for (id, name) in [(1, "alice"), (2, "bob"), (3, "carol")] {
        viewers.insert(id, spawn(&room, &store, &settings, id, name)?);
        bots.insert(id, Bot::new(SEED ^ id));
    }

    let mut ids: Vec<MemberId> = viewers.keys().copied().collect();
    ids.sort_unstable();

    let claims = [(1, Key::ClaimLeft), (2, Key::ClaimRight)];
    for (id, key) in claims {
        if let Some(app) = viewers.get_mut(&id) {
            app.handle_key(KeyEvent::Up(key));
        }
    }

    let total_frames = (seconds * 1000.0 / FRAME_MS) as u64;
    for frame in 0..total_frames {
        let now = frame as f64 * FRAME_MS;
        room.set_clock(now);
        store.pump(now);

        // Halfway through, bob walks away and carol takes over
        if frame == total_frames / 2 {
            if let Some(mut app) = viewers.remove(&2) {
                app.destroy();
            }
            room.leave(2);
            ids.retain(|&id| id != 2);
        }
        if frame == total_frames / 2 + 30 {
            if let Some(app) = viewers.get_mut(&3) {
                app.handle_key(KeyEvent::Up(Key::ClaimRight));
            }
        }

        for id in &ids {
            let (Some(app), Some(bot)) = (viewers.get_mut(id), bots.get_mut(id)) else {
                continue;
            };
            bot.drive(app);
            app.frame(now);
        }
    }

    // Alice holds her seat for the whole run, so she saw every point
    let points = viewers.get(&1).map_or(0, PongApp::points);

    for id in &ids {
        if let Some(app) = viewers.get(id) {
            let seat = app.side().map(Side::as_str).unwrap_or("spectator");
            log::info!(
                "viewer {}: {:?} as {}, ball at ({:.1}, {:.1})",
                id,
                app.phase(),
                seat,
                app.state().ball.x,
                app.state().ball.y
            );
        }
    }
    println!("{} frames, {} points scored", total_frames, points);
    match store.to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => log::warn!("Could not serialize shared state: {}", e),
    }

    for app in viewers.values_mut() {
        app.destroy();
    }
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Duet Pong (headless) starting...");

    let mut args = std::env::args().skip(1);
    let seconds = args
        .next()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(30.0);
    let settings = args.next().map(Settings::load).unwrap_or_default();

    if let Err(e) = run(seconds, settings) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
