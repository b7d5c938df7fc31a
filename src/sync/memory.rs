//! In-process shared store
//!
//! Holds the authoritative snapshot and fans every write out to all
//! subscribers. With a `LinkConfig` each delivery is delayed by a seeded
//! latency + jitter and may be dropped, which is enough to reproduce the
//! transient divergence real viewers see. Per-field order to each subscriber
//! is always preserved.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::mpsc::{self, Sender};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{SharedStore, Subscription};
use crate::sim::{Attributes, Field, FieldUpdate};

/// Upper bound for simulated latency and jitter (ms)
pub const MAX_LINK_DELAY_MS: f64 = 60_000.0;

/// Simulated network conditions between the store and each subscriber
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkConfig {
    pub seed: u64,
    /// Minimum delivery delay (ms)
    pub latency_ms: f64,
    /// Extra random delay on top of `latency_ms` (ms)
    pub jitter_ms: f64,
    /// Probability in [0, 1] that a delivery is lost
    pub loss: f64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            latency_ms: 40.0,
            jitter_ms: 30.0,
            loss: 0.0,
        }
    }
}

struct InFlight {
    due: f64,
    seq: u64,
    update: FieldUpdate,
}

struct Subscriber {
    tx: Sender<FieldUpdate>,
    in_flight: Vec<InFlight>,
    /// Latest due time per field, so a field never overtakes itself
    last_due: HashMap<Field, f64>,
}

struct Link {
    config: LinkConfig,
    rng: Pcg32,
}

struct Inner {
    attrs: Attributes,
    subscribers: Vec<Subscriber>,
    link: Option<Link>,
    now: f64,
    next_seq: u64,
}

/// Shared store living in this process; clones are handles to the same store
#[derive(Clone)]
pub struct MemoryStore {
    inner: Rc<RefCell<Inner>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store with instant delivery
    pub fn new() -> Self {
        Self::with_snapshot(Attributes::default())
    }

    /// Store resuming from a persisted snapshot
    pub fn with_snapshot(attrs: Attributes) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                attrs,
                subscribers: Vec::new(),
                link: None,
                now: 0.0,
                next_seq: 0,
            })),
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        Ok(Self::with_snapshot(Attributes::from_json(json)?))
    }

    /// Delay deliveries per `config`; they are released by `pump`
    pub fn with_link(self, config: LinkConfig) -> Self {
        let config = LinkConfig {
            loss: if config.loss.is_nan() {
                0.0
            } else {
                config.loss.clamp(0.0, 1.0)
            },
            latency_ms: clamp_delay(config.latency_ms),
            jitter_ms: clamp_delay(config.jitter_ms),
            ..config
        };
        self.inner.borrow_mut().link = Some(Link {
            config,
            rng: Pcg32::seed_from_u64(config.seed),
        });
        self
    }

    /// Deliver every in-flight update due at or before `now` (ms)
    pub fn pump(&self, now: f64) {
        let mut inner = self.inner.borrow_mut();
        inner.now = now;
        inner.subscribers.retain_mut(|sub| {
            sub.in_flight
                .sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
            let ready = sub.in_flight.partition_point(|f| f.due <= now);
            for flight in sub.in_flight.drain(..ready) {
                if sub.tx.send(flight.update).is_err() {
                    return false;
                }
            }
            true
        });
    }

    /// Updates published but not yet delivered to someone
    pub fn in_flight(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .map(|s| s.in_flight.len())
            .sum()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        self.inner.borrow().attrs.to_json()
    }
}

fn clamp_delay(ms: f64) -> f64 {
    if ms.is_nan() {
        0.0
    } else {
        ms.clamp(0.0, MAX_LINK_DELAY_MS)
    }
}

impl Inner {
    fn fan_out(&mut self, update: FieldUpdate) {
        let field = update.field();
        let now = self.now;
        let seq = self.next_seq;
        self.next_seq += 1;

        let Inner {
            subscribers, link, ..
        } = self;
        subscribers.retain_mut(|sub| match link {
            None => sub.tx.send(update).is_ok(),
            Some(link) => {
                if link.config.loss > 0.0 && link.rng.random_bool(link.config.loss) {
                    log::trace!("link dropped {}", field.as_str());
                    return true;
                }
                let jitter = if link.config.jitter_ms > 0.0 {
                    link.rng.random_range(0.0..link.config.jitter_ms)
                } else {
                    0.0
                };
                let earliest = sub.last_due.get(&field).copied().unwrap_or(f64::MIN);
                let due = (now + link.config.latency_ms + jitter).max(earliest);
                sub.last_due.insert(field, due);
                sub.in_flight.push(InFlight { due, seq, update });
                true
            }
        });
    }
}

impl SharedStore for MemoryStore {
    fn snapshot(&self) -> Attributes {
        self.inner.borrow().attrs.clone()
    }

    fn publish_field(&self, update: FieldUpdate) {
        let mut inner = self.inner.borrow_mut();
        inner.attrs.apply(update);
        inner.fan_out(update);
    }

    fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        self.inner.borrow_mut().subscribers.push(Subscriber {
            tx,
            in_flight: Vec::new(),
            last_due: HashMap::new(),
        });
        Subscription::new(rx)
    }
}
