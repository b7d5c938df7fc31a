//! Session / room provider
//!
//! The host owns membership and the shared logical clock; the game only
//! reads them through `Session`. `Room` is an in-process implementation used
//! by the demo binary and tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

use crate::sim::{MemberId, NO_MEMBER};

/// What the game needs from the host session
pub trait Session {
    /// Identity of the local viewer
    fn observer_id(&self) -> MemberId;

    /// Members currently present
    fn members(&self) -> HashSet<MemberId>;

    /// Session-wide monotonic timestamp for stamping updates
    fn clock(&self) -> f64;

    /// Cursor label of a present member; `None` if the member is unknown
    fn member_label(&self, member: MemberId) -> Option<String>;
}

/// Name shown above a seat, e.g. `"alice#42"`
///
/// `None` for an empty seat or a member the session cannot resolve.
pub fn display_name(session: &dyn Session, member: MemberId) -> Option<String> {
    if member == NO_MEMBER {
        return None;
    }
    let label = session.member_label(member)?;
    Some(format!("{label}#{member}"))
}

#[derive(Debug, Default)]
struct RoomInner {
    members: BTreeMap<MemberId, String>,
    clock: f64,
}

/// In-process room shared by several viewers; clones share state
#[derive(Debug, Clone, Default)]
pub struct Room {
    inner: Rc<RefCell<RoomInner>>,
}

impl Room {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member and return its view of the room
    pub fn join(&self, member: MemberId, label: impl Into<String>) -> RoomView {
        let label = label.into();
        log::info!("member {} ({}) joined", member, label);
        self.inner.borrow_mut().members.insert(member, label);
        self.view(member)
    }

    pub fn leave(&self, member: MemberId) {
        if self.inner.borrow_mut().members.remove(&member).is_some() {
            log::info!("member {} left", member);
        }
    }

    /// View of the room as seen by `observer`
    pub fn view(&self, observer: MemberId) -> RoomView {
        RoomView {
            room: self.clone(),
            observer,
        }
    }

    /// Move the logical clock forward; it never goes backward
    pub fn set_clock(&self, now: f64) {
        let mut inner = self.inner.borrow_mut();
        inner.clock = inner.clock.max(now);
    }
}

/// A `Room` seen from one member
#[derive(Debug, Clone)]
pub struct RoomView {
    room: Room,
    observer: MemberId,
}

impl Session for RoomView {
    fn observer_id(&self) -> MemberId {
        self.observer
    }

    fn members(&self) -> HashSet<MemberId> {
        self.room.inner.borrow().members.keys().copied().collect()
    }

    fn clock(&self) -> f64 {
        self.room.inner.borrow().clock
    }

    fn member_label(&self, member: MemberId) -> Option<String> {
        self.room.inner.borrow().members.get(&member).cloned()
    }
}
