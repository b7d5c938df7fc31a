//! Seat ownership
//!
//! A seat's occupant is the only writer of that seat and its paddle. Every
//! function here mutates the local mirror first and returns the update the
//! caller must publish, so the mirror is never behind what was published.

use std::collections::HashSet;

use super::state::{FieldUpdate, MemberId, PlayerSlot, SharedState, Side};

/// Side currently held by `me`, if any
pub fn local_side(state: &SharedState, me: MemberId) -> Option<Side> {
    Side::ALL
        .into_iter()
        .find(|&side| state.player(side).member_id == me && state.player(side).is_occupied())
}

/// Take `side` for `me`
///
/// No-op when the seat is already occupied or `me` already holds a seat.
pub fn claim_seat(
    state: &mut SharedState,
    side: Side,
    me: MemberId,
    clock: f64,
) -> Option<FieldUpdate> {
    if let Some(held) = local_side(state, me) {
        log::debug!("ignoring claim of {} seat: already seated {}", side.as_str(), held.as_str());
        return None;
    }
    if state.player(side).is_occupied() {
        log::debug!("ignoring claim of occupied {} seat", side.as_str());
        return None;
    }

    let slot = PlayerSlot::occupied_by(me, clock);
    *state.player_mut(side) = slot;
    log::info!("member {} claimed {} seat", me, side.as_str());
    Some(FieldUpdate::player(side, slot))
}

/// Vacate whatever seat `me` holds
pub fn release_seat(state: &mut SharedState, me: MemberId) -> Option<FieldUpdate> {
    let side = local_side(state, me)?;
    let slot = PlayerSlot::vacant();
    *state.player_mut(side) = slot;
    log::info!("member {} released {} seat", me, side.as_str());
    Some(FieldUpdate::player(side, slot))
}

/// Clear every seat whose occupant is no longer in the session
///
/// Several viewers may race to do this; they all write the same vacant value.
pub fn reap_absent_seats(state: &mut SharedState, members: &HashSet<MemberId>) -> Vec<FieldUpdate> {
    let mut cleared = Vec::new();
    for side in Side::ALL {
        let slot = state.player_mut(side);
        if slot.is_occupied() && !members.contains(&slot.member_id) {
            log::info!(
                "reaping {} seat: member {} left the session",
                side.as_str(),
                slot.member_id
            );
            *slot = PlayerSlot::vacant();
            cleared.push(FieldUpdate::player(side, *slot));
        }
    }
    cleared
}
